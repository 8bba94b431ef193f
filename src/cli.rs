use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

use crate::mirror::MirrorOptions;

#[derive(Parser, Debug)]
#[command(
    name = "asset-mirror",
    about = "Mirror a single HTML page together with its assets",
    version,
    long_about = "Downloads one HTML page plus the images, scripts, stylesheets, fonts and media it references. Asset references in the markup and in stylesheets are rewritten to point at a public prefix under which the downloaded assets are served."
)]
pub struct MirrorCommand {
    /// The URL of the page to mirror
    #[arg(required = true)]
    pub url: String,

    /// Output directory for the mirrored page and its assets
    #[arg(short = 'o', long, default_value = "site_mirror")]
    pub out_dir: PathBuf,

    /// Public URL prefix the assets will be served under (e.g. /static or /assets)
    #[arg(long, default_value = "/assets")]
    pub asset_prefix: String,

    /// File name of the saved HTML page
    #[arg(long, default_value = "index.html")]
    pub html_name: String,

    /// User agent string to use for requests
    #[arg(long, default_value = "asset-mirror/1.0")]
    pub user_agent: String,

    /// Timeout for each request in seconds
    #[arg(long, default_value = "20", value_parser = clap::value_parser!(u64).range(1..))]
    pub timeout: u64,

    /// Abort when an asset referenced from inline CSS cannot be downloaded
    #[arg(long)]
    pub strict_inline_styles: bool,
}

impl MirrorCommand {
    pub fn options(&self) -> MirrorOptions {
        MirrorOptions {
            out_dir: self.out_dir.clone(),
            asset_prefix: self.asset_prefix.clone(),
            html_name: self.html_name.clone(),
            user_agent: self.user_agent.clone(),
            timeout: Duration::from_secs(self.timeout),
            strict_inline_styles: self.strict_inline_styles,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_basic_args() {
        let args = MirrorCommand::try_parse_from(["asset-mirror", "https://example.com/page"]).unwrap();

        assert_eq!(args.url, "https://example.com/page");
        assert_eq!(args.out_dir, PathBuf::from("site_mirror"));
        assert_eq!(args.asset_prefix, "/assets");
        assert_eq!(args.html_name, "index.html");
        assert_eq!(args.timeout, 20);
        assert!(!args.strict_inline_styles);
    }

    #[test]
    fn test_parse_all_args() {
        let args = MirrorCommand::try_parse_from([
            "asset-mirror",
            "https://example.com",
            "-o",
            "./output",
            "--asset-prefix",
            "/static",
            "--html-name",
            "home.html",
            "--user-agent",
            "TestAgent/2.0",
            "--timeout",
            "5",
            "--strict-inline-styles",
        ])
        .unwrap();

        assert_eq!(args.out_dir, PathBuf::from("./output"));
        assert_eq!(args.asset_prefix, "/static");
        assert_eq!(args.html_name, "home.html");
        assert_eq!(args.user_agent, "TestAgent/2.0");
        assert_eq!(args.timeout, 5);
        assert!(args.strict_inline_styles);
    }

    #[test]
    fn test_long_out_dir_flag() {
        let args = MirrorCommand::try_parse_from(["asset-mirror", "https://example.com", "--out-dir", "mirror"]).unwrap();
        assert_eq!(args.out_dir, PathBuf::from("mirror"));
    }

    #[test]
    fn test_defaults_agree_with_library_defaults() {
        let args = MirrorCommand::try_parse_from(["asset-mirror", "https://example.com"]).unwrap();
        let options = args.options();
        let defaults = MirrorOptions::default();

        assert_eq!(options.out_dir, defaults.out_dir);
        assert_eq!(options.asset_prefix, defaults.asset_prefix);
        assert_eq!(options.html_name, defaults.html_name);
        assert_eq!(options.user_agent, defaults.user_agent);
        assert_eq!(options.timeout, defaults.timeout);
        assert_eq!(options.strict_inline_styles, defaults.strict_inline_styles);
    }

    #[test]
    fn test_parse_missing_url() {
        let result = MirrorCommand::try_parse_from(["asset-mirror", "-o", "./output"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_zero_timeout() {
        let result = MirrorCommand::try_parse_from(["asset-mirror", "https://example.com", "--timeout", "0"]);
        assert!(result.is_err());
    }
}
