use colored::*;
use indicatif::ProgressBar;
use regex::Regex;
use std::sync::LazyLock;
use url::Url;

use crate::classifier::should_download_asset;
use crate::downloader::Downloader;
use crate::error::MirrorError;
use crate::file_manager::FileManager;
use crate::mirror::MirrorReport;

/// `url(...)` with a lazy body. Textual on purpose: no CSS tokenizer, and a
/// reference never spans lines.
static CSS_URL: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)url\((.*?)\)").unwrap());

/// Rewrites `url(...)` references in CSS so they point into the mirrored
/// asset tree, downloading each referenced asset on first sight.
pub struct CssRewriter<'a> {
    downloader: &'a Downloader,
    files: &'a FileManager,
    public_prefix: &'a str,
    progress: &'a ProgressBar,
}

impl<'a> CssRewriter<'a> {
    pub fn new(
        downloader: &'a Downloader,
        files: &'a FileManager,
        public_prefix: &'a str,
        progress: &'a ProgressBar,
    ) -> Self {
        Self {
            downloader,
            files,
            public_prefix,
            progress,
        }
    }

    pub fn progress(&self) -> &ProgressBar {
        self.progress
    }

    /// Returns `css_text` with every downloadable reference replaced by
    /// `url('<prefix>/<relative path>')`. References are resolved against
    /// `base_url`, which is the page for inline CSS and the stylesheet itself
    /// for external files.
    ///
    /// The first failed download aborts the rewrite; the caller decides
    /// whether that is fatal.
    pub async fn rewrite_css_urls(
        &self,
        css_text: &str,
        base_url: &Url,
        report: &mut MirrorReport,
    ) -> Result<String, MirrorError> {
        let mut rewritten = String::with_capacity(css_text.len());
        let mut last_end = 0;

        for caps in CSS_URL.captures_iter(css_text) {
            let (Some(whole), Some(inner)) = (caps.get(0), caps.get(1)) else {
                continue;
            };

            rewritten.push_str(&css_text[last_end..whole.start()]);
            last_end = whole.end();

            match self.rewrite_reference(inner.as_str(), base_url, report).await? {
                Some(replacement) => rewritten.push_str(&replacement),
                None => rewritten.push_str(whole.as_str()),
            }
        }

        rewritten.push_str(&css_text[last_end..]);
        Ok(rewritten)
    }

    /// `None` keeps the original match untouched.
    async fn rewrite_reference(
        &self,
        raw: &str,
        base_url: &Url,
        report: &mut MirrorReport,
    ) -> Result<Option<String>, MirrorError> {
        let raw = raw.trim().trim_matches(|c| c == '\'' || c == '"');
        if raw.is_empty() || raw.starts_with("data:") {
            return Ok(None);
        }

        let full_url = base_url.join(raw).map_err(|source| MirrorError::MalformedUrl {
            url: raw.to_string(),
            source,
        })?;
        if !should_download_asset(&full_url) {
            return Ok(Some(format!("url({})", raw)));
        }

        let target = self.files.asset_path(&full_url);
        let status = self
            .downloader
            .ensure_asset(&full_url, &target, || {
                self.progress
                    .suspend(|| println!("📥 [CSS] Downloading {}", full_url.as_str().blue()))
            })
            .await?;
        report.record(status);

        Ok(Some(format!("url('{}')", target.public_url(self.public_prefix))))
    }
}
