use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

use crate::classifier::{should_download_asset, AssetKind};
use crate::css::CssRewriter;
use crate::downloader::{AssetStatus, Downloader, DEFAULT_TIMEOUT, DEFAULT_USER_AGENT};
use crate::error::MirrorError;
use crate::file_manager::{self, FileManager};
use crate::html_parser::{Element, HtmlDocument};

/// Tag/attribute pairs whose value is a direct asset reference.
const ASSET_ATTRIBUTES: [(&str, &str); 6] = [
    ("img", "src"),
    ("script", "src"),
    ("link", "href"),
    ("source", "src"),
    ("video", "src"),
    ("audio", "src"),
];

/// Everything that shapes a run apart from the start URL.
#[derive(Debug, Clone)]
pub struct MirrorOptions {
    pub out_dir: PathBuf,
    /// Public prefix written in front of every rewritten asset path.
    pub asset_prefix: String,
    pub html_name: String,
    pub user_agent: String,
    pub timeout: Duration,
    /// Abort the run when an asset referenced from inline CSS cannot be
    /// fetched, instead of leaving that block unchanged.
    pub strict_inline_styles: bool,
}

impl Default for MirrorOptions {
    fn default() -> Self {
        Self {
            out_dir: PathBuf::from("site_mirror"),
            asset_prefix: "/assets".to_string(),
            html_name: "index.html".to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout: DEFAULT_TIMEOUT,
            strict_inline_styles: false,
        }
    }
}

/// What a finished run produced.
#[derive(Debug, Clone, Default)]
pub struct MirrorReport {
    pub html_path: PathBuf,
    pub assets_dir: PathBuf,
    /// Assets fetched during this run.
    pub downloaded: usize,
    /// Assets already on disk from an earlier run.
    pub reused: usize,
    /// References left unrewritten because fetching or rewriting them failed.
    pub failed: usize,
}

impl MirrorReport {
    pub fn record(&mut self, status: AssetStatus) {
        match status {
            AssetStatus::Downloaded => self.downloaded += 1,
            AssetStatus::AlreadyPresent => self.reused += 1,
        }
    }
}

/// Mirrors a single page: the HTML, the assets it references, and the
/// assets referenced by its stylesheets.
pub struct PageMirror {
    options: MirrorOptions,
    downloader: Downloader,
    file_manager: FileManager,
}

impl PageMirror {
    pub fn new(options: MirrorOptions) -> Result<Self, MirrorError> {
        let downloader = Downloader::new(&options.user_agent, options.timeout)?;
        let file_manager = FileManager::new(&options.out_dir)?;

        Ok(Self {
            options,
            downloader,
            file_manager,
        })
    }

    pub fn options(&self) -> &MirrorOptions {
        &self.options
    }

    /// Runs the whole pipeline for `start_url`. Only a failure to fetch the
    /// page itself, or to write the final HTML, fails the run (plus inline
    /// CSS failures when `strict_inline_styles` is set).
    pub async fn process_page(&self, start_url: &str) -> Result<MirrorReport, MirrorError> {
        let progress = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner().template("{spinner} {msg}") {
            progress.set_style(style);
        }
        self.process_page_with_progress(start_url, &progress).await
    }

    /// The spinner is cleared whether or not the run succeeds.
    async fn process_page_with_progress(
        &self,
        start_url: &str,
        progress: &ProgressBar,
    ) -> Result<MirrorReport, MirrorError> {
        let result = self.run(start_url, progress).await;
        progress.finish_and_clear();
        result
    }

    async fn run(&self, start_url: &str, progress: &ProgressBar) -> Result<MirrorReport, MirrorError> {
        let base_url = Url::parse(start_url).map_err(|source| MirrorError::MalformedUrl {
            url: start_url.to_string(),
            source,
        })?;
        let mut report = MirrorReport {
            assets_dir: self.file_manager.assets_dir().to_path_buf(),
            ..Default::default()
        };

        progress.suspend(|| println!("🌐 Fetching HTML: {}", base_url.as_str().blue()));
        progress.set_message("Fetching page");
        let html = self.downloader.fetch_text(&base_url).await?;
        let document = HtmlDocument::parse(&html);

        progress.set_message("Rewriting asset references");
        self.rewrite_direct_assets(&document, &base_url, progress, &mut report)
            .await;

        progress.set_message("Rewriting inline styles");
        self.rewrite_inline_styles(&document, &base_url, progress, &mut report)
            .await?;

        progress.set_message("Rewriting stylesheets");
        self.rewrite_stylesheets(&document, &base_url, progress, &mut report)
            .await;

        let html = document
            .serialize()
            .map_err(|e| MirrorError::io(self.file_manager.base_dir().join(&self.options.html_name), e))?;
        report.html_path = self.file_manager.save_html(&self.options.html_name, &html)?;

        Ok(report)
    }

    async fn rewrite_direct_assets(
        &self,
        document: &HtmlDocument,
        base_url: &Url,
        progress: &ProgressBar,
        report: &mut MirrorReport,
    ) {
        for (tag, attr) in ASSET_ATTRIBUTES {
            for element in document.elements_named(tag) {
                // Stylesheets get their contents rewritten in a later pass
                if tag == "link" && is_stylesheet_link(&element, base_url) {
                    continue;
                }
                let Some(value) = element.attr(attr).filter(|v| !v.is_empty()) else {
                    continue;
                };

                match self.mirror_asset(&value, base_url, progress, report).await {
                    Ok(Some(public_url)) => element.set_attr(attr, &public_url),
                    Ok(None) => {}
                    Err(e) => {
                        progress.suspend(|| eprintln!("❌ Failed to download {}: {}", value.red(), e));
                        report.failed += 1;
                    }
                }
            }
        }
    }

    /// Downloads one referenced asset if it is new and returns its public URL.
    /// `None` means the reference is not an asset and stays as it is.
    async fn mirror_asset(
        &self,
        value: &str,
        base_url: &Url,
        progress: &ProgressBar,
        report: &mut MirrorReport,
    ) -> Result<Option<String>, MirrorError> {
        let full_url = resolve(base_url, value)?;
        let Some(kind) = AssetKind::from_url(&full_url) else {
            return Ok(None);
        };

        let target = self.file_manager.asset_path(&full_url);
        let status = self
            .downloader
            .ensure_asset(&full_url, &target, || {
                progress.suspend(|| {
                    println!("📥 [HTML] Downloading {} ({})", full_url.as_str().blue(), kind.label())
                })
            })
            .await?;
        report.record(status);

        Ok(Some(target.public_url(&self.options.asset_prefix)))
    }

    async fn rewrite_inline_styles(
        &self,
        document: &HtmlDocument,
        base_url: &Url,
        progress: &ProgressBar,
        report: &mut MirrorReport,
    ) -> Result<(), MirrorError> {
        let rewriter = self.css_rewriter(progress);

        for style in document.elements_named("style") {
            let css = style.text();
            if css.is_empty() {
                continue;
            }
            if let Some(new_css) = self.rewrite_inline_css(&rewriter, &css, base_url, report).await? {
                style.set_text(&new_css);
            }
        }

        for element in document.elements_with_attr("style") {
            let Some(css) = element.attr("style") else {
                continue;
            };
            if let Some(new_css) = self.rewrite_inline_css(&rewriter, &css, base_url, report).await? {
                element.set_attr("style", &new_css);
            }
        }

        Ok(())
    }

    /// Applies the inline-style failure policy: `Ok(None)` leaves the block
    /// unchanged after logging.
    async fn rewrite_inline_css(
        &self,
        rewriter: &CssRewriter<'_>,
        css: &str,
        base_url: &Url,
        report: &mut MirrorReport,
    ) -> Result<Option<String>, MirrorError> {
        match rewriter.rewrite_css_urls(css, base_url, report).await {
            Ok(new_css) => Ok(Some(new_css)),
            Err(e) if !self.options.strict_inline_styles => {
                rewriter
                    .progress()
                    .suspend(|| eprintln!("❌ Failed to rewrite inline CSS: {}", e));
                report.failed += 1;
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    async fn rewrite_stylesheets(
        &self,
        document: &HtmlDocument,
        base_url: &Url,
        progress: &ProgressBar,
        report: &mut MirrorReport,
    ) {
        let rewriter = self.css_rewriter(progress);

        for link in document.elements_named("link") {
            if !is_stylesheet_link(&link, base_url) {
                continue;
            }
            let Some(href) = link.attr("href").filter(|h| !h.is_empty()) else {
                continue;
            };

            match self.mirror_stylesheet(&rewriter, &href, base_url, report).await {
                Ok(Some(public_url)) => link.set_attr("href", &public_url),
                Ok(None) => {}
                Err(e) => {
                    progress.suspend(|| eprintln!("❌ Failed to process stylesheet {}: {}", href.red(), e));
                    report.failed += 1;
                }
            }
        }
    }

    /// Fetches a stylesheet, rewrites the references inside it relative to
    /// its own URL, and stores the rewritten text.
    async fn mirror_stylesheet(
        &self,
        rewriter: &CssRewriter<'_>,
        href: &str,
        base_url: &Url,
        report: &mut MirrorReport,
    ) -> Result<Option<String>, MirrorError> {
        let css_url = resolve(base_url, href)?;
        if !should_download_asset(&css_url) {
            return Ok(None);
        }

        let target = self.file_manager.asset_path(&css_url);
        if target.exists() {
            report.record(AssetStatus::AlreadyPresent);
        } else {
            rewriter
                .progress()
                .suspend(|| println!("🎨 [CSS] Downloading & rewriting {}", css_url.as_str().blue()));
            let css = self.downloader.fetch_text(&css_url).await?;
            let new_css = rewriter.rewrite_css_urls(&css, &css_url, report).await?;
            file_manager::write_file(target.local(), new_css.as_bytes())?;
            report.record(AssetStatus::Downloaded);
        }

        Ok(Some(target.public_url(&self.options.asset_prefix)))
    }

    fn css_rewriter<'a>(&'a self, progress: &'a ProgressBar) -> CssRewriter<'a> {
        CssRewriter::new(&self.downloader, &self.file_manager, &self.options.asset_prefix, progress)
    }
}

/// Mirrors `start_url` into `out_dir` with default client settings.
pub async fn process_page(
    start_url: &str,
    out_dir: &Path,
    public_asset_prefix: &str,
    html_name: &str,
) -> Result<MirrorReport, MirrorError> {
    let options = MirrorOptions {
        out_dir: out_dir.to_path_buf(),
        asset_prefix: public_asset_prefix.to_string(),
        html_name: html_name.to_string(),
        ..Default::default()
    };
    PageMirror::new(options)?.process_page(start_url).await
}

fn resolve(base_url: &Url, reference: &str) -> Result<Url, MirrorError> {
    base_url.join(reference).map_err(|source| MirrorError::MalformedUrl {
        url: reference.to_string(),
        source,
    })
}

/// A `link` is handled as a stylesheet when its `rel` says so or when its
/// `href` points at a `.css` file, so a preload of the same file cannot store
/// it unrewritten before the stylesheet pass sees it.
fn is_stylesheet_link(link: &Element, base_url: &Url) -> bool {
    link.has_token("rel", "stylesheet")
        || link
            .attr("href")
            .and_then(|href| base_url.join(&href).ok())
            .and_then(|url| AssetKind::from_url(&url))
            == Some(AssetKind::Stylesheet)
}
