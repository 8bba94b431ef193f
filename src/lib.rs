pub mod classifier;
pub mod cli;
pub mod css;
pub mod downloader;
pub mod error;
pub mod file_manager;
pub mod html_parser;
pub mod mirror;

// Re-export main types for convenience
pub use classifier::{should_download_asset, AssetKind};
pub use cli::MirrorCommand;
pub use css::CssRewriter;
pub use downloader::{AssetStatus, Downloader};
pub use error::MirrorError;
pub use file_manager::{map_to_local_path, AssetPath, FileManager};
pub use html_parser::{Element, HtmlDocument};
pub use mirror::{process_page, MirrorOptions, MirrorReport, PageMirror};
