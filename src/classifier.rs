use url::Url;

/// Schemes that never point at a downloadable file.
const SKIPPED_SCHEMES: [&str; 3] = ["data", "mailto", "javascript"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetKind {
    Image,
    Stylesheet,
    Script,
    Font,
    Media,
}

const ASSET_EXTENSIONS: &[(&str, AssetKind)] = &[
    (".png", AssetKind::Image),
    (".jpg", AssetKind::Image),
    (".jpeg", AssetKind::Image),
    (".gif", AssetKind::Image),
    (".webp", AssetKind::Image),
    (".svg", AssetKind::Image),
    (".ico", AssetKind::Image),
    (".css", AssetKind::Stylesheet),
    (".js", AssetKind::Script),
    (".woff", AssetKind::Font),
    (".woff2", AssetKind::Font),
    (".ttf", AssetKind::Font),
    (".otf", AssetKind::Font),
    (".eot", AssetKind::Font),
    (".mp4", AssetKind::Media),
    (".webm", AssetKind::Media),
];

impl AssetKind {
    /// Classifies a URL by the extension of its path, ignoring case.
    /// Query and fragment play no part.
    pub fn from_url(url: &Url) -> Option<Self> {
        if SKIPPED_SCHEMES.contains(&url.scheme()) {
            return None;
        }

        let path = url.path().to_ascii_lowercase();
        ASSET_EXTENSIONS
            .iter()
            .find(|(ext, _)| path.ends_with(ext))
            .map(|(_, kind)| *kind)
    }

    pub fn label(self) -> &'static str {
        match self {
            AssetKind::Image => "image",
            AssetKind::Stylesheet => "css",
            AssetKind::Script => "js",
            AssetKind::Font => "font",
            AssetKind::Media => "media",
        }
    }
}

/// Whether `url` names something worth downloading into the asset tree.
///
/// Extension-less URLs (dynamic endpoints) are never assets, even when they
/// serve an image or a stylesheet.
pub fn should_download_asset(url: &Url) -> bool {
    AssetKind::from_url(url).is_some()
}
