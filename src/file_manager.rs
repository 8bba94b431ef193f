use std::fs;
use std::path::{Path, PathBuf};
use url::Url;

use crate::error::MirrorError;

/// Extension given to files whose URL carries none.
const DEFAULT_EXTENSION: &str = ".bin";

/// Where a remote asset lives on disk, and how it is addressed once served.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetPath {
    local: PathBuf,
    relative: String,
}

impl AssetPath {
    /// Path on disk, below the assets root.
    pub fn local(&self) -> &Path {
        &self.local
    }

    /// Path relative to the assets root, always joined with `/`.
    pub fn relative(&self) -> &str {
        &self.relative
    }

    /// The reference written back into HTML or CSS, e.g. `/assets/img/logo.png`.
    pub fn public_url(&self, prefix: &str) -> String {
        format!("{}/{}", prefix.trim_end_matches('/'), self.relative)
    }

    pub fn exists(&self) -> bool {
        self.local.exists()
    }
}

/// Maps an asset URL to its place under `assets_root`.
///
/// `https://example.com/static/img/logo.png` becomes
/// `assets_root/static/img/logo.png`. A missing filename becomes `index`, a
/// missing extension becomes `.bin`, and a query string is folded into the
/// stem (`app.js?v=2` becomes `app_v_2.js`) so variants do not collide.
/// Pure: never touches the filesystem.
pub fn map_to_local_path(asset_url: &Url, assets_root: &Path) -> AssetPath {
    let path = match asset_url.path() {
        "" => "/unnamed",
        path => path,
    };

    let (dir, name) = match path.rfind('/') {
        Some(idx) => (&path[..idx], &path[idx + 1..]),
        None => ("", path),
    };
    let name = if name.is_empty() { "index" } else { name };

    let (stem, ext) = match split_extension(name) {
        (stem, ext) if ext.len() > 1 => (stem, ext),
        _ => (name, DEFAULT_EXTENSION),
    };

    let file_name = match asset_url.query().filter(|q| !q.is_empty()) {
        Some(query) => format!("{}_{}{}", stem, sanitize_query(query), ext),
        None => format!("{}{}", stem, ext),
    };

    // `.`/`..` segments are dropped so nothing lands outside the assets root
    let mut segments: Vec<&str> = dir
        .split('/')
        .filter(|s| !s.is_empty() && *s != "." && *s != "..")
        .collect();
    segments.push(&file_name);

    let mut local = assets_root.to_path_buf();
    for segment in &segments {
        local.push(segment);
    }

    AssetPath {
        local,
        relative: segments.join("/"),
    }
}

/// Splits `name` into stem and extension (the extension keeps its dot).
/// Leading dots belong to the stem, so `.htaccess` has no extension.
fn split_extension(name: &str) -> (&str, &str) {
    let leading_dots = name.len() - name.trim_start_matches('.').len();
    match name[leading_dots..].rfind('.') {
        Some(idx) => name.split_at(leading_dots + idx),
        None => (name, ""),
    }
}

fn sanitize_query(query: &str) -> String {
    query
        .chars()
        .map(|c| match c {
            c if c.is_ascii_alphanumeric() => c,
            '.' | '_' | '-' => c,
            _ => '_',
        })
        .collect()
}

/// Owns the output directory layout: `<out_dir>/<html>` plus `<out_dir>/assets/`.
#[derive(Clone, Debug)]
pub struct FileManager {
    base_dir: PathBuf,
    assets_dir: PathBuf,
}

impl FileManager {
    /// Creates `base_dir` if needed. The assets directory is created lazily
    /// by the first write below it.
    pub fn new(base_dir: &Path) -> Result<Self, MirrorError> {
        let base_dir = base_dir.to_path_buf();
        fs::create_dir_all(&base_dir).map_err(|e| MirrorError::io(&base_dir, e))?;
        let assets_dir = base_dir.join("assets");

        Ok(Self {
            base_dir,
            assets_dir,
        })
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    pub fn assets_dir(&self) -> &Path {
        &self.assets_dir
    }

    pub fn asset_path(&self, asset_url: &Url) -> AssetPath {
        map_to_local_path(asset_url, &self.assets_dir)
    }

    /// Writes the final page next to the assets directory.
    pub fn save_html(&self, html_name: &str, html: &str) -> Result<PathBuf, MirrorError> {
        let path = self.base_dir.join(html_name);
        write_file(&path, html.as_bytes())?;
        Ok(path)
    }
}

pub fn ensure_parent_dir(path: &Path) -> Result<(), MirrorError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| MirrorError::io(parent, e))?;
    }
    Ok(())
}

/// Writes `content` to `path`, creating parent directories and replacing any
/// existing file.
pub fn write_file(path: &Path, content: &[u8]) -> Result<(), MirrorError> {
    ensure_parent_dir(path)?;
    fs::write(path, content).map_err(|e| MirrorError::io(path, e))
}
