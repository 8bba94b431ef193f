use reqwest::{Client, ClientBuilder, Response};
use std::path::Path;
use std::time::Duration;
use url::Url;

use crate::error::MirrorError;
use crate::file_manager::{self, AssetPath};

pub const DEFAULT_USER_AGENT: &str = "asset-mirror/1.0";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(20);

/// Outcome of making sure an asset is on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetStatus {
    Downloaded,
    AlreadyPresent,
}

/// A single HTTP client shared by every request of a run.
#[derive(Clone)]
pub struct Downloader {
    client: Client,
}

impl Downloader {
    pub fn new(user_agent: &str, timeout: Duration) -> Result<Self, MirrorError> {
        let client = Self::build_http_client(user_agent, timeout)?;
        Ok(Self { client })
    }

    fn build_http_client(user_agent: &str, timeout: Duration) -> Result<Client, MirrorError> {
        ClientBuilder::new()
            .use_rustls_tls()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()
            .map_err(MirrorError::HttpClient)
    }

    /// Sends a GET and rejects anything but a success status.
    async fn get(&self, url: &Url) -> Result<Response, MirrorError> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|source| MirrorError::Network {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(MirrorError::RequestFailure {
                url: url.to_string(),
                status,
            });
        }

        Ok(response)
    }

    /// Fetches a document as text, decoded with the charset the server declares.
    pub async fn fetch_text(&self, url: &Url) -> Result<String, MirrorError> {
        self.get(url)
            .await?
            .text()
            .await
            .map_err(|source| MirrorError::Network {
                url: url.to_string(),
                source,
            })
    }

    pub async fn fetch_bytes(&self, url: &Url) -> Result<Vec<u8>, MirrorError> {
        let bytes = self
            .get(url)
            .await?
            .bytes()
            .await
            .map_err(|source| MirrorError::Network {
                url: url.to_string(),
                source,
            })?;
        Ok(bytes.to_vec())
    }

    /// Downloads `url` into `local_path`, unconditionally replacing whatever
    /// is there. Parent directories are created before the request goes out.
    pub async fn fetch_and_store(&self, url: &Url, local_path: &Path) -> Result<(), MirrorError> {
        file_manager::ensure_parent_dir(local_path)?;
        let content = self.fetch_bytes(url).await?;
        file_manager::write_file(local_path, &content)
    }

    /// Downloads `url` unless its mapped file already exists. `before_fetch`
    /// runs only when a request is about to go out.
    pub async fn ensure_asset(
        &self,
        url: &Url,
        target: &AssetPath,
        before_fetch: impl FnOnce(),
    ) -> Result<AssetStatus, MirrorError> {
        if target.exists() {
            return Ok(AssetStatus::AlreadyPresent);
        }
        before_fetch();
        self.fetch_and_store(url, target.local()).await?;
        Ok(AssetStatus::Downloaded)
    }
}
