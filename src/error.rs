use reqwest::StatusCode;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors produced while mirroring a page.
#[derive(Debug, Error)]
pub enum MirrorError {
    /// The server answered, but not with a success status.
    #[error("request to {url} failed with status {status}")]
    RequestFailure { url: String, status: StatusCode },

    /// The request never produced a usable response (connect, timeout, body read).
    #[error("request to {url} failed: {source}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),

    #[error("I/O error on {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("malformed URL `{url}`: {source}")]
    MalformedUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
}

impl MirrorError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// True for both kinds of fetch failure (bad status or transport error).
    pub fn is_fetch_failure(&self) -> bool {
        matches!(self, Self::RequestFailure { .. } | Self::Network { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_failure_names_url_and_status() {
        let err = MirrorError::RequestFailure {
            url: "https://example.com/logo.png".to_string(),
            status: StatusCode::NOT_FOUND,
        };
        let message = err.to_string();
        assert!(message.contains("https://example.com/logo.png"));
        assert!(message.contains("404"));
        assert!(err.is_fetch_failure());
    }

    #[test]
    fn io_error_is_not_a_fetch_failure() {
        let err = MirrorError::io(
            "site_mirror/index.html",
            io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        );
        assert!(!err.is_fetch_failure());
        assert!(err.to_string().contains("denied"));
    }
}
