//! Runtime configuration for the vector index.

use std::path::PathBuf;

use crate::errors::VectorError;

/// Configuration for remote search and the local fallback.
///
/// When `api_key` is `None` the store runs entirely against the local
/// per-namespace JSONL files under `stub_dir` — same call signature, same
/// ordering guarantee, degraded recall/scale only.
#[derive(Clone, Debug)]
pub struct VectorConfig {
    /// API key for the remote index; absence selects the local fallback.
    pub api_key: Option<String>,
    /// Index host, e.g. `https://my-index-abc123.svc.us-east-1.pinecone.io`.
    pub index_host: String,
    /// Directory holding `<namespace>.jsonl` fallback files.
    pub stub_dir: PathBuf,
    /// Request timeout for remote calls, seconds.
    pub timeout_secs: u64,
}

impl VectorConfig {
    /// A local-only config over the given stub directory.
    pub fn local(stub_dir: impl Into<PathBuf>) -> Self {
        Self {
            api_key: None,
            index_host: String::new(),
            stub_dir: stub_dir.into(),
            timeout_secs: 30,
        }
    }

    /// Builds configuration from environment variables.
    ///
    /// Environment variables:
    /// - `PINECONE_API_KEY` (optional; unset selects the local fallback)
    /// - `PINECONE_HOST` (required when the key is set)
    /// - `PINECONE_STUB_DIR` (default `storage/pinecone_stub`)
    /// - `PINECONE_TIMEOUT_SECS` (default 30)
    pub fn from_env() -> Self {
        let api_key = std::env::var("PINECONE_API_KEY")
            .ok()
            .filter(|v| !v.trim().is_empty());
        let index_host = std::env::var("PINECONE_HOST").unwrap_or_default();
        let stub_dir = std::env::var("PINECONE_STUB_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("storage/pinecone_stub"));
        let timeout_secs = std::env::var("PINECONE_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(30);
        Self {
            api_key,
            index_host,
            stub_dir,
            timeout_secs,
        }
    }

    /// Validates config values.
    ///
    /// # Errors
    /// Returns [`VectorError::Config`] when a key is configured without a
    /// host, or the host is not an HTTP(S) URL.
    pub fn validate(&self) -> Result<(), VectorError> {
        if self.api_key.is_some() {
            let host = self.index_host.trim();
            if host.is_empty() {
                return Err(VectorError::Config(
                    "index_host is required when api_key is set".into(),
                ));
            }
            if !(host.starts_with("http://") || host.starts_with("https://")) {
                return Err(VectorError::Config(
                    "index_host must start with http:// or https://".into(),
                ));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn local_config_validates() {
        assert!(VectorConfig::local("storage/pinecone_stub").validate().is_ok());
    }

    #[test]
    fn remote_requires_host() {
        let mut cfg = VectorConfig::local("x");
        cfg.api_key = Some("pk-test".into());
        assert!(cfg.validate().is_err());

        cfg.index_host = "my-index.svc.pinecone.io".into();
        assert!(cfg.validate().is_err());

        cfg.index_host = "https://my-index.svc.pinecone.io".into();
        assert!(cfg.validate().is_ok());
    }
}
