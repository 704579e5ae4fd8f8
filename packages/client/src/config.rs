//! Client configuration and the URLs derived from it.

use std::path::PathBuf;

use reqwest::Url;

use crate::error::ClientError;

/// Default server base URL
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:5000";

/// Default directory for persisted client state
pub const DEFAULT_DATA_DIR: &str = ".chatlink";

const COOKIE_FILE_NAME: &str = "cookies.json";
const WEBSOCKET_PATH: &str = "/ws";

/// Resolved client configuration
#[derive(Debug, Clone)]
pub struct ClientConfig {
    base_url: Url,
    data_dir: PathBuf,
}

impl ClientConfig {
    pub fn new(base_url: &str, data_dir: impl Into<PathBuf>) -> Result<Self, ClientError> {
        let base_url =
            Url::parse(base_url).map_err(|e| ClientError::InvalidUrl(format!("{base_url}: {e}")))?;
        match base_url.scheme() {
            "http" | "https" => {}
            other => {
                return Err(ClientError::InvalidUrl(format!(
                    "unsupported scheme '{other}'"
                )));
            }
        }
        if base_url.host_str().is_none() {
            return Err(ClientError::InvalidUrl(format!("{base_url}: missing host")));
        }

        Ok(Self {
            base_url,
            data_dir: data_dir.into(),
        })
    }

    /// Whether cookies marked `Secure` may be sent
    pub fn is_https(&self) -> bool {
        self.base_url.scheme() == "https"
    }

    /// Realtime endpoint on the same origin (`http` → `ws`, `https` → `wss`)
    pub fn ws_endpoint(&self) -> Result<Url, ClientError> {
        let mut url = self.base_url.clone();
        let scheme = if self.is_https() { "wss" } else { "ws" };
        url.set_scheme(scheme)
            .map_err(|_| ClientError::InvalidUrl(format!("cannot use scheme {scheme}")))?;
        url.set_path(WEBSOCKET_PATH);
        url.set_query(None);
        Ok(url)
    }

    /// Absolute URL for a REST path such as `/auth/login`
    pub fn endpoint(&self, path: &str) -> Result<Url, ClientError> {
        self.base_url
            .join(path)
            .map_err(|e| ClientError::InvalidUrl(format!("{path}: {e}")))
    }

    pub fn cookie_file(&self) -> PathBuf {
        self.data_dir.join(COOKIE_FILE_NAME)
    }
}
