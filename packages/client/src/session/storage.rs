//! Cookie persistence backends.

use std::{
    path::{Path, PathBuf},
    sync::{Mutex, PoisonError},
};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::cookie::StoredCookie;

/// Current on-disk format version
const STORAGE_VERSION: u32 = 1;

/// Session persistence errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Where the session store keeps its cookies
pub trait CookieStorage: Send + Sync {
    fn load(&self) -> Result<Vec<StoredCookie>, StorageError>;

    fn save(&self, cookies: &[StoredCookie]) -> Result<(), StorageError>;
}

/// Cookies kept for the lifetime of the process only
#[derive(Debug, Default)]
pub struct MemoryCookieStorage {
    cookies: Mutex<Vec<StoredCookie>>,
}

impl CookieStorage for MemoryCookieStorage {
    fn load(&self) -> Result<Vec<StoredCookie>, StorageError> {
        Ok(self
            .cookies
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone())
    }

    fn save(&self, cookies: &[StoredCookie]) -> Result<(), StorageError> {
        *self.cookies.lock().unwrap_or_else(PoisonError::into_inner) = cookies.to_vec();
        Ok(())
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct CookieFile {
    version: u32,
    cookies: Vec<StoredCookie>,
}

/// Cookies persisted to a JSON file readable only by the owner
#[derive(Debug, Clone)]
pub struct FileCookieStorage {
    path: PathBuf,
}

impl FileCookieStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl CookieStorage for FileCookieStorage {
    /// Read the cookie file; an unreadable or foreign file counts as no session
    fn load(&self) -> Result<Vec<StoredCookie>, StorageError> {
        let data = match std::fs::read_to_string(&self.path) {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let file: CookieFile = match serde_json::from_str(&data) {
            Ok(file) => file,
            Err(e) => {
                tracing::warn!("Ignoring corrupt cookie file {}: {}", self.path.display(), e);
                return Ok(Vec::new());
            }
        };
        if file.version != STORAGE_VERSION {
            tracing::warn!(
                "Ignoring cookie file {} with unsupported version {}",
                self.path.display(),
                file.version
            );
            return Ok(Vec::new());
        }
        Ok(file.cookies)
    }

    /// Replace the cookie file atomically via a sibling temp file
    fn save(&self, cookies: &[StoredCookie]) -> Result<(), StorageError> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        std::fs::create_dir_all(dir)?;

        let file = CookieFile {
            version: STORAGE_VERSION,
            cookies: cookies.to_vec(),
        };

        // NamedTempFile is created with mode 0o600 on unix
        let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
        serde_json::to_writer_pretty(&mut tmp, &file)?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path).map_err(|e| e.error)?;

        tracing::debug!("Saved {} cookie(s) to {}", cookies.len(), self.path.display());
        Ok(())
    }
}
