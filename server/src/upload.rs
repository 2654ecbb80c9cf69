//! Profile picture storage.
//!
//! Uploads are written as `<epoch-ms>.<ext>` under the upload directory,
//! with the timestamp taken from the injected clock. Files are opened with
//! create-new semantics; when two uploads land in the same millisecond the
//! later one moves to the next free millisecond.

use registry_core::Clock;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;

/// URL prefix stored uploads are served under.
pub const PUBLIC_PREFIX: &str = "uploads";

const MAX_NAME_ATTEMPTS: i64 = 1000;

/// A file written by [`UploadStore::save`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredUpload {
    /// File name inside the upload directory.
    pub file_name: String,
    /// Path as persisted on the record and served over HTTP.
    pub public_path: String,
}

/// Writes uploads to a local directory.
#[derive(Clone)]
pub struct UploadStore {
    dir: PathBuf,
    clock: Arc<dyn Clock>,
    max_bytes: usize,
}

impl UploadStore {
    /// Creates a store writing under `dir`.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>, clock: Arc<dyn Clock>, max_bytes: usize) -> Self {
        Self {
            dir: dir.into(),
            clock,
            max_bytes,
        }
    }

    /// Upload directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Request body limit for multipart registrations.
    #[must_use]
    pub const fn max_bytes(&self) -> usize {
        self.max_bytes
    }

    /// Creates the upload directory if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error.
    pub async fn ensure_dir(&self) -> io::Result<()> {
        tokio::fs::create_dir_all(&self.dir).await
    }

    /// Writes `contents` under a fresh timestamp-derived name, keeping the
    /// extension of `original_name`.
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error, or [`io::ErrorKind::AlreadyExists`]
    /// if no free name was found.
    pub async fn save(&self, original_name: Option<&str>, contents: &[u8]) -> io::Result<StoredUpload> {
        let extension = original_name.and_then(extension_of);
        let base = self.clock.now().timestamp_millis();

        for offset in 0..MAX_NAME_ATTEMPTS {
            let file_name = match &extension {
                Some(ext) => format!("{}.{ext}", base + offset),
                None => (base + offset).to_string(),
            };
            let path = self.dir.join(&file_name);

            let mut file = match OpenOptions::new().write(true).create_new(true).open(&path).await {
                Ok(file) => file,
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => continue,
                Err(e) => return Err(e),
            };
            let written = async {
                file.write_all(contents).await?;
                file.flush().await
            }
            .await;
            if let Err(e) = written {
                drop(file);
                remove_quietly(&path).await;
                return Err(e);
            }

            metrics::counter!("registry_uploads_total").increment(1);
            tracing::info!(file_name = %file_name, bytes = contents.len(), "Stored upload");

            return Ok(StoredUpload {
                public_path: format!("{PUBLIC_PREFIX}/{file_name}"),
                file_name,
            });
        }

        Err(io::Error::new(
            io::ErrorKind::AlreadyExists,
            "no free upload file name",
        ))
    }

    /// Deletes an upload whose record was never created.
    pub async fn discard(&self, upload: &StoredUpload) {
        remove_quietly(&self.dir.join(&upload.file_name)).await;
    }
}

async fn remove_quietly(path: &Path) {
    match tokio::fs::remove_file(path).await {
        Ok(()) => tracing::debug!(path = %path.display(), "Removed orphaned upload"),
        Err(e) => tracing::warn!(path = %path.display(), error = %e, "Failed to remove orphaned upload"),
    }
}

/// Extension of the client-supplied file name, restricted to ASCII
/// alphanumerics so it cannot escape the upload directory.
fn extension_of(original_name: &str) -> Option<String> {
    let ext = Path::new(original_name).extension()?.to_str()?;
    let ext: String = ext.chars().filter(char::is_ascii_alphanumeric).collect();
    (!ext.is_empty()).then_some(ext)
}
