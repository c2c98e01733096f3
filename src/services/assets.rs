//! Resolves local uploads into references to provider-hosted assets.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use uuid::Uuid;

use crate::error::AppError;
use crate::services::upload::{UploadOptions, UploadProvider};

/// A temporary file on local disk, removed when dropped.
///
/// Dropping covers every exit path of an upload: success, provider failure,
/// timeout, and a caller abandoning the future mid-flight.
#[derive(Debug)]
pub struct LocalFile {
    path: PathBuf,
}

impl LocalFile {
    pub fn adopt(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for LocalFile {
    fn drop(&mut self) {
        match std::fs::remove_file(&self.path) {
            Ok(()) => tracing::debug!(path = %self.path.display(), "Removed local temp file"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "Failed to remove local temp file")
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetKind {
    Video,
    Thumbnail,
}

impl AssetKind {
    fn resource_type(self) -> &'static str {
        match self {
            AssetKind::Video => "video",
            AssetKind::Thumbnail => "image",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AssetRef {
    pub url: String,
    /// Reported by the provider; always present for video assets.
    pub duration_seconds: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Resolved {
    /// No local file was supplied.
    Nothing,
    Uploaded(AssetRef),
}

impl Resolved {
    pub fn into_asset(self) -> Option<AssetRef> {
        match self {
            Resolved::Nothing => None,
            Resolved::Uploaded(asset) => Some(asset),
        }
    }
}

#[derive(Clone)]
pub struct AssetResolver {
    provider: Arc<dyn UploadProvider>,
    timeout: Duration,
    folder: Option<String>,
}

impl AssetResolver {
    pub fn new(provider: Arc<dyn UploadProvider>, timeout: Duration) -> Self {
        Self {
            provider,
            timeout,
            folder: None,
        }
    }

    pub fn with_folder(mut self, folder: Option<String>) -> Self {
        self.folder = folder;
        self
    }

    pub async fn resolve(
        &self,
        local: Option<LocalFile>,
        kind: AssetKind,
    ) -> Result<Resolved, AppError> {
        let Some(local) = local else {
            return Ok(Resolved::Nothing);
        };

        let options = UploadOptions {
            resource_type: Some(kind.resource_type().to_string()),
            folder: self.folder.clone(),
        };

        let outcome =
            tokio::time::timeout(self.timeout, self.provider.upload(local.path(), &options)).await;
        let path = local.path().display().to_string();
        drop(local);

        let uploaded = match outcome {
            Ok(Ok(uploaded)) => uploaded,
            Ok(Err(e)) => {
                tracing::error!(path = %path, error = %e, "Error while uploading file to provider");
                return Err(AppError::Upload(e.to_string()));
            }
            Err(_) => {
                tracing::error!(path = %path, timeout = ?self.timeout, "Upload to provider timed out");
                return Err(AppError::UploadTimeout(self.timeout.as_secs()));
            }
        };

        let url = normalize_ref(&uploaded.url)
            .map_err(|_| AppError::Upload(format!("provider returned an invalid url: {}", uploaded.url)))?;

        let duration_seconds = match (kind, uploaded.duration_seconds) {
            (AssetKind::Video, None) => {
                return Err(AppError::Upload("provider did not report a duration".to_string()))
            }
            (AssetKind::Video, Some(d)) if !d.is_finite() || d < 0.0 => {
                return Err(AppError::Upload(format!("provider reported an invalid duration: {}", d)))
            }
            (_, d) => d,
        };

        Ok(Resolved::Uploaded(AssetRef {
            url,
            duration_seconds,
        }))
    }
}

/// Normalizes an asset reference into an absolute http(s) URL.
pub fn normalize_ref(raw: &str) -> Result<String, AppError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(AppError::invalid("asset reference must not be empty"));
    }

    let url = url::Url::parse(trimmed)
        .map_err(|e| AppError::invalid(format!("asset reference '{}' is not a valid url: {}", trimmed, e)))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(AppError::invalid(format!(
            "asset reference '{}' must use http or https",
            trimmed
        )));
    }
    if url.host_str().map_or(true, str::is_empty) {
        return Err(AppError::invalid(format!(
            "asset reference '{}' has no host",
            trimmed
        )));
    }

    Ok(url.to_string())
}

/// Writes an incoming upload to a uniquely named file under `dir`.
///
/// The returned guard owns the file from before the first byte is written, so
/// a failed write leaves nothing behind either.
pub async fn stage(dir: &Path, filename: &str, data: &[u8]) -> Result<LocalFile, AppError> {
    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|e| AppError::Internal(format!("Failed to create upload dir: {}", e)))?;

    let ext = Path::new(filename)
        .extension()
        .and_then(std::ffi::OsStr::to_str)
        .unwrap_or("bin");
    let local = LocalFile::adopt(dir.join(format!("{}.{}", Uuid::new_v4(), ext)));

    tokio::fs::write(local.path(), data)
        .await
        .map_err(|e| AppError::Internal(format!("Failed to stage upload: {}", e)))?;

    Ok(local)
}
