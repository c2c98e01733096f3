use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::Notify;
use vidhub::services::upload::{ProviderError, UploadOptions, UploadProvider, UploadedAsset};

#[derive(Debug, Clone)]
pub enum Behavior {
    /// Accepts the upload; videos report `duration`.
    Succeed { duration: Option<f64> },
    Fail(String),
    /// Never completes.
    Hang,
}

/// Scripted stand-in for the media provider.
pub struct MockProvider {
    behavior: Behavior,
    calls: AtomicUsize,
    seen: Mutex<Vec<(PathBuf, bool)>>,
    pub called: Arc<Notify>,
}

impl MockProvider {
    pub fn new(behavior: Behavior) -> Self {
        Self {
            behavior,
            calls: AtomicUsize::new(0),
            seen: Mutex::new(Vec::new()),
            called: Arc::new(Notify::new()),
        }
    }

    pub fn succeeding() -> Self {
        Self::new(Behavior::Succeed {
            duration: Some(120.0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Paths handed to the provider and whether each existed at that moment.
    pub fn seen(&self) -> Vec<(PathBuf, bool)> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl UploadProvider for MockProvider {
    async fn upload(
        &self,
        path: &Path,
        options: &UploadOptions,
    ) -> Result<UploadedAsset, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.seen
            .lock()
            .unwrap()
            .push((path.to_path_buf(), path.exists()));
        self.called.notify_one();

        match &self.behavior {
            Behavior::Succeed { duration } => {
                let resource_type = options.resource_type.clone().unwrap_or_else(|| "auto".into());
                let name = path.file_name().unwrap().to_string_lossy().to_string();
                Ok(UploadedAsset {
                    url: format!("https://cdn.test/{}/{}", resource_type, name),
                    public_id: Some(name),
                    duration_seconds: if resource_type == "video" { *duration } else { None },
                    resource_type: Some(resource_type),
                    bytes: None,
                })
            }
            Behavior::Fail(message) => Err(ProviderError::Rejected {
                status: 400,
                message: message.clone(),
            }),
            Behavior::Hang => {
                std::future::pending::<()>().await;
                unreachable!()
            }
        }
    }
}
