use std::path::PathBuf;
use std::sync::Arc;

use crate::services::assets::AssetResolver;
use crate::services::videos::VideoStore;

#[derive(Clone)]
pub struct AppState {
    pub videos: VideoStore,
    pub assets: AssetResolver,
    /// Where multipart uploads are staged before they go to the provider.
    pub upload_dir: Arc<PathBuf>,
}

impl AppState {
    pub fn new(videos: VideoStore, assets: AssetResolver, upload_dir: PathBuf) -> Self {
        Self {
            videos,
            assets,
            upload_dir: Arc::new(upload_dir),
        }
    }
}
