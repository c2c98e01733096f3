//! Upload gateway to the external media-hosting provider.
//!
//! The provider owns the binary assets; this side only hands it a local file
//! and keeps the URL and metadata it reports back.

use std::collections::BTreeMap;
use std::path::Path;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use sha2::{Digest, Sha256};
use thiserror::Error;

use crate::config::CloudinaryConfig;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("failed to read local file: {0}")]
    Io(#[from] std::io::Error),
    #[error("provider request failed: {0}")]
    Transport(String),
    #[error("provider rejected upload ({status}): {message}")]
    Rejected { status: u16, message: String },
    #[error("unexpected provider response: {0}")]
    InvalidResponse(String),
}

#[derive(Debug, Clone, Default)]
pub struct UploadOptions {
    /// Provider resource type; `auto` lets the provider detect it.
    pub resource_type: Option<String>,
    pub folder: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UploadedAsset {
    pub url: String,
    pub public_id: Option<String>,
    pub resource_type: Option<String>,
    pub duration_seconds: Option<f64>,
    pub bytes: Option<u64>,
}

#[async_trait]
pub trait UploadProvider: Send + Sync {
    async fn upload(
        &self,
        path: &Path,
        options: &UploadOptions,
    ) -> Result<UploadedAsset, ProviderError>;
}

#[derive(Clone)]
pub struct CloudinaryGateway {
    http: reqwest::Client,
    config: CloudinaryConfig,
}

#[derive(Deserialize)]
struct CloudinaryUploadResponse {
    secure_url: Option<String>,
    url: Option<String>,
    public_id: Option<String>,
    resource_type: Option<String>,
    duration: Option<f64>,
    bytes: Option<u64>,
}

#[derive(Deserialize)]
struct CloudinaryErrorBody {
    error: CloudinaryErrorMessage,
}

#[derive(Deserialize)]
struct CloudinaryErrorMessage {
    message: String,
}

impl CloudinaryGateway {
    pub fn new(config: CloudinaryConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
        }
    }

    fn endpoint(&self, resource_type: &str) -> String {
        format!(
            "{}/v1_1/{}/{}/upload",
            self.config.api_base.trim_end_matches('/'),
            self.config.cloud_name,
            resource_type
        )
    }
}

/// Signs upload parameters: sorted `key=value` pairs joined with `&`, the API
/// secret appended, SHA-256 hex digest.
pub fn sign_params(params: &BTreeMap<&str, String>, api_secret: &str) -> String {
    let to_sign = params
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join("&");

    let mut hasher = Sha256::new();
    hasher.update(to_sign.as_bytes());
    hasher.update(api_secret.as_bytes());
    format!("{:x}", hasher.finalize())
}

#[async_trait]
impl UploadProvider for CloudinaryGateway {
    async fn upload(
        &self,
        path: &Path,
        options: &UploadOptions,
    ) -> Result<UploadedAsset, ProviderError> {
        let resource_type = options.resource_type.as_deref().unwrap_or("auto");
        let data = tokio::fs::read(path).await?;
        let filename = path
            .file_name()
            .and_then(std::ffi::OsStr::to_str)
            .unwrap_or("upload")
            .to_string();

        let mut params: BTreeMap<&str, String> = BTreeMap::new();
        params.insert("timestamp", chrono::Utc::now().timestamp().to_string());
        if let Some(folder) = options.folder.as_ref().or(self.config.folder.as_ref()) {
            params.insert("folder", folder.clone());
        }
        let signature = sign_params(&params, &self.config.api_secret);

        let mut form = Form::new()
            .part("file", Part::bytes(data).file_name(filename))
            .text("api_key", self.config.api_key.clone())
            .text("signature", signature)
            .text("signature_algorithm", "sha256");
        for (k, v) in params {
            form = form.text(k, v);
        }

        let resp = self
            .http
            .post(self.endpoint(resource_type))
            .multipart(form)
            .send()
            .await
            .map_err(|e| ProviderError::Transport(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            let message = serde_json::from_str::<CloudinaryErrorBody>(&body)
                .map(|b| b.error.message)
                .unwrap_or(body);
            return Err(ProviderError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        let body: CloudinaryUploadResponse = resp
            .json()
            .await
            .map_err(|e| ProviderError::InvalidResponse(e.to_string()))?;

        let url = body
            .secure_url
            .or(body.url)
            .ok_or_else(|| ProviderError::InvalidResponse("missing url".to_string()))?;

        tracing::info!(url = %url, "File uploaded to provider");

        Ok(UploadedAsset {
            url,
            public_id: body.public_id,
            resource_type: body.resource_type,
            duration_seconds: body.duration,
            bytes: body.bytes,
        })
    }
}
