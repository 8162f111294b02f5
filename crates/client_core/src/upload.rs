//! Multipart file upload and conversion of the server reply into display text.

use std::path::Path;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use shared::protocol::{UploadResponse, UPLOAD_FIELD, UPLOAD_PATH};

use crate::{
    api::HttpBackend,
    error::{ClientError, ClientResult},
};

#[derive(Debug, Clone)]
pub struct UploadFile {
    pub filename: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl UploadFile {
    pub async fn from_path(path: &Path) -> ClientResult<Self> {
        let bytes = tokio::fs::read(path).await?;
        let filename = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload.bin".to_string());
        let mime_type = mime_guess::from_path(path)
            .first_or_octet_stream()
            .essence_str()
            .to_string();
        Ok(Self {
            filename,
            mime_type,
            bytes,
        })
    }
}

#[async_trait]
pub trait Uploader: Send + Sync {
    async fn upload(&self, file: UploadFile) -> ClientResult<UploadResponse>;
}

#[async_trait]
impl Uploader for HttpBackend {
    async fn upload(&self, file: UploadFile) -> ClientResult<UploadResponse> {
        let url = self.endpoint(UPLOAD_PATH)?;
        let size = file.bytes.len();
        let part = Part::bytes(file.bytes)
            .file_name(file.filename.clone())
            .mime_str(&file.mime_type)
            .map_err(|e| ClientError::Config(format!("invalid mime type '{}': {e}", file.mime_type)))?;
        let form = Form::new().part(UPLOAD_FIELD, part);

        tracing::debug!(%url, filename = %file.filename, bytes = size, "POST upload");
        // The server answers errors with a JSON body too, so the status is not checked.
        let response = self.http().post(url).multipart(form).send().await?;
        let status = response.status();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| ClientError::Network(e.to_string()))?;
        serde_json::from_slice(&bytes).map_err(|e| {
            ClientError::Decode(format!("upload reply (HTTP {status}) is not valid JSON: {e}"))
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadOutcome {
    /// No file was chosen; nothing was sent.
    Skipped,
    Displayed { text: String, chunks: Vec<String> },
    Failed(String),
}

impl UploadOutcome {
    pub fn display_text(&self) -> &str {
        match self {
            Self::Skipped => "",
            Self::Displayed { text, .. } => text,
            Self::Failed(text) => text,
        }
    }
}

/// Handles a form submission. Failures become text instead of errors.
pub async fn submit_upload(uploader: &dyn Uploader, path: Option<&Path>) -> UploadOutcome {
    let Some(path) = path else {
        return UploadOutcome::Skipped;
    };

    let result = match UploadFile::from_path(path).await {
        Ok(file) => uploader.upload(file).await,
        Err(err) => Err(err),
    };

    match result {
        Ok(response) => {
            tracing::info!(
                path = %path.display(),
                chunks = response.chunks.len(),
                "upload finished"
            );
            UploadOutcome::Displayed {
                text: response.display_text().to_string(),
                chunks: response.chunks,
            }
        }
        Err(err) => {
            tracing::warn!(path = %path.display(), kind = err.kind(), %err, "upload failed");
            UploadOutcome::Failed(err.to_string())
        }
    }
}

#[cfg(test)]
#[path = "tests/upload_tests.rs"]
mod tests;
