//! Document and row loader backed by the JSON HTTP endpoints.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use shared::{
    domain::{Document, DocumentId, RowName},
    protocol::{DOCUMENTS_PATH, ROWS_PATH},
};
use url::Url;

use crate::{
    config::ClientSettings,
    error::{ClientError, ClientResult},
};

#[async_trait]
pub trait DocumentSource: Send + Sync {
    async fn list_documents(&self) -> ClientResult<Vec<Document>>;
    async fn list_rows(&self, doc_id: &DocumentId) -> ClientResult<Vec<RowName>>;
}

#[derive(Clone)]
pub struct HttpBackend {
    http: Client,
    base_url: Url,
}

impl HttpBackend {
    pub fn new(server_url: &str, timeout: Duration) -> ClientResult<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ClientError::Config(format!("failed to build http client: {e}")))?;
        Ok(Self {
            http,
            base_url: normalize_base_url(server_url)?,
        })
    }

    pub fn from_settings(settings: &ClientSettings) -> ClientResult<Self> {
        Self::new(&settings.server_url, settings.request_timeout())
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub(crate) fn http(&self) -> &Client {
        &self.http
    }

    pub(crate) fn endpoint(&self, path: &str) -> ClientResult<Url> {
        Ok(self.base_url.join(path)?)
    }

    fn rows_endpoint(&self, doc_id: &DocumentId) -> ClientResult<Url> {
        let mut url = self.endpoint(ROWS_PATH)?;
        url.path_segments_mut()
            .map_err(|_| {
                ClientError::Config(format!("server url '{}' cannot carry a path", self.base_url))
            })?
            .push(doc_id.as_str());
        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> ClientResult<T> {
        tracing::debug!(%url, "GET");
        let bytes = self
            .http
            .get(url.clone())
            .send()
            .await?
            .error_for_status()?
            .bytes()
            .await
            .map_err(|e| ClientError::Network(e.to_string()))?;
        serde_json::from_slice(&bytes)
            .map_err(|e| ClientError::Decode(format!("unexpected response from {url}: {e}")))
    }
}

#[async_trait]
impl DocumentSource for HttpBackend {
    async fn list_documents(&self) -> ClientResult<Vec<Document>> {
        let url = self.endpoint(DOCUMENTS_PATH)?;
        self.get_json(url).await
    }

    async fn list_rows(&self, doc_id: &DocumentId) -> ClientResult<Vec<RowName>> {
        let url = self.rows_endpoint(doc_id)?;
        self.get_json(url).await
    }
}

fn normalize_base_url(server_url: &str) -> ClientResult<Url> {
    let trimmed = server_url.trim();
    if trimmed.is_empty() {
        return Err(ClientError::Config("server url is empty".to_string()));
    }
    let mut url = Url::parse(trimmed)?;
    if url.cannot_be_a_base() {
        return Err(ClientError::Config(format!(
            "server url '{trimmed}' cannot carry a path"
        )));
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

#[cfg(test)]
#[path = "tests/api_tests.rs"]
mod tests;
