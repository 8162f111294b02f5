use serde::{Deserialize, Serialize};

pub const DOCUMENTS_PATH: &str = "api/documents";
pub const ROWS_PATH: &str = "api/rows";
pub const UPLOAD_PATH: &str = "upload";
pub const UPLOAD_FIELD: &str = "file";

/// Body returned by the upload endpoint, on success and on failure alike.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Names of the parts the server split a large upload into.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub chunks: Vec<String>,
}

impl UploadResponse {
    /// Text shown to the user: `message`, falling back to `error`.
    pub fn display_text(&self) -> &str {
        self.message
            .as_deref()
            .or(self.error.as_deref())
            .unwrap_or_default()
    }
}
