//! UI/backend events and error modeling for the desktop GUI controller.

use client_core::{ClientError, ModalView, UploadOutcome};
use shared::domain::{Document, DocumentId};

#[derive(Debug)]
pub enum UiEvent {
    Info(String),
    DocumentsLoaded(Vec<Document>),
    ModalUpdated(ModalView),
    ModalHidden,
    RowsLoadFailed { document_id: DocumentId },
    UploadFinished(UploadOutcome),
    Error(UiError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiErrorCategory {
    Transport,
    Decode,
    Storage,
    Config,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiErrorContext {
    BackendStartup,
    LoadDocuments,
    LoadRows,
    UpdateSelection,
    General,
}

#[derive(Debug, Clone)]
pub struct UiError {
    category: UiErrorCategory,
    context: UiErrorContext,
    message: String,
}

impl UiError {
    pub fn from_client(context: UiErrorContext, err: &ClientError) -> Self {
        let category = match err {
            ClientError::Network(_) => UiErrorCategory::Transport,
            ClientError::Decode(_) => UiErrorCategory::Decode,
            ClientError::Storage(_) | ClientError::Io(_) => UiErrorCategory::Storage,
            ClientError::Config(_) => UiErrorCategory::Config,
        };
        Self {
            category,
            context,
            message: err.to_string(),
        }
    }

    pub fn from_message(context: UiErrorContext, message: impl Into<String>) -> Self {
        let message = message.into();
        let message_lower = message.to_ascii_lowercase();
        let category = if message_lower.contains("sqlite")
            || message_lower.contains("database")
            || message_lower.contains("storage")
        {
            UiErrorCategory::Storage
        } else if message_lower.contains("url") || message_lower.contains("config") {
            UiErrorCategory::Config
        } else if message_lower.contains("timeout")
            || message_lower.contains("connection")
            || message_lower.contains("network")
            || message_lower.contains("disconnect")
        {
            UiErrorCategory::Transport
        } else {
            UiErrorCategory::Unknown
        };

        Self {
            category,
            context,
            message,
        }
    }

    pub fn category(&self) -> UiErrorCategory {
        self.category
    }

    pub fn context(&self) -> UiErrorContext {
        self.context
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// One-line text for the status bar.
    pub fn status_line(&self) -> String {
        let what = match self.context {
            UiErrorContext::BackendStartup => "Backend worker startup failure",
            UiErrorContext::LoadDocuments => "Could not load documents",
            UiErrorContext::LoadRows => "Could not load rows",
            UiErrorContext::UpdateSelection => "Selection change not saved",
            UiErrorContext::General => "Error",
        };
        let hint = match self.category {
            UiErrorCategory::Transport => " (server unreachable; check URL/network and retry)",
            UiErrorCategory::Decode => " (server sent an unexpected response)",
            UiErrorCategory::Storage => " (selection store unavailable)",
            UiErrorCategory::Config => " (check server URL / settings)",
            UiErrorCategory::Unknown => "",
        };
        format!("{what}: {}{hint}", self.message)
    }
}
