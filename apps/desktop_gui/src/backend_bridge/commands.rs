//! Backend commands queued from UI to backend worker.

use client_core::RowAction;
use shared::domain::DocumentId;
use std::path::PathBuf;

#[derive(Debug)]
pub enum BackendCommand {
    ListDocuments,
    OpenDocument { document_id: DocumentId },
    ApplyRowAction(RowAction),
    CloseModal,
    Upload { path: Option<PathBuf> },
}

impl BackendCommand {
    pub fn name(&self) -> &'static str {
        match self {
            BackendCommand::ListDocuments => "list_documents",
            BackendCommand::OpenDocument { .. } => "open_document",
            BackendCommand::ApplyRowAction(_) => "apply_row_action",
            BackendCommand::CloseModal => "close_modal",
            BackendCommand::Upload { .. } => "upload",
        }
    }
}
