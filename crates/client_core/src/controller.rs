//! Owns the open document, its rows and the selection, and turns user
//! actions into selection mutations plus a freshly rendered modal.

use std::sync::Arc;

use shared::domain::{Document, DocumentId, RowName};

use crate::{
    api::DocumentSource,
    error::ClientResult,
    selection::SelectionManager,
    view::{render, ModalView, RowAction},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModalPhase {
    /// No document has been opened yet.
    Idle,
    LoadingRows,
    Visible,
    Hidden,
}

/// Identifies one row fetch. Only the most recent ticket may update the modal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket {
    generation: u64,
}

pub struct SelectionController {
    source: Arc<dyn DocumentSource>,
    selection: SelectionManager,
    current_document: Option<DocumentId>,
    pending_document: Option<DocumentId>,
    rows: Vec<RowName>,
    phase: ModalPhase,
    shown_once: bool,
    generation: u64,
}

impl SelectionController {
    pub fn new(source: Arc<dyn DocumentSource>, selection: SelectionManager) -> Self {
        Self {
            source,
            selection,
            current_document: None,
            pending_document: None,
            rows: Vec::new(),
            phase: ModalPhase::Idle,
            shown_once: false,
            generation: 0,
        }
    }

    pub fn phase(&self) -> ModalPhase {
        self.phase
    }

    pub fn current_document(&self) -> Option<&DocumentId> {
        self.current_document.as_ref()
    }

    pub fn rows(&self) -> &[RowName] {
        &self.rows
    }

    pub fn selected_values(&self) -> &[RowName] {
        self.selection.selected_values()
    }

    pub fn source(&self) -> Arc<dyn DocumentSource> {
        Arc::clone(&self.source)
    }

    pub async fn documents(&self) -> ClientResult<Vec<Document>> {
        let documents = self.source.list_documents().await?;
        tracing::info!(count = documents.len(), "documents loaded");
        Ok(documents)
    }

    /// Starts loading `doc_id` and invalidates any fetch still in flight.
    /// The current document and rows stay as they are until rows arrive.
    pub fn begin_load(&mut self, doc_id: DocumentId) -> LoadTicket {
        self.generation += 1;
        tracing::debug!(document_id = %doc_id, generation = self.generation, "loading rows");
        self.pending_document = Some(doc_id);
        self.phase = ModalPhase::LoadingRows;
        LoadTicket {
            generation: self.generation,
        }
    }

    pub fn is_current(&self, ticket: LoadTicket) -> bool {
        ticket.generation == self.generation
    }

    /// Reconciles and shows the rows fetched for `ticket`. Returns `Ok(None)`
    /// when a newer load has started since, discarding the result.
    pub async fn apply_rows(
        &mut self,
        ticket: LoadTicket,
        fetched: ClientResult<Vec<RowName>>,
    ) -> ClientResult<Option<ModalView>> {
        if !self.is_current(ticket) {
            tracing::debug!(
                stale = ticket.generation,
                latest = self.generation,
                "discarding superseded row fetch"
            );
            return Ok(None);
        }

        let rows = match fetched {
            Ok(rows) => rows,
            Err(err) => {
                let pending = self.pending_document.take();
                self.phase = if self.shown_once {
                    ModalPhase::Hidden
                } else {
                    ModalPhase::Idle
                };
                tracing::warn!(
                    document_id = ?pending,
                    kind = err.kind(),
                    %err,
                    "failed to load rows"
                );
                return Err(err);
            }
        };

        if let Some(doc_id) = self.pending_document.take() {
            self.current_document = Some(doc_id);
        }
        self.rows = rows;
        let persisted = self.selection.reconcile(&self.rows).await;
        self.phase = ModalPhase::Visible;
        self.shown_once = true;
        self.log_selection("modal opened");
        persisted?;
        Ok(Some(self.view()))
    }

    /// Loads and shows `doc_id`. A `Storage` error still leaves the modal
    /// `Visible` with the reconciled rows; only the write was lost.
    pub async fn open_document(&mut self, doc_id: DocumentId) -> ClientResult<ModalView> {
        let ticket = self.begin_load(doc_id.clone());
        let fetched = self.source.list_rows(&doc_id).await;
        match self.apply_rows(ticket, fetched).await? {
            Some(view) => Ok(view),
            None => Ok(self.view()),
        }
    }

    /// Applies a modal interaction and re-renders. Ignored unless the modal
    /// is visible.
    pub async fn apply(&mut self, action: RowAction) -> ClientResult<ModalView> {
        if self.phase != ModalPhase::Visible {
            tracing::debug!(?action, phase = ?self.phase, "ignoring action while modal is not visible");
            return Ok(self.view());
        }

        let result = match &action {
            RowAction::Toggle { name, checked } => {
                if !self.rows.contains(name) {
                    tracing::debug!(row = %name, "toggle for row not shown; ignoring");
                    return Ok(self.view());
                }
                self.selection.toggle(name, *checked).await
            }
            RowAction::Delete { name } => {
                self.rows.retain(|row| row != name);
                self.selection.remove(name).await
            }
            RowAction::SelectAll => self.selection.select_all_toggle(&self.rows).await,
        };
        self.log_selection("selection updated");
        result?;
        Ok(self.view())
    }

    pub fn close(&mut self) {
        if self.phase == ModalPhase::Visible {
            self.phase = ModalPhase::Hidden;
            tracing::debug!(document_id = ?self.current_document, "modal closed");
        }
    }

    pub fn view(&self) -> ModalView {
        render(
            self.current_document.as_ref(),
            &self.rows,
            self.selection.selection(),
        )
    }

    fn log_selection(&self, what: &str) {
        let document_id = self
            .current_document
            .as_ref()
            .map(DocumentId::as_str)
            .unwrap_or_default();
        tracing::info!(
            document_id,
            selected = ?self.selection.selected_values(),
            "{what}"
        );
    }
}

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod tests;
