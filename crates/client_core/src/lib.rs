//! Client side of the document row picker: loads documents and rows over
//! HTTP, keeps the persisted row selection, renders the modal view model and
//! submits uploads.

use std::sync::Arc;

use storage::{KeyValueStore, MemoryStore, Storage};

pub mod api;
pub mod config;
pub mod controller;
pub mod error;
pub mod selection;
pub mod upload;
pub mod view;

pub use api::{DocumentSource, HttpBackend};
pub use config::{load_settings, ClientSettings};
pub use controller::{LoadTicket, ModalPhase, SelectionController};
pub use error::{ClientError, ClientResult};
pub use selection::{Selection, SelectionManager, SELECTION_KEY};
pub use upload::{submit_upload, UploadFile, UploadOutcome, Uploader};
pub use view::{render, ModalView, RowAction, RowView};

/// Opens the selection store named by `database_url`, or an in-memory one
/// when `ephemeral` is set.
pub async fn open_selection_store(
    database_url: &str,
    ephemeral: bool,
) -> ClientResult<Arc<dyn KeyValueStore>> {
    if ephemeral {
        return Ok(Arc::new(MemoryStore::new()));
    }
    let database_url = storage::prepare_database_url(database_url).map_err(ClientError::storage)?;
    let storage = Storage::new(&database_url)
        .await
        .map_err(ClientError::storage)?;
    storage.health_check().await.map_err(ClientError::storage)?;
    tracing::info!(%database_url, "selection store opened");
    Ok(Arc::new(storage))
}

/// Wires an HTTP backend and a loaded selection into a controller.
pub async fn build_controller(
    backend: Arc<HttpBackend>,
    store: Arc<dyn KeyValueStore>,
) -> SelectionController {
    let selection = SelectionManager::load(store).await;
    SelectionController::new(backend, selection)
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
