//! Backend worker: owns the selection controller on a tokio runtime and
//! answers UI commands with `UiEvent`s.

use std::{sync::Arc, thread};

use client_core::{
    build_controller, open_selection_store, submit_upload, ClientError, ClientSettings,
    HttpBackend, ModalPhase, SelectionController,
};
use shared::domain::DocumentId;
use crossbeam_channel::{Receiver, Sender};

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::{UiError, UiErrorContext, UiEvent};

#[derive(Debug, Clone)]
pub struct StartupConfig {
    pub settings: ClientSettings,
    pub ephemeral: bool,
}

pub fn launch(cmd_rx: Receiver<BackendCommand>, ui_tx: Sender<UiEvent>, startup: StartupConfig) {
    thread::spawn(move || {
        let _ = ui_tx.try_send(UiEvent::Info("Backend worker starting...".to_string()));
        let runtime = match tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
        {
            Ok(runtime) => runtime,
            Err(err) => {
                let _ = ui_tx.try_send(UiEvent::Error(UiError::from_message(
                    UiErrorContext::BackendStartup,
                    format!("failed to build runtime: {err}"),
                )));
                tracing::error!("failed to build backend runtime: {err}");
                return;
            }
        };

        runtime.block_on(async move {
            let Some(mut worker) = start_worker(&startup, &ui_tx).await else {
                return;
            };
            let _ = ui_tx.try_send(UiEvent::Info("Backend worker ready".to_string()));

            while let Ok(cmd) = cmd_rx.recv() {
                worker.handle_command(cmd, &ui_tx).await;
            }
            tracing::info!("ui command channel closed; backend worker exiting");
        });
    });
}

/// Events answering an `OpenDocument` command. A failed selection write
/// still shows the modal; only a failed row fetch reports the load as failed.
async fn open_document_events(
    controller: &mut SelectionController,
    document_id: DocumentId,
) -> Vec<UiEvent> {
    match controller.open_document(document_id.clone()).await {
        Ok(view) => vec![UiEvent::ModalUpdated(view)],
        Err(err @ ClientError::Storage(_)) if controller.phase() == ModalPhase::Visible => vec![
            UiEvent::ModalUpdated(controller.view()),
            UiEvent::Error(UiError::from_client(UiErrorContext::UpdateSelection, &err)),
        ],
        Err(err) => vec![
            UiEvent::Error(UiError::from_client(UiErrorContext::LoadRows, &err)),
            UiEvent::RowsLoadFailed { document_id },
        ],
    }
}

struct Worker {
    backend: Arc<HttpBackend>,
    controller: SelectionController,
}

async fn start_worker(startup: &StartupConfig, ui_tx: &Sender<UiEvent>) -> Option<Worker> {
    let backend = match HttpBackend::from_settings(&startup.settings) {
        Ok(backend) => Arc::new(backend),
        Err(err) => {
            tracing::error!(error = %err, "invalid backend configuration");
            let _ = ui_tx.try_send(UiEvent::Error(UiError::from_client(
                UiErrorContext::BackendStartup,
                &err,
            )));
            return None;
        }
    };
    let store = match open_selection_store(&startup.settings.database_url, startup.ephemeral).await
    {
        Ok(store) => store,
        Err(err) => {
            tracing::error!(
                error = %err,
                database_url = %startup.settings.database_url,
                "failed to open selection store"
            );
            let _ = ui_tx.try_send(UiEvent::Error(UiError::from_client(
                UiErrorContext::BackendStartup,
                &err,
            )));
            return None;
        }
    };
    let controller = build_controller(Arc::clone(&backend), store).await;
    Some(Worker {
        backend,
        controller,
    })
}

impl Worker {
    async fn handle_command(&mut self, cmd: BackendCommand, ui_tx: &Sender<UiEvent>) {
        let controller = &mut self.controller;
        match cmd {
            BackendCommand::ListDocuments => match controller.documents().await {
                Ok(documents) => {
                    let _ = ui_tx.try_send(UiEvent::DocumentsLoaded(documents));
                }
                Err(err) => {
                    let _ = ui_tx.try_send(UiEvent::Error(UiError::from_client(
                        UiErrorContext::LoadDocuments,
                        &err,
                    )));
                }
            },
            BackendCommand::OpenDocument { document_id } => {
                for event in open_document_events(controller, document_id).await {
                    let _ = ui_tx.try_send(event);
                }
            }
            BackendCommand::ApplyRowAction(action) => {
                if let Err(err) = controller.apply(action).await {
                    let _ = ui_tx.try_send(UiEvent::Error(UiError::from_client(
                        UiErrorContext::UpdateSelection,
                        &err,
                    )));
                }
                if controller.phase() == ModalPhase::Visible {
                    let _ = ui_tx.try_send(UiEvent::ModalUpdated(controller.view()));
                }
            }
            BackendCommand::CloseModal => {
                controller.close();
                let _ = ui_tx.try_send(UiEvent::ModalHidden);
            }
            BackendCommand::Upload { path } => {
                let outcome = submit_upload(self.backend.as_ref(), path.as_deref()).await;
                let _ = ui_tx.try_send(UiEvent::UploadFinished(outcome));
            }
        }
    }
}
