use std::{path::PathBuf, time::Duration};

use client_core::{ModalView, RowAction, UploadOutcome};
use crossbeam_channel::{Receiver, Sender};
use eframe::egui;
use shared::domain::{Document, DocumentId};

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::{
    events::{UiErrorCategory, UiEvent},
    orchestration::dispatch_backend_command,
};

const SELECT_PLACEHOLDER: &str = "--Select--";

fn default_upload_dir() -> Option<PathBuf> {
    dirs::desktop_dir()
        .or_else(dirs::download_dir)
        .or_else(dirs::document_dir)
        .or_else(dirs::home_dir)
}

fn err_label(category: UiErrorCategory) -> &'static str {
    match category {
        UiErrorCategory::Transport => "Transport",
        UiErrorCategory::Decode => "Protocol",
        UiErrorCategory::Storage => "Storage",
        UiErrorCategory::Config => "Configuration",
        UiErrorCategory::Unknown => "Error",
    }
}

pub struct DocPickApp {
    cmd_tx: Sender<BackendCommand>,
    ui_rx: Receiver<UiEvent>,
    documents: Vec<Document>,
    selected_document: Option<DocumentId>,
    modal: Option<ModalView>,
    loading_rows: bool,
    upload_path: Option<PathBuf>,
    upload_result: Option<UploadOutcome>,
    uploading: bool,
    status: String,
}

impl DocPickApp {
    pub fn new(cmd_tx: Sender<BackendCommand>, ui_rx: Receiver<UiEvent>) -> Self {
        let mut status = "Loading documents...".to_string();
        dispatch_backend_command(&cmd_tx, BackendCommand::ListDocuments, &mut status);
        Self {
            cmd_tx,
            ui_rx,
            documents: Vec::new(),
            selected_document: None,
            modal: None,
            loading_rows: false,
            upload_path: None,
            upload_result: None,
            uploading: false,
            status,
        }
    }

    fn process_ui_events(&mut self) {
        while let Ok(event) = self.ui_rx.try_recv() {
            match event {
                UiEvent::Info(message) => {
                    self.status = message;
                }
                UiEvent::DocumentsLoaded(documents) => {
                    self.status = format!("{} documents available", documents.len());
                    self.documents = documents;
                }
                UiEvent::ModalUpdated(view) => {
                    // Late replies for a document the user moved away from are dropped.
                    if view.document_id.is_some() && view.document_id != self.selected_document {
                        continue;
                    }
                    self.loading_rows = false;
                    self.modal = Some(view);
                }
                UiEvent::ModalHidden => {
                    self.modal = None;
                }
                UiEvent::RowsLoadFailed { document_id } => {
                    if self.selected_document.as_ref() != Some(&document_id) {
                        continue;
                    }
                    self.loading_rows = false;
                    self.modal = None;
                }
                UiEvent::UploadFinished(outcome) => {
                    self.uploading = false;
                    self.upload_result = Some(outcome);
                }
                UiEvent::Error(err) => {
                    tracing::warn!(
                        context = ?err.context(),
                        category = ?err.category(),
                        "{}",
                        err.message()
                    );
                    self.status = format!("{}: {}", err_label(err.category()), err.status_line());
                }
            }
        }
    }

    fn select_document(&mut self, document_id: Option<DocumentId>) {
        let showing = self.modal.is_some() || self.loading_rows;
        if document_id == self.selected_document && (document_id.is_none() || showing) {
            return;
        }
        self.selected_document = document_id.clone();
        let Some(document_id) = document_id else {
            return;
        };
        self.modal = None;
        self.loading_rows = dispatch_backend_command(
            &self.cmd_tx,
            BackendCommand::OpenDocument { document_id },
            &mut self.status,
        );
    }

    fn close_modal(&mut self) {
        self.modal = None;
        dispatch_backend_command(&self.cmd_tx, BackendCommand::CloseModal, &mut self.status);
    }

    fn show_document_picker(&mut self, ui: &mut egui::Ui) {
        let selected_text = self
            .selected_document
            .as_ref()
            .and_then(|id| self.documents.iter().find(|doc| &doc.id == id))
            .map(|doc| doc.name.clone())
            .unwrap_or_else(|| SELECT_PLACEHOLDER.to_string());

        let current = self.selected_document.clone();
        let mut picked = None;
        ui.horizontal(|ui| {
            ui.label("Document:");
            egui::ComboBox::from_id_salt("document_picker")
                .selected_text(selected_text)
                .width(260.0)
                .show_ui(ui, |ui| {
                    if ui
                        .selectable_label(current.is_none(), SELECT_PLACEHOLDER)
                        .clicked()
                    {
                        picked = Some(None);
                    }
                    for doc in &self.documents {
                        let selected = current.as_ref() == Some(&doc.id);
                        if ui.selectable_label(selected, doc.name.as_str()).clicked() {
                            picked = Some(Some(doc.id.clone()));
                        }
                    }
                });
            if ui.button("Refresh").clicked() {
                dispatch_backend_command(
                    &self.cmd_tx,
                    BackendCommand::ListDocuments,
                    &mut self.status,
                );
            }
            if self.loading_rows {
                ui.spinner();
            }
        });
        if let Some(choice) = picked {
            self.select_document(choice);
        }
    }

    fn show_upload_form(&mut self, ui: &mut egui::Ui) {
        ui.heading("Upload");
        ui.horizontal(|ui| {
            if ui.button("Choose file...").clicked() {
                let mut dialog = rfd::FileDialog::new();
                if let Some(dir) = default_upload_dir() {
                    dialog = dialog.set_directory(dir);
                }
                if let Some(path) = dialog.pick_file() {
                    self.upload_path = Some(path);
                }
            }
            let chosen = self
                .upload_path
                .as_ref()
                .and_then(|path| path.file_name())
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_else(|| "No file chosen".to_string());
            ui.label(chosen);
        });

        let upload_clicked = ui
            .add_enabled(!self.uploading, egui::Button::new("Upload"))
            .clicked();
        if upload_clicked {
            // Without a chosen file the backend answers `Skipped` and nothing is sent.
            self.uploading = dispatch_backend_command(
                &self.cmd_tx,
                BackendCommand::Upload {
                    path: self.upload_path.clone(),
                },
                &mut self.status,
            );
        }

        match &self.upload_result {
            Some(UploadOutcome::Displayed { text, chunks }) => {
                ui.label(text.as_str());
                for chunk in chunks {
                    ui.monospace(chunk.as_str());
                }
            }
            Some(UploadOutcome::Failed(text)) => {
                let color = ui.visuals().error_fg_color;
                ui.colored_label(color, text.as_str());
            }
            Some(UploadOutcome::Skipped) | None => {}
        }
    }

    fn show_modal(&mut self, ctx: &egui::Context) {
        let Some(view) = &self.modal else {
            return;
        };

        let title = self
            .documents
            .iter()
            .find(|doc| Some(&doc.id) == view.document_id.as_ref())
            .map(|doc| doc.name.clone())
            .unwrap_or_else(|| "Rows".to_string());

        let mut actions = Vec::new();
        let mut close_requested = false;
        let response = egui::Window::new(title)
            .collapsible(false)
            .resizable(true)
            .anchor(egui::Align2::CENTER_CENTER, egui::Vec2::ZERO)
            .show(ctx, |ui| {
                ui.label(format!(
                    "{} of {} rows selected",
                    view.checked_count(),
                    view.rows.len()
                ));
                ui.separator();
                egui::ScrollArea::vertical()
                    .max_height(360.0)
                    .show(ui, |ui| {
                        for row in &view.rows {
                            ui.horizontal(|ui| {
                                let mut checked = row.checked;
                                if ui.checkbox(&mut checked, row.name.as_str()).changed() {
                                    actions.push(RowAction::Toggle {
                                        name: row.name.clone(),
                                        checked,
                                    });
                                }
                                if ui.small_button("Delete").clicked() {
                                    actions.push(RowAction::Delete {
                                        name: row.name.clone(),
                                    });
                                }
                            });
                        }
                    });
                ui.separator();
                ui.horizontal(|ui| {
                    if ui.button(view.select_all_label()).clicked() {
                        actions.push(RowAction::SelectAll);
                    }
                    if ui.button("Close").clicked() {
                        close_requested = true;
                    }
                });
            });

        // A click on the backdrop dismisses the modal.
        if let Some(response) = response {
            let clicked_outside = ctx.input(|input| {
                input.pointer.primary_clicked()
                    && input
                        .pointer
                        .interact_pos()
                        .is_some_and(|pos| !response.response.rect.contains(pos))
            });
            close_requested |= clicked_outside;
        }

        for action in actions {
            dispatch_backend_command(
                &self.cmd_tx,
                BackendCommand::ApplyRowAction(action),
                &mut self.status,
            );
        }
        if close_requested {
            self.close_modal();
        }
    }
}

impl eframe::App for DocPickApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.process_ui_events();

        egui::TopBottomPanel::top("document_bar").show(ctx, |ui| {
            ui.add_space(4.0);
            self.show_document_picker(ui);
            ui.add_space(4.0);
        });
        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.label(self.status.as_str());
        });
        egui::CentralPanel::default().show(ctx, |ui| {
            self.show_upload_form(ui);
        });
        self.show_modal(ctx);

        ctx.request_repaint_after(Duration::from_millis(100));
    }
}
