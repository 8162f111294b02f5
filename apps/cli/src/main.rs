use std::{path::PathBuf, sync::Arc};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use client_core::{
    build_controller, load_settings, open_selection_store, submit_upload, ClientSettings,
    DocumentSource, HttpBackend, ModalView, RowAction, SelectionController, UploadOutcome,
};
use shared::domain::DocumentId;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "docpick", about = "Pick documents, select their rows, upload files")]
struct Cli {
    /// Backend base URL; defaults to docpick.toml / DOCPICK_SERVER_URL.
    #[arg(long)]
    server_url: Option<String>,
    /// Selection store location; defaults to docpick.toml / DOCPICK_DATABASE_URL.
    #[arg(long)]
    database_url: Option<String>,
    /// Keep the selection in memory only.
    #[arg(long)]
    ephemeral: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List documents offered by the backend.
    Documents,
    /// Print a document's rows without touching the selection.
    Rows { document_id: String },
    /// Open a document: reconcile the selection and show its rows.
    Open { document_id: String },
    /// Check or uncheck one row of a document.
    Toggle {
        document_id: String,
        row: String,
        #[arg(long)]
        off: bool,
    },
    /// Drop a row from the selection.
    Delete { document_id: String, row: String },
    /// Select every row, or clear the selection if all are selected.
    SelectAll { document_id: String },
    /// Print the stored selection.
    Selection,
    /// Upload a file and print the server's reply.
    Upload { file: PathBuf },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
    let cli = Cli::parse();

    let mut settings = load_settings();
    if let Some(url) = cli.server_url {
        settings.server_url = url;
    }
    if let Some(url) = cli.database_url {
        settings.database_url = url;
    }

    tracing::debug!(
        server_url = %settings.server_url,
        database_url = %settings.database_url,
        "settings loaded"
    );
    let backend = Arc::new(HttpBackend::from_settings(&settings)?);

    match cli.command {
        Command::Upload { file } => {
            print_upload(submit_upload(backend.as_ref(), Some(file.as_path())).await)
        }
        command => run(command, backend, &settings, cli.ephemeral).await,
    }
}

async fn run(
    command: Command,
    backend: Arc<HttpBackend>,
    settings: &ClientSettings,
    ephemeral: bool,
) -> Result<()> {
    let store = open_selection_store(&settings.database_url, ephemeral).await?;
    let mut controller = build_controller(Arc::clone(&backend), store).await;

    match command {
        Command::Documents => {
            for document in controller.documents().await? {
                println!("{}\t{}", document.id, document.name);
            }
        }
        Command::Rows { document_id } => {
            let doc_id = DocumentId::new(document_id);
            let rows = controller
                .source()
                .list_rows(&doc_id)
                .await
                .with_context(|| format!("failed to load rows for document {doc_id}"))?;
            for row in rows {
                println!("{row}");
            }
        }
        Command::Open { document_id } => {
            let view = open(&mut controller, document_id).await?;
            print_modal(&view);
        }
        Command::Toggle {
            document_id,
            row,
            off,
        } => {
            open(&mut controller, document_id).await?;
            let view = controller
                .apply(RowAction::Toggle {
                    name: row,
                    checked: !off,
                })
                .await?;
            print_modal(&view);
        }
        Command::Delete { document_id, row } => {
            open(&mut controller, document_id).await?;
            let view = controller.apply(RowAction::Delete { name: row }).await?;
            print_modal(&view);
        }
        Command::SelectAll { document_id } => {
            open(&mut controller, document_id).await?;
            let view = controller.apply(RowAction::SelectAll).await?;
            print_modal(&view);
        }
        Command::Selection => {
            for value in controller.selected_values() {
                println!("{value}");
            }
        }
        Command::Upload { file } => {
            print_upload(submit_upload(backend.as_ref(), Some(file.as_path())).await)?;
        }
    }

    Ok(())
}

async fn open(controller: &mut SelectionController, document_id: String) -> Result<ModalView> {
    let doc_id = DocumentId::new(document_id);
    controller
        .open_document(doc_id.clone())
        .await
        .with_context(|| format!("failed to open document {doc_id}"))
}

fn print_modal(view: &ModalView) {
    let document = view
        .document_id
        .as_ref()
        .map(DocumentId::as_str)
        .unwrap_or("-");
    println!(
        "document {document}: {} rows, {} selected",
        view.rows.len(),
        view.checked_count()
    );
    for row in &view.rows {
        let mark = if row.checked { "x" } else { " " };
        println!("  [{mark}] {}", row.name);
    }
}

fn print_upload(outcome: UploadOutcome) -> Result<()> {
    match outcome {
        UploadOutcome::Skipped => {}
        UploadOutcome::Displayed { text, chunks } => {
            println!("{text}");
            for chunk in chunks {
                println!("  {chunk}");
            }
        }
        UploadOutcome::Failed(text) => bail!(text),
    }
    Ok(())
}
