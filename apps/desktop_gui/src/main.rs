mod backend_bridge;
mod controller;
mod ui;

use clap::Parser;
use client_core::load_settings;
use crossbeam_channel::bounded;
use eframe::egui;
use tracing_subscriber::EnvFilter;

use crate::backend_bridge::{
    commands::BackendCommand,
    runtime::{self, StartupConfig},
};
use crate::controller::events::UiEvent;
use crate::ui::DocPickApp;

#[derive(Parser, Debug)]
#[command(name = "docpick_gui", about = "Desktop document row picker")]
struct Args {
    /// Backend base URL; defaults to docpick.toml / DOCPICK_SERVER_URL.
    #[arg(long)]
    server_url: Option<String>,
    /// Selection store location; defaults to docpick.toml / DOCPICK_DATABASE_URL.
    #[arg(long)]
    database_url: Option<String>,
    /// Keep the selection in memory only.
    #[arg(long)]
    ephemeral: bool,
}

/// `RUST_LOG` directives when they parse, `info` otherwise.
fn log_filter(directives: Option<&str>) -> EnvFilter {
    directives
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new("info"))
}

fn main() -> eframe::Result<()> {
    let rust_log = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    tracing_subscriber::fmt()
        .with_env_filter(log_filter(rust_log.as_deref()))
        .init();
    let args = Args::parse();

    let mut settings = load_settings();
    if let Some(url) = args.server_url {
        settings.server_url = url;
    }
    if let Some(url) = args.database_url {
        settings.database_url = url;
    }
    tracing::info!(server_url = %settings.server_url, "starting desktop client");

    let (cmd_tx, cmd_rx) = bounded::<BackendCommand>(256);
    let (ui_tx, ui_rx) = bounded::<UiEvent>(2048);
    runtime::launch(
        cmd_rx,
        ui_tx,
        StartupConfig {
            settings,
            ephemeral: args.ephemeral,
        },
    );

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("Document Row Picker")
            .with_inner_size([720.0, 520.0])
            .with_min_inner_size([480.0, 360.0]),
        ..Default::default()
    };
    eframe::run_native(
        "docpick",
        options,
        Box::new(|_cc| Ok(Box::new(DocPickApp::new(cmd_tx, ui_rx)))),
    )
}
