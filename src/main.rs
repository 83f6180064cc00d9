mod app;

use std::path::PathBuf;

use clap::Parser;
use eframe::egui;

use chat_toc::messaging::ExtensionRuntime;
use chat_toc::net::{load_snapshot, SnapshotSource};

use app::TocApp;

/// The in-process messaging runtime the harness hands to the panel.
pub struct LocalRuntime;

impl ExtensionRuntime for LocalRuntime {
    fn name(&self) -> &str {
        "local"
    }
}

#[derive(Parser, Debug, Clone, PartialEq)]
#[command(name = "chat-toc")]
#[command(version, about = "Table of contents panel over a chat page snapshot")]
pub struct Args {
    /// File path or http(s) address; the built-in demo when absent.
    pub snapshot: Option<String>,
    /// Address to report for the snapshot instead of the one it came from.
    #[arg(long, value_name = "URL")]
    pub location: Option<String>,
    /// JSON file holding the saved panel position.
    #[arg(long, value_name = "FILE", default_value = ".chat-toc/state.json")]
    pub state: PathBuf,
    /// Run without the messaging runtime.
    #[arg(long)]
    pub no_runtime: bool,
}

impl Args {
    fn source(&self) -> SnapshotSource {
        self.snapshot
            .as_deref()
            .map_or(SnapshotSource::Demo, SnapshotSource::parse)
    }
}

fn main() {
    env_logger::init();

    let args = Args::parse();

    let mut snapshot = match load_snapshot(&args.source()) {
        Ok(snapshot) => snapshot,
        Err(e) => {
            log::error!("Failed to load snapshot: {}", e);
            eprintln!("chat-toc: {}", e);
            std::process::exit(1);
        }
    };
    if let Some(location) = &args.location {
        snapshot.location = location.clone();
    }

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default().with_inner_size([1280.0, 800.0]),
        ..Default::default()
    };

    let result = eframe::run_native(
        "chat-toc",
        options,
        Box::new(move |cc| {
            let runtime = (!args.no_runtime).then_some(LocalRuntime);
            let app = TocApp::new(&cc.egui_ctx, snapshot, args.state, runtime)?;
            Ok(Box::new(app))
        }),
    );
    if let Err(e) = result {
        log::error!("Failed to start chat-toc: {}", e);
        std::process::exit(1);
    }
}
