//! `statusdeck-tui`: real-time terminal dashboard for Gearshift service status.
//!
//! Built on [ratatui](https://ratatui.rs) with deliveries from a
//! `statusdeck-core` [`StatusSource`](statusdeck_core::StatusSource). Two
//! screens, switched with `1`/`2` or Tab: the status board and the service
//! editor.
//!
//! Logs are written to a file (default `/tmp/statusdeck-tui.log`) so they
//! never corrupt the terminal. A background data bridge forwards every
//! board delivery into the TUI action loop.

mod action;
mod app;
mod component;
mod data_bridge;
mod event;
mod screen;
mod screens;
mod theme;
mod tui;
mod widgets;

use std::path::PathBuf;

use clap::Parser;
use color_eyre::eyre::Result;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use statusdeck_core::{SourceKind, build_source};

use crate::app::App;

/// Terminal dashboard for Gearshift service status.
#[derive(Parser, Debug)]
#[command(name = "statusdeck-tui", version, about)]
struct Cli {
    /// Data source: polling or live (overrides config)
    #[arg(long, env = "STATUSDECK_SOURCE")]
    source: Option<SourceKind>,

    /// Log file path (defaults to /tmp/statusdeck-tui.log)
    #[arg(long, default_value = "/tmp/statusdeck-tui.log")]
    log_file: PathBuf,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

/// File-based tracing; stdout and stderr belong to the terminal UI. The
/// returned guard must live as long as the app so logs get flushed.
fn setup_tracing(cli: &Cli) -> WorkerGuard {
    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "statusdeck_tui={log_level},statusdeck_core={log_level},statusdeck_api={log_level}"
        ))
    });

    let log_dir = cli
        .log_file
        .parent()
        .unwrap_or(std::path::Path::new("/tmp"));
    let log_filename = cli
        .log_file
        .file_name()
        .unwrap_or(std::ffi::OsStr::new("statusdeck-tui.log"));

    let file_appender = tracing_appender::rolling::never(log_dir, log_filename);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_target(true)
                .with_thread_ids(true),
        )
        .init();

    guard
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Hooks go in before the terminal is touched
    tui::install_hooks()?;

    let _log_guard = setup_tracing(&cli);

    let mut cfg = statusdeck_config::load_config_or_default();
    if let Some(source) = cli.source {
        cfg.source = source;
    }
    let dashboard = statusdeck_config::to_dashboard_config(&cfg)?;
    let source = build_source(&dashboard)?;

    info!(source = %source.kind(), "starting statusdeck-tui");

    let mut app = App::new(source);
    app.run().await?;

    Ok(())
}
