//! `watch`: stream board deliveries until Ctrl-C (or `--count`).

use std::sync::Arc;

use chrono::Local;
use tokio::sync::mpsc;

use statusdeck_core::appearance;
use statusdeck_core::{Board, CoreError, SourceKind, build_source};

use crate::cli::{GlobalOpts, OutputFormat, WatchArgs};
use crate::config;
use crate::error::CliError;
use crate::output;

use super::util;

/// One line per delivery: time, overall state, then each component.
fn summary(board: &Board, color: bool) -> String {
    let components: Vec<String> = board
        .components
        .iter()
        .map(|c| {
            format!(
                "{}: {}",
                c.name,
                appearance::service(c.state, board.vocabulary).label
            )
        })
        .collect();
    format!(
        "[{}] {}  {}",
        Local::now().format("%H:%M:%S"),
        util::state_cell(board.overall, board.vocabulary, color),
        components.join(", ")
    )
}

fn render(board: &Board, format: &OutputFormat, color: bool) -> String {
    match format {
        OutputFormat::Json | OutputFormat::JsonCompact => output::render_json_compact(board),
        OutputFormat::Yaml => output::render_yaml(board),
        OutputFormat::Plain => super::status::plain(board),
        OutputFormat::Table => summary(board, color),
    }
}

pub async fn handle(args: WatchArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let dash = config::resolve(global, false)?;
    let source = build_source(&dash)?;
    let color = output::should_color(&global.color);

    let (tx, mut rx) = mpsc::unbounded_channel::<Result<Board, CoreError>>();

    // Live deliveries wait for the channel join; show something right away.
    if dash.source == SourceKind::Live {
        let _ = tx.send(source.fetch_board().await);
    }
    let sink = tx.clone();
    let subscription = source.subscribe(Arc::new(move |delivery| {
        let _ = sink.send(delivery);
    }));
    drop(tx);

    let mut seen = 0usize;
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("interrupted, stopping watch");
                break;
            }
            delivery = rx.recv() => {
                let Some(delivery) = delivery else { break };
                match delivery {
                    Ok(board) => output::print_output(&render(&board, &global.output, color), global.quiet),
                    Err(e) => eprintln!("{}: {e}", e.user_message()),
                }
                seen += 1;
                if args.count.is_some_and(|limit| seen >= limit) {
                    break;
                }
            }
        }
    }

    subscription.unsubscribe();
    Ok(())
}
