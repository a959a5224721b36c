//! `status`: one-shot board read from the configured source.

use std::fmt::Write;

use tabled::Tabled;

use statusdeck_core::appearance;
use statusdeck_core::{Board, Incident, build_source};

use crate::cli::GlobalOpts;
use crate::config;
use crate::error::CliError;
use crate::output;

use super::util;

// ── Table rows ──────────────────────────────────────────────────────

#[derive(Tabled)]
struct ComponentRow {
    #[tabled(rename = "Component")]
    name: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Updated")]
    updated: String,
}

#[derive(Tabled)]
struct IncidentRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Title")]
    title: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Updated")]
    updated: String,
}

fn incident_rows(incidents: &[Incident], color: bool) -> Vec<IncidentRow> {
    incidents
        .iter()
        .map(|i| {
            let look = appearance::incident(i.state);
            IncidentRow {
                id: i.id.clone(),
                title: i.title.clone(),
                status: output::paint(&format!("{} {}", look.glyph, look.label), look.tone, color),
                updated: util::format_time(i.updated_at.or(i.created_at)),
            }
        })
        .collect()
}

// ── Renderers ───────────────────────────────────────────────────────

pub fn detail(board: &Board, color: bool) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Overall:  {}",
        util::state_cell(board.overall, board.vocabulary, color)
    );
    if let Some(ref message) = board.message {
        let _ = writeln!(out, "Message:  {message}");
    }
    let _ = writeln!(out, "Updated:  {}", util::format_time(board.last_updated));
    if let Some(ref notice) = board.notice {
        let _ = writeln!(out, "Note:     {notice}");
    }

    if let Some(ref stats) = board.stats {
        let metrics: Vec<String> = stats
            .headline()
            .iter()
            .map(|(label, value)| format!("{label}: {value}"))
            .collect();
        let _ = writeln!(out, "Metrics:  {}", metrics.join("  |  "));
    }

    let components: Vec<ComponentRow> = board
        .components
        .iter()
        .map(|c| ComponentRow {
            name: c.name.clone(),
            status: util::state_cell(c.state, board.vocabulary, color),
            updated: util::format_time(c.last_updated),
        })
        .collect();
    let _ = write!(out, "\n{}", output::render_table(&components));

    if !board.incidents.is_empty() {
        let _ = write!(
            out,
            "\n\nIncidents\n{}",
            output::render_table(&incident_rows(&board.incidents, color))
        );
    }
    if !board.maintenance.is_empty() {
        let _ = write!(
            out,
            "\n\nScheduled maintenance\n{}",
            output::render_table(&incident_rows(&board.maintenance, color))
        );
    }
    out
}

/// `overall<TAB>label` followed by one `name<TAB>label` line per component.
pub fn plain(board: &Board) -> String {
    let mut lines = vec![format!(
        "overall\t{}",
        appearance::service(board.overall, board.vocabulary).label
    )];
    lines.extend(board.components.iter().map(|c| {
        format!(
            "{}\t{}",
            c.name,
            appearance::service(c.state, board.vocabulary).label
        )
    }));
    lines.join("\n")
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(global: &GlobalOpts) -> Result<(), CliError> {
    let dash = config::resolve(global, false)?;
    let source = build_source(&dash)?;
    let board = source.fetch_board().await?;

    let color = output::should_color(&global.color);
    let out = output::render_single(&global.output, &board, |b| detail(b, color), plain);
    output::print_output(&out, global.quiet);
    Ok(())
}
