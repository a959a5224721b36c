//! `services`: list rows from the live status table.

use tabled::Tabled;

use statusdeck_core::{LiveClient, ServiceStatus, Vocabulary, overall_state};

use crate::cli::{GlobalOpts, OutputFormat};
use crate::config;
use crate::error::CliError;
use crate::output;

use super::util;

#[derive(Tabled)]
struct ServiceRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Service")]
    name: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Updated")]
    updated: String,
}

pub async fn handle(global: &GlobalOpts) -> Result<(), CliError> {
    let dash = config::resolve(global, true)?;
    util::require_backend(&dash)?;

    let client = LiveClient::new(&dash.backend, &dash.transport());
    let services = client.fetch_all().await;
    tracing::debug!(count = services.len(), "listing services");

    let color = output::should_color(&global.color);
    let out = output::render_list(
        &global.output,
        &services,
        |s: &ServiceStatus| ServiceRow {
            id: s.id.to_string(),
            name: s.name.clone(),
            status: util::state_cell(Some(s.state), Vocabulary::Table, color),
            updated: util::format_time(Some(s.updated_at)),
        },
        |s| format!("{}\t{}\t{}", s.id, s.name, s.state),
    );
    output::print_output(&out, global.quiet);

    if matches!(global.output, OutputFormat::Table) && !global.quiet {
        let overall = util::state_cell(Some(overall_state(&services)), Vocabulary::Table, color);
        eprintln!("Overall: {overall}");
    }
    Ok(())
}
