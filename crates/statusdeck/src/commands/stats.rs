//! `stats`: platform metrics from the stats endpoint.

use std::fmt::Write;

use statusdeck_core::{PlatformStats, PollingClient};

use crate::cli::GlobalOpts;
use crate::config;
use crate::error::CliError;
use crate::output;

use super::util;

fn detail(stats: &PlatformStats) -> String {
    let mut out = String::new();
    for (label, value) in stats.headline() {
        let _ = writeln!(out, "{label:<18}{value}");
    }
    let extra = [
        ("Active Users", stats.active_users.as_deref()),
        ("Events", stats.total_events.as_deref()),
        ("Marketplace Items", stats.total_marketplace_items.as_deref()),
    ];
    for (label, value) in extra {
        if let Some(value) = value {
            let _ = writeln!(out, "{label:<18}{value}");
        }
    }
    let _ = write!(out, "{:<18}{}", "Updated", util::format_time(stats.last_updated));
    out
}

fn plain(stats: &PlatformStats) -> String {
    stats
        .headline()
        .iter()
        .map(|(label, value)| format!("{label}\t{value}"))
        .collect::<Vec<_>>()
        .join("\n")
}

pub async fn handle(global: &GlobalOpts) -> Result<(), CliError> {
    let dash = config::resolve(global, false)?;
    let client = PollingClient::new(&dash.polling, &dash.transport())?;
    let stats = client.refresh_stats().await?;

    let out = output::render_single(&global.output, &*stats, detail, plain);
    output::print_output(&out, global.quiet);
    Ok(())
}
