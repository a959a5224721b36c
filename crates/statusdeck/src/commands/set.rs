//! `set`: change one service's state on the live backend.

use serde::Serialize;

use statusdeck_core::{LiveClient, LiveSource, ServiceId, ServiceState, StatusSource};

use crate::cli::{GlobalOpts, SetArgs};
use crate::config;
use crate::error::CliError;
use crate::output;

#[derive(Serialize)]
struct SetResult<'a> {
    id: &'a str,
    status: ServiceState,
}

pub async fn handle(args: SetArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let state: ServiceState = args.state.parse::<ServiceState>().map_err(|e| CliError::Validation {
        field: "state".into(),
        reason: e.to_string(),
    })?;

    let dash = config::resolve(global, true)?;
    let source = LiveSource::new(LiveClient::new(&dash.backend, &dash.transport()));
    if !source.can_mutate() {
        return Err(statusdeck_core::CoreError::BackendUnconfigured.into());
    }

    let id = ServiceId::new(args.id.clone());
    if !source.mutate(&id, state).await {
        return Err(CliError::MutationFailed {
            id: args.id,
            reason: format!("could not set state to {state}"),
        });
    }

    let result = SetResult {
        id: &args.id,
        status: state,
    };
    let out = output::render_single(
        &global.output,
        &result,
        |r| format!("Service {} set to {}", r.id, r.status),
        |r| format!("{}\t{}", r.id, r.status),
    );
    output::print_output(&out, global.quiet);
    Ok(())
}
