//! Config subcommand handlers.

use std::fmt::Write;

use dialoguer::{Input, Password, Select};

use statusdeck_config::load_config_or_default;

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::config::{self, BackendSection, Config};
use crate::error::CliError;
use crate::output;

// ── Helpers ─────────────────────────────────────────────────────────

/// Copy of the config with plaintext secrets masked.
fn redacted(cfg: &Config) -> Config {
    let mut cfg = cfg.clone();
    if cfg.backend.access_key.is_some() {
        cfg.backend.access_key = Some("****".into());
    }
    cfg
}

/// Format config for display as TOML-ish text.
fn format_config(cfg: &Config) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "source = \"{}\"", cfg.source);
    let _ = writeln!(out, "timeout = {}", cfg.timeout);
    if let Some(ref ca) = cfg.ca_cert {
        let _ = writeln!(out, "ca_cert = \"{}\"", ca.display());
    }

    let _ = writeln!(out, "\n[polling]");
    let _ = writeln!(out, "status_url = \"{}\"", cfg.polling.status_url);
    let _ = writeln!(out, "stats_url = \"{}\"", cfg.polling.stats_url);
    let _ = writeln!(out, "status_interval = {}", cfg.polling.status_interval);
    let _ = writeln!(out, "stats_interval = {}", cfg.polling.stats_interval);

    let _ = writeln!(out, "\n[backend]");
    let _ = writeln!(out, "url = \"{}\"", cfg.backend.url);
    if let Some(ref env) = cfg.backend.access_key_env {
        let _ = writeln!(out, "access_key_env = \"{env}\"");
    }
    if let Some(ref key) = cfg.backend.access_key {
        let _ = writeln!(out, "access_key = \"{key}\"");
    }
    if let Some(ref url) = cfg.backend.realtime_url {
        let _ = writeln!(out, "realtime_url = \"{url}\"");
    }
    let _ = write!(out, "table = \"{}\"", cfg.backend.table);
    out
}

/// Map a dialoguer / interactive I/O failure into CliError.
fn prompt_err(e: impl std::fmt::Display) -> CliError {
    CliError::Validation {
        field: "interactive".into(),
        reason: format!("prompt failed: {e}"),
    }
}

/// Ask where the access key goes. Returns the key when it belongs in the
/// config file, `None` when it went to the keyring.
fn prompt_key_storage(secret: String) -> Result<Option<String>, CliError> {
    let choices = &[
        "Store in system keyring (recommended)",
        "Save to config file (plaintext)",
    ];
    let selection = Select::new()
        .with_prompt("Where should the access key be stored?")
        .items(choices)
        .default(0)
        .interact()
        .map_err(prompt_err)?;

    if selection == 0 {
        config::store_access_key(&secret)?;
        eprintln!(
            "   ✓ access key stored in system keyring ({}/{})",
            config::KEYRING_SERVICE,
            config::KEYRING_ACCESS_KEY
        );
        Ok(None)
    } else {
        Ok(Some(secret))
    }
}

fn init_wizard() -> Result<Config, CliError> {
    let sources = &["polling (public status API)", "live (status table + realtime)"];
    let source = Select::new()
        .with_prompt("Data source")
        .items(sources)
        .default(0)
        .interact()
        .map_err(prompt_err)?;

    let mut cfg = Config::default();
    if source == 0 {
        return Ok(cfg);
    }

    cfg.source = statusdeck_core::SourceKind::Live;
    let url: String = Input::new()
        .with_prompt("Backend URL")
        .interact_text()
        .map_err(prompt_err)?;
    let key = Password::new()
        .with_prompt("Access key")
        .interact()
        .map_err(prompt_err)?;
    if key.trim().is_empty() {
        return Err(CliError::Validation {
            field: "access_key".into(),
            reason: "access key cannot be empty".into(),
        });
    }

    cfg.backend = BackendSection {
        url,
        access_key: prompt_key_storage(key)?,
        ..BackendSection::default()
    };
    Ok(cfg)
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(args: &ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Init => {
            let path = config::config_path();
            eprintln!("statusdeck configuration");
            eprintln!("   Config path: {}\n", path.display());

            let cfg = init_wizard()?;
            let written = config::save_config(&cfg)?;
            eprintln!("\n   ✓ wrote {}", written.display());
            Ok(())
        }

        ConfigCommand::Show => {
            let cfg = redacted(&load_config_or_default());
            let out = output::render_single(&global.output, &cfg, format_config, |c| {
                format!("source\t{}", c.source)
            });
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ConfigCommand::Path => {
            output::print_output(&config::config_path().display().to_string(), global.quiet);
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn show_masks_plaintext_key() {
        let cfg = Config {
            backend: BackendSection {
                access_key: Some("super-secret".into()),
                ..BackendSection::default()
            },
            ..Config::default()
        };
        let text = format_config(&redacted(&cfg));
        assert!(text.contains("access_key = \"****\""));
        assert!(!text.contains("super-secret"));
        assert!(text.contains("[polling]"));
    }
}
