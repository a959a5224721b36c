//! CLI configuration: thin wrapper around `statusdeck_config`.
//!
//! Adds resolution that respects `GlobalOpts` overrides (--source,
//! --status-url, --backend-url, --access-key, --timeout).

use secrecy::SecretString;

use statusdeck_core::{DashboardConfig, SourceKind};

use crate::cli::{GlobalOpts, SourceArg};
use crate::error::CliError;

pub use statusdeck_config::{
    BackendSection, Config, KEYRING_ACCESS_KEY, KEYRING_SERVICE, config_path, load_config,
    resolve_access_key, save_config, store_access_key,
};

impl From<SourceArg> for SourceKind {
    fn from(arg: SourceArg) -> Self {
        match arg {
            SourceArg::Polling => Self::Polling,
            SourceArg::Live => Self::Live,
        }
    }
}

/// Apply flag overrides on top of the loaded file + env config.
pub fn apply_overrides(mut cfg: Config, global: &GlobalOpts) -> Config {
    if let Some(source) = global.source {
        cfg.source = source.into();
    }
    if let Some(ref url) = global.status_url {
        cfg.polling.status_url.clone_from(url);
    }
    if let Some(ref url) = global.stats_url {
        cfg.polling.stats_url.clone_from(url);
    }
    if let Some(ref url) = global.backend_url {
        cfg.backend.url.clone_from(url);
    }
    if let Some(timeout) = global.timeout {
        cfg.timeout = timeout;
    }
    cfg
}

/// Load config, apply overrides, and build the dashboard config.
///
/// `force_live` selects the live source regardless of configuration, for
/// commands that only make sense against the live backend.
pub fn resolve(global: &GlobalOpts, force_live: bool) -> Result<DashboardConfig, CliError> {
    let mut cfg = apply_overrides(load_config()?, global);
    if force_live {
        cfg.source = SourceKind::Live;
    }

    // --access-key wins over the env/keyring/plaintext chain
    let access_key = match cfg.source {
        SourceKind::Live => global
            .access_key
            .clone()
            .map(SecretString::from)
            .or_else(|| resolve_access_key(&cfg.backend)),
        SourceKind::Polling => None,
    };

    Ok(statusdeck_config::dashboard_config_with_key(&cfg, access_key)?)
}
