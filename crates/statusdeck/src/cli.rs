//! Clap derive structures for the `statusdeck` CLI.
//!
//! Defines the command tree, global flags, and shared types. Kept free of
//! workspace crates so `build.rs` can include it for man page generation.

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// statusdeck -- status board for the Gearshift platform
#[derive(Debug, Parser)]
#[command(
    name = "statusdeck",
    version,
    about = "Check and manage Gearshift service status from the command line",
    long_about = "Reads the public status API (polling source) or the live status table\n\
        (live source) and renders the board, platform metrics, and service rows.\n\n\
        Service states can be changed with `set` when the live backend is configured.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Data source (overrides config)
    #[arg(long, env = "STATUSDECK_SOURCE", global = true)]
    pub source: Option<SourceArg>,

    /// Status API URL (overrides config)
    #[arg(long, global = true, hide_env = true, env = "STATUSDECK_STATUS_URL")]
    pub status_url: Option<String>,

    /// Platform stats API URL (overrides config)
    #[arg(long, global = true, hide_env = true, env = "STATUSDECK_STATS_URL")]
    pub stats_url: Option<String>,

    /// Live backend base URL (overrides config)
    #[arg(long, global = true, hide_env = true, env = "STATUSDECK_BACKEND_URL")]
    pub backend_url: Option<String>,

    /// Live backend access key
    #[arg(long, env = "STATUSDECK_ACCESS_KEY", global = true, hide_env = true)]
    pub access_key: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "STATUSDECK_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Request timeout in seconds (overrides config)
    #[arg(long, env = "STATUSDECK_TIMEOUT", global = true)]
    pub timeout: Option<u64>,
}

// ── Shared Enums ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SourceArg {
    /// Periodic HTTP polling of the public status API
    Polling,
    /// Live status table with realtime change notifications
    Live,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show the status board: overall state, components, incidents, maintenance
    #[command(alias = "st")]
    Status,

    /// List service rows from the live status table
    #[command(alias = "svc")]
    Services,

    /// Show platform metrics
    Stats,

    /// Change one service's state (live backend only)
    Set(SetArgs),

    /// Stream board updates until interrupted
    Watch(WatchArgs),

    /// Manage CLI configuration
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Command Arguments ────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct SetArgs {
    /// Service row ID
    pub id: String,

    /// New state: operational, partial-outage, major-outage, maintenance
    pub state: String,
}

#[derive(Debug, Args)]
pub struct WatchArgs {
    /// Exit after this many updates
    #[arg(long, short = 'n')]
    pub count: Option<usize>,
}

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Create the config file with guided setup
    Init,

    /// Display the current resolved configuration
    Show,

    /// Print the config file location
    Path,
}

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
