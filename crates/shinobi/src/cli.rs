//! Clap derive structures for the `shinobi` CLI.
//!
//! Defines the command tree, global flags, and shared value enums.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// shinobi -- operate Shinobi Video NVR monitors from the command line
#[derive(Debug, Parser)]
#[command(
    name = "shinobi",
    version,
    about = "Inspect and control Shinobi Video NVR monitors",
    long_about = "Polls a Shinobi Video NVR, exposes each monitor as a camera, a status\n\
        sensor and a recording switch, and drives monitor modes.",
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
    /// NVR profile to use
    #[arg(long, short = 'p', env = "SHINOBI_PROFILE", global = true)]
    pub profile: Option<String>,

    /// NVR URL (overrides profile)
    #[arg(long, short = 'u', env = "SHINOBI_URL", global = true)]
    pub url: Option<String>,

    /// API key (overrides profile)
    #[arg(long, env = "SHINOBI_API_KEY", global = true, hide_env_values = true)]
    pub api_key: Option<String>,

    /// Group key (overrides profile)
    #[arg(long, short = 'g', env = "SHINOBI_GROUP_KEY", global = true)]
    pub group_key: Option<String>,

    /// Skip TLS certificate verification
    #[arg(long, short = 'k', env = "SHINOBI_INSECURE", global = true)]
    pub insecure: bool,

    /// Stream flavour advertised by cameras
    #[arg(long, env = "SHINOBI_STREAM_TYPE", global = true)]
    pub stream_type: Option<StreamTypeArg>,

    /// Request timeout in seconds
    #[arg(long, env = "SHINOBI_TIMEOUT", global = true)]
    pub timeout: Option<u64>,

    /// Poll interval in seconds (used by `watch`)
    #[arg(long, env = "SHINOBI_INTERVAL", global = true)]
    pub interval: Option<u64>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "SHINOBI_OUTPUT",
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
}

// ── Value Enums ──────────────────────────────────────────────────────

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

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum StreamTypeArg {
    /// HLS playlist (supports the stream feature)
    Hls,
    /// Motion JPEG
    Mjpeg,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ModeArg {
    Record,
    Watch,
    Stop,
    Start,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum SwitchState {
    On,
    Off,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List and inspect monitors
    #[command(alias = "mon", alias = "m")]
    Monitors(MonitorsArgs),

    /// Show every camera, sensor and switch entity
    #[command(alias = "ent")]
    Entities(EntitiesArgs),

    /// Fetch a still JPEG from a monitor
    Snapshot(SnapshotArgs),

    /// Print a monitor's live stream URL
    Stream(StreamArgs),

    /// Set a monitor's mode
    Mode(ModeCmdArgs),

    /// Turn a monitor's recording switch on or off
    Record(RecordArgs),

    /// Poll continuously and print entity changes until Ctrl-C
    Watch(WatchArgs),

    /// Validate connection details and credentials
    Test,

    /// Manage CLI configuration and profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Monitors ─────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct MonitorsArgs {
    #[command(subcommand)]
    pub command: MonitorsCommand,
}

#[derive(Debug, Subcommand)]
pub enum MonitorsCommand {
    /// List monitors
    #[command(alias = "ls")]
    List,

    /// Show one monitor (by id or name)
    Get {
        /// Monitor id or name
        monitor: String,
    },
}

// ── Entities ─────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct EntitiesArgs {
    /// Only show one entity kind
    #[arg(long, short = 'K')]
    pub kind: Option<EntityKindArg>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum EntityKindArg {
    Camera,
    Sensor,
    Switch,
}

// ── Snapshot / stream / mode ─────────────────────────────────────────

#[derive(Debug, Args)]
pub struct SnapshotArgs {
    /// Monitor id or name
    pub monitor: String,

    /// Write the JPEG here instead of stdout
    #[arg(long, short = 'f')]
    pub file: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct StreamArgs {
    /// Monitor id or name
    pub monitor: String,

    /// Print the MJPEG URL instead of the HLS one
    #[arg(long)]
    pub mjpeg: bool,
}

#[derive(Debug, Args)]
pub struct ModeCmdArgs {
    /// Monitor id or name
    pub monitor: String,

    /// Target mode
    #[arg(value_enum)]
    pub mode: ModeArg,
}

#[derive(Debug, Args)]
pub struct RecordArgs {
    /// Desired switch state
    #[arg(value_enum)]
    pub state: SwitchState,

    /// Monitor id or name
    pub monitor: String,
}

#[derive(Debug, Args)]
pub struct WatchArgs {
    /// Stop after this many polls (0 = until Ctrl-C)
    #[arg(long, short = 'n', default_value = "0")]
    pub count: u64,
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Interactive configuration wizard
    Init,

    /// Show the resolved configuration
    Show,

    /// Set a value on the active profile
    Set {
        /// Key (url, group_key, api_key, api_key_env, verify_ssl,
        /// stream_type, timeout, poll_interval)
        key: String,
        /// Value
        value: String,
    },

    /// List profiles
    Profiles,

    /// Make a profile the default
    Use {
        /// Profile name
        name: String,
    },

    /// Store the profile's API key in the system keyring
    SetApiKey,
}

// ── Completions ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Target shell
    #[arg(value_enum)]
    pub shell: clap_complete::Shell,
}
