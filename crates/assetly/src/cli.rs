//! Clap derive structures for the `assetly` CLI.
//!
//! Defines the command tree, global flags, and shared argument types.

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// assetly -- search inventory and follow notifications from the terminal
#[derive(Debug, Parser)]
#[command(
    name = "assetly",
    version,
    about = "Search IT asset inventory and follow notifications",
    long_about = "A command-line client for an assetly asset management server.\n\n\
        Searches users, devices, and categories in one pass, lists and sorts\n\
        inventory tables, and watches a user's unread notifications.",
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
    /// Server profile to use
    #[arg(long, short = 'p', env = "ASSETLY_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Server URL (overrides profile)
    #[arg(long, short = 's', env = "ASSETLY_SERVER", global = true)]
    pub server: Option<String>,

    /// Signed-in user id (overrides profile)
    #[arg(long, short = 'u', env = "ASSETLY_USER", global = true)]
    pub user: Option<i64>,

    /// Session cookie as `name=value`
    #[arg(long, env = "ASSETLY_SESSION", global = true, hide_env_values = true)]
    pub session: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "ASSETLY_OUTPUT",
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

    /// Skip confirmation prompts
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,

    /// Accept self-signed TLS certificates
    #[arg(long, short = 'k', env = "ASSETLY_INSECURE", global = true)]
    pub insecure: bool,

    /// Request timeout in seconds (overrides profile)
    #[arg(long, env = "ASSETLY_TIMEOUT", global = true)]
    pub timeout: Option<u64>,
}

// ── Output & Color Enums ─────────────────────────────────────────────

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
    /// Search users, devices, and categories at once
    #[command(alias = "s", alias = "find")]
    Search(SearchArgs),

    /// Browse users
    #[command(alias = "u")]
    Users(UsersArgs),

    /// Browse devices
    #[command(alias = "dev", alias = "d")]
    Devices(DevicesArgs),

    /// Browse device categories
    #[command(alias = "cat")]
    Categories(CategoriesArgs),

    /// Read, manage, and watch notifications
    #[command(alias = "notif", alias = "n")]
    Notifications(NotificationsArgs),

    /// Manage CLI configuration and profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Shared Table Arguments ───────────────────────────────────────────

/// Client-side filtering and sorting shared by every list command.
#[derive(Debug, Args)]
pub struct TableArgs {
    /// Keep rows where any text or number column contains this text
    #[arg(long, short = 'f')]
    pub filter: Option<String>,

    /// Sort by column header (case-insensitive)
    #[arg(long)]
    pub sort: Option<String>,

    /// Sort descending
    #[arg(long, requires = "sort")]
    pub desc: bool,
}

// ── Search ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct SearchArgs {
    /// Case-insensitive substring; empty lists everything
    #[arg(default_value = "")]
    pub query: String,
}

// ── Users / Devices / Categories ─────────────────────────────────────

#[derive(Debug, Args)]
pub struct UsersArgs {
    #[command(subcommand)]
    pub command: UsersCommand,
}

#[derive(Debug, Subcommand)]
pub enum UsersCommand {
    /// List users
    #[command(alias = "ls")]
    List(TableArgs),

    /// Show one user
    Get {
        /// User id
        id: i64,
    },
}

#[derive(Debug, Args)]
pub struct DevicesArgs {
    #[command(subcommand)]
    pub command: DevicesCommand,
}

#[derive(Debug, Subcommand)]
pub enum DevicesCommand {
    /// List devices
    #[command(alias = "ls")]
    List(TableArgs),

    /// Show one device
    Get {
        /// Device id
        id: i64,
    },
}

#[derive(Debug, Args)]
pub struct CategoriesArgs {
    #[command(subcommand)]
    pub command: CategoriesCommand,
}

#[derive(Debug, Subcommand)]
pub enum CategoriesCommand {
    /// List categories
    #[command(alias = "ls")]
    List(TableArgs),

    /// Show one category
    Get {
        /// Category id
        id: i64,
    },
}

// ── Notifications ────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct NotificationsArgs {
    #[command(subcommand)]
    pub command: NotificationsCommand,
}

#[derive(Debug, Subcommand)]
pub enum NotificationsCommand {
    /// List notifications
    #[command(alias = "ls")]
    List {
        /// Only unread notifications
        #[arg(long)]
        unread: bool,

        #[command(flatten)]
        table: TableArgs,
    },

    /// Show the most recent unread notifications
    Recent {
        /// How many to show [default: 5]
        #[arg(long, short = 'l')]
        limit: Option<usize>,
    },

    /// Mark a notification as read
    Read {
        /// Notification id
        id: i64,
    },

    /// Delete a notification
    #[command(alias = "rm")]
    Delete {
        /// Notification id
        id: i64,
    },

    /// Poll unread notifications and alert on new ones
    Watch {
        /// Poll period (e.g. "10s", "1m"); overrides the profile
        #[arg(long, short = 'i')]
        interval: Option<String>,

        /// Never play the alert tone
        #[arg(long)]
        silent: bool,
    },

    /// Print the link to the full notifications page
    Open,
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Interactive profile setup
    Init,

    /// Show the resolved configuration
    Show,

    /// Set a value on the active profile
    Set {
        /// Key (server, user_id, session_cookie_env, insecure, timeout, ...)
        key: String,
        /// New value
        value: String,
    },

    /// List profiles (* marks the default)
    Profiles,

    /// Make a profile the default
    Use {
        /// Profile name
        name: String,
    },

    /// Store a session cookie in the system keyring
    SetSession {
        /// Profile name (defaults to the active one)
        name: Option<String>,
    },
}

// ── Completions ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate for
    pub shell: clap_complete::Shell,
}
