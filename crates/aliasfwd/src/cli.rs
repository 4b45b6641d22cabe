//! Clap derive structures for the `aliasfwd` CLI.
//!
//! Defines the complete command tree, global flags, and shared types.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// aliasfwd -- email aliases and their DNS forwarding records
#[derive(Debug, Parser)]
#[command(
    name = "aliasfwd",
    version,
    about = "Provision email aliases and manage their DNS forwarding records",
    long_about = "Provision email aliases at an apex domain and manage where their mail is \
        forwarded.\n\n\
        Forwarding is configured through one TXT record per alias at the DNS provider:\n\
        forward-email=<alias>:<target>",
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
    /// Configuration profile to use
    #[arg(long, short = 'p', env = "ALIASFWD_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Apex domain the aliases live under (overrides profile)
    #[arg(long, env = "ALIASFWD_APEX", global = true)]
    pub apex: Option<String>,

    /// DNS provider zone id (overrides profile)
    #[arg(long, short = 'z', env = "ALIASFWD_ZONE", global = true)]
    pub zone: Option<String>,

    /// DNS provider API token
    #[arg(long, env = "ALIASFWD_API_TOKEN", global = true, hide_env = true)]
    pub api_token: Option<String>,

    /// DNS provider API root (overrides profile)
    #[arg(long, env = "ALIASFWD_API_URL", global = true, hide = true)]
    pub api_url: Option<String>,

    /// Profile store file (overrides profile)
    #[arg(long, env = "ALIASFWD_STORE", global = true)]
    pub store: Option<PathBuf>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "ALIASFWD_OUTPUT",
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

    /// Skip TLS verification (local API mocks only)
    #[arg(long, short = 'k', env = "ALIASFWD_INSECURE", global = true)]
    pub insecure: bool,

    /// Request timeout in seconds
    #[arg(long, env = "ALIASFWD_TIMEOUT", global = true)]
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
    /// Give a user an alias and create its forwarding record
    #[command(alias = "new")]
    Provision(ProvisionArgs),

    /// Change or inspect where an alias forwards to
    #[command(alias = "fwd", alias = "f")]
    Forward(ForwardArgs),

    /// Locate a user's forwarding record id
    Resolve(ResolveArgs),

    /// Inspect forwarding records at the DNS provider
    #[command(alias = "rec")]
    Records(RecordsArgs),

    /// Manage alias owners
    #[command(alias = "u")]
    Users(UsersArgs),

    /// Compare local profiles with the provider's records
    Audit,

    /// Manage CLI configuration and profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  PROVISION
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ProvisionArgs {
    /// Account identifier of the new owner
    pub user: String,

    /// Alias to assign (the part before the @)
    pub alias: String,

    /// Forward incoming mail to this address
    #[arg(long, short = 't')]
    pub forward_to: Option<String>,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  FORWARD
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ForwardArgs {
    #[command(subcommand)]
    pub command: ForwardCommand,
}

#[derive(Debug, Subcommand)]
pub enum ForwardCommand {
    /// Forward a user's alias to an external address
    Set {
        /// Account identifier
        user: String,

        /// External address to forward to
        target: String,
    },

    /// Stop forwarding (local delivery only)
    #[command(alias = "off")]
    Clear {
        /// Account identifier
        user: String,
    },

    /// Show a user's alias and forwarding target
    Show {
        /// Account identifier
        user: String,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  RESOLVE
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ResolveArgs {
    /// Account identifier
    pub user: String,

    /// Ignore the cached record id and scan the provider
    #[arg(long)]
    pub rescan: bool,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  RECORDS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct RecordsArgs {
    #[command(subcommand)]
    pub command: RecordsCommand,
}

#[derive(Debug, Subcommand)]
pub enum RecordsCommand {
    /// List every forwarding record at the apex domain
    #[command(alias = "ls")]
    List,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  USERS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct UsersArgs {
    #[command(subcommand)]
    pub command: UsersCommand,
}

#[derive(Debug, Subcommand)]
pub enum UsersCommand {
    /// List alias owners from the local profile store
    #[command(alias = "ls")]
    List,

    /// Remove a user and delete their forwarding record
    #[command(alias = "rm")]
    Delete {
        /// Account identifier
        user: String,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  CONFIG
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Create initial config file with guided setup
    Init,

    /// Display current resolved configuration
    Show,

    /// Set a configuration value on the active profile
    Set {
        /// Config key (e.g., "apex_domain", "zone_id", "ttl")
        key: String,

        /// Value to set
        value: String,
    },

    /// List configured profiles
    Profiles,

    /// Set the default profile
    Use {
        /// Profile name to set as default
        name: String,
    },

    /// Store the API token (or global key) in the system keyring
    SetToken {
        /// Profile name
        #[arg(long)]
        profile: Option<String>,
    },

    /// Print the config file path
    Path,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  COMPLETIONS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
