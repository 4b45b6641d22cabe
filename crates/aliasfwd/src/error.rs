//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` variants into user-facing errors with
//! actionable help text and a stable exit code.

use miette::Diagnostic;
use thiserror::Error;

use aliasfwd_config::ConfigError;
use aliasfwd_core::{CoreError, ProviderErrorKind};

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const CONFLICT: i32 = 6;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────

    #[error("Could not reach the DNS provider: {message}")]
    #[diagnostic(
        code(aliasfwd::connection_failed),
        help("Check network access to the provider API, or the api_url in your profile.")
    )]
    ConnectionFailed { message: String },

    #[error("DNS provider request timed out: {message}")]
    #[diagnostic(
        code(aliasfwd::timeout),
        help("Increase the timeout with --timeout or the profile's `timeout` key.")
    )]
    Timeout { message: String },

    #[error("DNS provider is rate limiting requests: {message}")]
    #[diagnostic(code(aliasfwd::rate_limited), help("Wait a moment and try again."))]
    RateLimited { message: String },

    // ── Authentication ───────────────────────────────────────────────

    #[error("DNS provider rejected the credentials: {message}")]
    #[diagnostic(
        code(aliasfwd::auth_failed),
        help(
            "The API token needs DNS edit permission on the zone.\n\
             Store a new token with: aliasfwd config set-token"
        )
    )]
    AuthFailed { message: String },

    #[error("No credentials configured for profile '{profile}'")]
    #[diagnostic(
        code(aliasfwd::no_credentials),
        help(
            "Configure credentials with: aliasfwd config init\n\
             Or set the ALIASFWD_API_TOKEN environment variable."
        )
    )]
    NoCredentials { profile: String },

    // ── Resources ────────────────────────────────────────────────────

    #[error("{resource_type} '{identifier}' not found")]
    #[diagnostic(
        code(aliasfwd::not_found),
        help("Run: aliasfwd {list_command} to see available {resource_type}s")
    )]
    NotFound {
        resource_type: String,
        identifier: String,
        list_command: String,
    },

    #[error("No forwarding record exists for alias '{alias}'")]
    #[diagnostic(
        code(aliasfwd::record_not_found),
        help(
            "The DNS record was removed outside aliasfwd and needs an administrator.\n\
             Inspect with: aliasfwd audit"
        )
    )]
    RecordNotFound { alias: String },

    // ── Conflicts ────────────────────────────────────────────────────

    #[error("Alias '{alias}' is already assigned to user '{owner}'")]
    #[diagnostic(code(aliasfwd::alias_taken), help("Choose a different alias."))]
    AliasTaken { alias: String, owner: String },

    #[error("User '{user}' already has an alias")]
    #[diagnostic(
        code(aliasfwd::user_exists),
        help("Show it with: aliasfwd forward show {user}")
    )]
    UserExists { user: String },

    #[error("A forwarding record for '{alias}' already exists at the DNS provider ({record_id})")]
    #[diagnostic(
        code(aliasfwd::record_exists),
        help(
            "The record has no local owner. Remove it at the provider or run: aliasfwd audit"
        )
    )]
    RecordExists { alias: String, record_id: String },

    // ── Provider ─────────────────────────────────────────────────────

    #[error("DNS provider error: {message}")]
    #[diagnostic(code(aliasfwd::provider_error))]
    Provider { message: String, code: Option<u32> },

    // ── Validation ───────────────────────────────────────────────────

    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(aliasfwd::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────

    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(aliasfwd::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: aliasfwd config init"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error("No {missing} configured")]
    #[diagnostic(
        code(aliasfwd::no_config),
        help(
            "Create a profile with: aliasfwd config init\n\
             Or pass --apex, --zone and --api-token.\n\
             Expected config at: {path}"
        )
    )]
    NoConfig { missing: String, path: String },

    #[error("Configuration error: {message}")]
    #[diagnostic(code(aliasfwd::config))]
    Config { message: String },

    // ── Profile store ────────────────────────────────────────────────

    #[error("Profile store error: {message}")]
    #[diagnostic(
        code(aliasfwd::store),
        help("Check the store file path (--store) and its permissions.")
    )]
    Store { message: String },

    // ── Interactive ──────────────────────────────────────────────────

    #[error("Destructive operation '{action}' requires confirmation")]
    #[diagnostic(
        code(aliasfwd::confirmation_required),
        help("Use --yes (-y) to skip confirmation in non-interactive contexts.")
    )]
    NonInteractiveRequiresYes { action: String },

    // ── IO ───────────────────────────────────────────────────────────

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::Timeout { .. } => exit_code::TIMEOUT,
            Self::AuthFailed { .. } | Self::NoCredentials { .. } => exit_code::AUTH,
            Self::NotFound { .. } | Self::RecordNotFound { .. } => exit_code::NOT_FOUND,
            Self::AliasTaken { .. } | Self::UserExists { .. } | Self::RecordExists { .. } => {
                exit_code::CONFLICT
            }
            Self::Validation { .. } | Self::NonInteractiveRequiresYes { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Validation { field, reason } => CliError::Validation { field, reason },

            CoreError::Provider(e) => match e.kind {
                ProviderErrorKind::Authentication => CliError::AuthFailed { message: e.message },
                ProviderErrorKind::Unavailable => CliError::ConnectionFailed { message: e.message },
                ProviderErrorKind::Timeout => CliError::Timeout { message: e.message },
                ProviderErrorKind::RateLimited => CliError::RateLimited { message: e.message },
                ProviderErrorKind::NotFound | ProviderErrorKind::Rejected => CliError::Provider {
                    message: e.message,
                    code: e.code,
                },
            },

            CoreError::RecordNotFound { alias } => CliError::RecordNotFound { alias },

            CoreError::AliasTaken { alias, owner } => CliError::AliasTaken { alias, owner },
            CoreError::UserExists { user } => CliError::UserExists { user },
            CoreError::RecordExists { alias, record_id } => {
                CliError::RecordExists { alias, record_id }
            }

            CoreError::ProfileNotFound { user } => CliError::NotFound {
                resource_type: "user".into(),
                identifier: user,
                list_command: "users list".into(),
            },

            CoreError::Store { message } => CliError::Store { message },
            CoreError::Config { message } => CliError::Config { message },
        }
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => CliError::Validation { field, reason },
            ConfigError::ProfileNotFound { name } => CliError::ProfileNotFound {
                name,
                available: "(see: aliasfwd config profiles)".into(),
            },
            ConfigError::NoCredentials { profile } => CliError::NoCredentials { profile },
            ConfigError::Io(e) => CliError::Io(e),
            other => CliError::Config {
                message: other.to_string(),
            },
        }
    }
}
