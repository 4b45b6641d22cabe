// ── Core error types ──
//
// Reconciliation errors as callers see them. The DNS client's transport
// errors are folded into `ProviderError` so the reconciler can branch on
// "record not found" without knowing about HTTP. Cache-write failures are
// not here at all: they are `Warning`s on an `Outcome`.

use thiserror::Error;

use crate::store::StoreError;

/// What kind of provider failure happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display, strum::IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum ProviderErrorKind {
    /// The record id does not exist at the provider.
    NotFound,
    /// Token rejected or lacking zone permission.
    Authentication,
    /// Throttled by the provider.
    RateLimited,
    /// The request exceeded the client timeout.
    Timeout,
    /// Unreachable or a 5xx.
    Unavailable,
    /// Any other rejection (bad content, malformed response, ...).
    Rejected,
}

/// A failed call to the DNS provider, message passed through verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ProviderError {
    pub kind: ProviderErrorKind,
    pub message: String,
    pub status: Option<u16>,
    pub code: Option<u32>,
}

impl ProviderError {
    pub fn new(kind: ProviderErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            status: None,
            code: None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.kind == ProviderErrorKind::NotFound
    }
}

impl From<aliasfwd_api::Error> for ProviderError {
    fn from(err: aliasfwd_api::Error) -> Self {
        let kind = if err.is_not_found() {
            ProviderErrorKind::NotFound
        } else {
            match &err {
                aliasfwd_api::Error::Authentication { .. } => ProviderErrorKind::Authentication,
                aliasfwd_api::Error::RateLimited { .. } => ProviderErrorKind::RateLimited,
                aliasfwd_api::Error::Transport(e) if e.is_timeout() => ProviderErrorKind::Timeout,
                e if e.is_transient() => ProviderErrorKind::Unavailable,
                aliasfwd_api::Error::Tls(_) => ProviderErrorKind::Unavailable,
                _ => ProviderErrorKind::Rejected,
            }
        };

        let (status, code) = match &err {
            aliasfwd_api::Error::Api { status, code, .. } => (Some(*status), *code),
            aliasfwd_api::Error::Transport(e) => (e.status().map(|s| s.as_u16()), None),
            aliasfwd_api::Error::RateLimited { .. } => (Some(429), None),
            _ => (None, None),
        };

        let message = match err {
            aliasfwd_api::Error::Api { message, .. }
            | aliasfwd_api::Error::Authentication { message } => message,
            other => other.to_string(),
        };

        Self {
            kind,
            message,
            status,
            code,
        }
    }
}

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Input ────────────────────────────────────────────────────────
    #[error("Invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    // ── Provider ─────────────────────────────────────────────────────
    #[error("DNS provider error: {0}")]
    Provider(#[from] ProviderError),

    /// The listing scan found no record for the alias. Needs an admin.
    #[error("No forwarding record found for alias '{alias}'")]
    RecordNotFound { alias: String },

    // ── Conflicts ────────────────────────────────────────────────────
    #[error("Alias '{alias}' is already assigned to user '{owner}'")]
    AliasTaken { alias: String, owner: String },

    #[error("User '{user}' already has an alias")]
    UserExists { user: String },

    #[error("A forwarding record for alias '{alias}' already exists at the provider ({record_id})")]
    RecordExists { alias: String, record_id: String },

    // ── Profile store ────────────────────────────────────────────────
    #[error("Profile not found for user '{user}'")]
    ProfileNotFound { user: String },

    #[error("Profile store error: {message}")]
    Store { message: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl CoreError {
    /// Whether this is the provider's "record not found" or the scan's.
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::RecordNotFound { .. } => true,
            Self::Provider(e) => e.is_not_found(),
            _ => false,
        }
    }
}

impl From<StoreError> for CoreError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { user } => Self::ProfileNotFound { user },
            StoreError::AliasTaken { alias, owner } => Self::AliasTaken { alias, owner },
            StoreError::UserExists { user } => Self::UserExists { user },
            other => Self::Store {
                message: other.to_string(),
            },
        }
    }
}
