// ── Outcome + warnings ──
//
// A primary result plus the non-fatal things that went wrong on the way.
// The DNS provider is authoritative: once its write succeeded, a failing
// secondary write (the cached record id) is reported here, not as an error.

use std::fmt;

use serde::Serialize;

use crate::model::RecordId;

/// Non-fatal condition attached to a successful operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, strum::IntoStaticStr)]
#[serde(tag = "kind", rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Warning {
    /// Persisting the cached record id failed; the next call rescans.
    CacheWrite { user: String, reason: String },

    /// The cached id pointed at a record the provider no longer has.
    StaleCache { alias: String, record_id: RecordId },

    /// More than one record carries the alias key; the first one was used.
    DuplicateRecords {
        alias: String,
        used: RecordId,
        ignored: Vec<RecordId>,
    },

    /// The user was removed but their DNS record could not be deleted.
    DnsCleanup { alias: String, reason: String },

    /// Nothing to delete: the record was already gone.
    RecordAlreadyGone { alias: String },
}

impl Warning {
    pub fn kind(&self) -> &'static str {
        self.into()
    }
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CacheWrite { user, reason } => {
                write!(f, "could not cache DNS record id for user '{user}': {reason}")
            }
            Self::StaleCache { alias, record_id } => write!(
                f,
                "cached DNS record {record_id} for alias '{alias}' no longer exists; rescanned"
            ),
            Self::DuplicateRecords {
                alias,
                used,
                ignored,
            } => {
                let ignored: Vec<&str> = ignored.iter().map(RecordId::as_str).collect();
                write!(
                    f,
                    "alias '{alias}' has duplicate forwarding records; using {used}, ignoring {}",
                    ignored.join(", ")
                )
            }
            Self::DnsCleanup { alias, reason } => write!(
                f,
                "user deleted, but DNS cleanup for alias '{alias}' failed: {reason}. \
                 The DNS record may need to be removed manually"
            ),
            Self::RecordAlreadyGone { alias } => {
                write!(f, "no DNS record left to delete for alias '{alias}'")
            }
        }
    }
}

/// Primary result of an operation plus its warnings.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Outcome<T> {
    pub value: T,
    pub warnings: Vec<Warning>,
}

impl<T> Outcome<T> {
    pub fn new(value: T) -> Self {
        Self {
            value,
            warnings: Vec::new(),
        }
    }

    pub fn with_warnings(value: T, warnings: Vec<Warning>) -> Self {
        Self { value, warnings }
    }

    /// Record an optional warning (the shape best-effort writes return).
    pub fn note(&mut self, warning: Option<Warning>) {
        self.warnings.extend(warning);
    }

    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Outcome<U> {
        Outcome {
            value: f(self.value),
            warnings: self.warnings,
        }
    }

    pub fn into_parts(self) -> (T, Vec<Warning>) {
        (self.value, self.warnings)
    }
}
