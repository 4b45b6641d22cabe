use thiserror::Error;

/// Cloudflare reports a missing DNS record with this error code.
pub const RECORD_NOT_FOUND_CODE: u32 = 81044;

/// Top-level error type for the `aliasfwd-api` crate.
///
/// Covers every failure mode of the DNS provider API: authentication,
/// transport, structured API errors, and response decoding.
/// `aliasfwd-core` maps these into reconciliation errors.
#[derive(Debug, Error)]
pub enum Error {
    // ── Authentication ──────────────────────────────────────────────
    /// Token rejected, missing permission on the zone, etc.
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// TLS setup or certificate error.
    #[error("TLS error: {0}")]
    Tls(String),

    /// Rate limited by the provider. Includes retry-after in seconds.
    #[error("Rate limited -- retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    // ── Provider API ────────────────────────────────────────────────
    /// Structured error from the `{success: false, errors: [...]}` envelope.
    #[error("DNS provider error (HTTP {status}): {message}")]
    Api {
        message: String,
        code: Option<u32>,
        status: u16,
    },

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

impl Error {
    /// Returns `true` if the provider says the record does not exist.
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::Transport(e) => e.status() == Some(reqwest::StatusCode::NOT_FOUND),
            Self::Api { status, code, .. } => {
                *status == 404 || *code == Some(RECORD_NOT_FOUND_CODE)
            }
            _ => false,
        }
    }

    /// Returns `true` if this is a transient error worth retrying.
    ///
    /// Nothing in this crate retries; callers higher up may.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect(),
            Self::RateLimited { .. } => true,
            Self::Api { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// Extract the provider error code, if available.
    pub fn api_error_code(&self) -> Option<u32> {
        match self {
            Self::Api { code, .. } => *code,
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_by_status_or_code() {
        let by_status = Error::Api {
            message: "gone".into(),
            code: None,
            status: 404,
        };
        let by_code = Error::Api {
            message: "Record does not exist.".into(),
            code: Some(RECORD_NOT_FOUND_CODE),
            status: 400,
        };
        let other = Error::Api {
            message: "bad content".into(),
            code: Some(9005),
            status: 400,
        };

        assert!(by_status.is_not_found());
        assert!(by_code.is_not_found());
        assert!(!other.is_not_found());
    }

    #[test]
    fn server_errors_are_transient() {
        let err = Error::Api {
            message: "upstream".into(),
            code: None,
            status: 502,
        };
        assert!(err.is_transient());
        assert!(!Error::Tls("nope".into()).is_transient());
    }
}
