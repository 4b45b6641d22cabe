// ── Runtime reconciler configuration ──
//
// These types describe *which* zone to reconcile and *how* to reach the
// provider. They carry credential data but never touch disk; the CLI builds
// a `ReconcilerConfig` from its profile and hands it in.

use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;
use url::Url;

use crate::error::CoreError;

/// How to authenticate with the DNS provider.
#[derive(Debug, Clone)]
pub enum AuthCredentials {
    /// Scoped API token (preferred).
    ApiToken(SecretString),
    /// Account email + global API key.
    GlobalKey { email: String, key: SecretString },
}

/// TLS verification strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsVerification {
    /// System CA store (strict).
    #[default]
    SystemDefaults,
    /// Custom CA certificate file.
    CustomCa(PathBuf),
    /// Skip verification. Only for pointing at a local API mock.
    DangerAcceptInvalid,
}

/// Configuration for reconciling one apex domain.
#[derive(Debug, Clone)]
pub struct ReconcilerConfig {
    /// Provider API root (e.g. `https://api.cloudflare.com/client/v4/`).
    pub api_url: Url,
    /// Provider zone holding the apex domain's records.
    pub zone_id: String,
    /// Domain every alias lives under; also the TXT record name.
    pub apex_domain: String,
    pub auth: AuthCredentials,
    pub tls: TlsVerification,
    /// Per-request timeout. The only bound on a provider call.
    pub timeout: Duration,
    /// TXT record TTL; `1` is the provider's "automatic".
    pub ttl: u32,
    /// Records per page during the listing scan.
    pub page_size: u32,
}

impl ReconcilerConfig {
    pub fn new(
        zone_id: impl Into<String>,
        apex_domain: &str,
        auth: AuthCredentials,
    ) -> Result<Self, CoreError> {
        let api_url = Url::parse(aliasfwd_api::client::DEFAULT_BASE_URL).map_err(|e| {
            CoreError::Config {
                message: format!("invalid default API URL: {e}"),
            }
        })?;

        let zone_id = zone_id.into();
        if zone_id.trim().is_empty() {
            return Err(CoreError::Config {
                message: "zone_id must not be empty".into(),
            });
        }

        Ok(Self {
            api_url,
            zone_id,
            apex_domain: normalize_apex(apex_domain)?,
            auth,
            tls: TlsVerification::default(),
            timeout: Duration::from_secs(30),
            ttl: 1,
            page_size: aliasfwd_api::client::DEFAULT_PAGE_SIZE,
        })
    }
}

/// Lowercase, strip a trailing dot, and require at least one label dot.
pub fn normalize_apex(raw: &str) -> Result<String, CoreError> {
    let apex = raw.trim().trim_end_matches('.').to_ascii_lowercase();
    if apex.is_empty() || !apex.contains('.') || apex.split('.').any(str::is_empty) {
        return Err(CoreError::Config {
            message: format!("invalid apex domain '{raw}'"),
        });
    }
    if apex
        .chars()
        .any(|c| !(c.is_ascii_alphanumeric() || c == '-' || c == '.'))
    {
        return Err(CoreError::Config {
            message: format!("apex domain '{raw}' contains invalid characters"),
        });
    }
    Ok(apex)
}
