// ── API-to-domain conversions ──
//
// The only place that knows both `aliasfwd_api` wire types and the core
// model. Everything above this module speaks domain types.

use aliasfwd_api::transport::{TlsMode, TransportConfig};
use aliasfwd_api::{Credentials, DnsRecordResponse};

use crate::config::{AuthCredentials, ReconcilerConfig, TlsVerification};
use crate::model::{DnsRecord, RecordId};

impl From<DnsRecordResponse> for DnsRecord {
    fn from(r: DnsRecordResponse) -> Self {
        Self {
            id: RecordId::from(r.id),
            name: r.name,
            content: r.content,
            modified_on: r.modified_on.or(r.created_on),
        }
    }
}

impl From<&TlsVerification> for TlsMode {
    fn from(tls: &TlsVerification) -> Self {
        match tls {
            TlsVerification::SystemDefaults => Self::System,
            TlsVerification::CustomCa(path) => Self::CustomCa(path.clone()),
            TlsVerification::DangerAcceptInvalid => Self::DangerAcceptInvalid,
        }
    }
}

impl From<&AuthCredentials> for Credentials {
    fn from(auth: &AuthCredentials) -> Self {
        match auth {
            AuthCredentials::ApiToken(token) => Self::ApiToken {
                token: token.clone(),
            },
            AuthCredentials::GlobalKey { email, key } => Self::GlobalKey {
                email: email.clone(),
                key: key.clone(),
            },
        }
    }
}

pub(crate) fn build_transport(config: &ReconcilerConfig) -> TransportConfig {
    TransportConfig {
        tls: TlsMode::from(&config.tls),
        timeout: config.timeout,
    }
}
