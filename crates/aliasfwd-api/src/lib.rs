// aliasfwd-api: Async Rust client for the Cloudflare DNS records API

pub mod auth;
pub mod client;
pub mod error;
pub mod transport;
pub mod types;

pub use auth::{AuthStrategy, Credentials};
pub use client::DnsClient;
pub use error::Error;
pub use transport::{TlsMode, TransportConfig};
pub use types::{DnsRecordResponse, RecordType};
