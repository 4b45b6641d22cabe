//! Forwarding-record reconciliation for email aliases.
//!
//! Every alias at the apex domain owns one TXT record at the DNS provider,
//! `forward-email=<alias>:<target>`. This crate keeps the local profile
//! store and the provider in step:
//!
//! - **[`Reconciler`]**: creates, locates, updates and deletes forwarding
//!   records. Record ids are cached on the profile and trusted
//!   optimistically; a missing or stale id falls back to a full listing
//!   scan of the apex TXT records, matched on `forward-email=<alias>:`.
//!
//! - **[`RecordIdCache`]**: the `get` / `trust` / `refresh` view over the
//!   cached id. Cache writes are best-effort: a failure becomes a
//!   [`Warning`] on the returned [`Outcome`], never an error.
//!
//! - **[`DnsProvider`]** / **[`ProfileStore`]**: the two seams. The
//!   Cloudflare client and the in-memory / TOML-file stores implement them;
//!   tests inject fakes.

pub mod audit;
pub mod cache;
pub mod config;
pub mod convert;
pub mod error;
pub mod model;
pub mod outcome;
pub mod provider;
pub mod reconciler;
pub mod store;

// ── Primary re-exports ──────────────────────────────────────────────
pub use audit::{AuditFinding, AuditReport};
pub use cache::{CacheEntry, RecordIdCache};
pub use config::{AuthCredentials, ReconcilerConfig, TlsVerification};
pub use error::{CoreError, ProviderError, ProviderErrorKind};
pub use outcome::{Outcome, Warning};
pub use provider::{CloudflareProvider, DnsProvider};
pub use reconciler::{
    AliasStatus, Deprovisioned, ForwardingChange, Provisioned, Reconciler, Resolution,
    ResolutionSource, ScanResult,
};
pub use store::{FileProfileStore, MemoryProfileStore, ProfileStore, StoreError};

pub use model::{
    Alias, DnsRecord, ForwardTarget, ForwardingEntry, ForwardingRecord, RecordId, UserId,
    UserProfile,
};
