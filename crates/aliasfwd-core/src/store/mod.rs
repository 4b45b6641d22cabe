// ── Profile store seam ──
//
// Where alias owners and their cached record ids live. The reconciler
// treats reads and profile inserts/removals as primary (failures abort the
// operation) and `set_record_id` as best-effort.

mod file;
mod memory;

use std::future::Future;

use thiserror::Error;

use crate::model::{Alias, ForwardTarget, RecordId, UserId, UserProfile};

pub use file::FileProfileStore;
pub use memory::MemoryProfileStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("no profile for user '{user}'")]
    NotFound { user: String },

    #[error("alias '{alias}' is already assigned to user '{owner}'")]
    AliasTaken { alias: String, owner: String },

    #[error("user '{user}' already has a profile")]
    UserExists { user: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to decode profile store: {0}")]
    Decode(#[from] toml::de::Error),

    #[error("failed to encode profile store: {0}")]
    Encode(#[from] toml::ser::Error),

    /// Catch-all for backends that are not files or maps.
    #[error("{0}")]
    Backend(String),
}

/// Persistence for [`UserProfile`]s, keyed by user and unique by alias.
pub trait ProfileStore: Send + Sync {
    fn get(
        &self,
        user: &UserId,
    ) -> impl Future<Output = Result<UserProfile, StoreError>> + Send;

    fn find_by_alias(
        &self,
        alias: &Alias,
    ) -> impl Future<Output = Result<Option<UserProfile>, StoreError>> + Send;

    /// All profiles, ordered by alias.
    fn list(&self) -> impl Future<Output = Result<Vec<UserProfile>, StoreError>> + Send;

    /// Insert a new profile. Fails on a taken alias or an existing user.
    fn insert(
        &self,
        profile: UserProfile,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    fn remove(
        &self,
        user: &UserId,
    ) -> impl Future<Output = Result<UserProfile, StoreError>> + Send;

    /// Write (or clear) the cached DNS record id.
    fn set_record_id(
        &self,
        user: &UserId,
        record_id: Option<&RecordId>,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Write (or clear) the displayed forwarding target.
    fn set_forward_to(
        &self,
        user: &UserId,
        target: Option<&ForwardTarget>,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;
}
