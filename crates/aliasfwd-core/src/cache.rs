// ── Record-id cache ──
//
// The profile's `dns_record_id` is a hint. It is read once per operation,
// trusted optimistically, and rewritten after every successful scan or
// create. Writes never fail the caller.

use tracing::warn;

use crate::error::CoreError;
use crate::model::{Alias, RecordId, UserId};
use crate::outcome::Warning;
use crate::store::ProfileStore;

/// Snapshot of what the store holds for one user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry {
    pub alias: Alias,
    pub record_id: Option<RecordId>,
}

/// Best-effort view over the record ids held in a [`ProfileStore`].
#[derive(Debug)]
pub struct RecordIdCache<'a, S> {
    store: &'a S,
}

impl<'a, S: ProfileStore> RecordIdCache<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Read the user's alias and cached id. A missing profile is an error.
    pub async fn get(&self, user: &UserId) -> Result<CacheEntry, CoreError> {
        let profile = self.store.get(user).await?;
        Ok(CacheEntry {
            alias: profile.alias,
            record_id: profile.dns_record_id,
        })
    }

    /// The id to try first, if any. Empty ids count as absent.
    pub fn trust<'e>(&self, entry: &'e CacheEntry) -> Option<&'e RecordId> {
        entry
            .record_id
            .as_ref()
            .filter(|id| !id.as_str().trim().is_empty())
    }

    /// Persist `record_id`. Returns a warning instead of failing.
    pub async fn refresh(&self, user: &UserId, record_id: &RecordId) -> Option<Warning> {
        match self.store.set_record_id(user, Some(record_id)).await {
            Ok(()) => None,
            Err(e) => {
                warn!(user = %user, record_id = %record_id, error = %e, "failed to cache DNS record id");
                Some(Warning::CacheWrite {
                    user: user.to_string(),
                    reason: e.to_string(),
                })
            }
        }
    }

    /// Drop a cached id known to be stale.
    pub async fn invalidate(&self, user: &UserId) -> Option<Warning> {
        match self.store.set_record_id(user, None).await {
            Ok(()) => None,
            Err(e) => {
                warn!(user = %user, error = %e, "failed to clear stale DNS record id");
                Some(Warning::CacheWrite {
                    user: user.to_string(),
                    reason: e.to_string(),
                })
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::model::UserProfile;
    use crate::store::MemoryProfileStore;

    async fn seeded() -> (MemoryProfileStore, UserId) {
        let store = MemoryProfileStore::new();
        let user = UserId::parse("u1").unwrap();
        store
            .insert(UserProfile::new(user.clone(), Alias::parse("alice").unwrap(), None))
            .await
            .unwrap();
        (store, user)
    }

    #[tokio::test]
    async fn refresh_then_get() {
        let (store, user) = seeded().await;
        let cache = RecordIdCache::new(&store);

        assert!(cache.refresh(&user, &RecordId::from("rec_1")).await.is_none());
        let entry = cache.get(&user).await.unwrap();
        assert_eq!(cache.trust(&entry), Some(&RecordId::from("rec_1")));

        assert!(cache.invalidate(&user).await.is_none());
        let entry = cache.get(&user).await.unwrap();
        assert_eq!(cache.trust(&entry), None);
    }

    #[tokio::test]
    async fn blank_id_is_not_trusted() {
        let (store, _) = seeded().await;
        let cache = RecordIdCache::new(&store);
        let entry = CacheEntry {
            alias: Alias::parse("alice").unwrap(),
            record_id: Some(RecordId::from("  ")),
        };
        assert_eq!(cache.trust(&entry), None);
    }

    #[tokio::test]
    async fn failed_write_becomes_warning() {
        let store = MemoryProfileStore::new();
        let cache = RecordIdCache::new(&store);
        let ghost = UserId::parse("ghost").unwrap();

        let warning = cache.refresh(&ghost, &RecordId::from("rec_1")).await;
        assert!(matches!(warning, Some(Warning::CacheWrite { ref user, .. }) if user == "ghost"));
    }

    #[tokio::test]
    async fn missing_profile_is_an_error() {
        let store = MemoryProfileStore::new();
        let err = RecordIdCache::new(&store)
            .get(&UserId::parse("ghost").unwrap())
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::ProfileNotFound { .. }));
    }
}
