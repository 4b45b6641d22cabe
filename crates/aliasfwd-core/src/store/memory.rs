// ── In-memory profile store ──
//
// Two concurrent maps: user -> profile, plus an alias -> user index that
// enforces alias uniqueness through its entry lock.

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

use super::{ProfileStore, StoreError};
use crate::model::{Alias, ForwardTarget, RecordId, UserId, UserProfile};

#[derive(Debug, Default)]
pub struct MemoryProfileStore {
    by_user: DashMap<UserId, UserProfile>,
    alias_to_user: DashMap<Alias, UserId>,
}

impl MemoryProfileStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.by_user.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_user.is_empty()
    }

    fn with_profile<T>(
        &self,
        user: &UserId,
        f: impl FnOnce(&mut UserProfile) -> T,
    ) -> Result<T, StoreError> {
        let mut entry = self.by_user.get_mut(user).ok_or_else(|| StoreError::NotFound {
            user: user.to_string(),
        })?;
        Ok(f(entry.value_mut()))
    }
}

impl ProfileStore for MemoryProfileStore {
    async fn get(&self, user: &UserId) -> Result<UserProfile, StoreError> {
        self.with_profile(user, |p| p.clone())
    }

    async fn find_by_alias(&self, alias: &Alias) -> Result<Option<UserProfile>, StoreError> {
        let Some(user) = self.alias_to_user.get(alias).map(|r| r.value().clone()) else {
            return Ok(None);
        };
        Ok(self.by_user.get(&user).map(|r| r.value().clone()))
    }

    async fn list(&self) -> Result<Vec<UserProfile>, StoreError> {
        let mut all: Vec<UserProfile> = self.by_user.iter().map(|r| r.value().clone()).collect();
        all.sort_by(|a, b| a.alias.cmp(&b.alias));
        Ok(all)
    }

    async fn insert(&self, profile: UserProfile) -> Result<(), StoreError> {
        // Lock order: user entry, then alias entry. Nothing else nests them.
        let Entry::Vacant(user_slot) = self.by_user.entry(profile.user_id.clone()) else {
            return Err(StoreError::UserExists {
                user: profile.user_id.to_string(),
            });
        };
        match self.alias_to_user.entry(profile.alias.clone()) {
            Entry::Occupied(owner) => Err(StoreError::AliasTaken {
                alias: profile.alias.to_string(),
                owner: owner.get().to_string(),
            }),
            Entry::Vacant(alias_slot) => {
                alias_slot.insert(profile.user_id.clone());
                user_slot.insert(profile);
                Ok(())
            }
        }
    }

    async fn remove(&self, user: &UserId) -> Result<UserProfile, StoreError> {
        let (_, profile) = self.by_user.remove(user).ok_or_else(|| StoreError::NotFound {
            user: user.to_string(),
        })?;
        self.alias_to_user.remove(&profile.alias);
        Ok(profile)
    }

    async fn set_record_id(
        &self,
        user: &UserId,
        record_id: Option<&RecordId>,
    ) -> Result<(), StoreError> {
        self.with_profile(user, |p| p.dns_record_id = record_id.cloned())
    }

    async fn set_forward_to(
        &self,
        user: &UserId,
        target: Option<&ForwardTarget>,
    ) -> Result<(), StoreError> {
        self.with_profile(user, |p| p.forward_to = target.cloned())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn profile(user: &str, alias: &str) -> UserProfile {
        UserProfile::new(
            UserId::parse(user).unwrap(),
            Alias::parse(alias).unwrap(),
            None,
        )
    }

    #[tokio::test]
    async fn insert_and_lookup() {
        let store = MemoryProfileStore::new();
        store.insert(profile("u1", "alice")).await.unwrap();

        let by_user = store.get(&UserId::parse("u1").unwrap()).await.unwrap();
        assert_eq!(by_user.alias.as_str(), "alice");

        let by_alias = store
            .find_by_alias(&Alias::parse("alice").unwrap())
            .await
            .unwrap();
        assert_eq!(by_alias.unwrap().user_id.as_str(), "u1");
    }

    #[tokio::test]
    async fn alias_is_unique() {
        let store = MemoryProfileStore::new();
        store.insert(profile("u1", "alice")).await.unwrap();

        let err = store.insert(profile("u2", "alice")).await.unwrap_err();
        assert!(matches!(err, StoreError::AliasTaken { ref owner, .. } if owner == "u1"));
    }

    #[tokio::test]
    async fn one_alias_per_user() {
        let store = MemoryProfileStore::new();
        store.insert(profile("u1", "alice")).await.unwrap();

        let err = store.insert(profile("u1", "alice2")).await.unwrap_err();
        assert!(matches!(err, StoreError::UserExists { .. }));
        // The rejected alias must not stay reserved.
        assert!(
            store
                .find_by_alias(&Alias::parse("alice2").unwrap())
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn remove_frees_alias() {
        let store = MemoryProfileStore::new();
        let u1 = UserId::parse("u1").unwrap();
        store.insert(profile("u1", "alice")).await.unwrap();
        store.remove(&u1).await.unwrap();

        assert!(store.is_empty());
        store.insert(profile("u2", "alice")).await.unwrap();
    }

    #[tokio::test]
    async fn record_id_round_trips() {
        let store = MemoryProfileStore::new();
        let u1 = UserId::parse("u1").unwrap();
        store.insert(profile("u1", "alice")).await.unwrap();

        store
            .set_record_id(&u1, Some(&RecordId::from("rec_1")))
            .await
            .unwrap();
        assert_eq!(
            store.get(&u1).await.unwrap().dns_record_id,
            Some(RecordId::from("rec_1"))
        );

        store.set_record_id(&u1, None).await.unwrap();
        assert_eq!(store.get(&u1).await.unwrap().dns_record_id, None);
    }

    #[tokio::test]
    async fn missing_user() {
        let store = MemoryProfileStore::new();
        let err = store
            .set_forward_to(&UserId::parse("ghost").unwrap(), None)
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn racing_inserts_for_one_user_reserve_one_alias() {
        let store = std::sync::Arc::new(MemoryProfileStore::new());
        let aliases = ["alice", "bob", "carol", "dave", "erin", "frank", "grace", "heidi"];

        let handles: Vec<_> = aliases
            .iter()
            .map(|alias| {
                let store = std::sync::Arc::clone(&store);
                let p = profile("u1", alias);
                tokio::spawn(async move { store.insert(p).await })
            })
            .collect();

        let mut winners = Vec::new();
        for (alias, handle) in aliases.iter().zip(handles) {
            match handle.await.unwrap() {
                Ok(()) => winners.push(*alias),
                Err(err) => assert!(matches!(err, StoreError::UserExists { .. })),
            }
        }
        assert_eq!(winners.len(), 1);
        assert_eq!(store.len(), 1);

        for alias in aliases {
            let found = store.find_by_alias(&Alias::parse(alias).unwrap()).await.unwrap();
            assert_eq!(found.is_some(), alias == winners[0], "alias {alias}");
        }
    }
}
