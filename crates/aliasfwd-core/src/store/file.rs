// ── TOML-file profile store ──
//
// One file holds every profile:
//
//     [profiles.<user_id>]
//     alias = "alice"
//     forward_to = "alice@gmail.com"
//     dns_record_id = "rec_1"
//     created_at = "..."
//
// Every operation re-reads the file under a process-local lock so edits by
// another process between calls are picked up. Writes go to a sibling temp
// file and are renamed into place.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::debug;

use super::{ProfileStore, StoreError};
use crate::model::{Alias, ForwardTarget, RecordId, UserId, UserProfile};

#[derive(Debug, Default, Serialize, Deserialize)]
struct ProfileFile {
    #[serde(default)]
    profiles: BTreeMap<String, StoredProfile>,
}

/// On-disk row. The user id is the table key, not a field.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredProfile {
    alias: Alias,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    forward_to: Option<ForwardTarget>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    dns_record_id: Option<RecordId>,
    created_at: chrono::DateTime<chrono::Utc>,
}

impl StoredProfile {
    fn into_profile(self, user: &str) -> Result<UserProfile, StoreError> {
        let user_id = UserId::parse(user).map_err(|e| StoreError::Backend(e.to_string()))?;
        Ok(UserProfile {
            user_id,
            alias: self.alias,
            forward_to: self.forward_to,
            dns_record_id: self.dns_record_id,
            created_at: self.created_at,
        })
    }
}

impl From<UserProfile> for StoredProfile {
    fn from(p: UserProfile) -> Self {
        Self {
            alias: p.alias,
            forward_to: p.forward_to,
            dns_record_id: p.dns_record_id,
            created_at: p.created_at,
        }
    }
}

/// [`ProfileStore`] persisted as a single TOML file. A missing file is an
/// empty store.
#[derive(Debug)]
pub struct FileProfileStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileProfileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(&self) -> Result<ProfileFile, StoreError> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => Ok(toml::from_str(&raw)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(ProfileFile::default()),
            Err(e) => Err(e.into()),
        }
    }

    async fn save(&self, file: &ProfileFile) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        let body = toml::to_string_pretty(file)?;
        let tmp = self.path.with_extension("toml.tmp");
        tokio::fs::write(&tmp, body).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        debug!(path = %self.path.display(), profiles = file.profiles.len(), "profile store written");
        Ok(())
    }

    /// Read-modify-write of one profile under the lock.
    async fn update(
        &self,
        user: &UserId,
        f: impl FnOnce(&mut StoredProfile) + Send,
    ) -> Result<(), StoreError> {
        let _guard = self.lock.lock().await;
        let mut file = self.load().await?;
        let row = file
            .profiles
            .get_mut(user.as_str())
            .ok_or_else(|| StoreError::NotFound {
                user: user.to_string(),
            })?;
        f(row);
        self.save(&file).await
    }
}

impl ProfileStore for FileProfileStore {
    async fn get(&self, user: &UserId) -> Result<UserProfile, StoreError> {
        let _guard = self.lock.lock().await;
        let mut file = self.load().await?;
        file.profiles
            .remove(user.as_str())
            .ok_or_else(|| StoreError::NotFound {
                user: user.to_string(),
            })?
            .into_profile(user.as_str())
    }

    async fn find_by_alias(&self, alias: &Alias) -> Result<Option<UserProfile>, StoreError> {
        let _guard = self.lock.lock().await;
        let file = self.load().await?;
        file.profiles
            .into_iter()
            .find(|(_, row)| &row.alias == alias)
            .map(|(user, row)| row.into_profile(&user))
            .transpose()
    }

    async fn list(&self) -> Result<Vec<UserProfile>, StoreError> {
        let _guard = self.lock.lock().await;
        let file = self.load().await?;
        let mut all = file
            .profiles
            .into_iter()
            .map(|(user, row)| row.into_profile(&user))
            .collect::<Result<Vec<_>, _>>()?;
        all.sort_by(|a, b| a.alias.cmp(&b.alias));
        Ok(all)
    }

    async fn insert(&self, profile: UserProfile) -> Result<(), StoreError> {
        let _guard = self.lock.lock().await;
        let mut file = self.load().await?;

        if let Some((owner, _)) = file.profiles.iter().find(|(_, r)| r.alias == profile.alias) {
            return Err(StoreError::AliasTaken {
                alias: profile.alias.to_string(),
                owner: owner.clone(),
            });
        }
        if file.profiles.contains_key(profile.user_id.as_str()) {
            return Err(StoreError::UserExists {
                user: profile.user_id.to_string(),
            });
        }

        file.profiles
            .insert(profile.user_id.to_string(), StoredProfile::from(profile));
        self.save(&file).await
    }

    async fn remove(&self, user: &UserId) -> Result<UserProfile, StoreError> {
        let _guard = self.lock.lock().await;
        let mut file = self.load().await?;
        let row = file
            .profiles
            .remove(user.as_str())
            .ok_or_else(|| StoreError::NotFound {
                user: user.to_string(),
            })?;
        self.save(&file).await?;
        row.into_profile(user.as_str())
    }

    async fn set_record_id(
        &self,
        user: &UserId,
        record_id: Option<&RecordId>,
    ) -> Result<(), StoreError> {
        let record_id = record_id.cloned();
        self.update(user, move |row| row.dns_record_id = record_id)
            .await
    }

    async fn set_forward_to(
        &self,
        user: &UserId,
        target: Option<&ForwardTarget>,
    ) -> Result<(), StoreError> {
        let target = target.cloned();
        self.update(user, move |row| row.forward_to = target).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn profile(user: &str, alias: &str, target: Option<&str>) -> UserProfile {
        UserProfile::new(
            UserId::parse(user).unwrap(),
            Alias::parse(alias).unwrap(),
            ForwardTarget::parse_optional(target).unwrap(),
        )
    }

    #[tokio::test]
    async fn missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileProfileStore::new(dir.path().join("profiles.toml"));
        assert!(store.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("profiles.toml");

        let store = FileProfileStore::new(&path);
        store
            .insert(profile("u1", "alice", Some("alice@gmail.com")))
            .await
            .unwrap();
        store
            .set_record_id(&UserId::parse("u1").unwrap(), Some(&RecordId::from("rec_1")))
            .await
            .unwrap();

        let reopened = FileProfileStore::new(&path);
        let p = reopened.get(&UserId::parse("u1").unwrap()).await.unwrap();
        assert_eq!(p.alias.as_str(), "alice");
        assert_eq!(p.forward_to.unwrap().as_str(), "alice@gmail.com");
        assert_eq!(p.dns_record_id, Some(RecordId::from("rec_1")));
        assert!(!path.with_extension("toml.tmp").exists());
    }

    #[tokio::test]
    async fn enforces_alias_uniqueness() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileProfileStore::new(dir.path().join("profiles.toml"));
        store.insert(profile("u1", "alice", None)).await.unwrap();

        let err = store.insert(profile("u2", "alice", None)).await.unwrap_err();
        assert!(matches!(err, StoreError::AliasTaken { .. }));
        let err = store.insert(profile("u1", "other", None)).await.unwrap_err();
        assert!(matches!(err, StoreError::UserExists { .. }));
    }

    #[tokio::test]
    async fn find_and_remove() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileProfileStore::new(dir.path().join("profiles.toml"));
        store.insert(profile("u1", "alice", None)).await.unwrap();
        store.insert(profile("u2", "bob", None)).await.unwrap();

        let bob = store
            .find_by_alias(&Alias::parse("bob").unwrap())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(bob.user_id.as_str(), "u2");

        store.remove(&UserId::parse("u2").unwrap()).await.unwrap();
        let names: Vec<String> = store
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.alias.to_string())
            .collect();
        assert_eq!(names, vec!["alice"]);
    }

    #[tokio::test]
    async fn corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("profiles.toml");
        std::fs::write(&path, "profiles = 12").unwrap();

        let err = FileProfileStore::new(&path).list().await.unwrap_err();
        assert!(matches!(err, StoreError::Decode(_)));
    }
}
