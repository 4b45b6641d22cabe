// Shared fakes for the reconciler integration tests.
#![allow(dead_code, clippy::unwrap_used)]

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use aliasfwd_core::{
    Alias, DnsProvider, DnsRecord, ForwardTarget, MemoryProfileStore, ProfileStore,
    ProviderError, ProviderErrorKind, RecordId, StoreError, UserId, UserProfile,
};

pub const APEX: &str = "example.com";

pub fn alias(s: &str) -> Alias {
    Alias::parse(s).unwrap()
}

pub fn user(s: &str) -> UserId {
    UserId::parse(s).unwrap()
}

pub fn target(s: &str) -> ForwardTarget {
    ForwardTarget::parse(s).unwrap()
}

// ── FakeProvider ────────────────────────────────────────────────────

#[derive(Default)]
struct FakeState {
    records: Vec<DnsRecord>,
    next_id: u32,
    writes: usize,
    lists: usize,
    fail_create: Option<ProviderError>,
    fail_delete: Option<ProviderError>,
    fail_list: Option<ProviderError>,
}

/// In-memory TXT record set. New ids are `rec_1`, `rec_2`, ...
#[derive(Default)]
pub struct FakeProvider {
    state: Mutex<FakeState>,
}

impl FakeProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-existing records, in listing order. Seeding is not a write.
    pub fn with_records(records: &[(&str, &str)]) -> Self {
        let fake = Self::new();
        for (id, content) in records {
            fake.seed(id, content);
        }
        fake
    }

    pub fn seed(&self, id: &str, content: &str) {
        self.state.lock().unwrap().records.push(DnsRecord {
            id: RecordId::from(id),
            name: APEX.into(),
            content: (*content).into(),
            modified_on: None,
        });
    }

    /// Delete a record behind the reconciler's back.
    pub fn forget(&self, id: &str) {
        self.state
            .lock()
            .unwrap()
            .records
            .retain(|r| r.id.as_str() != id);
    }

    pub fn content_of(&self, id: &str) -> Option<String> {
        self.state
            .lock()
            .unwrap()
            .records
            .iter()
            .find(|r| r.id.as_str() == id)
            .map(|r| r.content.clone())
    }

    pub fn record_count(&self) -> usize {
        self.state.lock().unwrap().records.len()
    }

    /// Provider writes so far (create, replace, delete).
    pub fn writes(&self) -> usize {
        self.state.lock().unwrap().writes
    }

    pub fn lists(&self) -> usize {
        self.state.lock().unwrap().lists
    }

    pub fn fail_next_create(&self, err: ProviderError) {
        self.state.lock().unwrap().fail_create = Some(err);
    }

    pub fn fail_deletes(&self, err: ProviderError) {
        self.state.lock().unwrap().fail_delete = Some(err);
    }

    pub fn fail_lists(&self, err: ProviderError) {
        self.state.lock().unwrap().fail_list = Some(err);
    }
}

fn not_found(id: &RecordId) -> ProviderError {
    let mut err = ProviderError::new(
        ProviderErrorKind::NotFound,
        format!("Record {id} does not exist."),
    );
    err.status = Some(404);
    err.code = Some(81044);
    err
}

impl DnsProvider for FakeProvider {
    async fn create_txt(&self, content: &str) -> Result<DnsRecord, ProviderError> {
        let mut state = self.state.lock().unwrap();
        if let Some(err) = state.fail_create.take() {
            return Err(err);
        }
        state.writes += 1;
        state.next_id += 1;
        let record = DnsRecord {
            id: RecordId::new(format!("rec_{}", state.next_id)),
            name: APEX.into(),
            content: content.into(),
            modified_on: None,
        };
        state.records.push(record.clone());
        Ok(record)
    }

    async fn replace_txt(&self, id: &RecordId, content: &str) -> Result<DnsRecord, ProviderError> {
        let mut state = self.state.lock().unwrap();
        state.writes += 1;
        let record = state
            .records
            .iter_mut()
            .find(|r| &r.id == id)
            .ok_or_else(|| not_found(id))?;
        record.content = content.into();
        Ok(record.clone())
    }

    async fn list_txt(&self) -> Result<Vec<DnsRecord>, ProviderError> {
        let mut state = self.state.lock().unwrap();
        if let Some(err) = state.fail_list.clone() {
            return Err(err);
        }
        state.lists += 1;
        Ok(state.records.clone())
    }

    async fn delete(&self, id: &RecordId) -> Result<(), ProviderError> {
        let mut state = self.state.lock().unwrap();
        if let Some(err) = state.fail_delete.clone() {
            return Err(err);
        }
        state.writes += 1;
        let before = state.records.len();
        state.records.retain(|r| &r.id != id);
        if state.records.len() == before {
            return Err(not_found(id));
        }
        Ok(())
    }
}

// ── FlakyStore ──────────────────────────────────────────────────────

/// Memory store whose record-id writes can be made to fail.
#[derive(Default)]
pub struct FlakyStore {
    inner: MemoryProfileStore,
    fail_record_id_writes: AtomicBool,
}

impl FlakyStore {
    pub fn failing() -> Self {
        let store = Self::default();
        store.fail_record_id_writes.store(true, Ordering::SeqCst);
        store
    }
}

impl ProfileStore for FlakyStore {
    async fn get(&self, user: &UserId) -> Result<UserProfile, StoreError> {
        self.inner.get(user).await
    }

    async fn find_by_alias(&self, alias: &Alias) -> Result<Option<UserProfile>, StoreError> {
        self.inner.find_by_alias(alias).await
    }

    async fn list(&self) -> Result<Vec<UserProfile>, StoreError> {
        self.inner.list().await
    }

    async fn insert(&self, profile: UserProfile) -> Result<(), StoreError> {
        self.inner.insert(profile).await
    }

    async fn remove(&self, user: &UserId) -> Result<UserProfile, StoreError> {
        self.inner.remove(user).await
    }

    async fn set_record_id(
        &self,
        user: &UserId,
        record_id: Option<&RecordId>,
    ) -> Result<(), StoreError> {
        if self.fail_record_id_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Backend("disk full".into()));
        }
        self.inner.set_record_id(user, record_id).await
    }

    async fn set_forward_to(
        &self,
        user: &UserId,
        target: Option<&ForwardTarget>,
    ) -> Result<(), StoreError> {
        self.inner.set_forward_to(user, target).await
    }
}
