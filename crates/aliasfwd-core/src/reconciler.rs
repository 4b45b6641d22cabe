// ── Forwarding reconciler ──
//
// Keeps a profile store and the DNS provider's TXT records in step. The
// provider is authoritative: the cached record id on a profile is only a
// hint, repaired by a listing scan whenever it is missing or stale.

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::cache::RecordIdCache;
use crate::error::CoreError;
use crate::model::{
    Alias, DnsRecord, ForwardTarget, ForwardingEntry, ForwardingRecord, RecordId, UserId,
    UserProfile,
};
use crate::outcome::{Outcome, Warning};
use crate::provider::DnsProvider;
use crate::store::ProfileStore;

// ── Result types ────────────────────────────────────────────────────

/// Where a resolved record id came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, strum::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ResolutionSource {
    /// Trusted from the profile without asking the provider.
    Cache,
    /// Found by the listing scan.
    Scan,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Resolution {
    pub record_id: RecordId,
    pub source: ResolutionSource,
}

/// Every apex TXT record carrying the alias key, in provider order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanResult {
    pub alias: Alias,
    pub matches: Vec<DnsRecord>,
    pub records_scanned: usize,
}

impl ScanResult {
    /// The authoritative match: the first one the provider listed.
    pub fn first(&self) -> Option<&DnsRecord> {
        self.matches.first()
    }

    /// Warn when more than one record carries the alias key.
    pub fn duplicates(&self) -> Option<Warning> {
        let (used, rest) = self.matches.split_first()?;
        if rest.is_empty() {
            return None;
        }
        Some(Warning::DuplicateRecords {
            alias: self.alias.to_string(),
            used: used.id.clone(),
            ignored: rest.iter().map(|r| r.id.clone()).collect(),
        })
    }
}

/// An applied forwarding update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ForwardingChange {
    pub record_id: RecordId,
    pub alias: Alias,
    pub forward_to: Option<ForwardTarget>,
    /// TXT content now held by the provider.
    pub content: String,
    pub message: String,
}

impl ForwardingChange {
    fn new(record_id: RecordId, alias: Alias, forward_to: Option<ForwardTarget>, content: String) -> Self {
        let message = match &forward_to {
            Some(target) => format!("Email forwarding enabled to {target}"),
            None => "Email forwarding removed".to_owned(),
        };
        Self {
            record_id,
            alias,
            forward_to,
            content,
            message,
        }
    }

    pub fn is_forwarding(&self) -> bool {
        self.forward_to.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Provisioned {
    pub user_id: UserId,
    pub alias: Alias,
    /// `<alias>@<apex>`
    pub address: String,
    pub forward_to: Option<ForwardTarget>,
    pub record: DnsRecord,
}

/// Local view of one user's alias. Never touches the provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AliasStatus {
    pub user_id: UserId,
    pub alias: Alias,
    pub address: String,
    pub forward_to: Option<ForwardTarget>,
    pub dns_record_id: Option<RecordId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Deprovisioned {
    pub user_id: UserId,
    pub alias: Alias,
    /// The record that was targeted for deletion, if one was located.
    pub dns_record_id: Option<RecordId>,
    pub dns_deleted: bool,
}

// ── Reconciler ──────────────────────────────────────────────────────

/// Creates, locates, updates and deletes forwarding records for one apex.
pub struct Reconciler<P, S> {
    provider: P,
    store: S,
    apex_domain: String,
}

impl<P: DnsProvider, S: ProfileStore> Reconciler<P, S> {
    pub fn new(provider: P, store: S, apex_domain: impl Into<String>) -> Self {
        Self {
            provider,
            store,
            apex_domain: apex_domain.into(),
        }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn apex_domain(&self) -> &str {
        &self.apex_domain
    }

    fn cache(&self) -> RecordIdCache<'_, S> {
        RecordIdCache::new(&self.store)
    }

    // ── Primitives ───────────────────────────────────────────────────

    /// Submit a new TXT record for `alias`. One provider call, no retry.
    pub async fn create(
        &self,
        alias: &Alias,
        forward_to: Option<&ForwardTarget>,
    ) -> Result<DnsRecord, CoreError> {
        let content = ForwardingEntry::new(alias, forward_to).to_txt_content();
        let record = self.provider.create_txt(&content).await?;
        info!(alias = %alias, record_id = %record.id, "forwarding record created");
        Ok(record)
    }

    /// Replace the content of `record_id`. Idempotent.
    ///
    /// A provider not-found becomes [`CoreError::RecordNotFound`].
    pub async fn update(
        &self,
        record_id: &RecordId,
        alias: &Alias,
        forward_to: Option<&ForwardTarget>,
    ) -> Result<ForwardingChange, CoreError> {
        let content = ForwardingEntry::new(alias, forward_to).to_txt_content();
        match self.provider.replace_txt(record_id, &content).await {
            Ok(record) => {
                info!(alias = %alias, record_id = %record.id, forwarding = forward_to.is_some(), "forwarding record updated");
                Ok(ForwardingChange::new(
                    record.id,
                    alias.clone(),
                    forward_to.cloned(),
                    content,
                ))
            }
            Err(e) if e.is_not_found() => {
                debug!(alias = %alias, record_id = %record_id, "provider reports record missing");
                Err(CoreError::RecordNotFound {
                    alias: alias.to_string(),
                })
            }
            Err(e) => Err(e.into()),
        }
    }

    /// List every apex TXT record and keep those carrying the alias key.
    pub async fn scan(&self, alias: &Alias) -> Result<ScanResult, CoreError> {
        let records = self.provider.list_txt().await?;
        let records_scanned = records.len();
        let matches: Vec<DnsRecord> = records
            .into_iter()
            .filter(|r| r.matches_alias(alias))
            .collect();
        debug!(alias = %alias, records_scanned, matches = matches.len(), "listing scan");
        Ok(ScanResult {
            alias: alias.clone(),
            matches,
            records_scanned,
        })
    }

    /// Find the record id for `alias`.
    ///
    /// A non-blank `cached_id` is returned as-is. Otherwise the listing scan
    /// runs and the first match wins; the hit is written back to the
    /// user's profile (best-effort). No match is [`CoreError::RecordNotFound`].
    pub async fn resolve(
        &self,
        user: &UserId,
        alias: &Alias,
        cached_id: Option<&RecordId>,
    ) -> Result<Outcome<Resolution>, CoreError> {
        if let Some(id) = cached_id.filter(|id| !id.as_str().trim().is_empty()) {
            debug!(alias = %alias, record_id = %id, "trusting cached record id");
            return Ok(Outcome::new(Resolution {
                record_id: id.clone(),
                source: ResolutionSource::Cache,
            }));
        }

        let scan = self.scan(alias).await?;
        let Some(first) = scan.first() else {
            return Err(CoreError::RecordNotFound {
                alias: alias.to_string(),
            });
        };

        let mut outcome = Outcome::new(Resolution {
            record_id: first.id.clone(),
            source: ResolutionSource::Scan,
        });
        if let Some(dup) = scan.duplicates() {
            warn!(alias = %alias, "{dup}");
            outcome.note(Some(dup));
        }
        outcome.note(self.cache().refresh(user, &first.id).await);
        Ok(outcome)
    }

    // ── Caller-level flows ───────────────────────────────────────────

    /// Give `user` the alias and create its forwarding record.
    ///
    /// The alias must be free both locally and at the provider.
    pub async fn provision(
        &self,
        user: UserId,
        alias: Alias,
        forward_to: Option<ForwardTarget>,
    ) -> Result<Outcome<Provisioned>, CoreError> {
        if let Some(owner) = self.store.find_by_alias(&alias).await? {
            return Err(CoreError::AliasTaken {
                alias: alias.to_string(),
                owner: owner.user_id.to_string(),
            });
        }
        if let Some(existing) = self.scan(&alias).await?.first() {
            return Err(CoreError::RecordExists {
                alias: alias.to_string(),
                record_id: existing.id.to_string(),
            });
        }

        self.store
            .insert(UserProfile::new(user.clone(), alias.clone(), forward_to.clone()))
            .await?;

        let record = match self.create(&alias, forward_to.as_ref()).await {
            Ok(record) => record,
            Err(e) => {
                if let Err(rollback) = self.store.remove(&user).await {
                    warn!(user = %user, error = %rollback, "could not roll back profile after failed record creation");
                }
                return Err(e);
            }
        };

        let mut outcome = Outcome::new(Provisioned {
            address: alias.address(&self.apex_domain),
            user_id: user.clone(),
            alias,
            forward_to,
            record,
        });
        let cached = self.cache().refresh(&user, &outcome.value.record.id).await;
        outcome.note(cached);
        Ok(outcome)
    }

    /// Point the user's alias at `forward_to`, or stop forwarding.
    ///
    /// A cached id the provider no longer knows is dropped and the update
    /// is retried once against the scanned id.
    pub async fn set_forwarding(
        &self,
        user: &UserId,
        forward_to: Option<ForwardTarget>,
    ) -> Result<Outcome<ForwardingChange>, CoreError> {
        let cache = self.cache();
        let entry = cache.get(user).await?;
        let alias = &entry.alias;

        let (resolution, mut warnings) = self
            .resolve(user, alias, cache.trust(&entry))
            .await?
            .into_parts();

        let change = match self
            .update(&resolution.record_id, alias, forward_to.as_ref())
            .await
        {
            Ok(change) => change,
            Err(e) if e.is_not_found() && resolution.source == ResolutionSource::Cache => {
                let stale = Warning::StaleCache {
                    alias: alias.to_string(),
                    record_id: resolution.record_id.clone(),
                };
                warn!(user = %user, "{stale}");
                warnings.push(stale);
                warnings.extend(cache.invalidate(user).await);

                let (rescanned, more) = self.resolve(user, alias, None).await?.into_parts();
                warnings.extend(more);
                self.update(&rescanned.record_id, alias, forward_to.as_ref())
                    .await?
            }
            Err(e) => return Err(e),
        };

        self.store.set_forward_to(user, forward_to.as_ref()).await?;
        Ok(Outcome::with_warnings(change, warnings))
    }

    pub async fn status(&self, user: &UserId) -> Result<AliasStatus, CoreError> {
        let profile = self.store.get(user).await?;
        Ok(AliasStatus {
            address: profile.alias.address(&self.apex_domain),
            user_id: profile.user_id,
            alias: profile.alias,
            forward_to: profile.forward_to,
            dns_record_id: profile.dns_record_id,
        })
    }

    /// Remove the user and delete their forwarding record.
    ///
    /// DNS problems are warnings: the profile is removed regardless.
    pub async fn deprovision(&self, user: &UserId) -> Result<Outcome<Deprovisioned>, CoreError> {
        let cache = self.cache();
        let entry = cache.get(user).await?;
        let alias = entry.alias.clone();
        let mut warnings = Vec::new();

        let (dns_record_id, dns_deleted) = match cache.trust(&entry) {
            Some(id) => match self.provider.delete(id).await {
                Ok(()) => (Some(id.clone()), true),
                Err(e) if e.is_not_found() => {
                    debug!(alias = %alias, record_id = %id, "cached record already gone; rescanning");
                    self.delete_scanned(&alias, &mut warnings).await
                }
                Err(e) => {
                    warnings.push(cleanup_failed(&alias, &e.to_string()));
                    (Some(id.clone()), false)
                }
            },
            None => self.delete_scanned(&alias, &mut warnings).await,
        };

        let profile = self.store.remove(user).await?;
        info!(user = %user, alias = %profile.alias, dns_deleted, "alias deprovisioned");

        Ok(Outcome::with_warnings(
            Deprovisioned {
                user_id: profile.user_id,
                alias: profile.alias,
                dns_record_id,
                dns_deleted,
            },
            warnings,
        ))
    }

    async fn delete_scanned(
        &self,
        alias: &Alias,
        warnings: &mut Vec<Warning>,
    ) -> (Option<RecordId>, bool) {
        let scan = match self.scan(alias).await {
            Ok(scan) => scan,
            Err(e) => {
                warnings.push(cleanup_failed(alias, &e.to_string()));
                return (None, false);
            }
        };
        let Some(first) = scan.first() else {
            let gone = Warning::RecordAlreadyGone {
                alias: alias.to_string(),
            };
            warn!("{gone}");
            warnings.push(gone);
            return (None, false);
        };
        warnings.extend(scan.duplicates());

        match self.provider.delete(&first.id).await {
            Ok(()) => (Some(first.id.clone()), true),
            Err(e) => {
                warnings.push(cleanup_failed(alias, &e.to_string()));
                (Some(first.id.clone()), false)
            }
        }
    }

    /// Every forwarding record at the apex, decoded.
    pub async fn list_forwarding_records(&self) -> Result<Vec<ForwardingRecord>, CoreError> {
        let records = self.provider.list_txt().await?;
        Ok(records.iter().filter_map(ForwardingRecord::decode).collect())
    }

    pub async fn list_profiles(&self) -> Result<Vec<UserProfile>, CoreError> {
        Ok(self.store.list().await?)
    }
}

fn cleanup_failed(alias: &Alias, reason: &str) -> Warning {
    let w = Warning::DnsCleanup {
        alias: alias.to_string(),
        reason: reason.to_owned(),
    };
    warn!("{w}");
    w
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn record(id: &str, content: &str) -> DnsRecord {
        DnsRecord {
            id: RecordId::from(id),
            name: "example.com".into(),
            content: content.into(),
            modified_on: None,
        }
    }

    #[test]
    fn change_messages() {
        let alias = Alias::parse("alice").unwrap();
        let on = ForwardingChange::new(
            "rec_1".into(),
            alias.clone(),
            Some(ForwardTarget::parse("alice@external.com").unwrap()),
            "forward-email=alice:alice@external.com".into(),
        );
        assert_eq!(on.message, "Email forwarding enabled to alice@external.com");

        let off = ForwardingChange::new("rec_1".into(), alias, None, "forward-email=alice:".into());
        assert_eq!(off.message, "Email forwarding removed");
        assert!(!off.is_forwarding());
    }

    #[test]
    fn duplicates_warning_lists_ignored_ids() {
        let scan = ScanResult {
            alias: Alias::parse("alice").unwrap(),
            matches: vec![
                record("rec_1", "forward-email=alice:"),
                record("rec_2", "forward-email=alice:a@b.com"),
            ],
            records_scanned: 5,
        };
        assert_eq!(scan.first().unwrap().id.as_str(), "rec_1");
        assert_eq!(
            scan.duplicates(),
            Some(Warning::DuplicateRecords {
                alias: "alice".into(),
                used: "rec_1".into(),
                ignored: vec!["rec_2".into()],
            })
        );
    }

    #[test]
    fn single_match_has_no_duplicates() {
        let scan = ScanResult {
            alias: Alias::parse("alice").unwrap(),
            matches: vec![record("rec_1", "forward-email=alice:")],
            records_scanned: 1,
        };
        assert!(scan.duplicates().is_none());
    }
}
