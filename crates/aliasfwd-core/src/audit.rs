// ── Drift audit ──
//
// Read-only comparison of the profile store against one listing of the
// apex TXT records. Nothing is repaired here.

use std::collections::{BTreeMap, HashSet};

use serde::Serialize;
use tracing::info;

use crate::error::CoreError;
use crate::model::{ForwardingRecord, RecordId};
use crate::provider::DnsProvider;
use crate::reconciler::Reconciler;
use crate::store::ProfileStore;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, strum::IntoStaticStr)]
#[serde(tag = "kind", rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum AuditFinding {
    /// A profile whose alias has no forwarding record.
    MissingRecord { user: String, alias: String },

    /// The cached id is not one of the alias's records.
    StaleCache {
        user: String,
        alias: String,
        cached: RecordId,
        actual: RecordId,
    },

    /// A record exists but the profile has no cached id.
    Uncached {
        user: String,
        alias: String,
        record_id: RecordId,
    },

    DuplicateRecords {
        alias: String,
        record_ids: Vec<RecordId>,
    },

    /// Local `forward_to` disagrees with the provider content.
    TargetDrift {
        user: String,
        alias: String,
        local: Option<String>,
        provider: Option<String>,
    },

    /// A forwarding record for an alias nobody holds.
    Orphan { alias: String, record_id: RecordId },
}

impl AuditFinding {
    pub fn kind(&self) -> &'static str {
        self.into()
    }

    pub fn alias(&self) -> &str {
        match self {
            Self::MissingRecord { alias, .. }
            | Self::StaleCache { alias, .. }
            | Self::Uncached { alias, .. }
            | Self::DuplicateRecords { alias, .. }
            | Self::TargetDrift { alias, .. }
            | Self::Orphan { alias, .. } => alias,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuditReport {
    pub profiles_checked: usize,
    pub records_scanned: usize,
    pub findings: Vec<AuditFinding>,
}

impl AuditReport {
    pub fn is_clean(&self) -> bool {
        self.findings.is_empty()
    }
}

impl<P: DnsProvider, S: ProfileStore> Reconciler<P, S> {
    /// Compare every profile with the provider's forwarding records.
    pub async fn audit(&self) -> Result<AuditReport, CoreError> {
        let profiles = self.store().list().await?;
        let records = self.provider().list_txt().await?;
        let records_scanned = records.len();

        let mut claimed: HashSet<RecordId> = HashSet::new();
        let mut findings = Vec::new();
        for profile in &profiles {
            let user = profile.user_id.to_string();
            let alias = profile.alias.to_string();

            // Same matching rule as resolve, so records with a leading
            // token still count.
            let recs: Vec<ForwardingRecord> = records
                .iter()
                .filter_map(|rec| ForwardingRecord::decode_for(rec, &profile.alias))
                .collect();
            claimed.extend(recs.iter().map(|r| r.record_id.clone()));
            let Some(first) = recs.first() else {
                findings.push(AuditFinding::MissingRecord { user, alias });
                continue;
            };

            if recs.len() > 1 {
                findings.push(AuditFinding::DuplicateRecords {
                    alias: alias.clone(),
                    record_ids: recs.iter().map(|r| r.record_id.clone()).collect(),
                });
            }

            match &profile.dns_record_id {
                None => findings.push(AuditFinding::Uncached {
                    user: user.clone(),
                    alias: alias.clone(),
                    record_id: first.record_id.clone(),
                }),
                Some(cached) if !recs.iter().any(|r| &r.record_id == cached) => {
                    findings.push(AuditFinding::StaleCache {
                        user: user.clone(),
                        alias: alias.clone(),
                        cached: cached.clone(),
                        actual: first.record_id.clone(),
                    });
                }
                Some(_) => {}
            }

            let local = profile.forward_to.as_ref().map(|t| t.to_string());
            if local != first.target {
                findings.push(AuditFinding::TargetDrift {
                    user,
                    alias,
                    local,
                    provider: first.target.clone(),
                });
            }
        }

        let mut orphans: BTreeMap<String, Vec<RecordId>> = BTreeMap::new();
        for rec in records
            .iter()
            .filter(|rec| !claimed.contains(&rec.id))
            .filter_map(ForwardingRecord::decode)
        {
            orphans.entry(rec.alias).or_default().push(rec.record_id);
        }
        for (alias, record_ids) in orphans {
            for record_id in record_ids {
                findings.push(AuditFinding::Orphan {
                    alias: alias.clone(),
                    record_id,
                });
            }
        }

        info!(
            profiles = profiles.len(),
            records_scanned,
            findings = findings.len(),
            "audit complete"
        );
        Ok(AuditReport {
            profiles_checked: profiles.len(),
            records_scanned,
            findings,
        })
    }
}
