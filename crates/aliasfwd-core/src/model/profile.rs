use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::identity::{Alias, ForwardTarget, UserId};
use super::record::RecordId;

/// Local view of an alias owner.
///
/// `dns_record_id` is a cache, not a source of truth: it may point at a
/// record that no longer exists. `forward_to` is what the user last saved
/// and is shown back to them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub user_id: UserId,
    pub alias: Alias,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub forward_to: Option<ForwardTarget>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dns_record_id: Option<RecordId>,
    pub created_at: DateTime<Utc>,
}

impl UserProfile {
    pub fn new(user_id: UserId, alias: Alias, forward_to: Option<ForwardTarget>) -> Self {
        Self {
            user_id,
            alias,
            forward_to,
            dns_record_id: None,
            created_at: Utc::now(),
        }
    }

    pub fn is_forwarding(&self) -> bool {
        self.forward_to.is_some()
    }
}
