// ── DNS forwarding records ──
//
// The TXT encoding is the only wire format this crate owns:
//
//     forward-email=<alias>:<target-or-empty>
//
// `forward-email=<alias>:` is the lookup key. The trailing colon keeps
// `bob` from matching `bobby`'s record.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::identity::{Alias, ForwardTarget};

pub const FORWARD_EMAIL_PREFIX: &str = "forward-email=";

// ── RecordId ────────────────────────────────────────────────────────

/// Provider-assigned opaque record identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(String);

impl RecordId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for RecordId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for RecordId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

// ── DnsRecord ───────────────────────────────────────────────────────

/// A TXT record as the provider reports it. The provider is authoritative.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DnsRecord {
    pub id: RecordId,
    pub name: String,
    pub content: String,
    pub modified_on: Option<DateTime<Utc>>,
}

impl DnsRecord {
    /// Whether this record carries the forwarding key for `alias`.
    pub fn matches_alias(&self, alias: &Alias) -> bool {
        self.content.contains(&ForwardingEntry::lookup_key(alias))
    }
}

// ── ForwardingEntry ─────────────────────────────────────────────────

/// Forwarding configuration of one alias, as encoded in TXT content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForwardingEntry<'a> {
    pub alias: &'a Alias,
    pub target: Option<&'a ForwardTarget>,
}

impl<'a> ForwardingEntry<'a> {
    pub fn new(alias: &'a Alias, target: Option<&'a ForwardTarget>) -> Self {
        Self { alias, target }
    }

    /// `forward-email=<alias>:` for `alias`.
    pub fn lookup_key(alias: &Alias) -> String {
        format!("{FORWARD_EMAIL_PREFIX}{alias}:")
    }

    /// Full TXT content. Deterministic in its inputs.
    pub fn to_txt_content(&self) -> String {
        format!(
            "{}{}",
            Self::lookup_key(self.alias),
            self.target.map(ForwardTarget::as_str).unwrap_or_default()
        )
    }
}

// ── ForwardingRecord ────────────────────────────────────────────────

/// A provider record decoded back into alias and target.
///
/// `target` stays a raw string: records written by hand may hold values
/// this crate would not accept as input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ForwardingRecord {
    pub record_id: RecordId,
    pub alias: String,
    pub target: Option<String>,
    pub modified_on: Option<DateTime<Utc>>,
}

impl ForwardingRecord {
    /// Decode a record, tolerating the quoted form some providers return.
    /// Returns `None` for TXT records that are not forwarding records.
    pub fn decode(record: &DnsRecord) -> Option<Self> {
        let content = record.content.trim();
        let content = content
            .strip_prefix('"')
            .and_then(|c| c.strip_suffix('"'))
            .unwrap_or(content);

        let rest = content.strip_prefix(FORWARD_EMAIL_PREFIX)?;
        let (alias, target) = rest.split_once(':')?;
        if alias.is_empty() {
            return None;
        }

        Some(Self {
            record_id: record.id.clone(),
            alias: alias.to_owned(),
            target: (!target.is_empty()).then(|| target.to_owned()),
            modified_on: record.modified_on,
        })
    }

    /// Decode `record` as `alias`'s forwarding record wherever the lookup
    /// key sits in the content, the same rule `DnsRecord::matches_alias`
    /// applies. The target runs to the next whitespace or closing quote.
    pub fn decode_for(record: &DnsRecord, alias: &Alias) -> Option<Self> {
        let key = ForwardingEntry::lookup_key(alias);
        let (_, rest) = record.content.split_once(&key)?;
        let target = rest
            .split(|c: char| c.is_whitespace() || c == '"')
            .next()
            .filter(|t| !t.is_empty());

        Some(Self {
            record_id: record.id.clone(),
            alias: alias.to_string(),
            target: target.map(str::to_owned),
            modified_on: record.modified_on,
        })
    }
}
