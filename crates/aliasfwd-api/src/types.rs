//! Wire types for the Cloudflare v4 DNS records API.
//!
//! Every response is wrapped in the `{success, errors, messages, result}`
//! envelope; list endpoints add `result_info` for pagination.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ── Envelope ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
pub struct Envelope<T> {
    pub success: bool,
    #[serde(default)]
    pub errors: Vec<ApiMessage>,
    #[serde(default)]
    pub messages: Vec<ApiMessage>,
    pub result: Option<T>,
    pub result_info: Option<ResultInfo>,
}

/// One entry of the `errors` / `messages` arrays.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiMessage {
    #[serde(default)]
    pub code: Option<u32>,
    pub message: String,
}

/// Pagination info returned by list endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultInfo {
    pub page: u32,
    pub per_page: u32,
    #[serde(default)]
    pub count: u32,
    #[serde(default)]
    pub total_count: u32,
    #[serde(default)]
    pub total_pages: Option<u32>,
}

impl ResultInfo {
    /// Whether another page follows this one.
    pub fn has_more(&self) -> bool {
        match self.total_pages {
            Some(total) => self.page < total,
            None => self.count >= self.per_page && self.count > 0,
        }
    }
}

/// A page of list results, envelope stripped.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub info: Option<ResultInfo>,
}

// ── DNS records ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RecordType {
    Txt,
    A,
    Aaaa,
    Cname,
    Mx,
    #[serde(other)]
    Other,
}

/// DNS record, from `GET /zones/{zone}/dns_records` and the write endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DnsRecordResponse {
    pub id: String,
    #[serde(rename = "type")]
    pub record_type: RecordType,
    pub name: String,
    pub content: String,
    #[serde(default)]
    pub ttl: Option<u32>,
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(default)]
    pub created_on: Option<DateTime<Utc>>,
    #[serde(default)]
    pub modified_on: Option<DateTime<Utc>>,
}

/// Body for record create and full replace.
#[derive(Debug, Clone, Serialize)]
pub struct TxtRecordBody<'a> {
    #[serde(rename = "type")]
    pub record_type: RecordType,
    pub name: &'a str,
    pub content: &'a str,
    /// `1` means "automatic" on Cloudflare.
    pub ttl: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<&'a str>,
}

/// Result of a delete: Cloudflare echoes back only the id.
#[derive(Debug, Clone, Deserialize)]
pub struct DeletedRecord {
    pub id: String,
}
