// ── Domain model ──
//
// Identity types validate on construction and on deserialization, so a
// value that exists is always well-formed.

pub mod identity;
pub mod profile;
pub mod record;

pub use identity::{Alias, ForwardTarget, UserId};
pub use profile::UserProfile;
pub use record::{DnsRecord, ForwardingEntry, ForwardingRecord, RecordId};
