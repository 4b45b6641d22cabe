// ── Core identity types ──
//
// Alias, ForwardTarget and UserId are the inputs every operation takes.
// Parsing is the only validation point: malformed input is rejected here,
// before anything reaches the DNS provider or the profile store.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// RFC 5321 local-part limit.
const MAX_ALIAS_LEN: usize = 64;
/// RFC 5321 path limit.
const MAX_ADDRESS_LEN: usize = 254;

// ── Alias ───────────────────────────────────────────────────────────

/// Mailbox handle at the apex domain, normalized to lowercase.
///
/// Only `[a-z0-9._+-]`, starting and ending with a letter or digit. `:` and
/// `=` can never appear, which keeps `forward-email=<alias>:` unambiguous.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Alias(String);

impl Alias {
    pub fn parse(raw: &str) -> Result<Self, CoreError> {
        let alias = raw.trim().to_ascii_lowercase();

        if alias.is_empty() {
            return Err(invalid("alias", "must not be empty"));
        }
        if alias.len() > MAX_ALIAS_LEN {
            return Err(invalid(
                "alias",
                format!("must be at most {MAX_ALIAS_LEN} characters"),
            ));
        }
        if let Some(bad) = alias
            .chars()
            .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_' | '+')))
        {
            return Err(invalid("alias", format!("contains invalid character {bad:?}")));
        }
        let edge_ok = |c: Option<char>| c.is_some_and(|c| c.is_ascii_alphanumeric());
        if !edge_ok(alias.chars().next()) || !edge_ok(alias.chars().last()) {
            return Err(invalid("alias", "must start and end with a letter or digit"));
        }

        Ok(Self(alias))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Full mailbox address at the apex domain.
    pub fn address(&self, apex_domain: &str) -> String {
        format!("{}@{apex_domain}", self.0)
    }
}

impl fmt::Display for Alias {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Alias {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Alias {
    type Error = CoreError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(&s)
    }
}

impl From<Alias> for String {
    fn from(a: Alias) -> Self {
        a.0
    }
}

// ── ForwardTarget ───────────────────────────────────────────────────

/// External address that mail for an alias is re-sent to.
///
/// Only a plausibility check: one `@`, a dotted domain, nothing that would
/// break the TXT encoding (whitespace, `:`, `,`, `;`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ForwardTarget(String);

impl ForwardTarget {
    pub fn parse(raw: &str) -> Result<Self, CoreError> {
        let addr = raw.trim();

        if addr.is_empty() {
            return Err(invalid("forward_to", "must not be empty"));
        }
        if addr.len() > MAX_ADDRESS_LEN {
            return Err(invalid(
                "forward_to",
                format!("must be at most {MAX_ADDRESS_LEN} characters"),
            ));
        }
        if addr
            .chars()
            .any(|c| c.is_whitespace() || c.is_control() || matches!(c, ':' | ',' | ';'))
        {
            return Err(invalid(
                "forward_to",
                "must not contain whitespace, ':', ',' or ';'",
            ));
        }

        let Some((local, domain)) = addr.split_once('@') else {
            return Err(invalid("forward_to", "must be an email address"));
        };
        if local.is_empty() || domain.contains('@') {
            return Err(invalid("forward_to", "must contain exactly one '@'"));
        }
        if !domain.contains('.') || domain.split('.').any(str::is_empty) {
            return Err(invalid("forward_to", format!("invalid domain '{domain}'")));
        }

        Ok(Self(addr.to_owned()))
    }

    /// Parse caller input where empty means "no forwarding".
    pub fn parse_optional(raw: Option<&str>) -> Result<Option<Self>, CoreError> {
        match raw.map(str::trim) {
            None | Some("") => Ok(None),
            Some(addr) => Self::parse(addr).map(Some),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ForwardTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for ForwardTarget {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for ForwardTarget {
    type Error = CoreError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(&s)
    }
}

impl From<ForwardTarget> for String {
    fn from(t: ForwardTarget) -> Self {
        t.0
    }
}

// ── UserId ──────────────────────────────────────────────────────────

/// Opaque identifier of the account that owns an alias.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserId(String);

impl UserId {
    pub fn parse(raw: &str) -> Result<Self, CoreError> {
        let id = raw.trim();
        if id.is_empty() {
            return Err(invalid("user_id", "must not be empty"));
        }
        Ok(Self(id.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for UserId {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for UserId {
    type Error = CoreError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(&s)
    }
}

impl From<UserId> for String {
    fn from(u: UserId) -> Self {
        u.0
    }
}

fn invalid(field: &str, reason: impl Into<String>) -> CoreError {
    CoreError::Validation {
        field: field.into(),
        reason: reason.into(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn alias_is_normalized() {
        let alias = Alias::parse("  Alice.Smith ").unwrap();
        assert_eq!(alias.as_str(), "alice.smith");
        assert_eq!(alias.address("example.com"), "alice.smith@example.com");
    }

    #[test]
    fn alias_rejects_encoding_breakers() {
        for raw in ["", "  ", "bob:x", "a=b", "with space", ".dot", "dash-", "ünï"] {
            assert!(
                matches!(Alias::parse(raw), Err(CoreError::Validation { .. })),
                "expected {raw:?} to be rejected"
            );
        }
    }

    #[test]
    fn alias_length_limit() {
        assert!(Alias::parse(&"a".repeat(64)).is_ok());
        assert!(Alias::parse(&"a".repeat(65)).is_err());
    }

    #[test]
    fn target_accepts_plausible_addresses() {
        for raw in ["alice@external.com", "a.b+tag@mail.example.co.uk"] {
            assert_eq!(ForwardTarget::parse(raw).unwrap().as_str(), raw);
        }
    }

    #[test]
    fn target_rejects_implausible_addresses() {
        for raw in [
            "nobody",
            "@example.com",
            "a@b@c.com",
            "a@localhost",
            "a@example..com",
            "a b@example.com",
            "a@example.com,b@example.com",
            "a:b@example.com",
        ] {
            assert!(ForwardTarget::parse(raw).is_err(), "expected {raw:?} to be rejected");
        }
    }

    #[test]
    fn empty_optional_target_means_no_forwarding() {
        assert_eq!(ForwardTarget::parse_optional(None).unwrap(), None);
        assert_eq!(ForwardTarget::parse_optional(Some("   ")).unwrap(), None);
        assert!(ForwardTarget::parse_optional(Some("x@y.com")).unwrap().is_some());
    }

    #[test]
    fn deserialization_validates() {
        let ok: Alias = serde_json::from_str("\"Bob\"").unwrap();
        assert_eq!(ok.as_str(), "bob");
        assert!(serde_json::from_str::<Alias>("\"bo:b\"").is_err());
        assert!(serde_json::from_str::<UserId>("\"\"").is_err());
    }
}
