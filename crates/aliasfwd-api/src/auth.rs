use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use secrecy::{ExposeSecret, SecretString};

use crate::error::Error;

/// Which authentication strategy a set of credentials uses.
///
/// Marker enum (no data) -- the actual secrets live in [`Credentials`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthStrategy {
    /// Scoped API token sent as `Authorization: Bearer`.
    ApiToken,
    /// Account-wide global key sent as `X-Auth-Email` + `X-Auth-Key`.
    GlobalKey,
}

/// Credentials for the DNS provider API.
///
/// Each variant carries the secret material needed for its auth flow.
#[derive(Debug, Clone)]
pub enum Credentials {
    /// Scoped token with `Zone.DNS:Edit` on the apex zone (preferred).
    ApiToken { token: SecretString },

    /// Legacy global API key. Grants full account access.
    GlobalKey { email: String, key: SecretString },
}

impl Credentials {
    pub fn strategy(&self) -> AuthStrategy {
        match self {
            Self::ApiToken { .. } => AuthStrategy::ApiToken,
            Self::GlobalKey { .. } => AuthStrategy::GlobalKey,
        }
    }

    /// Render the credentials as default request headers.
    ///
    /// Secret header values are marked sensitive so they never show up
    /// in debug output.
    pub fn headers(&self) -> Result<HeaderMap, Error> {
        let mut headers = HeaderMap::new();
        match self {
            Self::ApiToken { token } => {
                let value = format!("Bearer {}", token.expose_secret());
                headers.insert(reqwest::header::AUTHORIZATION, sensitive(&value)?);
            }
            Self::GlobalKey { email, key } => {
                let email = HeaderValue::from_str(email).map_err(|e| Error::Authentication {
                    message: format!("invalid account email header value: {e}"),
                })?;
                headers.insert(HeaderName::from_static("x-auth-email"), email);
                headers.insert(
                    HeaderName::from_static("x-auth-key"),
                    sensitive(key.expose_secret())?,
                );
            }
        }
        Ok(headers)
    }
}

fn sensitive(raw: &str) -> Result<HeaderValue, Error> {
    let mut value = HeaderValue::from_str(raw).map_err(|e| Error::Authentication {
        message: format!("invalid credential header value: {e}"),
    })?;
    value.set_sensitive(true);
    Ok(value)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn token_becomes_bearer_header() {
        let creds = Credentials::ApiToken {
            token: SecretString::from("tok-123".to_string()),
        };
        let headers = creds.headers().unwrap();
        let auth = headers.get(reqwest::header::AUTHORIZATION).unwrap();
        assert_eq!(auth.to_str().unwrap(), "Bearer tok-123");
        assert!(auth.is_sensitive());
        assert_eq!(creds.strategy(), AuthStrategy::ApiToken);
    }

    #[test]
    fn global_key_sets_both_headers() {
        let creds = Credentials::GlobalKey {
            email: "ops@example.com".into(),
            key: SecretString::from("k".to_string()),
        };
        let headers = creds.headers().unwrap();
        assert_eq!(headers.get("x-auth-email").unwrap(), "ops@example.com");
        assert!(headers.get("x-auth-key").unwrap().is_sensitive());
    }

    #[test]
    fn newline_in_token_is_rejected() {
        let creds = Credentials::ApiToken {
            token: SecretString::from("bad\ntoken".to_string()),
        };
        assert!(matches!(
            creds.headers(),
            Err(Error::Authentication { .. })
        ));
    }
}
