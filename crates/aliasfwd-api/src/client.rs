// Async HTTP client for the Cloudflare v4 DNS records API.
//
// Base path: /client/v4/
// Auth: Bearer token or X-Auth-Email/X-Auth-Key, injected as default headers.

use std::future::Future;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, trace};
use url::Url;

use crate::auth::Credentials;
use crate::error::Error;
use crate::transport::TransportConfig;
use crate::types::{
    DeletedRecord, DnsRecordResponse, Envelope, Page, RecordType, TxtRecordBody,
};

/// Public Cloudflare API endpoint.
pub const DEFAULT_BASE_URL: &str = "https://api.cloudflare.com/client/v4/";

/// Cloudflare caps `per_page` for DNS records at 5000; 100 keeps pages small.
pub const DEFAULT_PAGE_SIZE: u32 = 100;

// ── Client ───────────────────────────────────────────────────────────

/// Async client for the DNS records of a single zone.
///
/// Every method issues exactly one HTTP request, except
/// [`list_all_txt_records`](Self::list_all_txt_records) which walks
/// the pages sequentially. Nothing here retries.
pub struct DnsClient {
    http: reqwest::Client,
    base_url: Url,
    zone_id: String,
    page_size: u32,
}

impl DnsClient {
    // ── Constructors ─────────────────────────────────────────────────

    /// Build from credentials and a transport config.
    ///
    /// Auth headers become default headers on every request.
    pub fn new(
        base_url: &str,
        zone_id: impl Into<String>,
        credentials: &Credentials,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let http = transport.build_client_with_headers(credentials.headers()?)?;
        Self::from_reqwest(base_url, zone_id, http)
    }

    /// Wrap an existing `reqwest::Client` (caller manages auth headers).
    pub fn from_reqwest(
        base_url: &str,
        zone_id: impl Into<String>,
        http: reqwest::Client,
    ) -> Result<Self, Error> {
        Ok(Self {
            http,
            base_url: Self::normalize_base_url(base_url)?,
            zone_id: zone_id.into(),
            page_size: DEFAULT_PAGE_SIZE,
        })
    }

    /// Override the page size used by the listing scan.
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Ensure the base URL ends with a slash so relative joins keep `/client/v4`.
    fn normalize_base_url(raw: &str) -> Result<Url, Error> {
        let mut url = Url::parse(raw)?;
        let path = url.path().trim_end_matches('/').to_owned();
        url.set_path(&format!("{path}/"));
        Ok(url)
    }

    pub fn zone_id(&self) -> &str {
        &self.zone_id
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // ── URL builders ─────────────────────────────────────────────────

    fn records_url(&self) -> Result<Url, Error> {
        Ok(self
            .base_url
            .join(&format!("zones/{}/dns_records", self.zone_id))?)
    }

    fn record_url(&self, record_id: &str) -> Result<Url, Error> {
        let mut url = self.records_url()?;
        url.path_segments_mut()
            .map_err(|()| Error::InvalidUrl(url::ParseError::RelativeUrlWithCannotBeABaseBase))?
            .push(record_id);
        Ok(url)
    }

    // ── HTTP verbs ───────────────────────────────────────────────────

    async fn get<T: DeserializeOwned>(
        &self,
        url: Url,
        params: &[(&str, String)],
    ) -> Result<Envelope<T>, Error> {
        debug!("GET {url} params={params:?}");
        let resp = self.http.get(url).query(params).send().await?;
        self.handle_response(resp).await
    }

    async fn post<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        url: Url,
        body: &B,
    ) -> Result<Envelope<T>, Error> {
        debug!("POST {url}");
        let resp = self.http.post(url).json(body).send().await?;
        self.handle_response(resp).await
    }

    async fn put<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        url: Url,
        body: &B,
    ) -> Result<Envelope<T>, Error> {
        debug!("PUT {url}");
        let resp = self.http.put(url).json(body).send().await?;
        self.handle_response(resp).await
    }

    async fn delete<T: DeserializeOwned>(&self, url: Url) -> Result<Envelope<T>, Error> {
        debug!("DELETE {url}");
        let resp = self.http.delete(url).send().await?;
        self.handle_response(resp).await
    }

    // ── Response handling ────────────────────────────────────────────

    async fn handle_response<T: DeserializeOwned>(
        &self,
        resp: reqwest::Response,
    ) -> Result<Envelope<T>, Error> {
        let status = resp.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after_secs = resp
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse().ok())
                .unwrap_or(60);
            return Err(Error::RateLimited { retry_after_secs });
        }

        let body = resp.text().await?;
        trace!(status = status.as_u16(), len = body.len(), "provider response");

        let envelope: Option<Envelope<T>> = serde_json::from_str(&body).ok();

        if status.is_success() {
            let envelope = match envelope {
                Some(env) => env,
                None => return Err(decode_error::<Envelope<T>>(&body)),
            };
            if envelope.success {
                return Ok(envelope);
            }
            return Err(api_error(status, &envelope.errors, &body));
        }

        let errors = envelope.map(|env| env.errors).unwrap_or_default();
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN
        {
            let message = errors
                .first()
                .map_or_else(|| format!("HTTP {status}"), |e| e.message.clone());
            return Err(Error::Authentication { message });
        }

        Err(api_error(status, &errors, &body))
    }

    // ── Pagination helper ────────────────────────────────────────────

    /// Collect all pages into a single `Vec<T>`.
    pub async fn paginate_all<T, F, Fut>(&self, fetch: F) -> Result<Vec<T>, Error>
    where
        F: Fn(u32, u32) -> Fut,
        Fut: Future<Output = Result<Page<T>, Error>>,
    {
        let mut all = Vec::new();
        let mut page_no = 1;

        loop {
            let page = fetch(page_no, self.page_size).await?;
            let received = page.items.len();
            all.extend(page.items);

            let more = match page.info {
                Some(info) => info.has_more(),
                None => u32::try_from(received).unwrap_or(u32::MAX) >= self.page_size,
            };
            if !more || received == 0 {
                break;
            }
            page_no += 1;
        }

        Ok(all)
    }

    // ━━ Public API ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

    /// Create a TXT record. One write to the provider.
    pub async fn create_txt_record(
        &self,
        name: &str,
        content: &str,
        ttl: u32,
    ) -> Result<DnsRecordResponse, Error> {
        let body = TxtRecordBody {
            record_type: RecordType::Txt,
            name,
            content,
            ttl,
            comment: None,
        };
        let env = self.post(self.records_url()?, &body).await?;
        require_result(env)
    }

    /// Replace a TXT record's full contents (PUT). One write to the provider.
    pub async fn replace_txt_record(
        &self,
        record_id: &str,
        name: &str,
        content: &str,
        ttl: u32,
    ) -> Result<DnsRecordResponse, Error> {
        let body = TxtRecordBody {
            record_type: RecordType::Txt,
            name,
            content,
            ttl,
            comment: None,
        };
        let env = self.put(self.record_url(record_id)?, &body).await?;
        require_result(env)
    }

    pub async fn get_record(&self, record_id: &str) -> Result<DnsRecordResponse, Error> {
        let env = self.get(self.record_url(record_id)?, &[]).await?;
        require_result(env)
    }

    /// One page of TXT records, optionally filtered by exact record name.
    pub async fn list_txt_records(
        &self,
        name: Option<&str>,
        page: u32,
        per_page: u32,
    ) -> Result<Page<DnsRecordResponse>, Error> {
        let mut params = vec![
            ("type", "TXT".to_owned()),
            ("page", page.to_string()),
            ("per_page", per_page.to_string()),
        ];
        if let Some(name) = name {
            params.push(("name", name.to_owned()));
        }

        let env: Envelope<Vec<DnsRecordResponse>> =
            self.get(self.records_url()?, &params).await?;
        Ok(Page {
            info: env.result_info,
            items: env.result.unwrap_or_default(),
        })
    }

    /// Every TXT record (all pages), optionally filtered by record name.
    pub async fn list_all_txt_records(
        &self,
        name: Option<&str>,
    ) -> Result<Vec<DnsRecordResponse>, Error> {
        self.paginate_all(|page, per_page| self.list_txt_records(name, page, per_page))
            .await
    }

    pub async fn delete_record(&self, record_id: &str) -> Result<(), Error> {
        let env: Envelope<DeletedRecord> = self.delete(self.record_url(record_id)?).await?;
        if let Some(deleted) = env.result {
            debug!(record_id = %deleted.id, "record deleted");
        }
        Ok(())
    }
}

// ── Helpers ──────────────────────────────────────────────────────────

fn require_result<T>(env: Envelope<T>) -> Result<T, Error> {
    env.result.ok_or_else(|| Error::Deserialization {
        message: "envelope reported success but carried no result".into(),
        body: String::new(),
    })
}

fn api_error(
    status: reqwest::StatusCode,
    errors: &[crate::types::ApiMessage],
    raw: &str,
) -> Error {
    match errors.first() {
        Some(first) => Error::Api {
            status: status.as_u16(),
            code: first.code,
            message: errors
                .iter()
                .map(|e| e.message.as_str())
                .collect::<Vec<_>>()
                .join("; "),
        },
        None => Error::Api {
            status: status.as_u16(),
            code: None,
            message: if raw.is_empty() {
                status.to_string()
            } else {
                raw.chars().take(200).collect()
            },
        },
    }
}

fn decode_error<T: DeserializeOwned>(body: &str) -> Error {
    let message = match serde_json::from_str::<T>(body) {
        Ok(_) => "unexpected response shape".to_owned(),
        Err(e) => {
            let preview: String = body.chars().take(200).collect();
            format!("{e} (body preview: {preview:?})")
        }
    };
    Error::Deserialization {
        message,
        body: body.to_owned(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn client(base: &str) -> DnsClient {
        DnsClient::from_reqwest(base, "zone-1", reqwest::Client::new()).unwrap()
    }

    #[test]
    fn base_url_gains_trailing_slash() {
        let c = client("https://api.cloudflare.com/client/v4");
        assert_eq!(c.base_url().as_str(), "https://api.cloudflare.com/client/v4/");
    }

    #[test]
    fn record_url_keeps_api_prefix() {
        let c = client(DEFAULT_BASE_URL);
        assert_eq!(
            c.record_url("abc").unwrap().as_str(),
            "https://api.cloudflare.com/client/v4/zones/zone-1/dns_records/abc"
        );
    }

    #[test]
    fn record_id_is_escaped_as_one_segment() {
        let c = client(DEFAULT_BASE_URL);
        let url = c.record_url("a/b").unwrap();
        assert!(url.path().ends_with("/dns_records/a%2Fb"));
    }
}
