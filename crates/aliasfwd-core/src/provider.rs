// ── DNS provider seam ──
//
// The reconciler only needs four calls against the apex TXT record set.
// `CloudflareProvider` implements them over `aliasfwd_api::DnsClient`;
// tests implement them over a `Vec` in memory.

use std::future::Future;

use aliasfwd_api::DnsClient;
use tracing::debug;

use crate::config::ReconcilerConfig;
use crate::convert::build_transport;
use crate::error::{CoreError, ProviderError};
use crate::model::{DnsRecord, RecordId};

/// TXT record operations scoped to the apex domain.
///
/// Each call is a single provider round-trip (the listing walks pages
/// sequentially). Implementations must not retry.
pub trait DnsProvider: Send + Sync {
    /// Create a TXT record at the apex with `content`.
    fn create_txt(
        &self,
        content: &str,
    ) -> impl Future<Output = Result<DnsRecord, ProviderError>> + Send;

    /// Replace the content of record `id`. Not-found must use
    /// [`ProviderErrorKind::NotFound`](crate::ProviderErrorKind::NotFound).
    fn replace_txt(
        &self,
        id: &RecordId,
        content: &str,
    ) -> impl Future<Output = Result<DnsRecord, ProviderError>> + Send;

    /// Every TXT record at the apex, in provider order.
    fn list_txt(&self) -> impl Future<Output = Result<Vec<DnsRecord>, ProviderError>> + Send;

    fn delete(&self, id: &RecordId) -> impl Future<Output = Result<(), ProviderError>> + Send;
}

// ── Cloudflare ──────────────────────────────────────────────────────

/// [`DnsProvider`] backed by the Cloudflare DNS records API.
pub struct CloudflareProvider {
    client: DnsClient,
    apex_domain: String,
    ttl: u32,
}

impl CloudflareProvider {
    pub fn new(client: DnsClient, apex_domain: impl Into<String>, ttl: u32) -> Self {
        Self {
            client,
            apex_domain: apex_domain.into(),
            ttl,
        }
    }

    /// Build the HTTP client from a reconciler config.
    pub fn from_config(config: &ReconcilerConfig) -> Result<Self, CoreError> {
        let transport = build_transport(config);
        let client = DnsClient::new(
            config.api_url.as_str(),
            config.zone_id.clone(),
            &(&config.auth).into(),
            &transport,
        )
        .map_err(|e| CoreError::Config {
            message: format!("cannot build DNS client: {e}"),
        })?
        .with_page_size(config.page_size);

        Ok(Self::new(client, config.apex_domain.clone(), config.ttl))
    }

    pub fn client(&self) -> &DnsClient {
        &self.client
    }
}

impl DnsProvider for CloudflareProvider {
    async fn create_txt(&self, content: &str) -> Result<DnsRecord, ProviderError> {
        let rec = self
            .client
            .create_txt_record(&self.apex_domain, content, self.ttl)
            .await?;
        debug!(record_id = %rec.id, "TXT record created");
        Ok(rec.into())
    }

    async fn replace_txt(&self, id: &RecordId, content: &str) -> Result<DnsRecord, ProviderError> {
        let rec = self
            .client
            .replace_txt_record(id.as_str(), &self.apex_domain, content, self.ttl)
            .await?;
        Ok(rec.into())
    }

    async fn list_txt(&self) -> Result<Vec<DnsRecord>, ProviderError> {
        let all = self
            .client
            .list_all_txt_records(Some(&self.apex_domain))
            .await?;
        debug!(count = all.len(), apex = %self.apex_domain, "listed TXT records");
        Ok(all.into_iter().map(DnsRecord::from).collect())
    }

    async fn delete(&self, id: &RecordId) -> Result<(), ProviderError> {
        self.client.delete_record(id.as_str()).await?;
        Ok(())
    }
}
