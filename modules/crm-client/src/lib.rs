pub mod error;
pub mod types;

pub use error::{CrmError, Result};
pub use types::{ContactsResponse, CrmContact};

use std::time::Duration;

use async_trait::async_trait;

use leadscan_common::{with_retry, ApiHealth, Contact, ContactSource, RateLimiter, RetryPolicy};

/// Client for the CRM contact-list provider.
pub struct CrmClient {
    client: reqwest::Client,
    base_url: String,
    limiter: RateLimiter,
    retry: RetryPolicy,
    health: ApiHealth,
}

/// Knobs for the client's resilience wrapping.
pub struct CrmClientConfig {
    pub base_url: String,
    pub timeout: Duration,
    pub retry: RetryPolicy,
    pub rate_limit_max_calls: usize,
    pub rate_limit_window: Duration,
    pub unhealthy_after: u32,
}

impl CrmClient {
    pub fn new(config: CrmClientConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            limiter: RateLimiter::new(config.rate_limit_max_calls, config.rate_limit_window),
            retry: config.retry,
            health: ApiHealth::new("crm", config.unhealthy_after),
        }
    }

    /// Fetch all contacts for the account behind `token`.
    pub async fn contacts(&self, token: &str) -> Result<Vec<Contact>> {
        let result = with_retry(&self.retry, "crm.contacts", || self.contacts_once(token)).await;
        match &result {
            Ok(contacts) => {
                self.health.record_success();
                tracing::info!(count = contacts.len(), "Fetched CRM contacts");
            }
            Err(e) => {
                self.health.record_failure();
                tracing::error!(error = %e, "Failed to fetch CRM contacts");
            }
        }
        result
    }

    async fn contacts_once(&self, token: &str) -> Result<Vec<Contact>> {
        self.limiter.acquire().await;

        let url = format!("{}/v2/public/contacts", self.base_url);
        let resp = self
            .client
            .get(&url)
            .bearer_auth(token)
            .header("accept", "application/json")
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(CrmError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body: ContactsResponse = resp.json().await?;
        Ok(body
            .data
            .into_iter()
            .map(|c| Contact {
                name: c.name,
                email: c.email,
            })
            .collect())
    }
}

#[async_trait]
impl ContactSource for CrmClient {
    async fn fetch_contacts(&self, owner_token: &str) -> anyhow::Result<Vec<Contact>> {
        Ok(self.contacts(owner_token).await?)
    }
}
