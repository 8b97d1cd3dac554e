pub mod error;
pub mod types;

pub use error::{RecordsError, Result};

use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use tokio::sync::RwLock;
use tracing::debug;

use leadscan_common::{
    with_retry, ApiHealth, NameField, PropertyDetail, PropertySearch, RateLimiter, Region,
    RetryPolicy,
};

use types::{
    normalize_property_id, ApiMessage, AuthRequest, DetailRequestBody, Filter, ReportResponse,
    SearchRequest, SearchRequestBody, SearchResponse,
};

const AUTH_ENDPOINT: &str = "/api/Login/AuthenticateClient";
const REPORT_ENDPOINT: &str = "/api/Report/GetReport";

const PRODUCT_DETAIL_REPORT: &str = "PropertyDetailReport";
const SEARCH_MAX_RETURN: &str = "100";

/// 400 payload message that means "empty result set", not an error.
const NO_MATCH_MESSAGE: &str = "No matching property found.";

/// Knobs for the client's resilience wrapping.
pub struct RecordsClientConfig {
    pub base_url: String,
    pub client_id: String,
    pub client_secret: String,
    pub timeout: Duration,
    pub retry: RetryPolicy,
    pub rate_limit_max_calls: usize,
    pub rate_limit_window: Duration,
    pub unhealthy_after: u32,
}

/// Client for the property-records provider. Every outbound call waits on
/// the shared rate limiter, then runs under the retry policy. Safe for
/// concurrent use: the bearer token is read-shared after `authenticate`.
pub struct RecordsClient {
    client: reqwest::Client,
    base_url: String,
    client_id: String,
    client_secret: String,
    token: RwLock<Option<String>>,
    limiter: RateLimiter,
    retry: RetryPolicy,
    health: ApiHealth,
}

impl RecordsClient {
    pub fn new(config: RecordsClientConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            client_id: config.client_id,
            client_secret: config.client_secret,
            token: RwLock::new(None),
            limiter: RateLimiter::new(config.rate_limit_max_calls, config.rate_limit_window),
            retry: config.retry,
            health: ApiHealth::new("records", config.unhealthy_after),
        }
    }

    /// Authenticate and store the bearer token for subsequent calls.
    pub async fn authenticate(&self) -> Result<()> {
        let result =
            with_retry(&self.retry, "records.authenticate", || self.authenticate_once()).await;
        match result {
            Ok(token) => {
                self.health.record_success();
                *self.token.write().await = Some(token);
                tracing::info!("Records provider authentication successful");
                Ok(())
            }
            Err(e) => {
                self.health.record_failure();
                tracing::error!(error = %e, "Records provider authentication failed");
                Err(e)
            }
        }
    }

    async fn authenticate_once(&self) -> Result<String> {
        self.limiter.acquire().await;

        let url = format!("{}{}", self.base_url, AUTH_ENDPOINT);
        let payload = AuthRequest {
            client_id: &self.client_id,
            client_secret_key: &self.client_secret,
        };
        let resp = self.client.post(&url).json(&payload).send().await?;

        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(RecordsError::Api {
                status: status.as_u16(),
                message,
            });
        }

        // The token arrives as a quoted string body.
        let body = resp.text().await?;
        let token = body.trim().trim_matches('"').to_string();
        if token.is_empty() {
            return Err(RecordsError::Auth(
                "received empty authentication token".to_string(),
            ));
        }
        Ok(token)
    }

    async fn bearer(&self) -> Result<String> {
        self.token
            .read()
            .await
            .clone()
            .ok_or_else(|| RecordsError::Auth("not authenticated".to_string()))
    }

    /// Name-filtered search for sales after `since`. Returns candidate
    /// property ids; the provider's no-match 400 yields an empty vec.
    pub async fn search(
        &self,
        field: NameField,
        variation: &str,
        state_fips: Option<&str>,
        county_fips: Option<&str>,
        since: NaiveDate,
    ) -> Result<Vec<String>> {
        let result = with_retry(&self.retry, "records.search", || {
            self.search_once(field, variation, state_fips, county_fips, since)
        })
        .await;
        self.track(&result);
        result
    }

    async fn search_once(
        &self,
        field: NameField,
        variation: &str,
        state_fips: Option<&str>,
        county_fips: Option<&str>,
        since: NaiveDate,
    ) -> Result<Vec<String>> {
        self.limiter.acquire().await;
        let token = self.bearer().await?;

        let filter_name = match field {
            NameField::Owner => "OwnerNames",
            NameField::Seller => "SellerName",
        };
        let mut filters = vec![
            Filter {
                name: filter_name,
                operator: "contains",
                values: vec![variation.to_string()],
            },
            Filter {
                name: "SaleDate",
                operator: "is after",
                values: vec![since.format("%Y-%m-%d").to_string()],
            },
        ];
        if let Some(state) = state_fips {
            filters.push(Filter {
                name: "StateFips",
                operator: "is",
                values: vec![state.to_string()],
            });
        }
        if let Some(county) = county_fips {
            filters.push(Filter {
                name: "CountyFips",
                operator: "is",
                values: vec![county.to_string()],
            });
        }

        let payload = SearchRequestBody {
            product_names: vec![PRODUCT_DETAIL_REPORT],
            search_type: "Filter",
            search_request: SearchRequest {
                reference_id: "1",
                product_name: "SearchLite",
                max_return: SEARCH_MAX_RETURN,
                filters,
            },
        };

        let url = format!("{}{}", self.base_url, REPORT_ENDPOINT);
        let resp = self
            .client
            .post(&url)
            .bearer_auth(&token)
            .json(&payload)
            .send()
            .await?;

        let status = resp.status();
        if status == reqwest::StatusCode::BAD_REQUEST {
            let body = resp.text().await.unwrap_or_default();
            if let Ok(msg) = serde_json::from_str::<ApiMessage>(&body) {
                if msg.message.as_deref() == Some(NO_MATCH_MESSAGE) {
                    debug!(variation, field = %field, "No matching properties");
                    return Ok(Vec::new());
                }
            }
            return Err(RecordsError::Api {
                status: 400,
                message: body,
            });
        }
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(RecordsError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body: SearchResponse = resp.json().await?;
        let ids: Vec<String> = body
            .lite_property_list
            .iter()
            .filter_map(|p| p.property_id.as_ref().and_then(normalize_property_id))
            .collect();
        debug!(variation, field = %field, count = ids.len(), "Search returned candidates");
        Ok(ids)
    }

    /// Fetch the detail report for one property id. `None` when the
    /// provider has no report for it.
    pub async fn detail(&self, property_id: &str) -> Result<Option<PropertyDetail>> {
        let result = with_retry(&self.retry, "records.detail", || {
            self.detail_once(property_id)
        })
        .await;
        self.track(&result);
        result
    }

    async fn detail_once(&self, property_id: &str) -> Result<Option<PropertyDetail>> {
        self.limiter.acquire().await;
        let token = self.bearer().await?;

        let payload = DetailRequestBody {
            product_names: vec![PRODUCT_DETAIL_REPORT],
            search_type: "PROPERTY",
            property_id,
        };

        let url = format!("{}{}", self.base_url, REPORT_ENDPOINT);
        let resp = self
            .client
            .post(&url)
            .bearer_auth(&token)
            .json(&payload)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(RecordsError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body: ReportResponse = resp.json().await?;
        let Some(report) = body.reports.into_iter().next() else {
            debug!(property_id, "No report found");
            return Ok(None);
        };

        let data = report.data;
        let Some(id) = data
            .subject_property
            .property_id
            .as_ref()
            .and_then(normalize_property_id)
        else {
            return Ok(None);
        };

        Ok(Some(PropertyDetail {
            property_id: id,
            owner_names: non_placeholder(data.owner_information.owner_names),
            seller_name: non_placeholder(data.owner_transfer_information.seller_name),
            street_address: non_placeholder(data.subject_property.situs_address.street_address),
            county: non_placeholder(data.subject_property.situs_address.county),
            state: non_placeholder(data.subject_property.situs_address.state),
            sale_date: non_placeholder(data.owner_transfer_information.sale_date),
        }))
    }

    fn track<T>(&self, result: &Result<T>) {
        match result {
            Ok(_) => self.health.record_success(),
            Err(_) => self.health.record_failure(),
        }
    }
}

fn non_placeholder(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.is_empty() && s != "N/A")
}

#[async_trait]
impl PropertySearch for RecordsClient {
    async fn authenticate(&self) -> anyhow::Result<()> {
        Ok(self.authenticate().await?)
    }

    async fn search_by_name_filter(
        &self,
        field: NameField,
        variation: &str,
        region: Option<&Region>,
        since: NaiveDate,
    ) -> anyhow::Result<Vec<String>> {
        let state = region.and_then(|r| r.state_fips.as_deref());
        let county = region.and_then(|r| r.county_fips.as_deref());
        Ok(self.search(field, variation, state, county, since).await?)
    }

    async fn fetch_detail(&self, property_id: &str) -> anyhow::Result<Option<PropertyDetail>> {
        Ok(self.detail(property_id).await?)
    }
}
