use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crm_client::{CrmClient, CrmClientConfig};
use leadscan_common::{Config, RetryPolicy};
use leadscan_match::ScoreConfig;
use leadscan_scanner::pipeline::{Pipeline, PipelineConfig};
use leadscan_scanner::report::LogReporter;
use leadscan_scanner::scanner::ScanConfig;
use leadscan_store::PgStore;
use records_client::{RecordsClient, RecordsClientConfig};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    info!("Lead scan worker starting...");

    let config = Config::from_env();
    config.log_summary();

    let store = Arc::new(PgStore::connect(&config.database_url).await?);

    let retry = RetryPolicy::with_max_attempts(config.max_attempts);
    let timeout = Duration::from_secs(config.http_timeout_secs);
    let rate_window = Duration::from_secs(config.rate_limit_window_secs);

    let records = Arc::new(RecordsClient::new(RecordsClientConfig {
        base_url: config.records_base_url.clone(),
        client_id: config.records_client_id.clone(),
        client_secret: config.records_client_secret.clone(),
        timeout,
        retry: retry.clone(),
        rate_limit_max_calls: config.rate_limit_max_calls,
        rate_limit_window: rate_window,
        unhealthy_after: config.unhealthy_after,
    }));

    let contacts = Arc::new(CrmClient::new(CrmClientConfig {
        base_url: config.crm_base_url.clone(),
        timeout,
        retry,
        rate_limit_max_calls: config.rate_limit_max_calls,
        rate_limit_window: rate_window,
        unhealthy_after: config.unhealthy_after,
    }));

    let scan_config = ScanConfig {
        unit_concurrency: config.unit_concurrency,
        lookback_days: config.lookback_days,
        score: ScoreConfig {
            component_threshold: config.component_threshold,
        },
    };
    let pipeline_config = PipelineConfig {
        owner_concurrency: config.owner_concurrency,
        owner_timeout: Duration::from_secs(config.owner_timeout_mins * 60),
    };

    let pipeline = Pipeline::new(
        store,
        contacts,
        records,
        Arc::new(LogReporter),
        scan_config,
        pipeline_config,
    );

    let summary = pipeline.run().await?;
    info!("{summary}");

    Ok(())
}
