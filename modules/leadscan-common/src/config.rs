use std::env;

use tracing::info;

/// Worker configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    // Postgres
    pub database_url: String,

    // Property-records provider
    pub records_base_url: String,
    pub records_client_id: String,
    pub records_client_secret: String,

    // Contact-list provider
    pub crm_base_url: String,

    // Outbound HTTP behavior
    pub http_timeout_secs: u64,
    pub max_attempts: u32,
    pub rate_limit_max_calls: usize,
    pub rate_limit_window_secs: u64,
    pub unhealthy_after: u32,

    // Scan shape
    pub owner_concurrency: usize,
    pub unit_concurrency: usize,
    pub lookback_days: i64,
    pub owner_timeout_mins: u64,
    pub component_threshold: u8,
}

impl Config {
    /// Load configuration from environment variables.
    /// Panics with a clear message if required vars are missing.
    pub fn from_env() -> Self {
        Self {
            database_url: required_env("DATABASE_URL"),
            records_base_url: required_env("RECORDS_BASE_URL"),
            records_client_id: required_env("RECORDS_CLIENT_ID"),
            records_client_secret: required_env("RECORDS_CLIENT_SECRET"),
            crm_base_url: env::var("CRM_BASE_URL")
                .unwrap_or_else(|_| "https://api.kvcore.com".to_string()),
            http_timeout_secs: parsed_env("HTTP_TIMEOUT_SECS", 30),
            max_attempts: parsed_env("API_MAX_ATTEMPTS", 4),
            rate_limit_max_calls: parsed_env("RATE_LIMIT_MAX_CALLS", 100),
            rate_limit_window_secs: parsed_env("RATE_LIMIT_WINDOW_SECS", 3600),
            unhealthy_after: parsed_env("API_UNHEALTHY_AFTER", 5),
            owner_concurrency: parsed_env("OWNER_CONCURRENCY", 5),
            unit_concurrency: parsed_env("UNIT_CONCURRENCY", 8),
            lookback_days: parsed_env("LOOKBACK_DAYS", 180),
            owner_timeout_mins: parsed_env("OWNER_TIMEOUT_MINS", 40),
            component_threshold: parsed_env("COMPONENT_MATCH_THRESHOLD", 60),
        }
    }

    /// Log the non-secret knobs at startup.
    pub fn log_summary(&self) {
        info!(
            records_base_url = self.records_base_url.as_str(),
            crm_base_url = self.crm_base_url.as_str(),
            owner_concurrency = self.owner_concurrency,
            unit_concurrency = self.unit_concurrency,
            lookback_days = self.lookback_days,
            owner_timeout_mins = self.owner_timeout_mins,
            component_threshold = self.component_threshold,
            rate_limit_max_calls = self.rate_limit_max_calls,
            rate_limit_window_secs = self.rate_limit_window_secs,
            "Configuration loaded"
        );
    }
}

fn required_env(key: &str) -> String {
    env::var(key).unwrap_or_else(|_| panic!("{key} environment variable is required"))
}

fn parsed_env<T: std::str::FromStr>(key: &str, default: T) -> T {
    match env::var(key) {
        Ok(raw) => raw
            .parse()
            .unwrap_or_else(|_| panic!("{key} must be a number, got: {raw}")),
        Err(_) => default,
    }
}
