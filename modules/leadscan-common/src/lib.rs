pub mod config;
pub mod health;
pub mod limiter;
pub mod retry;
pub mod traits;
pub mod types;

pub use config::Config;
pub use health::ApiHealth;
pub use limiter::RateLimiter;
pub use retry::{with_retry, RetryPolicy, Retryable};
pub use traits::{ContactSource, MatchReporter, OwnerStore, PropertySearch};
pub use types::{
    Candidate, Contact, MatchQuality, MatchResult, MatchScore, MatchType, NameField, Owner,
    PropertyDetail, Region,
};
