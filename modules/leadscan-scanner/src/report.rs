//! Digest logging for new matches.

use anyhow::Result;
use async_trait::async_trait;
use tracing::info;

use leadscan_common::{MatchReporter, MatchResult, Owner};

/// Logs each owner's digest. Building the deliverable and notifying the
/// owner is the reporting service's job; the worker only emits the summary.
pub struct LogReporter;

#[async_trait]
impl MatchReporter for LogReporter {
    async fn deliver(&self, owner: &Owner, results: &[MatchResult]) -> Result<()> {
        info!(
            owner = owner.name.as_str(),
            matches = results.len(),
            "New property matches"
        );
        for result in results {
            info!(
                owner = owner.name.as_str(),
                contact = result.contact.name.as_str(),
                property_id = result.detail.property_id.as_str(),
                address = result.detail.street_address.as_deref().unwrap_or("unknown"),
                percentage = result.score.percentage,
                quality = %result.score.quality(),
                field = %result.score.matched_field,
                "Match"
            );
        }
        Ok(())
    }
}
