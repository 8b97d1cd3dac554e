//! Run-level driver: iterates all owners with bounded concurrency,
//! flushes ledgers, records matches, and aggregates a run summary.

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use futures::stream::{self, StreamExt};
use tracing::{error, info, warn};
use uuid::Uuid;

use leadscan_common::{ContactSource, MatchReporter, Owner, OwnerStore, PropertySearch};

use crate::ledger::Ledger;
use crate::scanner::{ScanConfig, ScanSink, Scanner};

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Owners processed concurrently.
    pub owner_concurrency: usize,
    /// Per-owner deadline; on expiry in-flight units are abandoned and
    /// partial results are still flushed and reported.
    pub owner_timeout: Duration,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            owner_concurrency: 5,
            owner_timeout: Duration::from_secs(40 * 60),
        }
    }
}

/// Counters for one full run.
#[derive(Debug, Default)]
pub struct RunSummary {
    pub processed_owners: u32,
    pub failed_owners: u32,
    pub total_contacts: u32,
    pub total_matches: u32,
    pub duration: Duration,
}

impl std::fmt::Display for RunSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "\n=== Lead Scan Run Complete ===")?;
        writeln!(f, "Owners processed: {}", self.processed_owners)?;
        writeln!(f, "Owners failed:    {}", self.failed_owners)?;
        writeln!(f, "Contacts scanned: {}", self.total_contacts)?;
        writeln!(f, "New matches:      {}", self.total_matches)?;
        writeln!(f, "Duration:         {:.1}s", self.duration.as_secs_f64())
    }
}

struct OwnerOutcome {
    contacts: u32,
    matches: u32,
}

pub struct Pipeline {
    store: Arc<dyn OwnerStore>,
    records: Arc<dyn PropertySearch>,
    reporter: Arc<dyn MatchReporter>,
    scanner: Scanner,
    config: PipelineConfig,
}

impl Pipeline {
    pub fn new(
        store: Arc<dyn OwnerStore>,
        contacts: Arc<dyn ContactSource>,
        records: Arc<dyn PropertySearch>,
        reporter: Arc<dyn MatchReporter>,
        scan_config: ScanConfig,
        config: PipelineConfig,
    ) -> Self {
        Self {
            store,
            records: records.clone(),
            reporter,
            scanner: Scanner::new(contacts, records, scan_config),
            config,
        }
    }

    /// Run one full pass over all owners. Owner failures are counted, never
    /// propagated; only startup failures abort the run.
    pub async fn run(&self) -> Result<RunSummary> {
        let run_id = Uuid::new_v4();
        let started = Instant::now();

        // Without a provider token no unit could proceed.
        self.records
            .authenticate()
            .await
            .context("Records provider authentication failed, aborting run")?;

        let owners = self
            .store
            .list_owners()
            .await
            .context("Failed to load owners, aborting run")?;
        info!(%run_id, owners = owners.len(), "Starting lead scan run");

        let outcomes: Vec<Result<OwnerOutcome>> = stream::iter(owners)
            .map(|owner| self.process_owner(owner))
            .buffer_unordered(self.config.owner_concurrency)
            .collect()
            .await;

        let mut summary = RunSummary::default();
        for outcome in outcomes {
            match outcome {
                Ok(o) => {
                    summary.processed_owners += 1;
                    summary.total_contacts += o.contacts;
                    summary.total_matches += o.matches;
                }
                Err(_) => summary.failed_owners += 1,
            }
        }
        summary.duration = started.elapsed();

        info!(
            %run_id,
            processed = summary.processed_owners,
            failed = summary.failed_owners,
            matches = summary.total_matches,
            "Lead scan run complete"
        );
        Ok(summary)
    }

    async fn process_owner(&self, owner: Owner) -> Result<OwnerOutcome> {
        let result = self.process_owner_inner(&owner).await;
        if let Err(e) = &result {
            error!(owner = owner.name.as_str(), error = %e, "Owner processing failed");
        }
        result
    }

    async fn process_owner_inner(&self, owner: &Owner) -> Result<OwnerOutcome> {
        let ledger = Ledger::new(owner.seen_property_ids.clone());
        let sink = ScanSink::default();

        let scan = tokio::time::timeout(
            self.config.owner_timeout,
            self.scanner.scan_owner(owner, &ledger, &sink),
        )
        .await;
        match scan {
            Ok(Ok(())) => {}
            Ok(Err(e)) => return Err(e),
            Err(_) => {
                warn!(
                    owner = owner.name.as_str(),
                    timeout_secs = self.config.owner_timeout.as_secs(),
                    "Owner scan timed out, keeping partial results"
                );
            }
        }

        let mut results = sink.drain().await;
        results.sort_by(|a, b| b.score.percentage.cmp(&a.score.percentage));

        // Flush failure loses at most one run of dedup state; the next run
        // rescores those properties (at-least-once).
        if let Err(e) = self
            .store
            .persist_ledger(owner.id, &ledger.snapshot().await)
            .await
        {
            error!(owner = owner.name.as_str(), error = %e, "Failed to flush ledger, continuing");
        }

        for result in &results {
            if let Err(e) = self.store.record_match(owner.id, result).await {
                warn!(
                    owner = owner.name.as_str(),
                    property_id = result.detail.property_id.as_str(),
                    error = %e,
                    "Failed to record match"
                );
            }
        }

        if !results.is_empty() {
            if let Err(e) = self.reporter.deliver(owner, &results).await {
                error!(owner = owner.name.as_str(), error = %e, "Failed to deliver match digest");
            }
        }

        info!(
            owner = owner.name.as_str(),
            contacts = sink.contacts_processed(),
            skipped = sink.contacts_skipped(),
            units_failed = sink.units_failed(),
            matches = results.len(),
            "Owner processing complete"
        );
        Ok(OwnerOutcome {
            contacts: sink.contacts_processed(),
            matches: results.len() as u32,
        })
    }
}
