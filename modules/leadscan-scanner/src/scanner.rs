//! Per-owner search orchestration.
//!
//! One owner's scan fans out over (contact, region) units under bounded
//! concurrency. Each unit generates name variations, searches both name
//! fields, claims fresh candidates in the ledger before fetching detail,
//! scores them, and pushes kept matches into the shared sink.

use std::collections::HashSet;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use chrono::{Duration as ChronoDuration, Utc};
use futures::stream::{self, StreamExt};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use leadscan_common::{
    Candidate, Contact, ContactSource, MatchResult, NameField, Owner, PropertySearch, Region,
};
use leadscan_match::{name_variations, score_property, should_include, NameParts, ScoreConfig};

use crate::ledger::Ledger;

/// Knobs for one owner's scan.
#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// Concurrent (contact, region) units per owner.
    pub unit_concurrency: usize,
    /// Rolling sale-date window, anchored to now.
    pub lookback_days: i64,
    pub score: ScoreConfig,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            unit_concurrency: 8,
            lookback_days: 180,
            score: ScoreConfig::default(),
        }
    }
}

/// Collects kept matches and counters across an owner's units. Shared with
/// the driver so a timed-out scan still surfaces what it found.
#[derive(Default)]
pub struct ScanSink {
    results: Mutex<Vec<MatchResult>>,
    contacts_processed: AtomicU32,
    contacts_skipped: AtomicU32,
    units_failed: AtomicU32,
}

impl ScanSink {
    pub async fn push(&self, result: MatchResult) {
        self.results.lock().await.push(result);
    }

    pub async fn drain(&self) -> Vec<MatchResult> {
        std::mem::take(&mut *self.results.lock().await)
    }

    pub fn contacts_processed(&self) -> u32 {
        self.contacts_processed.load(Ordering::Relaxed)
    }

    pub fn contacts_skipped(&self) -> u32 {
        self.contacts_skipped.load(Ordering::Relaxed)
    }

    pub fn units_failed(&self) -> u32 {
        self.units_failed.load(Ordering::Relaxed)
    }
}

pub struct Scanner {
    contacts: Arc<dyn ContactSource>,
    records: Arc<dyn PropertySearch>,
    config: ScanConfig,
}

impl Scanner {
    pub fn new(
        contacts: Arc<dyn ContactSource>,
        records: Arc<dyn PropertySearch>,
        config: ScanConfig,
    ) -> Self {
        Self {
            contacts,
            records,
            config,
        }
    }

    /// Scan one owner. Unit failures are isolated; the only hard error is
    /// an unreachable contact list.
    pub async fn scan_owner(&self, owner: &Owner, ledger: &Ledger, sink: &ScanSink) -> Result<()> {
        let contacts = self
            .contacts
            .fetch_contacts(&owner.crm_token)
            .await
            .with_context(|| format!("Failed to fetch contacts for {}", owner.name))?;
        info!(
            owner = owner.name.as_str(),
            contacts = contacts.len(),
            regions = owner.regions.len(),
            "Scanning owner"
        );
        sink.contacts_processed
            .fetch_add(contacts.len() as u32, Ordering::Relaxed);

        let mut units: Vec<(Contact, Option<Region>)> = Vec::new();
        for contact in contacts {
            if !valid_contact(&contact) {
                warn!(
                    owner = owner.name.as_str(),
                    contact = contact.name.as_str(),
                    "Skipping invalid contact"
                );
                sink.contacts_skipped.fetch_add(1, Ordering::Relaxed);
                continue;
            }
            if owner.regions.is_empty() {
                units.push((contact, None));
            } else {
                for region in &owner.regions {
                    units.push((contact.clone(), Some(region.clone())));
                }
            }
        }

        stream::iter(units)
            .map(|(contact, region)| async move {
                if let Err(e) = self
                    .process_unit(owner, &contact, region.as_ref(), ledger, sink)
                    .await
                {
                    warn!(
                        owner = owner.name.as_str(),
                        contact = contact.name.as_str(),
                        error = %e,
                        "Search unit failed"
                    );
                    sink.units_failed.fetch_add(1, Ordering::Relaxed);
                }
            })
            .buffer_unordered(self.config.unit_concurrency)
            .collect::<Vec<_>>()
            .await;

        Ok(())
    }

    async fn process_unit(
        &self,
        owner: &Owner,
        contact: &Contact,
        region: Option<&Region>,
        ledger: &Ledger,
        sink: &ScanSink,
    ) -> Result<()> {
        let parts = NameParts::from_display_name(&contact.name);
        let variations = name_variations(&parts);
        if variations.is_empty() {
            warn!(
                contact = contact.name.as_str(),
                "No usable name variations, skipping contact"
            );
            return Ok(());
        }

        let since = (Utc::now() - ChronoDuration::days(self.config.lookback_days)).date_naive();

        let mut fresh: Vec<Candidate> = Vec::new();
        let mut seen_in_unit: HashSet<String> = HashSet::new();
        let mut searches = 0u32;
        let mut search_errors = 0u32;

        for variation in &variations {
            for field in [NameField::Seller, NameField::Owner] {
                searches += 1;
                let ids = match self
                    .records
                    .search_by_name_filter(field, variation, region, since)
                    .await
                {
                    Ok(ids) => ids,
                    Err(e) => {
                        warn!(
                            owner = owner.name.as_str(),
                            contact = contact.name.as_str(),
                            variation = variation.as_str(),
                            field = %field,
                            error = %e,
                            "Name-filter search failed"
                        );
                        search_errors += 1;
                        continue;
                    }
                };
                for id in ids {
                    if !seen_in_unit.insert(id.clone()) {
                        continue;
                    }
                    // Claim before the detail fetch: sibling units working
                    // the same owner must not fetch this property again.
                    if !ledger.claim(&id).await {
                        continue;
                    }
                    fresh.push(Candidate {
                        property_id: id,
                        field,
                        variation: variation.clone(),
                    });
                }
            }
        }

        if searches > 0 && search_errors == searches {
            bail!("all {searches} name-filter searches failed");
        }

        for candidate in fresh {
            let detail = match self.records.fetch_detail(&candidate.property_id).await {
                Ok(Some(detail)) => detail,
                Ok(None) => {
                    debug!(property_id = candidate.property_id.as_str(), "No detail report");
                    continue;
                }
                Err(e) => {
                    warn!(
                        property_id = candidate.property_id.as_str(),
                        error = %e,
                        "Detail fetch failed"
                    );
                    continue;
                }
            };

            let score = score_property(&variations, &parts, &detail);
            if !should_include(&score, &self.config.score) {
                debug!(
                    property_id = detail.property_id.as_str(),
                    percentage = score.percentage,
                    "Below inclusion threshold"
                );
                continue;
            }

            debug!(
                owner = owner.name.as_str(),
                contact = contact.name.as_str(),
                property_id = detail.property_id.as_str(),
                percentage = score.percentage,
                field = %score.matched_field,
                "Match kept"
            );
            sink.push(MatchResult {
                contact: contact.clone(),
                detail,
                triggered_by: candidate.variation,
                score,
            })
            .await;
        }

        Ok(())
    }
}

/// Cheap pre-filter ahead of any API call.
fn valid_contact(contact: &Contact) -> bool {
    let name = contact.name.trim();
    let email = contact.email.trim();
    name.chars().count() >= 2 && email.contains('@')
}
