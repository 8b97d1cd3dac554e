// Trait abstractions for the pipeline's external collaborators.
//
// OwnerStore — persistence (owner list, ledger flush, match audit rows).
// ContactSource — the relationship-management provider.
// PropertySearch — the property-records provider.
// MatchReporter — downstream digest delivery.
//
// These enable deterministic testing with in-memory implementations:
// no network, no database.

use std::collections::HashSet;

use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDate;

use crate::types::{Contact, MatchResult, NameField, Owner, PropertyDetail, Region};

#[async_trait]
pub trait OwnerStore: Send + Sync {
    /// All owners with their current ledgers and region assignments.
    async fn list_owners(&self) -> Result<Vec<Owner>>;

    /// Persist an owner's accumulated seen-property set.
    async fn persist_ledger(&self, owner_id: i64, property_ids: &HashSet<String>) -> Result<()>;

    /// Record one confirmed match for audit.
    async fn record_match(&self, owner_id: i64, result: &MatchResult) -> Result<()>;
}

#[async_trait]
pub trait ContactSource: Send + Sync {
    /// Fetch the owner's full contact list.
    async fn fetch_contacts(&self, owner_token: &str) -> Result<Vec<Contact>>;
}

#[async_trait]
pub trait PropertySearch: Send + Sync {
    /// Obtain the provider bearer token. Called once at the start of a run;
    /// implementations without an auth step use the default no-op.
    async fn authenticate(&self) -> Result<()> {
        Ok(())
    }

    /// Name-filtered search over sales after `since`. Returns candidate
    /// property ids; no matches is an empty vec, not an error.
    async fn search_by_name_filter(
        &self,
        field: NameField,
        variation: &str,
        region: Option<&Region>,
        since: NaiveDate,
    ) -> Result<Vec<String>>;

    /// Full record for one candidate. `None` when the provider has no report
    /// for the id.
    async fn fetch_detail(&self, property_id: &str) -> Result<Option<PropertyDetail>>;
}

#[async_trait]
pub trait MatchReporter: Send + Sync {
    /// Deliver one owner's new, deduplicated, scored matches.
    async fn deliver(&self, owner: &Owner, results: &[MatchResult]) -> Result<()>;
}
