//! In-memory collaborators for deterministic tests: no network, no
//! database.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::NaiveDate;
use tokio::sync::Mutex;

use leadscan_common::{
    Contact, ContactSource, MatchReporter, MatchResult, NameField, Owner, OwnerStore,
    PropertyDetail, PropertySearch, Region,
};

pub fn owner(id: i64, name: &str, token: &str) -> Owner {
    Owner {
        id,
        name: name.to_string(),
        email: format!("{}@example.com", name.to_lowercase().replace(' ', ".")),
        crm_token: token.to_string(),
        regions: Vec::new(),
        seen_property_ids: HashSet::new(),
    }
}

pub fn contact(name: &str, email: &str) -> Contact {
    Contact {
        name: name.to_string(),
        email: email.to_string(),
    }
}

pub fn detail(property_id: &str, owner_names: Option<&str>, seller_name: Option<&str>) -> PropertyDetail {
    PropertyDetail {
        property_id: property_id.to_string(),
        owner_names: owner_names.map(String::from),
        seller_name: seller_name.map(String::from),
        street_address: Some("12 Oak St".to_string()),
        county: Some("Hennepin".to_string()),
        state: Some("MN".to_string()),
        sale_date: Some("2026-06-01".to_string()),
    }
}

// ---------------------------------------------------------------------------
// ContactSource
// ---------------------------------------------------------------------------

/// Serves fixed contact lists keyed by owner token; tokens in `fail_tokens`
/// simulate an unreachable provider.
#[derive(Default)]
pub struct StaticContacts {
    by_token: HashMap<String, Vec<Contact>>,
    fail_tokens: HashSet<String>,
}

impl StaticContacts {
    pub fn with(mut self, token: &str, contacts: Vec<Contact>) -> Self {
        self.by_token.insert(token.to_string(), contacts);
        self
    }

    pub fn failing_for(mut self, token: &str) -> Self {
        self.fail_tokens.insert(token.to_string());
        self
    }
}

#[async_trait]
impl ContactSource for StaticContacts {
    async fn fetch_contacts(&self, owner_token: &str) -> Result<Vec<Contact>> {
        if self.fail_tokens.contains(owner_token) {
            return Err(anyhow!("contact provider unavailable"));
        }
        Ok(self.by_token.get(owner_token).cloned().unwrap_or_default())
    }
}

// ---------------------------------------------------------------------------
// PropertySearch
// ---------------------------------------------------------------------------

/// Scripted search results and detail reports, with call counters for
/// dedup assertions. Every search whose variation contains a rule's needle
/// (case-insensitive; empty needle matches everything) returns that rule's
/// ids.
#[derive(Default)]
pub struct ScriptedRecords {
    rules: Vec<(String, Vec<String>)>,
    details: HashMap<String, PropertyDetail>,
    search_delay: Option<Duration>,
    pub search_calls: AtomicU32,
    pub detail_calls: AtomicU32,
}

impl ScriptedRecords {
    pub fn candidates_for(mut self, needle: &str, ids: &[&str]) -> Self {
        self.rules.push((
            needle.to_uppercase(),
            ids.iter().map(|id| id.to_string()).collect(),
        ));
        self
    }

    pub fn with_detail(mut self, detail: PropertyDetail) -> Self {
        self.details.insert(detail.property_id.clone(), detail);
        self
    }

    pub fn with_search_delay(mut self, delay: Duration) -> Self {
        self.search_delay = Some(delay);
        self
    }
}

#[async_trait]
impl PropertySearch for ScriptedRecords {
    async fn search_by_name_filter(
        &self,
        _field: NameField,
        variation: &str,
        _region: Option<&Region>,
        _since: NaiveDate,
    ) -> Result<Vec<String>> {
        self.search_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.search_delay {
            tokio::time::sleep(delay).await;
        }
        let needle_target = variation.to_uppercase();
        Ok(self
            .rules
            .iter()
            .filter(|(needle, _)| needle.is_empty() || needle_target.contains(needle))
            .flat_map(|(_, ids)| ids.clone())
            .collect())
    }

    async fn fetch_detail(&self, property_id: &str) -> Result<Option<PropertyDetail>> {
        self.detail_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.details.get(property_id).cloned())
    }
}

// ---------------------------------------------------------------------------
// OwnerStore
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct MemoryStore {
    owners: Vec<Owner>,
    ledgers: Mutex<HashMap<i64, HashSet<String>>>,
    recorded: Mutex<Vec<(i64, MatchResult)>>,
}

impl MemoryStore {
    pub fn with_owners(owners: Vec<Owner>) -> Self {
        Self {
            owners,
            ..Self::default()
        }
    }

    /// The last flushed ledger for an owner.
    pub async fn ledger(&self, owner_id: i64) -> HashSet<String> {
        self.ledgers
            .lock()
            .await
            .get(&owner_id)
            .cloned()
            .unwrap_or_default()
    }

    /// Whether a flush has happened for this owner (even an empty one).
    pub async fn flushed(&self, owner_id: i64) -> bool {
        self.ledgers.lock().await.contains_key(&owner_id)
    }

    pub async fn recorded_matches(&self, owner_id: i64) -> Vec<MatchResult> {
        self.recorded
            .lock()
            .await
            .iter()
            .filter(|(id, _)| *id == owner_id)
            .map(|(_, m)| m.clone())
            .collect()
    }
}

#[async_trait]
impl OwnerStore for MemoryStore {
    async fn list_owners(&self) -> Result<Vec<Owner>> {
        Ok(self.owners.clone())
    }

    async fn persist_ledger(&self, owner_id: i64, property_ids: &HashSet<String>) -> Result<()> {
        self.ledgers
            .lock()
            .await
            .insert(owner_id, property_ids.clone());
        Ok(())
    }

    async fn record_match(&self, owner_id: i64, result: &MatchResult) -> Result<()> {
        self.recorded.lock().await.push((owner_id, result.clone()));
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// MatchReporter
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct RecordingReporter {
    delivered: Mutex<Vec<(String, usize)>>,
}

impl RecordingReporter {
    /// (owner name, match count) per delivery, in delivery order.
    pub async fn deliveries(&self) -> Vec<(String, usize)> {
        self.delivered.lock().await.clone()
    }
}

#[async_trait]
impl MatchReporter for RecordingReporter {
    async fn deliver(&self, owner: &Owner, results: &[MatchResult]) -> Result<()> {
        self.delivered
            .lock()
            .await
            .push((owner.name.clone(), results.len()));
        Ok(())
    }
}
