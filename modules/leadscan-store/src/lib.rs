//! Postgres-backed owner store.
//!
//! The schema is owned by the management backend; this crate reads the
//! `crm_owners` table (ledger and region assignments live in JSON columns)
//! and appends audit rows to `property_matches`.

use std::collections::HashSet;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::NaiveDate;
use serde_json::Value;
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Row};
use tracing::info;

use leadscan_common::{MatchResult, Owner, OwnerStore, Region};

pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(database_url)
            .await
            .context("Failed to connect to Postgres")?;
        Ok(Self { pool })
    }

    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl OwnerStore for PgStore {
    async fn list_owners(&self) -> Result<Vec<Owner>> {
        let rows = sqlx::query(
            "SELECT id::bigint AS id, name, email, token, seen_property_ids, states_counties
             FROM crm_owners
             ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await
        .context("Failed to load CRM owners")?;

        let mut owners = Vec::with_capacity(rows.len());
        for row in rows {
            let seen: Option<Value> = row.try_get("seen_property_ids")?;
            let regions: Option<Value> = row.try_get("states_counties")?;
            owners.push(Owner {
                id: row.try_get("id")?,
                name: row.try_get("name")?,
                email: row.try_get("email")?,
                crm_token: row.try_get("token")?,
                regions: parse_regions(regions),
                seen_property_ids: parse_seen_ids(seen),
            });
        }
        info!(count = owners.len(), "Loaded CRM owners");
        Ok(owners)
    }

    async fn persist_ledger(&self, owner_id: i64, property_ids: &HashSet<String>) -> Result<()> {
        let mut ids: Vec<&String> = property_ids.iter().collect();
        ids.sort();
        let payload = serde_json::to_string(&ids).context("Failed to encode ledger")?;

        sqlx::query("UPDATE crm_owners SET seen_property_ids = $2::json WHERE id = $1")
            .bind(owner_id)
            .bind(payload)
            .execute(&self.pool)
            .await
            .context("Failed to persist seen-property ledger")?;
        Ok(())
    }

    async fn record_match(&self, owner_id: i64, result: &MatchResult) -> Result<()> {
        let score_json =
            serde_json::to_string(&result.score).context("Failed to encode match score")?;
        let sale_date = result.detail.sale_date.as_deref().and_then(parse_sale_date);

        sqlx::query(
            "INSERT INTO property_matches
                (crm_owner_id, property_id, owner_name, street_address, county, state,
                 seller_name, sale_date, contact_name, contact_email,
                 match_confidence, name_variation_used, search_criteria,
                 is_new_match, is_notified)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13::json, TRUE, FALSE)",
        )
        .bind(owner_id)
        .bind(&result.detail.property_id)
        .bind(&result.detail.owner_names)
        .bind(&result.detail.street_address)
        .bind(&result.detail.county)
        .bind(&result.detail.state)
        .bind(&result.detail.seller_name)
        .bind(sale_date)
        .bind(&result.contact.name)
        .bind(&result.contact.email)
        .bind(result.score.percentage as f64)
        .bind(&result.triggered_by)
        .bind(score_json)
        .execute(&self.pool)
        .await
        .context("Failed to record property match")?;
        Ok(())
    }
}

/// The provider reports sale dates in either ISO or US order.
fn parse_sale_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(raw, "%m/%d/%Y"))
        .ok()
}

/// Ledger entries were historically stored as strings or bare numbers.
fn parse_seen_ids(value: Option<Value>) -> HashSet<String> {
    match value {
        Some(Value::Array(items)) => items
            .into_iter()
            .filter_map(|item| match item {
                Value::String(s) if !s.is_empty() => Some(s),
                Value::Number(n) => Some(n.to_string()),
                _ => None,
            })
            .collect(),
        _ => HashSet::new(),
    }
}

/// Region rows appear in both the old (`state_FIPS`) and new (`state_fips`)
/// key casings, with string or numeric FIPS codes.
fn parse_regions(value: Option<Value>) -> Vec<Region> {
    match value {
        Some(Value::Array(items)) => items
            .into_iter()
            .filter_map(|item| {
                let obj = item.as_object()?;
                let state = fips_code(obj.get("state_fips").or_else(|| obj.get("state_FIPS")));
                let county = fips_code(obj.get("county_fips").or_else(|| obj.get("county_FIPS")));
                if state.is_none() && county.is_none() {
                    None
                } else {
                    Some(Region {
                        state_fips: state,
                        county_fips: county,
                    })
                }
            })
            .collect(),
        _ => Vec::new(),
    }
}

fn fips_code(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_seen_ids_of_mixed_types() {
        let seen = parse_seen_ids(Some(json!(["100045", 200099, "", null])));
        assert!(seen.contains("100045"));
        assert!(seen.contains("200099"));
        assert_eq!(seen.len(), 2);
    }

    #[test]
    fn missing_ledger_is_empty() {
        assert!(parse_seen_ids(None).is_empty());
        assert!(parse_seen_ids(Some(json!(null))).is_empty());
    }

    #[test]
    fn parses_regions_in_both_key_casings() {
        let regions = parse_regions(Some(json!([
            {"state_FIPS": 27, "county_FIPS": 53},
            {"state_fips": "06", "county_fips": "037"},
            {"note": "no codes"}
        ])));
        assert_eq!(regions.len(), 2);
        assert_eq!(regions[0].state_fips.as_deref(), Some("27"));
        assert_eq!(regions[1].county_fips.as_deref(), Some("037"));
    }

    #[test]
    fn parses_sale_dates_in_both_formats() {
        let expected = NaiveDate::from_ymd_opt(2026, 3, 15);
        assert_eq!(parse_sale_date("2026-03-15"), expected);
        assert_eq!(parse_sale_date("03/15/2026"), expected);
        assert_eq!(parse_sale_date("N/A"), None);
    }

    #[test]
    fn region_with_state_only_is_kept() {
        let regions = parse_regions(Some(json!([{"state_fips": "27"}])));
        assert_eq!(regions.len(), 1);
        assert_eq!(regions[0].county_fips, None);
    }
}
