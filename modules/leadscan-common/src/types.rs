use std::collections::HashSet;

use serde::{Deserialize, Serialize};

// --- Tenancy ---

/// A tenant of the pipeline: one CRM account whose contacts are scanned for
/// property matches. The `seen_property_ids` ledger only grows, within and
/// across runs.
#[derive(Debug, Clone)]
pub struct Owner {
    pub id: i64,
    pub name: String,
    pub email: String,
    /// Bearer token for the owner's contact-list provider account.
    pub crm_token: String,
    /// Assigned search regions. Empty means search unrestricted.
    pub regions: Vec<Region>,
    pub seen_property_ids: HashSet<String>,
}

/// An optional (state, county) FIPS restriction on a search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Region {
    #[serde(default, alias = "state_FIPS")]
    pub state_fips: Option<String>,
    #[serde(default, alias = "county_FIPS")]
    pub county_fips: Option<String>,
}

/// A person in an owner's contact list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    pub name: String,
    pub email: String,
}

// --- Search ---

/// Which provider name field a search or score refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NameField {
    Owner,
    Seller,
}

impl std::fmt::Display for NameField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NameField::Owner => write!(f, "owner"),
            NameField::Seller => write!(f, "seller"),
        }
    }
}

/// An unverified property id surfaced by a name-filtered search, with the
/// filter and variation that produced it.
#[derive(Debug, Clone)]
pub struct Candidate {
    pub property_id: String,
    pub field: NameField,
    pub variation: String,
}

/// The fully fetched record for one property id. Provider strings are kept
/// raw; absent fields are `None`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyDetail {
    pub property_id: String,
    pub owner_names: Option<String>,
    pub seller_name: Option<String>,
    pub street_address: Option<String>,
    pub county: Option<String>,
    pub state: Option<String>,
    pub sale_date: Option<String>,
}

// --- Scoring ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchType {
    Exact,
    Substring,
    Fuzzy,
    Component,
    None,
}

/// Confidence tier derived from the score percentage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchQuality {
    Excellent,
    Strong,
    Probable,
    Weak,
}

impl std::fmt::Display for MatchQuality {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MatchQuality::Excellent => write!(f, "excellent"),
            MatchQuality::Strong => write!(f, "strong"),
            MatchQuality::Probable => write!(f, "probable"),
            MatchQuality::Weak => write!(f, "weak"),
        }
    }
}

/// The scorer's verdict for one (contact, property) pair: the best
/// percentage found across all name variations and both name fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchScore {
    /// 0-100.
    pub percentage: u8,
    pub match_type: MatchType,
    pub matched_field: NameField,
    /// The variation (or matched components, for component matches) that
    /// produced the winning score. Empty when nothing matched.
    pub matched_variation: String,
}

impl MatchScore {
    pub fn none() -> Self {
        Self {
            percentage: 0,
            match_type: MatchType::None,
            matched_field: NameField::Owner,
            matched_variation: String::new(),
        }
    }

    pub fn quality(&self) -> MatchQuality {
        match self.percentage {
            95..=100 => MatchQuality::Excellent,
            85..=94 => MatchQuality::Strong,
            70..=84 => MatchQuality::Probable,
            _ => MatchQuality::Weak,
        }
    }
}

/// One confirmed, scored property match. Immutable once created.
#[derive(Debug, Clone, Serialize)]
pub struct MatchResult {
    pub contact: Contact,
    pub detail: PropertyDetail,
    /// The name variation whose search surfaced this property.
    pub triggered_by: String,
    pub score: MatchScore,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quality_tiers() {
        let mut score = MatchScore::none();
        assert_eq!(score.quality(), MatchQuality::Weak);
        score.percentage = 70;
        assert_eq!(score.quality(), MatchQuality::Probable);
        score.percentage = 85;
        assert_eq!(score.quality(), MatchQuality::Strong);
        score.percentage = 100;
        assert_eq!(score.quality(), MatchQuality::Excellent);
    }

    #[test]
    fn region_accepts_legacy_key_casing() {
        let r: Region = serde_json::from_str(r#"{"state_FIPS":"27","county_FIPS":"053"}"#).unwrap();
        assert_eq!(r.state_fips.as_deref(), Some("27"));
        assert_eq!(r.county_fips.as_deref(), Some("053"));
    }
}
