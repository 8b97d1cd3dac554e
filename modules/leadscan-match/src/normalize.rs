//! Field-value normalization ahead of scoring.

use std::sync::OnceLock;

use regex::Regex;

const HONORIFIC_PREFIXES: &[&str] = &["MR", "MRS", "MS", "MISS", "DR", "PROF", "REV"];

const PERSONAL_SUFFIXES: &[&str] = &["JR", "SR", "II", "III", "IV", "PHD", "MD", "ESQ", "DDS"];

/// Entity markers at the end of an owner/seller field. These records name
/// businesses, not people, and are never personal matches.
const BUSINESS_SUFFIXES: &[&str] = &[
    "LLC",
    "INC",
    "CORP",
    "LTD",
    "LLP",
    "LP",
    "CO",
    "COMPANY",
    "TRUST",
    "ESTATE",
    "PROPERTIES",
    "HOLDINGS",
    "INVESTMENTS",
    "ASSOCIATES",
    "PARTNERS",
    "GROUP",
    "ENTERPRISES",
    "REALTY",
];

fn punctuation() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[\p{P}\p{S}]+").expect("valid regex"))
}

/// Uppercase, strip punctuation, collapse whitespace, and drop honorific
/// prefixes and personal suffixes. Business suffixes are left in place so
/// `is_business_entity` can see them.
pub fn normalize_name(raw: &str) -> String {
    let upper = raw.to_uppercase();
    let cleaned = punctuation().replace_all(&upper, " ");
    let mut tokens: Vec<&str> = cleaned.split_whitespace().collect();

    while tokens.first().is_some_and(|t| HONORIFIC_PREFIXES.contains(t)) {
        tokens.remove(0);
    }
    while tokens.last().is_some_and(|t| PERSONAL_SUFFIXES.contains(t)) {
        tokens.pop();
    }
    tokens.join(" ")
}

/// True when a normalized value ends in a business-entity suffix.
pub fn is_business_entity(normalized: &str) -> bool {
    normalized
        .rsplit(' ')
        .next()
        .is_some_and(|t| BUSINESS_SUFFIXES.contains(&t))
}
