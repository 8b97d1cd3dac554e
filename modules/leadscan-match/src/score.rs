//! Confidence scoring for (contact, property) pairs.
//!
//! The ladder is evaluated per name variation against each name field,
//! keeping the best score seen: exact match, substring containment, token
//! fuzzy similarity, then a component-overlap fallback for weak results.

use std::collections::BTreeSet;

use leadscan_common::{MatchScore, MatchType, NameField, PropertyDetail};

use crate::name::NameParts;
use crate::normalize::{is_business_entity, normalize_name};

const EXACT_SUBSTRING_THRESHOLD: u8 = 80;
const FUZZY_THRESHOLD: u8 = 70;

/// Substring scores are capped below a perfect match.
const SUBSTRING_CAP: usize = 95;

/// Component fallback only runs when nothing stronger reached this score.
const COMPONENT_TRIGGER: u8 = 60;

/// Name components this short carry no signal on their own.
const MIN_COMPONENT_CHARS: usize = 2;

/// Inclusion thresholds for the scoring ladder.
#[derive(Debug, Clone)]
pub struct ScoreConfig {
    /// Minimum percentage for a component-level match to be included.
    pub component_threshold: u8,
}

impl Default for ScoreConfig {
    fn default() -> Self {
        Self {
            component_threshold: 60,
        }
    }
}

/// Score one contact against one field value.
pub fn score_field(
    variations: &[String],
    parts: &NameParts,
    field_value: &str,
    field: NameField,
) -> MatchScore {
    let value = normalize_name(field_value);
    if value.is_empty() || is_business_entity(&value) {
        return empty_score(field);
    }

    let mut best = empty_score(field);

    for variation in variations {
        let candidate = normalize_name(variation);
        if candidate.is_empty() {
            continue;
        }

        if candidate == value {
            return MatchScore {
                percentage: 100,
                match_type: MatchType::Exact,
                matched_field: field,
                matched_variation: candidate,
            };
        }

        if value.contains(&candidate) {
            let pct = substring_pct(candidate.chars().count(), value.chars().count());
            if pct > best.percentage {
                best = MatchScore {
                    percentage: pct,
                    match_type: MatchType::Substring,
                    matched_field: field,
                    matched_variation: candidate.clone(),
                };
            }
        }

        let pct = (fuzzy_similarity(&candidate, &value) * 100.0).round() as u8;
        if pct > best.percentage {
            best = MatchScore {
                percentage: pct,
                match_type: MatchType::Fuzzy,
                matched_field: field,
                matched_variation: candidate.clone(),
            };
        }
    }

    if best.percentage < COMPONENT_TRIGGER {
        if let Some(component) = component_score(parts, &value, field) {
            if component.percentage > best.percentage {
                best = component;
            }
        }
    }

    best
}

/// Score a (contact, property) pair: the better of the owner-of-record and
/// seller-of-record fields. Deterministic for identical inputs.
pub fn score_property(
    variations: &[String],
    parts: &NameParts,
    detail: &PropertyDetail,
) -> MatchScore {
    let owner = detail
        .owner_names
        .as_deref()
        .map(|v| score_field(variations, parts, v, NameField::Owner));
    let seller = detail
        .seller_name
        .as_deref()
        .map(|v| score_field(variations, parts, v, NameField::Seller));

    match (owner, seller) {
        (Some(o), Some(s)) => {
            if s.percentage > o.percentage {
                s
            } else {
                o
            }
        }
        (Some(o), None) => o,
        (None, Some(s)) => s,
        (None, None) => MatchScore::none(),
    }
}

/// Whether a score clears its match type's inclusion threshold.
pub fn should_include(score: &MatchScore, config: &ScoreConfig) -> bool {
    match score.match_type {
        MatchType::Exact | MatchType::Substring => score.percentage >= EXACT_SUBSTRING_THRESHOLD,
        MatchType::Fuzzy => score.percentage >= FUZZY_THRESHOLD,
        MatchType::Component => score.percentage >= config.component_threshold,
        MatchType::None => false,
    }
}

fn empty_score(field: NameField) -> MatchScore {
    MatchScore {
        percentage: 0,
        match_type: MatchType::None,
        matched_field: field,
        matched_variation: String::new(),
    }
}

/// Coverage of the field value by a contained variation, capped below a
/// perfect match.
fn substring_pct(candidate_chars: usize, value_chars: usize) -> u8 {
    let pct = (100.0 * candidate_chars as f64 / value_chars as f64).round() as usize;
    pct.min(SUBSTRING_CAP) as u8
}

/// Max of simple, token-sort, and token-set similarity, each in 0..=1.
fn fuzzy_similarity(a: &str, b: &str) -> f64 {
    let simple = strsim::normalized_levenshtein(a, b);
    let sorted = strsim::normalized_levenshtein(&token_sort(a), &token_sort(b));
    let set = token_set_similarity(a, b);
    simple.max(sorted).max(set)
}

fn token_sort(value: &str) -> String {
    let mut tokens: Vec<&str> = value.split_whitespace().collect();
    tokens.sort_unstable();
    tokens.join(" ")
}

/// Token-set similarity: compare the shared-token core against each side's
/// core-plus-remainder, and the remainders against each other.
fn token_set_similarity(a: &str, b: &str) -> f64 {
    let tokens_a: BTreeSet<&str> = a.split_whitespace().collect();
    let tokens_b: BTreeSet<&str> = b.split_whitespace().collect();

    let core = join_tokens(tokens_a.intersection(&tokens_b).copied());
    let only_a = join_tokens(tokens_a.difference(&tokens_b).copied());
    let only_b = join_tokens(tokens_b.difference(&tokens_a).copied());

    let full_a = join_pair(&core, &only_a);
    let full_b = join_pair(&core, &only_b);

    let mut best = strsim::normalized_levenshtein(&full_a, &full_b);
    if !core.is_empty() {
        best = best
            .max(strsim::normalized_levenshtein(&core, &full_a))
            .max(strsim::normalized_levenshtein(&core, &full_b));
    }
    best
}

fn join_tokens<'a>(tokens: impl Iterator<Item = &'a str>) -> String {
    tokens.collect::<Vec<_>>().join(" ")
}

fn join_pair(core: &str, rest: &str) -> String {
    match (core.is_empty(), rest.is_empty()) {
        (true, _) => rest.to_string(),
        (_, true) => core.to_string(),
        _ => format!("{core} {rest}"),
    }
}

/// Fallback for weak ladder results: fraction of meaningful name components
/// contained in the field value, scaled to a 60-point ceiling.
fn component_score(parts: &NameParts, value: &str, field: NameField) -> Option<MatchScore> {
    let components: Vec<String> = [&parts.first, &parts.middle, &parts.last]
        .into_iter()
        .map(|c| normalize_name(c))
        .filter(|c| c.chars().count() > MIN_COMPONENT_CHARS)
        .collect();
    if components.is_empty() {
        return None;
    }

    let matched: Vec<&str> = components
        .iter()
        .filter(|c| value.contains(c.as_str()))
        .map(|c| c.as_str())
        .collect();
    if matched.is_empty() {
        return None;
    }

    let pct = (60 * matched.len() / components.len()) as u8;
    Some(MatchScore {
        percentage: pct,
        match_type: MatchType::Component,
        matched_field: field,
        matched_variation: matched.join(" "),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::name::name_variations;

    fn scored(first: &str, middle: &str, last: &str, field_value: &str) -> MatchScore {
        let parts = NameParts::new(first, middle, last);
        let variations = name_variations(&parts);
        score_field(&variations, &parts, field_value, NameField::Owner)
    }

    // --- ladder rungs ---

    #[test]
    fn exact_match_scores_100() {
        let score = scored("John", "", "Smith", "JOHN SMITH");
        assert_eq!(score.percentage, 100);
        assert_eq!(score.match_type, MatchType::Exact);
        assert_eq!(score.matched_variation, "JOHN SMITH");
    }

    #[test]
    fn exact_match_ignores_case_and_punctuation() {
        let score = scored("John", "", "Smith", "  smith,   john ");
        assert_eq!(score.percentage, 100);
        assert_eq!(score.match_type, MatchType::Exact);
    }

    #[test]
    fn substring_match_scales_with_coverage() {
        // "SMITH JOHN" (10 chars) inside "SMITH JOHNSTONE" (15 chars) = 67.
        let parts = NameParts::new("John", "", "Smith");
        let variations = vec!["Smith John".to_string()];
        let score = score_field(&variations, &parts, "SMITH JOHNSTONE", NameField::Owner);
        assert_eq!(score.match_type, MatchType::Substring);
        assert_eq!(score.percentage, 67);
    }

    #[test]
    fn substring_pct_rounds_and_caps() {
        assert_eq!(substring_pct(10, 15), 67);
        assert_eq!(substring_pct(10, 12), 83);
        // Near-total coverage stays below a perfect match.
        assert_eq!(substring_pct(22, 23), 95);
        assert_eq!(substring_pct(40, 40), 95);
    }

    #[test]
    fn business_entities_never_match() {
        for value in ["Smith Properties LLC", "SMITH FAMILY TRUST", "Smith Holdings"] {
            let score = scored("John", "", "Smith", value);
            assert_eq!(score.percentage, 0, "{value}");
            assert_eq!(score.match_type, MatchType::None);
        }
    }

    #[test]
    fn empty_field_scores_none() {
        let score = scored("John", "", "Smith", "   ");
        assert_eq!(score.match_type, MatchType::None);
        assert_eq!(score.percentage, 0);
    }

    #[test]
    fn fuzzy_match_tolerates_token_reordering() {
        // No generated variation equals "DOE M JANE", but token-sort order does.
        let score = scored("Jane", "Mary", "Doe", "DOE M JANE");
        assert_eq!(score.match_type, MatchType::Fuzzy);
        assert_eq!(score.percentage, 100);
    }

    #[test]
    fn component_fallback_fires_when_ladder_is_weak() {
        // "SMITHSON" appears only inside "SMITHSONIAN", so no token matches
        // and the fuzzy rungs stay low; the contained component still counts.
        let parts = NameParts::new("Jo", "", "Smithson");
        let variations = name_variations(&parts);
        let score = score_field(
            &variations,
            &parts,
            "SMITHSONIAN ACQUISITION VENTURES OF MAINE",
            NameField::Owner,
        );
        assert_eq!(score.match_type, MatchType::Component);
        assert_eq!(score.percentage, 60);
        assert_eq!(score.matched_variation, "SMITHSON");
    }

    #[test]
    fn component_score_scales_with_matched_fraction() {
        let parts = NameParts::new("Jonathan", "", "Smithson");
        let score = component_score(&parts, "SMITHSONIAN ARCHIVE", NameField::Owner)
            .expect("one component matches");
        // One of two meaningful components matched.
        assert_eq!(score.percentage, 30);
    }

    // --- pair scoring ---

    fn detail(owner: Option<&str>, seller: Option<&str>) -> PropertyDetail {
        PropertyDetail {
            property_id: "1".to_string(),
            owner_names: owner.map(String::from),
            seller_name: seller.map(String::from),
            street_address: None,
            county: None,
            state: None,
            sale_date: None,
        }
    }

    #[test]
    fn pair_score_takes_the_better_field() {
        let parts = NameParts::new("Jane", "Mary", "Doe");
        let variations = name_variations(&parts);
        let score = score_property(
            &variations,
            &parts,
            &detail(Some("UNRELATED PERSON"), Some("DOE JANE MARY")),
        );
        assert_eq!(score.matched_field, NameField::Seller);
        assert_eq!(score.percentage, 100);
    }

    #[test]
    fn pair_score_records_owner_field_on_tie() {
        let parts = NameParts::new("Jane", "", "Doe");
        let variations = name_variations(&parts);
        let score = score_property(
            &variations,
            &parts,
            &detail(Some("JANE DOE"), Some("JANE DOE")),
        );
        assert_eq!(score.matched_field, NameField::Owner);
    }

    #[test]
    fn scoring_is_idempotent() {
        let parts = NameParts::new("Jane", "Mary", "Doe");
        let variations = name_variations(&parts);
        let d = detail(Some("DOE JANE M"), Some("SMITH ASSOCIATES LLC"));
        let first = score_property(&variations, &parts, &d);
        let second = score_property(&variations, &parts, &d);
        assert_eq!(first, second);
    }

    #[test]
    fn end_to_end_owner_of_record_scenario() {
        let parts = NameParts::from_display_name("Jane Mary Doe");
        let variations = name_variations(&parts);
        let score = score_property(
            &variations,
            &parts,
            &detail(Some("DOE JANE MARY"), None),
        );
        assert!(matches!(
            score.match_type,
            MatchType::Exact | MatchType::Substring
        ));
        assert!(score.percentage >= 95);
        assert_eq!(score.matched_field, NameField::Owner);
    }

    // --- inclusion thresholds ---

    fn synthetic(match_type: MatchType, percentage: u8) -> MatchScore {
        MatchScore {
            percentage,
            match_type,
            matched_field: NameField::Owner,
            matched_variation: String::new(),
        }
    }

    #[test]
    fn fuzzy_threshold_boundary() {
        let config = ScoreConfig::default();
        assert!(should_include(&synthetic(MatchType::Fuzzy, 70), &config));
        assert!(!should_include(&synthetic(MatchType::Fuzzy, 69), &config));
    }

    #[test]
    fn exact_and_substring_require_80() {
        let config = ScoreConfig::default();
        assert!(should_include(&synthetic(MatchType::Substring, 80), &config));
        assert!(!should_include(&synthetic(MatchType::Substring, 79), &config));
        assert!(should_include(&synthetic(MatchType::Exact, 100), &config));
    }

    #[test]
    fn component_threshold_is_configurable() {
        let strict = ScoreConfig {
            component_threshold: 60,
        };
        let lenient = ScoreConfig {
            component_threshold: 50,
        };
        let borderline = synthetic(MatchType::Component, 55);
        assert!(!should_include(&borderline, &strict));
        assert!(should_include(&borderline, &lenient));

        let full = synthetic(MatchType::Component, 60);
        assert!(should_include(&full, &strict));
        assert!(should_include(&full, &lenient));
    }

    #[test]
    fn none_is_never_included() {
        let config = ScoreConfig::default();
        assert!(!should_include(&synthetic(MatchType::None, 100), &config));
    }
}
