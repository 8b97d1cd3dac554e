//! Contact name splitting and search-variation generation.

use std::collections::HashSet;

/// Words that mark a junk contact record rather than a person.
const BLOCKED_WORDS: &[&str] = &["user", "new", "street", "avenue"];

/// First/middle/last components derived from a display name by position:
/// one token is a bare last name, two are first/last, exactly three are
/// first/middle/last, and longer names keep only the outermost tokens.
/// Suffixes (Jr., III) and multi-word surnames are not special-cased.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NameParts {
    pub first: String,
    pub middle: String,
    pub last: String,
}

impl NameParts {
    pub fn new(first: &str, middle: &str, last: &str) -> Self {
        Self {
            first: first.trim().to_string(),
            middle: middle.trim().to_string(),
            last: last.trim().to_string(),
        }
    }

    pub fn from_display_name(name: &str) -> Self {
        let tokens: Vec<&str> = name.split_whitespace().collect();
        match tokens.as_slice() {
            [] => Self::default(),
            [last] => Self::new("", "", last),
            [first, last] => Self::new(first, "", last),
            [first, middle, last] => Self::new(first, middle, last),
            [first, .., last] => Self::new(first, "", last),
        }
    }
}

/// Expand name components into the deduplicated set of search variations.
/// Returns an empty vec for invalid names; never errors.
pub fn name_variations(parts: &NameParts) -> Vec<String> {
    let first = parts.first.trim();
    let middle = parts.middle.trim();
    let last = parts.last.trim();

    if !is_alphabetic(first) || !is_alphabetic(last) {
        return Vec::new();
    }
    if !middle.is_empty() && !is_alphabetic(middle) {
        return Vec::new();
    }
    if is_blocked(first) || is_blocked(last) {
        return Vec::new();
    }

    let first_len = first.chars().count();
    let last_len = last.chars().count();
    if first_len < 2 || last_len < 2 {
        return Vec::new();
    }

    let mut variations = Vec::new();
    if !middle.is_empty() {
        variations.push(format!("{first} {middle} {last}"));
        variations.push(format!("{last} {first} {middle}"));
        variations.push(format!("{last} {middle} {first}"));
        variations.push(format!("{first} {last}"));
        variations.push(format!("{last} {first}"));
        if middle.chars().count() > 1 {
            if let Some(initial) = middle.chars().next() {
                variations.push(format!("{first} {initial} {last}"));
                variations.push(format!("{last} {first} {initial}"));
            }
        }
    } else if last_len > 1 {
        if first_len >= 3 {
            // Partial first names tolerate truncated records at the source.
            for k in 3..=first_len {
                let prefix: String = first.chars().take(k).collect();
                variations.push(format!("{last} {prefix}"));
                variations.push(format!("{prefix} {last}"));
            }
        } else if first_len == 2 && last_len > 2 {
            variations.push(format!("{first} {last}"));
        }
    } else if first_len > 2 {
        variations.push(format!("{last} {first}"));
        variations.push(format!("{first} {last}"));
    }

    let mut seen = HashSet::new();
    variations.retain(|v| seen.insert(v.clone()));
    variations
}

fn is_alphabetic(value: &str) -> bool {
    !value.is_empty() && value.chars().all(|c| c.is_alphabetic())
}

fn is_blocked(value: &str) -> bool {
    let lowered = value.trim().to_lowercase();
    lowered.is_empty() || lowered == "." || BLOCKED_WORDS.contains(&lowered.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    // --- splitting ---

    #[test]
    fn splits_two_token_names() {
        let parts = NameParts::from_display_name("Jane Doe");
        assert_eq!(parts, NameParts::new("Jane", "", "Doe"));
    }

    #[test]
    fn splits_three_token_names_with_middle() {
        let parts = NameParts::from_display_name("Jane Mary Doe");
        assert_eq!(parts, NameParts::new("Jane", "Mary", "Doe"));
    }

    #[test]
    fn single_token_is_last_name_only() {
        let parts = NameParts::from_display_name("Cher");
        assert_eq!(parts, NameParts::new("", "", "Cher"));
    }

    #[test]
    fn long_names_keep_outermost_tokens() {
        let parts = NameParts::from_display_name("Jane Mary Louise Doe");
        assert_eq!(parts, NameParts::new("Jane", "", "Doe"));
    }

    // --- validation ---

    #[test]
    fn blocklisted_names_yield_no_variations() {
        for bad in ["user", "User", "new", "street", "avenue", "."] {
            assert!(
                name_variations(&NameParts::new(bad, "", "Doe")).is_empty(),
                "first name {bad:?} should be rejected"
            );
            assert!(
                name_variations(&NameParts::new("Jane", "", bad)).is_empty(),
                "last name {bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn non_alphabetic_names_yield_no_variations() {
        assert!(name_variations(&NameParts::new("Jane3", "", "Doe")).is_empty());
        assert!(name_variations(&NameParts::new("Jane", "M.", "Doe")).is_empty());
        assert!(name_variations(&NameParts::new("", "", "Doe")).is_empty());
    }

    #[test]
    fn one_char_components_yield_no_variations() {
        assert!(name_variations(&NameParts::new("J", "", "Doe")).is_empty());
        assert!(name_variations(&NameParts::new("Jane", "", "D")).is_empty());
    }

    // --- generation ---

    #[test]
    fn middle_name_produces_reorderings() {
        let variations = name_variations(&NameParts::new("Jane", "Mary", "Doe"));
        for expected in [
            "Jane Mary Doe",
            "Doe Jane Mary",
            "Doe Mary Jane",
            "Jane Doe",
            "Doe Jane",
            "Jane M Doe",
            "Doe Jane M",
        ] {
            assert!(variations.contains(&expected.to_string()), "missing {expected:?}");
        }
    }

    #[test]
    fn single_char_middle_skips_initial_forms() {
        let variations = name_variations(&NameParts::new("Jane", "M", "Doe"));
        assert!(variations.contains(&"Jane M Doe".to_string()));
        assert_eq!(variations.len(), 5);
    }

    #[test]
    fn no_middle_produces_prefix_pairs() {
        let variations = name_variations(&NameParts::new("Jonathan", "", "Doe"));
        // Prefixes of length 3 through the full first name, in both orders.
        assert!(variations.contains(&"Doe Jon".to_string()));
        assert!(variations.contains(&"Jon Doe".to_string()));
        assert!(variations.contains(&"Doe Jonathan".to_string()));
        assert!(variations.contains(&"Jonathan Doe".to_string()));
        assert_eq!(variations.len(), 12);
    }

    #[test]
    fn two_char_first_produces_single_pair() {
        let variations = name_variations(&NameParts::new("Jo", "", "Doe"));
        assert_eq!(variations, vec!["Jo Doe".to_string()]);
    }

    #[test]
    fn output_has_no_duplicates() {
        for parts in [
            NameParts::new("Jane", "Mary", "Doe"),
            NameParts::new("Ann", "", "Lee"),
            NameParts::new("Jonathan", "", "Smith"),
        ] {
            let variations = name_variations(&parts);
            let unique: HashSet<&String> = variations.iter().collect();
            assert_eq!(unique.len(), variations.len());
        }
    }

    #[test]
    fn middle_variations_use_only_supplied_components() {
        let parts = NameParts::new("Jane", "Mary", "Doe");
        let components = ["Jane", "Mary", "Doe", "M"];
        for variation in name_variations(&parts) {
            for token in variation.split_whitespace() {
                assert!(components.contains(&token), "unexpected token {token:?}");
            }
        }
    }

    #[test]
    fn prefix_variation_tokens_are_component_prefixes() {
        let parts = NameParts::new("Jonathan", "", "Smith");
        for variation in name_variations(&parts) {
            for token in variation.split_whitespace() {
                assert!(
                    "Jonathan".starts_with(token) || token == "Smith",
                    "unexpected token {token:?}"
                );
            }
        }
    }
}
