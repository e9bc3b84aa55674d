//! Location confidence scoring.
//!
//! Maps a normalised location string to a score in `0..=100`. Rules are
//! evaluated in priority order and the first match wins:
//!
//! | rule | signal                                        | score |
//! |------|-----------------------------------------------|-------|
//! | 1    | contains the country name                     | 100   |
//! | 2    | contains the capital                          | 85    |
//! | 3    | a regional city as a whole token              | 75    |
//! | 4    | `ug` as a standalone token, or `u.g.`         | 50    |
//! | 5    | nothing                                       | 0     |
//!
//! [`is_likely_location`] additionally rejects strings that also name a
//! conflicting country, which is how multi-country profiles show up.

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use super::normalize::normalize_location;

/// Full name of the target country.
pub const TARGET_COUNTRY: &str = "uganda";

/// Capital and primary city.
pub const PRIMARY_CITY: &str = "kampala";

/// Known cities, primary first.
pub const KNOWN_CITIES: &[&str] = &[
    PRIMARY_CITY,
    "entebbe",
    "jinja",
    "gulu",
    "mbarara",
    "mbale",
    "lira",
    "masaka",
    "arua",
    "soroti",
    "fort portal",
    "kasese",
    "hoima",
    "mukono",
    "wakiso",
    "kabale",
    "tororo",
    "iganga",
    "busia",
    "kitgum",
    "moroto",
    "masindi",
    "mityana",
    "lugazi",
    "njeru",
    "kira",
    "nansana",
    "bushenyi",
    "ntungamo",
    "rukungiri",
    "kabarole",
];

/// Other nations whose mention makes a match unreliable.
const CONFLICTING_COUNTRIES: &[&str] = &[
    "kenya",
    "tanzania",
    "rwanda",
    "south sudan",
    "nigeria",
    "ghana",
    "south africa",
    "india",
    "united states",
    "usa",
    "united kingdom",
    "canada",
    "germany",
];

/// Two-letter codes of the neighbouring countries.
const CONFLICTING_CODES: &[&str] = &["ke", "tz", "rw", "ng"];

pub const SCORE_COUNTRY: u8 = 100;
pub const SCORE_PRIMARY_CITY: u8 = 85;
pub const SCORE_REGIONAL_CITY: u8 = 75;
pub const SCORE_ABBREVIATION: u8 = 50;

/// Alternation of whole words, bounded by non-letters or the string edges.
fn whole_word_pattern(words: &[&str]) -> String {
    let alternation = words
        .iter()
        .map(|w| regex::escape(w))
        .collect::<Vec<_>>()
        .join("|");
    format!(r"(?:^|\P{{L}})(?:{alternation})(?:$|\P{{L}})")
}

/// Alternation of codes preceded by `", "` or `" "` and followed by a
/// comma, a space or the end.
fn standalone_code_pattern(codes: &[&str]) -> String {
    let alternation = codes
        .iter()
        .map(|c| regex::escape(c))
        .collect::<Vec<_>>()
        .join("|");
    format!(r"(?:, | )(?:{alternation})(?:,| |$)")
}

fn regional_city_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(&whole_word_pattern(&KNOWN_CITIES[1..])).expect("valid regex")
    })
}

fn abbreviation_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        let pattern = format!(
            r"{}|(?:^|\P{{L}})u\.g\.(?:$|\P{{L}})",
            standalone_code_pattern(&["ug"])
        );
        Regex::new(&pattern).expect("valid regex")
    })
}

fn conflict_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        let pattern = format!(
            "{}|{}",
            whole_word_pattern(CONFLICTING_COUNTRIES),
            standalone_code_pattern(CONFLICTING_CODES)
        );
        Regex::new(&pattern).expect("valid regex")
    })
}

/// Score a normalised location. First matching rule wins.
pub fn score_location(normalized: &str) -> u8 {
    if normalized.contains(TARGET_COUNTRY) {
        SCORE_COUNTRY
    } else if normalized.contains(PRIMARY_CITY) {
        SCORE_PRIMARY_CITY
    } else if regional_city_regex().is_match(normalized) {
        SCORE_REGIONAL_CITY
    } else if abbreviation_regex().is_match(normalized) {
        SCORE_ABBREVIATION
    } else {
        0
    }
}

/// Whether the normalised location mentions a conflicting country.
pub fn has_conflicting_marker(normalized: &str) -> bool {
    conflict_regex().is_match(normalized)
}

/// Whether a normalised location should be accepted as the target region.
///
/// Requires a positive score and no conflicting country marker.
pub fn is_likely_location(normalized: &str) -> bool {
    score_location(normalized) > 0 && !has_conflicting_marker(normalized)
}

/// Combined result of normalising and scoring one raw location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationAssessment {
    pub normalized: String,
    pub score: u8,
    pub is_likely: bool,
}

/// Normalise, score and classify a raw location.
pub fn assess_location(raw: Option<&str>) -> LocationAssessment {
    let normalized = normalize_location(raw);
    let score = score_location(&normalized);
    let is_likely = score > 0 && !has_conflicting_marker(&normalized);
    LocationAssessment {
        normalized,
        score,
        is_likely,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn country_name_scores_100() {
        assert_eq!(score_location("uganda"), 100);
        assert_eq!(score_location("kampala, uganda"), 100);
        assert_eq!(score_location("somewhere in east africa, uganda"), 100);
    }

    #[test]
    fn country_beats_abbreviation() {
        assert_eq!(score_location("uganda, ug"), 100);
        assert_eq!(score_location("jinja ug uganda"), 100);
    }

    #[test]
    fn known_cities_score_by_rank() {
        for city in KNOWN_CITIES {
            let expected = if *city == PRIMARY_CITY { 85 } else { 75 };
            assert_eq!(score_location(city), expected, "city {city}");
        }
    }

    #[test]
    fn capital_beats_regional_city() {
        assert_eq!(score_location("kampala / entebbe"), 85);
    }

    #[test]
    fn regional_city_needs_whole_token() {
        assert_eq!(score_location("gulu"), 75);
        assert_eq!(score_location("near gulu, north"), 75);
        assert_eq!(score_location("gulumbe"), 0);
        assert_eq!(score_location("ajira"), 0);
        assert_eq!(score_location("kiran"), 0);
        assert_eq!(score_location("lira-town"), 75);
    }

    #[test]
    fn standalone_abbreviation_scores_50() {
        assert_eq!(score_location("remote ug"), 50);
        assert_eq!(score_location("east africa, ug"), 50);
        assert_eq!(score_location("east africa, ug, earth"), 50);
        assert_eq!(score_location("home u.g."), 50);
        assert_eq!(score_location("u.g."), 50);
    }

    #[test]
    fn abbreviation_inside_word_ignored() {
        assert_eq!(score_location("hamburg"), 0);
        assert_eq!(score_location("pittsburgh"), 0);
        assert_eq!(score_location("the ugly duckling"), 0);
        assert_eq!(score_location("bug city"), 0);
        assert!(!is_likely_location("hamburg"));
    }

    #[test]
    fn abbreviation_at_start_is_not_standalone() {
        assert_eq!(score_location("ug based"), 0);
    }

    #[test]
    fn empty_scores_zero() {
        assert_eq!(score_location(""), 0);
        assert!(!is_likely_location(""));
    }

    #[test]
    fn conflicting_country_overrides_likely() {
        let location = "nairobi, kenya / kampala, uganda";
        assert_eq!(score_location(location), 100);
        assert!(!is_likely_location(location));
    }

    #[test]
    fn conflicting_code_overrides_likely() {
        assert!(!is_likely_location("kampala, ke"));
        assert!(!is_likely_location("uganda ng"));
    }

    #[test]
    fn conflicting_name_needs_whole_token() {
        assert!(is_likely_location("indiana ave, kampala"));
        assert!(is_likely_location("kampala, uganda"));
    }

    #[test]
    fn kampala_ug_end_to_end() {
        let assessment = assess_location(Some("  Kampala UG  "));
        assert_eq!(assessment.normalized, "kampala, uganda");
        assert_eq!(assessment.score, 100);
        assert!(assessment.is_likely);
    }

    #[test]
    fn assess_matches_individual_functions() {
        for raw in ["Gulu", "Nairobi, Kenya", "UG", "Berlin", "Lira, UG 🇺🇬"] {
            let assessment = assess_location(Some(raw));
            assert_eq!(assessment.score, score_location(&assessment.normalized));
            assert_eq!(
                assessment.is_likely,
                is_likely_location(&assessment.normalized)
            );
        }
    }

    #[test]
    fn scoring_is_idempotent_through_normalize() {
        for raw in ["  Kampala UG  ", "Entebbe", "Somewhere, ug", "🌍"] {
            let first = assess_location(Some(raw));
            let second = assess_location(Some(&first.normalized));
            assert_eq!(first, second);
        }
    }
}
