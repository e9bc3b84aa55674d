//! Canonicalisation of free-text profile locations.
//!
//! Users write locations however they like: padded, emoji-decorated,
//! mixed case, or as a bare country code. [`normalize_location`] reduces
//! all of that to one lowercase, single-spaced form and expands a small
//! table of exact-match aliases so the scorer sees canonical names.

use std::sync::OnceLock;

use regex::Regex;

/// Pictographs, flag halves, skin-tone modifiers, keycap and joiner marks.
const EMOJI_PATTERN: &str =
    r"[\p{Extended_Pictographic}\x{1F1E6}-\x{1F1FF}\x{1F3FB}-\x{1F3FF}\x{FE0F}\x{200D}\x{20E3}]";

fn emoji_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(EMOJI_PATTERN).expect("emoji pattern is valid"))
}

fn whitespace_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s+").expect("whitespace pattern is valid"))
}

/// Exact-match alias expansion.
///
/// Keys are already normalised; no canonical value is itself a key, which
/// keeps normalisation idempotent.
fn alias(normalized: &str) -> Option<&'static str> {
    let canonical = match normalized {
        "ug" | "u.g." => "uganda",
        "kla" | "kampala ug" | "kampala, ug" | "kampala-ug" => "kampala, uganda",
        "entebbe ug" | "entebbe, ug" => "entebbe, uganda",
        "jinja ug" | "jinja, ug" => "jinja, uganda",
        "gulu ug" | "gulu, ug" => "gulu, uganda",
        "mbarara ug" | "mbarara, ug" => "mbarara, uganda",
        _ => return None,
    };
    Some(canonical)
}

/// Normalise a raw location string.
///
/// Steps, in order: absent becomes empty; trim; strip emoji; collapse
/// whitespace runs to one space; trim; lowercase; expand exact aliases.
pub fn normalize_location(raw: Option<&str>) -> String {
    let trimmed = raw.unwrap_or_default().trim();
    let without_emoji = emoji_regex().replace_all(trimmed, "");
    let collapsed = whitespace_regex().replace_all(&without_emoji, " ");
    let lowered = collapsed.trim().to_lowercase();
    match alias(&lowered) {
        Some(canonical) => canonical.to_owned(),
        None => lowered,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_is_empty() {
        assert_eq!(normalize_location(None), "");
        assert_eq!(normalize_location(Some("")), "");
        assert_eq!(normalize_location(Some("   \t\n")), "");
    }

    #[test]
    fn padded_city_with_code_expands() {
        assert_eq!(normalize_location(Some("  Kampala UG  ")), "kampala, uganda");
    }

    #[test]
    fn bare_code_expands() {
        assert_eq!(normalize_location(Some("UG")), "uganda");
        assert_eq!(normalize_location(Some("U.G.")), "uganda");
    }

    #[test]
    fn alias_is_exact_match_only() {
        assert_eq!(normalize_location(Some("ug based")), "ug based");
        assert_eq!(normalize_location(Some("near kampala ug")), "near kampala ug");
    }

    #[test]
    fn emoji_removed() {
        assert_eq!(normalize_location(Some("Kampala 🇺🇬")), "kampala");
        assert_eq!(normalize_location(Some("🌍 Jinja ✨ Uganda")), "jinja uganda");
        assert_eq!(normalize_location(Some("Gulu 👋🏽")), "gulu");
    }

    #[test]
    fn whitespace_collapsed() {
        assert_eq!(
            normalize_location(Some("Fort   Portal,\t\tUganda")),
            "fort portal, uganda"
        );
    }

    #[test]
    fn emoji_between_words_leaves_single_space() {
        assert_eq!(normalize_location(Some("Mbarara 🏔️ UG")), "mbarara, uganda");
    }

    #[test]
    fn digits_and_punctuation_kept() {
        assert_eq!(normalize_location(Some("Plot 12, Kira Rd")), "plot 12, kira rd");
    }

    #[test]
    fn normalize_is_idempotent() {
        let samples = [
            "  Kampala UG  ",
            "UG",
            "kla",
            "🇺🇬",
            "Entebbe,  UG",
            "Nairobi, Kenya",
            "  MiXeD   Case 🙂 ",
            "",
        ];
        for raw in samples {
            let once = normalize_location(Some(raw));
            let twice = normalize_location(Some(&once));
            assert_eq!(once, twice, "not idempotent for {raw:?}");
        }
    }

    #[test]
    fn alias_values_are_not_keys() {
        for key in [
            "ug",
            "u.g.",
            "kla",
            "kampala ug",
            "kampala, ug",
            "kampala-ug",
            "entebbe ug",
            "jinja, ug",
            "gulu ug",
            "mbarara, ug",
        ] {
            let canonical = alias(key).expect("key should have an alias");
            assert!(alias(canonical).is_none(), "{canonical} is also a key");
        }
    }
}
