//! Lazy name resolution.
//!
//! Operators type abbreviations, so card names are compared lazily: two
//! names are equal when they agree, ignoring ASCII case, over the length of
//! the shorter one. Decks keep exact ordering internally and every lazy
//! comparison goes through this module.

use crate::Card;
use crate::Category;

/// Outcome of resolving one operator token against a set of candidates
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Resolution {
    /// Exactly one candidate matched
    Unique(Card),
    /// Several candidates matched; names in key order
    Ambiguous(Vec<String>),
    NotFound,
}

/// Case-insensitive equality over the overlapping prefix of `a` and `b`
pub fn lazy_eq(a: &str, b: &str) -> bool {
    a.chars()
        .zip(b.chars())
        .all(|(x, y)| x.to_ascii_lowercase() == y.to_ascii_lowercase())
}

/// Resolve `token` against `candidates`.
///
/// An exact match does not win over longer names sharing the prefix:
/// `atlanta` is ambiguous when `atlantis` is also a candidate.
pub fn resolve<'a, I>(token: &str, candidates: I) -> Resolution
where
    I: IntoIterator<Item = (&'a str, Category)>,
{
    let mut matches: Vec<(&str, Category)> = candidates
        .into_iter()
        .filter(|(name, _)| lazy_eq(token, name))
        .collect();

    match matches.len() {
        0 => Resolution::NotFound,
        1 => {
            let (name, category) = matches[0];
            Resolution::Unique(Card::new(name, category))
        }
        _ => {
            matches.sort_by(|a, b| a.0.cmp(b.0));
            Resolution::Ambiguous(matches.into_iter().map(|(n, _)| n.to_string()).collect())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cities() -> Vec<(&'static str, Category)> {
        vec![
            ("atlanta", Category::Blue),
            ("athens", Category::Black),
            ("miami", Category::Yellow),
        ]
    }

    #[test]
    fn test_lazy_eq_ignores_case_and_length() {
        assert!(lazy_eq("ATL", "atlanta"));
        assert!(lazy_eq("atlanta", "at"));
        assert!(!lazy_eq("atx", "atlanta"));
        assert!(lazy_eq("", "anything"));
    }

    #[test]
    fn test_ambiguous_prefix() {
        let resolution = resolve("at", cities());
        assert_eq!(
            resolution,
            Resolution::Ambiguous(vec!["athens".into(), "atlanta".into()])
        );
    }

    #[test]
    fn test_unique_prefix() {
        let resolution = resolve("atl", cities());
        assert_eq!(
            resolution,
            Resolution::Unique(Card::new("atlanta", Category::Blue))
        );
    }

    #[test]
    fn test_not_found() {
        assert_eq!(resolve("paris", cities()), Resolution::NotFound);
    }

    #[test]
    fn test_exact_match_still_ambiguous() {
        let candidates = vec![("lima", Category::Yellow), ("limassol", Category::Black)];
        match resolve("lima", candidates) {
            Resolution::Ambiguous(names) => assert_eq!(names, vec!["lima", "limassol"]),
            other => panic!("expected ambiguity, got {:?}", other),
        }
    }

    #[test]
    fn test_resolution_is_deterministic() {
        let first = resolve("a", cities());
        for _ in 0..5 {
            assert_eq!(resolve("a", cities()), first);
        }
    }
}
