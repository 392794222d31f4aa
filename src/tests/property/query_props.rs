//! Property-based tests for query building
//!
//! Tests invariants:
//! - Query terms never contain forbidden punctuation or `#`
//! - Every hashtag carries the escape sequence
//! - The expression is empty exactly when no term survives

use proptest::prelude::*;

use crate::core::search::query::FORBIDDEN_CHARS;
use crate::tests::common::search;

proptest! {
    /// Property: free terms are clean words
    #[test]
    fn prop_terms_have_no_punctuation(raw in "[a-z #!?.,;:()_'\"-]{0,40}") {
        let query = search().build_query(&raw, Some("simple"));
        for term in query.expression.terms() {
            prop_assert!(!term.is_empty());
            prop_assert!(!term.contains('#'));
            prop_assert!(!term.chars().any(|c| FORBIDDEN_CHARS.contains(c) || c.is_whitespace()));
        }
    }

    /// Property: hashtags are escaped and unique
    #[test]
    fn prop_hashtags_are_escaped(tags in proptest::collection::vec("[a-z]{1,6}", 1..5)) {
        let raw = tags.iter().map(|t| format!("#{t}")).collect::<Vec<_>>().join(" ");
        let query = search().build_query(&raw, Some("simple"));
        let escape = search().hashtags().escape_sequence();

        let hashtags = query.expression.hashtags();
        prop_assert!(!hashtags.is_empty());
        prop_assert!(query.expression.terms().is_empty());
        for hashtag in hashtags {
            prop_assert!(hashtag.starts_with(escape));
        }
        let mut unique = hashtags.to_vec();
        unique.dedup();
        prop_assert_eq!(unique.len(), hashtags.len());
    }

    /// Property: only punctuation and whitespace yields the empty query
    #[test]
    fn prop_punctuation_only_is_empty(raw in "[ !?.,;:()_'\"-]{0,20}") {
        let query = search().build_query(&raw, Some("simple"));
        prop_assert!(query.is_empty());
        prop_assert_eq!(query.expression.to_string(), "");
    }
}
