//! Property-based tests for Term Vectors
//!
//! Tests invariants:
//! - Serialized vectors parse back to the same vector
//! - Concatenation is associative and matches the n-ary form
//! - Concatenation never changes its inputs
//! - Built vectors only use positions the tokenizer produced

use proptest::prelude::*;

use crate::core::search::{
    concatenate, PositionTag, TermVector, Tokenizer, Weight, WordTokenizer,
};
use crate::tests::common::search;

// ============================================================================
// Strategies
// ============================================================================

fn arb_weight() -> impl Strategy<Value = Weight> {
    prop_oneof![
        Just(Weight::A),
        Just(Weight::B),
        Just(Weight::C),
        Just(Weight::D),
    ]
}

/// Vectors with small positions so concatenations stay below the cap.
fn arb_vector() -> impl Strategy<Value = TermVector> {
    proptest::collection::vec(
        ("[a-zł'\\\\]{1,6}", proptest::collection::vec((1u32..50, arb_weight()), 1..4)),
        0..6,
    )
    .prop_map(|entries| {
        let mut vector = TermVector::new();
        for (stem, tags) in entries {
            for (position, weight) in tags {
                vector.insert(stem.clone(), PositionTag::new(position, weight));
            }
        }
        vector
    })
}

fn arb_profile() -> impl Strategy<Value = &'static str> {
    prop_oneof![Just("simple"), Just("english"), Just("polish")]
}

fn arb_words() -> impl Strategy<Value = String> {
    proptest::collection::vec("[a-zA-Ząćęłńóśźż]{1,8}(-[a-z]{1,4})?", 0..20)
        .prop_map(|words| words.join(" "))
}

// ============================================================================
// Property Tests
// ============================================================================

proptest! {
    /// Property: text format round-trips
    #[test]
    fn prop_parse_serialize_roundtrip(vector in arb_vector()) {
        let text = vector.to_string();
        let parsed: TermVector = text.parse().unwrap();
        prop_assert_eq!(&parsed, &vector, "round-trip through '{}'", text);
    }

    /// Property: pairwise concatenation is associative
    #[test]
    fn prop_concat_is_associative(
        a in arb_vector(),
        b in arb_vector(),
        c in arb_vector()
    ) {
        let left = a.concat(&b).concat(&c);
        let right = a.concat(&b.concat(&c));
        prop_assert_eq!(&left, &right);
        prop_assert_eq!(&left, &concatenate([&a, &b, &c]));
    }

    /// Property: inputs are untouched and the first keeps its positions
    #[test]
    fn prop_concat_preserves_inputs(a in arb_vector(), b in arb_vector()) {
        let (a_before, b_before) = (a.clone(), b.clone());
        let joined = a.concat(&b);

        prop_assert_eq!(&a, &a_before);
        prop_assert_eq!(&b, &b_before);
        for (stem, positions) in a.iter() {
            let joined_positions = joined.get(stem).unwrap();
            for tag in positions.iter() {
                prop_assert!(joined_positions.contains(tag.position));
            }
        }
        prop_assert_eq!(joined.max_position(), a.max_position() + b.max_position());
    }

    /// Property: every position lies in [1, token count] whatever the
    /// stemming strategy, including unaccented alternates and compounds
    #[test]
    fn prop_positions_within_token_count(
        profile in arb_profile(),
        text in arb_words()
    ) {
        let token_count = WordTokenizer.tokenize(profile, &text).unwrap().len();
        let vector = search().build_vector(profile, &text, None).unwrap();

        for (stem, positions) in vector.iter() {
            for tag in positions.iter() {
                prop_assert!(
                    tag.position >= 1 && (tag.position as usize) <= token_count,
                    "{}: stem '{}' at {} outside 1..={}", profile, stem, tag.position, token_count
                );
            }
        }
    }

    /// Property: a weight applies to every position
    #[test]
    fn prop_weight_applies_everywhere(text in arb_words(), weight in arb_weight()) {
        let vector = search().build_vector("english", &text, Some(weight)).unwrap();
        for (_, positions) in vector.iter() {
            prop_assert!(positions.iter().all(|tag| tag.weight == weight));
        }
        prop_assert_eq!(vector.with_weight(Weight::D).len(), vector.len());
    }
}
