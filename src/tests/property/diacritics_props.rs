//! Property-based tests for diacritic handling
//!
//! Tests invariants:
//! - Normalization is idempotent
//! - Folding is idempotent and never grows accents back
//! - Unaccent augmentation only adds folded stems

use proptest::prelude::*;

use crate::core::search::builder::augment_with_unaccents;
use crate::core::search::diacritics::{fold, has_diacritics, normalize};
use crate::core::search::stemmer::Stemmed;
use crate::core::search::{PositionTag, TermVector, Weight};

fn arb_accented() -> impl Strategy<Value = String> {
    "[a-zA-Ząćęłńóśźżéèüößø\u{0301}\u{0308} ]{0,24}"
}

proptest! {
    /// Property: normalize(normalize(x)) == normalize(x)
    #[test]
    fn prop_normalize_is_idempotent(text in arb_accented()) {
        let once = normalize(&text).into_owned();
        prop_assert_eq!(normalize(&once).into_owned(), once);
    }

    /// Property: folded text has nothing left to fold
    #[test]
    fn prop_fold_is_idempotent(text in arb_accented()) {
        let once = fold(&text).into_owned();
        prop_assert_eq!(fold(&once).into_owned(), once.clone());
        prop_assert!(!has_diacritics(&once));
    }

    /// Property: augmentation keeps every stem and only adds folded ones
    #[test]
    fn prop_unaccent_is_monotonic(
        stems in proptest::collection::vec(("[a-ząćęłńóśźż]{1,8}", 1u32..30), 0..10)
    ) {
        let mut vector = TermVector::new();
        for (stem, position) in &stems {
            vector.insert(stem.clone(), PositionTag::new(*position, Weight::D));
        }

        let augmented = augment_with_unaccents(Stemmed {
            vector: vector.clone(),
            tokens: Vec::new(),
        });

        for (stem, positions) in vector.iter() {
            let kept = augmented.get(stem).unwrap();
            for tag in positions.iter() {
                prop_assert!(kept.contains(tag.position));
            }
            let folded = fold(stem);
            let folded_positions = augmented.get(&folded).unwrap();
            for tag in positions.iter() {
                prop_assert!(folded_positions.contains(tag.position));
            }
        }
        for stem in augmented.stems() {
            prop_assert!(
                vector.contains(stem) || vector.iter().any(|(s, _)| fold(s) == stem),
                "unexpected stem '{}'", stem
            );
        }
    }
}
