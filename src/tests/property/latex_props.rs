//! Property-based tests for LaTeX rewriting
//!
//! Tests invariants:
//! - The pass count never exceeds the configured maximum
//! - Rewritten formulas carry no residual markup
//! - Text without formulas keeps its words

use proptest::prelude::*;

use crate::core::search::{LatexLanguage, LatexRewriter, RuleSet};
use std::sync::Arc;

fn rewriter(max_passes: usize) -> LatexRewriter {
    LatexRewriter::new(Arc::new(RuleSet::builtin().unwrap())).with_max_passes(max_passes)
}

fn arb_language() -> impl Strategy<Value = LatexLanguage> {
    prop_oneof![Just(LatexLanguage::English), Just(LatexLanguage::Polish)]
}

/// Nested LaTeX built from a handful of constructors.
fn arb_formula() -> impl Strategy<Value = String> {
    let leaf = prop_oneof![
        "[a-z]".prop_map(String::from),
        "[0-9]{1,2}".prop_map(String::from),
        Just("\\pi".to_string()),
        Just("\\infty".to_string()),
    ];
    leaf.prop_recursive(6, 32, 2, |inner| {
        prop_oneof![
            inner.clone().prop_map(|x| format!("\\sqrt{{{x}}}")),
            (inner.clone(), inner.clone()).prop_map(|(a, b)| format!("\\frac{{{a}}}{{{b}}}")),
            (inner.clone(), inner.clone()).prop_map(|(a, b)| format!("{a} + {b}")),
            inner.clone().prop_map(|x| format!("{{{x}}}^2")),
            inner.clone().prop_map(|x| format!("\\sin{{{x}}}")),
            inner.prop_map(|x| format!("({x})")),
        ]
    })
}

proptest! {
    /// Property: bounded fixpoint iteration
    #[test]
    fn prop_passes_never_exceed_maximum(
        formula in arb_formula(),
        max_passes in 1usize..8,
        language in arb_language()
    ) {
        let outcome = rewriter(max_passes).rewrite_in(&formula, language);
        prop_assert!(outcome.passes <= max_passes);
        prop_assert!(!outcome.capped || outcome.passes == max_passes);
    }

    /// Property: braces, backslashes, carets and underscores never survive
    #[test]
    fn prop_no_residual_markup(formula in arb_formula(), language in arb_language()) {
        let outcome = rewriter(20).rewrite_in(&formula, language);
        prop_assert!(
            !outcome.text.contains(['{', '}', '\\', '^', '_', ',']),
            "markup left in '{}'", outcome.text
        );
        prop_assert!(!outcome.text.contains("REPL"));
        prop_assert!(!outcome.text.contains("  "));
    }

    /// Property: deep nesting terminates within the bound
    #[test]
    fn prop_deep_nesting_is_bounded(depth in 1usize..60, max_passes in 1usize..6) {
        let nested = (0..depth).fold("x".to_string(), |inner, _| format!("\\sqrt{{{inner}}}"));
        let outcome = rewriter(max_passes).rewrite_in(&nested, LatexLanguage::English);
        prop_assert!(outcome.passes <= max_passes);
    }

    /// Property: text without delimiters keeps its words in order
    #[test]
    fn prop_plain_text_is_untouched(words in proptest::collection::vec("[a-z]{1,8}", 0..10)) {
        let text = words.join("  ");
        prop_assert_eq!(rewriter(20).transform(&text, "english"), words.join(" "));
    }
}
