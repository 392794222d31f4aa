//! Formula Rewriter
//!
//! Applies a [`RuleSet`] to a formula until nothing changes or the pass
//! budget runs out. A rule that matched nothing in one pass is dropped from
//! the working set for all later passes.

use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use super::{LatexLanguage, RuleSet};

/// Passes after which rewriting stops even if rules still match.
pub const DEFAULT_MAX_PASSES: usize = 20;

static FORMULA_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\$\$(.+?)\$\$").expect("Invalid formula regex"));

static CLEANUP_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"REPL|[{}\\,_^]").expect("Invalid cleanup regex"));

/// Result of rewriting a single formula.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewriteOutcome {
    pub text: String,
    /// Passes that performed at least one substitution.
    pub passes: usize,
    /// Whether the pass budget ran out before a fixpoint was reached.
    pub capped: bool,
}

#[derive(Debug, Clone)]
pub struct LatexRewriter {
    rules: Arc<RuleSet>,
    max_passes: usize,
    default_language: LatexLanguage,
}

impl LatexRewriter {
    pub fn new(rules: Arc<RuleSet>) -> Self {
        Self {
            rules,
            max_passes: DEFAULT_MAX_PASSES,
            default_language: LatexLanguage::default(),
        }
    }

    pub fn with_max_passes(mut self, max_passes: usize) -> Self {
        self.max_passes = max_passes.max(1);
        self
    }

    pub fn with_default_language(mut self, language: LatexLanguage) -> Self {
        self.default_language = language;
        self
    }

    pub fn max_passes(&self) -> usize {
        self.max_passes
    }

    /// Phrase language for a profile; unknown profiles use the default.
    pub fn language_for(&self, profile: &str) -> LatexLanguage {
        LatexLanguage::for_profile(profile).unwrap_or(self.default_language)
    }

    /// Rewrite every `$$ ... $$` span of `text` and collapse whitespace.
    ///
    /// Text without formulas only has its whitespace collapsed.
    pub fn transform(&self, text: &str, profile: &str) -> String {
        let language = self.language_for(profile);
        let rewritten = FORMULA_PATTERN.replace_all(text, |caps: &Captures<'_>| {
            format!(" {} ", self.rewrite_in(&caps[1], language).text)
        });
        collapse_whitespace(&rewritten)
    }

    /// Rewrite a single formula without delimiters.
    pub fn rewrite(&self, formula: &str, profile: &str) -> RewriteOutcome {
        self.rewrite_in(formula, self.language_for(profile))
    }

    pub fn rewrite_in(&self, formula: &str, language: LatexLanguage) -> RewriteOutcome {
        let mut formula = formula.replace(['(', ')'], " ");
        let mut working: Vec<usize> = (0..self.rules.len()).collect();
        let mut passes = 0;

        while !working.is_empty() {
            if passes >= self.max_passes {
                tracing::debug!(
                    max_passes = self.max_passes,
                    pending_rules = working.len(),
                    "Formula rewrite stopped at pass limit"
                );
                break;
            }

            let mut matched = Vec::with_capacity(working.len());
            for &index in &working {
                let Some(rule) = self.rules.get(index) else {
                    continue;
                };
                let (rewritten, count) = rule.apply(formula.trim(), language);
                if count > 0 {
                    formula = rewritten;
                    matched.push(index);
                }
            }

            if matched.is_empty() {
                break;
            }
            passes += 1;
            tracing::trace!(pass = passes, rules = matched.len(), "Formula rewrite pass");
            working = matched;
        }

        let capped = passes >= self.max_passes && !working.is_empty();
        let cleaned = CLEANUP_PATTERN.replace_all(&formula, " ");

        RewriteOutcome {
            text: collapse_whitespace(&cleaned),
            passes,
            capped,
        }
    }
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
