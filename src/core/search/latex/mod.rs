//! LaTeX Rewriting
//!
//! Formulas embedded in text between `$$ ... $$` are rewritten into natural
//! language phrases so that they can be tokenized and searched like prose:
//!
//! ```text
//! $$ \frac{a}{b^2} $$  ->  fraction a divided by b squared
//! ```
//!
//! The rewrite is a bounded fixpoint over an ordered [`RuleSet`]: see
//! [`LatexRewriter`].

mod rewriter;
mod rules;

pub use rewriter::{LatexRewriter, RewriteOutcome, DEFAULT_MAX_PASSES};
pub use rules::{ComputeFn, Replacement, RuleSet, RuleSpec, TransformationRule};

use serde::{Deserialize, Serialize};

/// Languages with hand-written formula phrasing.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum LatexLanguage {
    #[default]
    English,
    Polish,
}

impl LatexLanguage {
    /// Resolve a search profile name, `None` when the profile has no phrasing.
    pub fn for_profile(profile: &str) -> Option<Self> {
        match profile.trim().to_lowercase().as_str() {
            "english" => Some(Self::English),
            "polish" => Some(Self::Polish),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::English => "english",
            Self::Polish => "polish",
        }
    }
}
