//! Term Vector Builder
//!
//! Turns raw text into a [`TermVector`]:
//!
//! 1. blank text short-circuits to an empty vector
//! 2. decomposed diacritics are composed
//! 3. hashtags are escaped
//! 4. `$$ ... $$` formulas are rewritten to words
//! 5. the profile's stemming strategy tokenizes, filters and stems
//! 6. every stem and surface token with diacritics also gets its folded
//!    form, sharing the same positions

use std::borrow::Cow;
use std::sync::Arc;

use super::diacritics;
use super::error::Result;
use super::hashtag::HashtagCodec;
use super::latex::LatexRewriter;
use super::resources::SearchResources;
use super::stemmer::{Stemmed, StemmerRegistry};
use super::vector::{TermVector, Weight};

pub struct TermVectorBuilder {
    resources: Arc<SearchResources>,
    stemmers: StemmerRegistry,
    hashtags: HashtagCodec,
    latex: LatexRewriter,
}

impl TermVectorBuilder {
    pub fn new(
        resources: Arc<SearchResources>,
        stemmers: StemmerRegistry,
        hashtags: HashtagCodec,
        latex: LatexRewriter,
    ) -> Self {
        Self {
            resources,
            stemmers,
            hashtags,
            latex,
        }
    }

    /// Build the vector of `text` under `profile`. Unknown profiles use the
    /// default profile.
    pub fn build(&self, profile: &str, text: &str, weight: Option<Weight>) -> Result<TermVector> {
        if text.trim().is_empty() {
            return Ok(TermVector::new());
        }

        let profile = self.resources.profile_or_default(profile);
        let prepared = self.prepare(&profile.name, text);
        let stemmed = self
            .stemmers
            .get(&profile.name)
            .stem(&profile.name, &prepared, weight)?;
        let vector = augment_with_unaccents(stemmed);

        tracing::debug!(
            profile = %profile.name,
            stems = vector.len(),
            "Built term vector"
        );
        Ok(vector)
    }

    /// [`Self::build`] for optional fields; `None` gives an empty vector.
    pub fn build_optional(
        &self,
        profile: &str,
        text: Option<&str>,
        weight: Option<Weight>,
    ) -> Result<TermVector> {
        match text {
            Some(text) => self.build(profile, text, weight),
            None => Ok(TermVector::new()),
        }
    }

    /// Text as handed to the stemming strategy.
    pub fn prepare(&self, profile: &str, text: &str) -> String {
        let normalized = diacritics::normalize(text);
        let encoded = self.hashtags.encode(&normalized);
        self.latex.transform(&encoded, profile)
    }
}

/// Add the folded form of every stem, and of every surface token the
/// strategy reported, when folding changes it.
pub fn augment_with_unaccents(stemmed: Stemmed) -> TermVector {
    let Stemmed { mut vector, tokens } = stemmed;
    let mut folded = TermVector::new();

    for (stem, positions) in vector.iter() {
        if let Cow::Owned(unaccented) = diacritics::fold(stem) {
            folded.merge_positions(unaccented, positions);
        }
    }
    for (token, tag) in tokens {
        if let Cow::Owned(unaccented) = diacritics::fold(&token) {
            folded.insert(unaccented, tag);
        }
    }

    for (stem, positions) in folded.iter() {
        vector.merge_positions(stem, positions);
    }
    vector
}
