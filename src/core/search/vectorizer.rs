//! Whole-Text Vectorizers
//!
//! Profiles without a morphological dictionary hand the whole text to a
//! vectorizer, which tokenizes, filters and stems in one call.

use std::collections::HashMap;
use std::sync::Arc;

use rust_stemmers::{Algorithm, Stemmer};

use super::error::{Result, SearchError};
use super::profile::StemmingStrategy;
use super::resources::SearchResources;
use super::stopwords::StopwordSet;
use super::tokenizer::Tokenizer;
use super::vector::{PositionTag, TermVector, Weight};

/// Turns a text into a term vector for a profile.
#[cfg_attr(test, mockall::automock)]
pub trait Vectorizer: Send + Sync {
    fn vectorize(&self, profile: &str, text: &str, weight: Option<Weight>) -> Result<TermVector>;
}

/// Snowball algorithm by its lower-case name, e.g. `english`.
pub fn snowball_algorithm(name: &str) -> Result<Algorithm> {
    let algorithm = match name.trim().to_lowercase().as_str() {
        "arabic" => Algorithm::Arabic,
        "danish" => Algorithm::Danish,
        "dutch" => Algorithm::Dutch,
        "english" => Algorithm::English,
        "finnish" => Algorithm::Finnish,
        "french" => Algorithm::French,
        "german" => Algorithm::German,
        "greek" => Algorithm::Greek,
        "hungarian" => Algorithm::Hungarian,
        "italian" => Algorithm::Italian,
        "norwegian" => Algorithm::Norwegian,
        "portuguese" => Algorithm::Portuguese,
        "romanian" => Algorithm::Romanian,
        "russian" => Algorithm::Russian,
        "spanish" => Algorithm::Spanish,
        "swedish" => Algorithm::Swedish,
        "tamil" => Algorithm::Tamil,
        "turkish" => Algorithm::Turkish,
        other => {
            return Err(SearchError::Config(format!(
                "unknown snowball algorithm '{other}'"
            )))
        }
    };
    Ok(algorithm)
}

struct SnowballProfile {
    stemmer: Option<Stemmer>,
    stopwords: Option<StopwordSet>,
}

/// Snowball stemming over [`Tokenizer`] output.
///
/// Stopwords consume a position but are not emitted. Unknown profiles are
/// lower-cased only. Tokens holding a digit, escaped hashtags included, are
/// never stemmed, the way the database parser treats them as plain words.
pub struct SnowballVectorizer {
    tokenizer: Arc<dyn Tokenizer>,
    profiles: HashMap<String, SnowballProfile>,
}

impl SnowballVectorizer {
    pub fn new(tokenizer: Arc<dyn Tokenizer>) -> Self {
        Self {
            tokenizer,
            profiles: HashMap::new(),
        }
    }

    pub fn with_profile(
        mut self,
        profile: impl Into<String>,
        algorithm: Option<Algorithm>,
        stopwords: Option<StopwordSet>,
    ) -> Self {
        self.profiles.insert(
            profile.into(),
            SnowballProfile {
                stemmer: algorithm.map(Stemmer::create),
                stopwords,
            },
        );
        self
    }

    /// One entry per vectorizer profile of `resources`.
    pub fn from_resources(tokenizer: Arc<dyn Tokenizer>, resources: &SearchResources) -> Result<Self> {
        let mut vectorizer = Self::new(tokenizer);
        for profile in resources.profiles() {
            if profile.strategy != StemmingStrategy::Vectorizer {
                continue;
            }
            let algorithm = profile
                .algorithm
                .as_deref()
                .map(snowball_algorithm)
                .transpose()?;
            vectorizer = vectorizer.with_profile(
                profile.name.clone(),
                algorithm,
                resources.stopwords(profile).cloned(),
            );
        }
        Ok(vectorizer)
    }

    pub fn has_profile(&self, profile: &str) -> bool {
        self.profiles.contains_key(profile)
    }
}

impl Vectorizer for SnowballVectorizer {
    fn vectorize(&self, profile: &str, text: &str, weight: Option<Weight>) -> Result<TermVector> {
        let settings = self.profiles.get(profile);
        let weight = weight.unwrap_or_default();
        let mut vector = TermVector::new();

        for token in self.tokenizer.tokenize(profile, text)? {
            let lower = token.text.to_lowercase();
            if settings
                .and_then(|s| s.stopwords.as_ref())
                .is_some_and(|stopwords| stopwords.contains(&lower))
            {
                continue;
            }

            let stem = match settings.and_then(|s| s.stemmer.as_ref()) {
                Some(stemmer) if !has_digit(&lower) => stemmer.stem(&lower).into_owned(),
                _ => lower,
            };
            vector.insert(stem, PositionTag::new(token.position, weight));
        }

        tracing::trace!(profile, stems = vector.len(), "Vectorized text");
        Ok(vector)
    }
}

fn has_digit(token: &str) -> bool {
    token.bytes().any(|b| b.is_ascii_digit())
}
