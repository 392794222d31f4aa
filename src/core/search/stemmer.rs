//! Stemming Strategies
//!
//! Two ways of turning normalized text into stems:
//! - [`DictionaryStemmer`] tokenizes, drops stopwords and looks every token
//!   up in a morphological dictionary; each candidate lemma gets the token's
//!   position.
//! - [`VectorizerStemmer`] hands the whole text to a [`Vectorizer`].
//!
//! [`StemmerRegistry`] picks the strategy by profile name.

use std::collections::HashMap;
use std::sync::Arc;

use super::error::{Result, SearchError};
use super::morphology::MorphologicalDictionary;
use super::profile::StemmingStrategy;
use super::resources::SearchResources;
use super::stopwords::StopwordSet;
use super::tokenizer::Tokenizer;
use super::vector::{PositionTag, TermVector, Weight};
use super::vectorizer::Vectorizer;

/// Output of a stemming strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Stemmed {
    pub vector: TermVector,
    /// Lower-cased surface tokens that survived filtering, with their
    /// positions. Empty for strategies that never see individual tokens.
    pub tokens: Vec<(String, PositionTag)>,
}

#[cfg_attr(test, mockall::automock)]
pub trait Stemmer: Send + Sync {
    fn stem(&self, profile: &str, text: &str, weight: Option<Weight>) -> Result<Stemmed>;
}

// ============================================================================
// Dictionary Strategy
// ============================================================================

pub struct DictionaryStemmer {
    tokenizer: Arc<dyn Tokenizer>,
    dictionary: Arc<dyn MorphologicalDictionary>,
    stopwords: Option<StopwordSet>,
}

impl DictionaryStemmer {
    pub fn new(
        tokenizer: Arc<dyn Tokenizer>,
        dictionary: Arc<dyn MorphologicalDictionary>,
        stopwords: Option<StopwordSet>,
    ) -> Self {
        Self {
            tokenizer,
            dictionary,
            stopwords,
        }
    }
}

impl Stemmer for DictionaryStemmer {
    fn stem(&self, profile: &str, text: &str, weight: Option<Weight>) -> Result<Stemmed> {
        let weight = weight.unwrap_or_default();
        let mut stemmed = Stemmed::default();

        for token in self.tokenizer.tokenize(profile, text)? {
            if token.text.trim().is_empty() {
                continue;
            }
            let lower = token.text.to_lowercase();
            if self
                .stopwords
                .as_ref()
                .is_some_and(|stopwords| stopwords.contains(&lower))
            {
                continue;
            }

            let tag = PositionTag::new(token.position, weight);
            for candidate in self.dictionary.stem(&token.text)? {
                stemmed.vector.insert(candidate, tag);
            }
            stemmed.tokens.push((lower, tag));
        }

        Ok(stemmed)
    }
}

// ============================================================================
// Vectorizer Strategy
// ============================================================================

pub struct VectorizerStemmer {
    vectorizer: Arc<dyn Vectorizer>,
}

impl VectorizerStemmer {
    pub fn new(vectorizer: Arc<dyn Vectorizer>) -> Self {
        Self { vectorizer }
    }
}

impl Stemmer for VectorizerStemmer {
    fn stem(&self, profile: &str, text: &str, weight: Option<Weight>) -> Result<Stemmed> {
        Ok(Stemmed {
            vector: self.vectorizer.vectorize(profile, text, weight)?,
            tokens: Vec::new(),
        })
    }
}

// ============================================================================
// Registry
// ============================================================================

/// Profile-keyed strategy lookup with a fallback for unlisted profiles.
#[derive(Clone)]
pub struct StemmerRegistry {
    by_profile: HashMap<String, Arc<dyn Stemmer>>,
    fallback: Arc<dyn Stemmer>,
}

impl StemmerRegistry {
    pub fn new(fallback: Arc<dyn Stemmer>) -> Self {
        Self {
            by_profile: HashMap::new(),
            fallback,
        }
    }

    /// A strategy for every profile of `resources`; unlisted profiles go
    /// to the vectorizer.
    pub fn from_resources(
        resources: &SearchResources,
        tokenizer: Arc<dyn Tokenizer>,
        vectorizer: Arc<dyn Vectorizer>,
    ) -> Result<Self> {
        let shared: Arc<dyn Stemmer> = Arc::new(VectorizerStemmer::new(vectorizer));
        let mut registry = Self::new(shared.clone());

        for profile in resources.profiles() {
            let stemmer: Arc<dyn Stemmer> = match profile.strategy {
                StemmingStrategy::Vectorizer => shared.clone(),
                StemmingStrategy::Dictionary => {
                    let dictionary = resources.dictionary(profile).ok_or_else(|| {
                        SearchError::Config(format!(
                            "profile '{}' has no dictionary",
                            profile.name
                        ))
                    })?;
                    Arc::new(DictionaryStemmer::new(
                        tokenizer.clone(),
                        dictionary.clone(),
                        resources.stopwords(profile).cloned(),
                    ))
                }
            };
            registry.register(profile.name.clone(), stemmer);
        }

        Ok(registry)
    }

    pub fn register(&mut self, profile: impl Into<String>, stemmer: Arc<dyn Stemmer>) {
        self.by_profile.insert(profile.into(), stemmer);
    }

    pub fn with(mut self, profile: impl Into<String>, stemmer: Arc<dyn Stemmer>) -> Self {
        self.register(profile, stemmer);
        self
    }

    pub fn get(&self, profile: &str) -> &Arc<dyn Stemmer> {
        self.by_profile.get(profile).unwrap_or(&self.fallback)
    }

    pub fn is_registered(&self, profile: &str) -> bool {
        self.by_profile.contains_key(profile)
    }
}
