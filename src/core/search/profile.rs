//! Language Profiles
//!
//! A profile names a search configuration and decides how its text is
//! stemmed and filtered. Profiles and the language table are read once from
//! resource files and never change afterwards.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Profile used when nothing better is known.
pub const SIMPLE_PROFILE: &str = "simple";

/// How a profile turns tokens into stems.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StemmingStrategy {
    /// Whole text handed to an external vectorizer in one call.
    #[default]
    Vectorizer,
    /// Per-token lookup in a morphological dictionary.
    Dictionary,
}

/// Entry of `profiles.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileSpec {
    pub strategy: StemmingStrategy,
    /// Snowball algorithm name for vectorizer profiles.
    pub algorithm: Option<String>,
    pub stopwords: Option<String>,
    pub dictionary: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguageProfile {
    pub name: String,
    pub strategy: StemmingStrategy,
    pub algorithm: Option<String>,
    pub stopwords: Option<String>,
    pub dictionary: Option<String>,
}

impl LanguageProfile {
    pub fn from_spec(name: impl Into<String>, spec: ProfileSpec) -> Self {
        Self {
            name: name.into(),
            strategy: spec.strategy,
            algorithm: spec.algorithm,
            stopwords: spec.stopwords,
            dictionary: spec.dictionary,
        }
    }

    /// Profile with no stemming and no stopwords.
    pub fn simple() -> Self {
        Self::from_spec(SIMPLE_PROFILE, ProfileSpec::default())
    }
}

/// Entry of `languages.yaml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguageRecord {
    /// Short language code as reported by the identifier, e.g. `en`.
    pub abbr: String,
    pub name: String,
    pub profile: String,
}

/// Language code to search profile lookup.
#[derive(Debug, Clone, Default)]
pub struct LanguageTable {
    records: Vec<LanguageRecord>,
    by_abbr: HashMap<String, usize>,
}

impl LanguageTable {
    pub fn new(records: Vec<LanguageRecord>) -> Self {
        let by_abbr = records
            .iter()
            .enumerate()
            .map(|(i, r)| (r.abbr.to_lowercase(), i))
            .collect();
        Self { records, by_abbr }
    }

    pub fn get(&self, abbr: &str) -> Option<&LanguageRecord> {
        self.by_abbr
            .get(&abbr.to_lowercase())
            .and_then(|&i| self.records.get(i))
    }

    pub fn profile_for(&self, abbr: &str) -> Option<&str> {
        self.get(abbr).map(|r| r.profile.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &LanguageRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
