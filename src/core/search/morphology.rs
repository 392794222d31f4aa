//! Morphological Dictionaries
//!
//! Dictionary-stemmed languages map every inflected form to one or more
//! lemmas. Ambiguous forms (`kota` is both "cat" and a proper noun) keep
//! all candidates.

use std::collections::HashMap;

use super::error::{Result, SearchError};

/// Morphological stemmer for a single language.
#[cfg_attr(test, mockall::automock)]
pub trait MorphologicalDictionary: Send + Sync {
    /// Candidate stems for `token`, lower-cased. Unknown tokens yield the
    /// lower-cased token itself.
    fn stem(&self, token: &str) -> Result<Vec<String>>;
}

/// In-memory form to lemma table.
#[derive(Debug, Clone, Default)]
pub struct LemmaDictionary {
    entries: HashMap<String, Vec<String>>,
}

impl LemmaDictionary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse `form<TAB>lemma[ lemma...]` lines. Blank lines and lines
    /// starting with `#` are skipped.
    pub fn from_tsv(content: &str) -> Result<Self> {
        let mut dictionary = Self::new();

        for (index, line) in content.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let Some((form, lemmas)) = line.split_once('\t') else {
                return Err(SearchError::Config(format!(
                    "morphology line {}: expected form<TAB>lemmas",
                    index + 1
                )));
            };
            let lemmas: Vec<&str> = lemmas.split_whitespace().collect();
            if lemmas.is_empty() {
                return Err(SearchError::Config(format!(
                    "morphology line {}: no lemma for '{}'",
                    index + 1,
                    form.trim()
                )));
            }
            dictionary.insert(form.trim(), lemmas);
        }

        Ok(dictionary)
    }

    /// Add lemmas for `form`, keeping earlier ones first.
    pub fn insert<I, S>(&mut self, form: &str, lemmas: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let entry = self.entries.entry(form.to_lowercase()).or_default();
        for lemma in lemmas {
            let lemma = lemma.as_ref().to_lowercase();
            if !entry.contains(&lemma) {
                entry.push(lemma);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl MorphologicalDictionary for LemmaDictionary {
    fn stem(&self, token: &str) -> Result<Vec<String>> {
        let lower = token.to_lowercase();
        Ok(match self.entries.get(&lower) {
            Some(lemmas) => lemmas.clone(),
            None => vec![lower],
        })
    }
}
