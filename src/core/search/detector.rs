//! Language Detection
//!
//! Maps text to a search profile. Detection is advisory: short texts,
//! identifier failures and languages missing from the table all resolve to
//! the default profile instead of an error.

use std::sync::Arc;

use whatlang::Lang;

use super::diacritics;
use super::error::{Result, SearchError};
use super::profile::LanguageRecord;
use super::resources::SearchResources;
use crate::config::SearchConfig;

/// One ranked answer of a [`LanguageIdentifier`].
#[derive(Debug, Clone, PartialEq)]
pub struct LanguageGuess {
    /// Short language code, e.g. `en`.
    pub code: String,
    pub probability: f64,
}

impl LanguageGuess {
    pub fn new(code: impl Into<String>, probability: f64) -> Self {
        Self {
            code: code.into(),
            probability,
        }
    }
}

#[cfg_attr(test, mockall::automock)]
pub trait LanguageIdentifier: Send + Sync {
    /// Candidate languages, most probable first.
    fn identify(&self, text: &str) -> Result<Vec<LanguageGuess>>;
}

// ============================================================================
// whatlang
// ============================================================================

#[derive(Debug, Clone, Copy, Default)]
pub struct WhatlangIdentifier;

impl WhatlangIdentifier {
    /// Two-letter code for languages in the table, ISO 639-3 otherwise.
    fn code(lang: Lang) -> String {
        let short = match lang {
            Lang::Eng => "en",
            Lang::Pol => "pl",
            Lang::Dan => "da",
            Lang::Deu => "de",
            Lang::Spa => "es",
            Lang::Fin => "fi",
            Lang::Fra => "fr",
            Lang::Hun => "hu",
            Lang::Ita => "it",
            Lang::Nld => "nl",
            Lang::Nob => "no",
            Lang::Por => "pt",
            Lang::Ron => "ro",
            Lang::Rus => "ru",
            Lang::Swe => "sv",
            Lang::Tur => "tr",
            other => return other.code().to_string(),
        };
        short.to_string()
    }
}

impl LanguageIdentifier for WhatlangIdentifier {
    fn identify(&self, text: &str) -> Result<Vec<LanguageGuess>> {
        Ok(whatlang::detect(text)
            .map(|info| vec![LanguageGuess::new(Self::code(info.lang()), info.confidence())])
            .unwrap_or_default())
    }
}

// ============================================================================
// Detector
// ============================================================================

pub struct LanguageDetector {
    identifier: Arc<dyn LanguageIdentifier>,
    resources: Arc<SearchResources>,
    min_length: usize,
    threshold: f64,
    max_candidates: usize,
}

impl LanguageDetector {
    pub fn new(
        identifier: Arc<dyn LanguageIdentifier>,
        resources: Arc<SearchResources>,
        config: &SearchConfig,
    ) -> Self {
        Self {
            identifier,
            resources,
            min_length: config.detect_min_length,
            threshold: config.detect_threshold_prob,
            max_candidates: config.detect_max_candidates,
        }
    }

    /// Candidate languages above the probability threshold, best first.
    pub fn detect_languages(&self, text: &str) -> Result<Vec<LanguageRecord>> {
        let languages = self.resources.languages();
        let candidates: Vec<LanguageRecord> = self
            .identifier
            .identify(text)?
            .into_iter()
            .filter(|guess| guess.probability > self.threshold)
            .take(self.max_candidates)
            .filter_map(|guess| languages.get(&guess.code).cloned())
            .collect();

        if candidates.is_empty() {
            return Err(SearchError::UnsupportedLanguage(preview(text)));
        }
        Ok(candidates)
    }

    /// Profile for `text`, the default profile when unsure.
    pub fn detect(&self, text: &str) -> String {
        let normalized = diacritics::normalize(text);
        let normalized = normalized.trim();

        if normalized.chars().count() < self.min_length {
            return self.resources.default_profile().to_string();
        }

        match self.detect_languages(normalized) {
            Ok(candidates) => candidates
                .first()
                .map(|record| record.profile.clone())
                .unwrap_or_else(|| self.resources.default_profile().to_string()),
            Err(err) => {
                tracing::debug!(error = %err, "Language detection fell back to default profile");
                self.resources.default_profile().to_string()
            }
        }
    }
}

fn preview(text: &str) -> String {
    const MAX_CHARS: usize = 40;
    let mut preview: String = text.chars().take(MAX_CHARS).collect();
    if text.chars().count() > MAX_CHARS {
        preview.push_str("...");
    }
    preview
}
