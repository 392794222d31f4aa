//! Text Search Facade
//!
//! Wires resources, capabilities and pipeline stages together once at
//! startup and exposes the operations callers need. `TextSearch` is
//! `Send + Sync`; share it behind an `Arc` and call it from any thread.

use std::sync::Arc;

use rayon::prelude::*;

use super::builder::TermVectorBuilder;
use super::detector::{LanguageDetector, LanguageIdentifier, WhatlangIdentifier};
use super::error::Result;
use super::hashtag::HashtagCodec;
use super::latex::{LatexLanguage, LatexRewriter, RewriteOutcome};
use super::profile::LanguageRecord;
use super::query::{BuiltQuery, QueryBuilder};
use super::resources::SearchResources;
use super::stemmer::StemmerRegistry;
use super::tokenizer::{Tokenizer, WordTokenizer};
use super::vector::{concatenate, TermVector, Weight};
use super::vectorizer::{SnowballVectorizer, Vectorizer};
use crate::config::SearchConfig;

/// Capability adapters handed to [`TextSearch::with_capabilities`].
///
/// `vectorizer: None` builds the snowball vectorizer over `tokenizer`.
pub struct Capabilities {
    pub tokenizer: Arc<dyn Tokenizer>,
    pub vectorizer: Option<Arc<dyn Vectorizer>>,
    pub identifier: Arc<dyn LanguageIdentifier>,
}

impl Default for Capabilities {
    fn default() -> Self {
        Self {
            tokenizer: Arc::new(WordTokenizer),
            vectorizer: None,
            identifier: Arc::new(WhatlangIdentifier),
        }
    }
}

/// One input of [`TextSearch::build_many`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VectorRequest {
    pub profile: String,
    pub text: String,
    pub weight: Option<Weight>,
}

impl VectorRequest {
    pub fn new(profile: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            profile: profile.into(),
            text: text.into(),
            weight: None,
        }
    }

    pub fn weighted(mut self, weight: Weight) -> Self {
        self.weight = Some(weight);
        self
    }
}

pub struct TextSearch {
    resources: Arc<SearchResources>,
    builder: TermVectorBuilder,
    queries: QueryBuilder,
    detector: Arc<LanguageDetector>,
    latex: LatexRewriter,
    hashtags: HashtagCodec,
    parallel_batches: bool,
}

impl TextSearch {
    /// Load resources per `config` and use the built-in adapters.
    pub fn new(config: &SearchConfig) -> Result<Self> {
        let resources = Arc::new(SearchResources::from_config(config)?);
        Self::with_capabilities(resources, config, Capabilities::default())
    }

    pub fn with_capabilities(
        resources: Arc<SearchResources>,
        config: &SearchConfig,
        capabilities: Capabilities,
    ) -> Result<Self> {
        let Capabilities {
            tokenizer,
            vectorizer,
            identifier,
        } = capabilities;

        let vectorizer: Arc<dyn Vectorizer> = match vectorizer {
            Some(vectorizer) => vectorizer,
            None => Arc::new(SnowballVectorizer::from_resources(
                tokenizer.clone(),
                &resources,
            )?),
        };
        let stemmers = StemmerRegistry::from_resources(&resources, tokenizer, vectorizer)?;

        let hashtags = HashtagCodec::new(config.hashtag_escape.clone());
        let latex = LatexRewriter::new(resources.rules().clone())
            .with_max_passes(config.latex_max_passes)
            .with_default_language(config.latex_default_language);
        let detector = Arc::new(LanguageDetector::new(identifier, resources.clone(), config));

        log::info!(
            "Text search ready (default profile '{}', {} LaTeX rules)",
            resources.default_profile(),
            resources.rules().len()
        );

        Ok(Self {
            builder: TermVectorBuilder::new(
                resources.clone(),
                stemmers,
                hashtags.clone(),
                latex.clone(),
            ),
            queries: QueryBuilder::new(
                resources.clone(),
                detector.clone(),
                hashtags.clone(),
                latex.clone(),
            ),
            resources,
            detector,
            latex,
            hashtags,
            parallel_batches: config.parallel_batches,
        })
    }

    pub fn resources(&self) -> &Arc<SearchResources> {
        &self.resources
    }

    pub fn hashtags(&self) -> &HashtagCodec {
        &self.hashtags
    }

    // ========================================================================
    // Vectors
    // ========================================================================

    pub fn build_vector(&self, profile: &str, text: &str, weight: Option<Weight>) -> Result<TermVector> {
        self.builder.build(profile, text, weight)
    }

    pub fn build_optional(
        &self,
        profile: &str,
        text: Option<&str>,
        weight: Option<Weight>,
    ) -> Result<TermVector> {
        self.builder.build_optional(profile, text, weight)
    }

    /// Build independent vectors, in parallel unless disabled in the config.
    /// Results keep the order of `requests`.
    pub fn build_many(&self, requests: &[VectorRequest]) -> Vec<Result<TermVector>> {
        let build = |request: &VectorRequest| {
            self.builder
                .build(&request.profile, &request.text, request.weight)
        };

        if self.parallel_batches {
            requests.par_iter().map(build).collect()
        } else {
            requests.iter().map(build).collect()
        }
    }

    /// Detect the profile of `text`, then build its vector.
    pub fn build_detected(&self, text: &str, weight: Option<Weight>) -> Result<(String, TermVector)> {
        let profile = self.detect(text);
        let vector = self.builder.build(&profile, text, weight)?;
        Ok((profile, vector))
    }

    /// Stems of `text`, in byte order.
    pub fn stems(&self, profile: &str, text: &str) -> Result<Vec<String>> {
        Ok(self
            .builder
            .build(profile, text, None)?
            .stems()
            .into_iter()
            .map(str::to_string)
            .collect())
    }

    pub fn concatenate(&self, vectors: &[TermVector]) -> TermVector {
        concatenate(vectors)
    }

    // ========================================================================
    // Queries and detection
    // ========================================================================

    pub fn build_query(&self, raw: &str, profile: Option<&str>) -> BuiltQuery {
        self.queries.build(raw, profile)
    }

    pub fn detect(&self, text: &str) -> String {
        self.detector.detect(text)
    }

    pub fn detect_languages(&self, text: &str) -> Result<Vec<LanguageRecord>> {
        self.detector.detect_languages(text)
    }

    // ========================================================================
    // LaTeX
    // ========================================================================

    /// Rewrite every `$$ ... $$` span of `text` for `profile`.
    pub fn transform_latex(&self, text: &str, profile: &str) -> String {
        self.latex.transform(text, profile)
    }

    /// Rewrite a single formula, reporting how many passes it took.
    pub fn rewrite_formula(&self, formula: &str, language: LatexLanguage) -> RewriteOutcome {
        self.latex.rewrite_in(formula, language)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::search::detector::{LanguageGuess, MockLanguageIdentifier};
    use crate::core::search::error::{Capability, SearchError};
    use crate::core::search::vectorizer::MockVectorizer;

    fn search() -> TextSearch {
        TextSearch::new(&SearchConfig::default()).unwrap()
    }

    fn with_identifier(code: &'static str) -> TextSearch {
        let config = SearchConfig::default();
        let resources = Arc::new(SearchResources::embedded(&config).unwrap());
        let mut identifier = MockLanguageIdentifier::new();
        identifier
            .expect_identify()
            .returning(move |_| Ok(vec![LanguageGuess::new(code, 0.95)]));

        TextSearch::with_capabilities(
            resources,
            &config,
            Capabilities {
                identifier: Arc::new(identifier),
                ..Capabilities::default()
            },
        )
        .unwrap()
    }

    #[test]
    fn test_build_vector() {
        let vector = search()
            .build_vector("english", "The cats are running", None)
            .unwrap();
        assert_eq!(vector.to_string(), "'cat':2 'run':4");
    }

    #[test]
    fn test_build_many_keeps_order() {
        let requests = vec![
            VectorRequest::new("simple", "first"),
            VectorRequest::new("english", "running dogs").weighted(Weight::B),
            VectorRequest::new("simple", ""),
        ];
        let results: Vec<String> = search()
            .build_many(&requests)
            .into_iter()
            .map(|r| r.unwrap().to_string())
            .collect();

        assert_eq!(results, vec!["'first':1", "'dog':2B 'run':1B", ""]);
    }

    #[test]
    fn test_build_many_sequential() {
        let config = SearchConfig {
            parallel_batches: false,
            ..SearchConfig::default()
        };
        let search = TextSearch::new(&config).unwrap();
        let results = search.build_many(&[VectorRequest::new("simple", "a b")]);
        assert_eq!(results[0].as_ref().unwrap().to_string(), "'a':1 'b':2");
    }

    #[test]
    fn test_build_detected() {
        let (profile, vector) = with_identifier("en")
            .build_detected("The cats are running", None)
            .unwrap();
        assert_eq!(profile, "english");
        assert_eq!(vector.to_string(), "'cat':2 'run':4");
    }

    #[test]
    fn test_vectorizer_failure_is_typed() {
        let config = SearchConfig::default();
        let resources = Arc::new(SearchResources::embedded(&config).unwrap());
        let mut vectorizer = MockVectorizer::new();
        vectorizer
            .expect_vectorize()
            .returning(|_, _, _| Err(SearchError::capability(Capability::Vectorizer, "offline")));

        let search = TextSearch::with_capabilities(
            resources,
            &config,
            Capabilities {
                vectorizer: Some(Arc::new(vectorizer)),
                ..Capabilities::default()
            },
        )
        .unwrap();

        let err = search.build_vector("english", "text", None).unwrap_err();
        assert_eq!(err.failed_capability(), Some(Capability::Vectorizer));
    }

    #[test]
    fn test_stems_and_concatenate() {
        let search = search();
        assert_eq!(search.stems("simple", "b a b").unwrap(), vec!["a", "b"]);

        let first = search.build_vector("simple", "cat", None).unwrap();
        let second = search.build_vector("simple", "dog", None).unwrap();
        assert_eq!(
            search.concatenate(&[first, second]).to_string(),
            "'cat':1 'dog':2"
        );
    }

    #[test]
    fn test_query_uses_configured_escape() {
        let query = search().build_query("#universe is crazy!", Some("simple"));
        assert_eq!(
            query.expression.to_string(),
            "HASH58437HASHuniverse & (is | crazy)"
        );
    }

    #[test]
    fn test_query_hashtags_match_indexed_stems() {
        let search = search();
        let vector = search
            .build_vector("english", "we love #running and #cats", None)
            .unwrap();
        let query = search.build_query("#running #cats", Some("english"));

        assert_eq!(query.expression.hashtags().len(), 2);
        for hashtag in query.expression.hashtags() {
            assert!(
                vector.stems().contains(&hashtag.to_lowercase().as_str()),
                "{hashtag} missing from {vector}"
            );
        }
    }

    #[test]
    fn test_explicit_unknown_profile_falls_back() {
        assert_eq!(search().build_query("cats", Some("klingon")).profile, "simple");
    }

    #[test]
    fn test_query_detects_profile() {
        let query = with_identifier("pl").build_query("Gdzie jest mój kot?", None);
        assert_eq!(query.profile, "polish");
    }

    #[test]
    fn test_transform_latex() {
        assert_eq!(
            search().transform_latex(r"hi there $$ 2 * x = \pi $$", "english"),
            "hi there 2 times x equals to number pi"
        );
        let outcome = search().rewrite_formula(r"\alpha", LatexLanguage::Polish);
        assert!(outcome.passes >= 1);
        assert!(!outcome.capped);
    }

    #[test]
    fn test_bad_resources_dir_is_fatal() {
        let config = SearchConfig {
            resources_dir: Some("/definitely/not/here".into()),
            ..SearchConfig::default()
        };
        assert!(matches!(
            TextSearch::new(&config),
            Err(SearchError::Resource { .. })
        ));
    }
}
