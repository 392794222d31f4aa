//! Query Builder
//!
//! Turns a raw search phrase into a boolean expression for the index:
//! hashtags are exact filters joined with AND, remaining words are joined
//! with OR.
//!
//! ```text
//! "#universe is crazy!"  ->  <escape>universe & (is | crazy)
//! ```

use std::fmt;
use std::sync::Arc;

use super::detector::LanguageDetector;
use super::diacritics;
use super::hashtag::HashtagCodec;
use super::latex::LatexRewriter;
use super::resources::SearchResources;

/// Characters replaced by whitespace before the query is split into terms.
pub const FORBIDDEN_CHARS: &str = "!\"$%&'()*+,-./:;<=>?@[\\]^_`{|}~";

/// Boolean shape of a search query.
///
/// An empty expression matches nothing; callers should skip the query
/// rather than run it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryExpression {
    Empty,
    /// All hashtags must match.
    Hashtags(Vec<String>),
    /// Any term may match.
    Terms(Vec<String>),
    /// All hashtags and at least one term.
    Both {
        hashtags: Vec<String>,
        terms: Vec<String>,
    },
}

impl QueryExpression {
    pub fn new(hashtags: Vec<String>, terms: Vec<String>) -> Self {
        match (hashtags.is_empty(), terms.is_empty()) {
            (true, true) => Self::Empty,
            (false, true) => Self::Hashtags(hashtags),
            (true, false) => Self::Terms(terms),
            (false, false) => Self::Both { hashtags, terms },
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    pub fn hashtags(&self) -> &[String] {
        match self {
            Self::Hashtags(hashtags) | Self::Both { hashtags, .. } => hashtags,
            _ => &[],
        }
    }

    pub fn terms(&self) -> &[String] {
        match self {
            Self::Terms(terms) | Self::Both { terms, .. } => terms,
            _ => &[],
        }
    }
}

impl fmt::Display for QueryExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => Ok(()),
            Self::Hashtags(hashtags) => write!(f, "{}", hashtags.join(" & ")),
            Self::Terms(terms) => write!(f, "{}", terms.join(" | ")),
            Self::Both { hashtags, terms } => {
                write!(f, "{} & ({})", hashtags.join(" & "), terms.join(" | "))
            }
        }
    }
}

/// A query ready to be compiled: its profile and expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuiltQuery {
    pub profile: String,
    pub expression: QueryExpression,
}

impl BuiltQuery {
    pub fn is_empty(&self) -> bool {
        self.expression.is_empty()
    }
}

pub struct QueryBuilder {
    resources: Arc<SearchResources>,
    detector: Arc<LanguageDetector>,
    hashtags: HashtagCodec,
    latex: LatexRewriter,
}

impl QueryBuilder {
    pub fn new(
        resources: Arc<SearchResources>,
        detector: Arc<LanguageDetector>,
        hashtags: HashtagCodec,
        latex: LatexRewriter,
    ) -> Self {
        Self {
            resources,
            detector,
            hashtags,
            latex,
        }
    }

    /// Build the query for `raw`. Without an explicit profile the language
    /// is detected from the text; an unknown one falls back to the default.
    pub fn build(&self, raw: &str, profile: Option<&str>) -> BuiltQuery {
        let profile = match profile {
            Some(profile) => self.resources.profile_or_default(profile).name.clone(),
            None => self.detector.detect(raw),
        };

        let normalized = diacritics::normalize(raw);
        let rewritten = self.latex.transform(&normalized, &profile);
        let stripped = strip_forbidden(&rewritten);

        let split = self.hashtags.split(&stripped);
        let remainder = split.remainder.replace('#', " ");

        let expression = QueryExpression::new(
            dedupe(split.hashtags),
            dedupe(remainder.split_whitespace().map(str::to_string).collect()),
        );

        tracing::debug!(profile = %profile, query = %expression, "Built search query");
        BuiltQuery {
            profile,
            expression,
        }
    }
}

fn strip_forbidden(text: &str) -> String {
    text.chars()
        .map(|c| if FORBIDDEN_CHARS.contains(c) { ' ' } else { c })
        .collect()
}

fn dedupe(items: Vec<String>) -> Vec<String> {
    let mut unique: Vec<String> = Vec::with_capacity(items.len());
    for item in items {
        if !unique.contains(&item) {
            unique.push(item);
        }
    }
    unique
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SearchConfig;
    use crate::core::search::detector::MockLanguageIdentifier;
    use crate::core::search::resources::SearchResources;
    use rstest::rstest;

    fn query_builder() -> QueryBuilder {
        let resources = Arc::new(SearchResources::embedded(&SearchConfig::default()).unwrap());
        let mut identifier = MockLanguageIdentifier::new();
        identifier.expect_identify().returning(|_| Ok(Vec::new()));
        let detector = Arc::new(LanguageDetector::new(
            Arc::new(identifier),
            resources.clone(),
            &SearchConfig::default(),
        ));
        let latex = LatexRewriter::new(resources.rules().clone());
        QueryBuilder::new(resources, detector, HashtagCodec::new("007"), latex)
    }

    fn parse_value(text: &str, profile: &str) -> String {
        query_builder().build(text, Some(profile)).expression.to_string()
    }

    #[rstest]
    #[case("hi all", "hi | all")]
    #[case("#universe is crazy!", "007universe & (is | crazy)")]
    #[case("#universe #crazy", "007universe & 007crazy")]
    #[case("#universe", "007universe")]
    #[case("#universe word", "007universe & (word)")]
    #[case("what, is: this?", "what | is | this")]
    #[case("again and again", "again | and")]
    #[case("#crazy!", "007crazy")]
    #[case("#a_b", "007a & (b)")]
    #[case("price#tag", "price | tag")]
    #[case("(#inside) ~#negated", "007inside & 007negated")]
    fn test_parse_value(#[case] text: &str, #[case] expected: &str) {
        assert_eq!(parse_value(text, "simple"), expected);
    }

    #[test]
    fn test_latex_in_query() {
        assert_eq!(
            parse_value("$$ a + b $$", "english"),
            "a | plus | b"
        );
    }

    #[test]
    fn test_empty_query() {
        let query = query_builder().build(" ?!. ", Some("simple"));
        assert!(query.is_empty());
        assert_eq!(query.expression.to_string(), "");
        assert!(query.expression.terms().is_empty());
    }

    #[test]
    fn test_decomposed_input_is_composed() {
        let query = query_builder().build("czes\u{0301}c\u{0301}", Some("polish"));
        assert_eq!(query.expression.terms(), ["cześć".to_string()]);
    }

    #[test]
    fn test_unknown_profile_uses_default() {
        let query = query_builder().build("cats", Some("klingon"));
        assert_eq!(query.profile, "simple");
        assert_eq!(query_builder().build("cats", Some("polish")).profile, "polish");
    }

    #[test]
    fn test_detects_profile_when_not_given() {
        let query = query_builder().build("hello there friends", None);
        assert_eq!(query.profile, "simple");
        assert_eq!(query.expression.terms().len(), 3);
    }

    #[test]
    fn test_expression_accessors() {
        let expression = QueryExpression::new(vec!["h".into()], vec!["t".into()]);
        assert_eq!(expression.hashtags(), ["h".to_string()]);
        assert_eq!(expression.terms(), ["t".to_string()]);
        assert!(!expression.is_empty());
    }
}
