//! Hashtag Codec
//!
//! The index tokenizer drops a leading `#` together with the word it is
//! attached to, which would make hashtags useless as filters. Before
//! tokenization every `#tag` is rewritten to `<escape>tag`; queries use the
//! same pattern to pull hashtags out as exact-match terms.
//!
//! A `#` only starts a hashtag after start-of-text, whitespace, the negation
//! marker `~`, or one of `:;,.!?。’[]()`. That boundary character is kept
//! verbatim and is not part of the tag.

use std::borrow::Cow;

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

/// Escape sequence used in place of `#` when none is configured.
pub const DEFAULT_ESCAPE_SEQUENCE: &str = "HASH58437HASH";

static HASHTAG_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?P<prefix>^|\s+|~|[;:,.!?。’\[\]()])#(?P<text>\w+)")
        .expect("Invalid hashtag regex")
});

/// Result of separating hashtags from the rest of a query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HashtagSplit {
    /// Escaped hashtags, in order of appearance.
    pub hashtags: Vec<String>,
    /// Input with every hashtag replaced by a single space.
    pub remainder: String,
}

#[derive(Debug, Clone)]
pub struct HashtagCodec {
    escape: String,
}

impl Default for HashtagCodec {
    fn default() -> Self {
        Self::new(DEFAULT_ESCAPE_SEQUENCE)
    }
}

impl HashtagCodec {
    pub fn new(escape: impl Into<String>) -> Self {
        Self {
            escape: escape.into(),
        }
    }

    pub fn escape_sequence(&self) -> &str {
        &self.escape
    }

    /// Replace `<boundary>#word` with `<boundary><escape>word`.
    pub fn encode<'t>(&self, text: &'t str) -> Cow<'t, str> {
        HASHTAG_PATTERN.replace_all(text, |caps: &Captures| {
            format!("{}{}{}", &caps["prefix"], self.escape, &caps["text"])
        })
    }

    /// Whether `term` is an escaped hashtag produced by [`Self::encode`].
    pub fn is_encoded(&self, term: &str) -> bool {
        term.len() > self.escape.len()
            && term
                .get(..self.escape.len())
                .is_some_and(|prefix| prefix.eq_ignore_ascii_case(&self.escape))
    }

    /// Turn an escaped term back into `#tag` form.
    pub fn decode<'t>(&self, term: &'t str) -> Cow<'t, str> {
        if self.is_encoded(term) {
            Cow::Owned(format!("#{}", &term[self.escape.len()..]))
        } else {
            Cow::Borrowed(term)
        }
    }

    /// Pull every hashtag out of `text`.
    pub fn split(&self, text: &str) -> HashtagSplit {
        let mut hashtags = Vec::new();
        let remainder = HASHTAG_PATTERN
            .replace_all(text, |caps: &Captures| {
                hashtags.push(format!("{}{}", self.escape, &caps["text"]));
                format!("{} ", &caps["prefix"])
            })
            .into_owned();

        HashtagSplit {
            hashtags,
            remainder,
        }
    }
}
