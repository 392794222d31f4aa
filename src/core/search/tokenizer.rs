//! Tokenization
//!
//! Splits normalized text into positioned tokens. Positions are 1-based and
//! sequential per text; whitespace never produces a token.

use once_cell::sync::Lazy;
use regex::Regex;

use super::error::Result;

static WORD_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[\p{L}\p{N}]+(?:-[\p{L}\p{N}]+)*").expect("Invalid word regex")
});

/// A token and its 1-based position within the source text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub text: String,
    pub position: u32,
}

impl Token {
    pub fn new(text: impl Into<String>, position: u32) -> Self {
        Self {
            text: text.into(),
            position,
        }
    }
}

/// Language-aware word splitter.
#[cfg_attr(test, mockall::automock)]
pub trait Tokenizer: Send + Sync {
    fn tokenize(&self, profile: &str, text: &str) -> Result<Vec<Token>>;
}

/// Letter/digit runs. A hyphenated compound is emitted whole, then each
/// part follows at its own position, as full-text engines do for `hword`.
#[derive(Debug, Clone, Copy, Default)]
pub struct WordTokenizer;

impl WordTokenizer {
    pub fn new() -> Self {
        Self
    }
}

impl Tokenizer for WordTokenizer {
    fn tokenize(&self, _profile: &str, text: &str) -> Result<Vec<Token>> {
        let mut tokens = Vec::new();
        let mut position = 0u32;

        for word in WORD_PATTERN.find_iter(text) {
            let word = word.as_str();
            position += 1;
            tokens.push(Token::new(word, position));

            if word.contains('-') {
                for part in word.split('-') {
                    position += 1;
                    tokens.push(Token::new(part, position));
                }
            }
        }

        Ok(tokens)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(text: &str) -> Vec<(String, u32)> {
        WordTokenizer
            .tokenize("simple", text)
            .unwrap()
            .into_iter()
            .map(|t| (t.text, t.position))
            .collect()
    }

    #[test]
    fn test_positions_are_sequential() {
        assert_eq!(
            tokens("hi  there, world!"),
            vec![
                ("hi".to_string(), 1),
                ("there".to_string(), 2),
                ("world".to_string(), 3)
            ]
        );
    }

    #[test]
    fn test_hyphenated_compound() {
        let result = tokens("we love san-jose");
        assert_eq!(result[2], ("san-jose".to_string(), 3));
        assert_eq!(result[3], ("san".to_string(), 4));
        assert_eq!(result[4], ("jose".to_string(), 5));
    }

    #[test]
    fn test_unicode_words() {
        assert_eq!(
            tokens("Zażółć gęślą jaźń"),
            vec![
                ("Zażółć".to_string(), 1),
                ("gęślą".to_string(), 2),
                ("jaźń".to_string(), 3)
            ]
        );
    }

    #[test]
    fn test_escaped_hashtag_is_one_token() {
        assert_eq!(tokens("HASH58437HASHtag x").len(), 2);
    }

    #[test]
    fn test_blank_text() {
        assert!(tokens("  \t\n ").is_empty());
        assert!(tokens("-- ... !!").is_empty());
    }
}
