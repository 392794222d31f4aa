//! Search Module
//!
//! Text-indexing and query-construction pipeline for full-text search.
//!
//! # Architecture
//!
//! ## Data
//! - `vector`: positional term vectors, their text format and concatenation
//! - `resources`: immutable rule set, language table, profiles, stopwords
//!   and dictionaries, loaded once at startup
//!
//! ## Stages
//! - `diacritics`: decomposed-to-precomposed normalization and ASCII folding
//! - `hashtag`: escaping of `#tag` spans
//! - `latex`: bounded fixpoint rewriting of `$$ ... $$` formulas
//! - `stemmer`: dictionary and vectorizer stemming strategies
//! - `builder`: text to term vector
//! - `query`: search phrase to boolean expression
//! - `detector`: text to profile
//!
//! ## Capabilities
//! - `tokenizer`, `vectorizer`, `morphology`, `detector`: traits with
//!   in-process default adapters
//!
//! ## Output
//! - `sql`: vectors, queries and rank functions as PostgreSQL expressions
//! - `engine`: the `TextSearch` facade
//!
//! # Usage Example
//!
//! ```rust,ignore
//! use termvec::config::SearchConfig;
//! use termvec::core::search::TextSearch;
//!
//! let search = TextSearch::new(&SearchConfig::default())?;
//! let vector = search.build_vector("english", "The cats are running", None)?;
//! assert_eq!(vector.to_string(), "'cat':2 'run':4");
//! ```

// ============================================================================
// Data and resources
// ============================================================================

mod error;
pub mod profile;
pub mod resources;
pub mod stopwords;
pub mod vector;

// ============================================================================
// Pipeline stages
// ============================================================================

pub mod builder;
pub mod diacritics;
pub mod hashtag;
pub mod latex;
pub mod query;
pub mod stemmer;

// ============================================================================
// Capabilities
// ============================================================================

pub mod detector;
pub mod morphology;
pub mod tokenizer;
pub mod vectorizer;

// ============================================================================
// Output
// ============================================================================

pub mod engine;
pub mod sql;

// ============================================================================
// Re-exports
// ============================================================================

pub use error::{Capability, Result, SearchError};

pub use builder::TermVectorBuilder;
pub use detector::{LanguageDetector, LanguageGuess, LanguageIdentifier, WhatlangIdentifier};
pub use engine::{Capabilities, TextSearch, VectorRequest};
pub use hashtag::{HashtagCodec, HashtagSplit, DEFAULT_ESCAPE_SEQUENCE};
pub use latex::{LatexLanguage, LatexRewriter, RewriteOutcome, RuleSet};
pub use morphology::{LemmaDictionary, MorphologicalDictionary};
pub use profile::{LanguageProfile, LanguageRecord, StemmingStrategy};
pub use query::{BuiltQuery, QueryBuilder, QueryExpression};
pub use resources::SearchResources;
pub use sql::{RankFunction, SearchQuery, SqlParams, VectorExpr};
pub use stemmer::{Stemmer, StemmerRegistry};
pub use stopwords::StopwordSet;
pub use tokenizer::{Token, Tokenizer, WordTokenizer};
pub use vector::{concatenate, PositionSet, PositionTag, TermVector, Weight};
pub use vectorizer::{SnowballVectorizer, Vectorizer};
