//! Property-based tests for the search pipeline
//!
//! Property tests verify invariants that should hold for all inputs, rather
//! than testing specific cases.
//!
//! ## Running Property Tests
//!
//! ```sh
//! cargo test property --release
//! ```
//!
//! ## Test Modules
//!
//! - `term_vector_props`: serialization round-trip, concatenation
//!   associativity, position bounds
//! - `latex_props`: pass bound, markup cleanup
//! - `diacritics_props`: normalization idempotence, unaccent monotonicity
//! - `query_props`: clean terms, escaped hashtags, empty queries
//!
//! By default, proptest runs 256 cases per property. This can be configured
//! via the `PROPTEST_CASES` environment variable:
//!
//! ```sh
//! PROPTEST_CASES=1000 cargo test property --release
//! ```

mod diacritics_props;
mod latex_props;
mod query_props;
mod term_vector_props;
