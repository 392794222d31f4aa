//! In-tree tests
//!
//! - `common`: shared fixtures
//! - `property`: proptest invariants of the pipeline

mod common;
mod property;
