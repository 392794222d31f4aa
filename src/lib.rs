/// termvec - multilingual, LaTeX-aware text indexing
///
/// Turns free text into positional term vectors and search phrases into
/// boolean query expressions for a full-text index.

pub mod config;
pub mod core;

#[cfg(test)]
mod tests;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
