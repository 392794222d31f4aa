pub mod logging;

// Text-indexing and query-construction pipeline
pub mod search;
