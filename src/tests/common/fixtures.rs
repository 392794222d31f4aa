//! Test fixtures built once per test binary.

use once_cell::sync::Lazy;

use crate::config::SearchConfig;
use crate::core::search::TextSearch;

static SEARCH: Lazy<TextSearch> = Lazy::new(|| {
    TextSearch::new(&SearchConfig::default()).expect("embedded resources must load")
});

/// Pipeline over the embedded resources and default adapters.
pub fn search() -> &'static TextSearch {
    &SEARCH
}
