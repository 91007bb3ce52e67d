//! Keyword search over the documentation and repository corpora
//!
//! Linear substring scoring only: every query scans the loaded corpus.

mod engine;
mod results;
mod scoring;

pub use engine::SearchEngine;
pub use results::{
    CombinedResults, DocResult, ExampleHit, ExampleResults, FileResult, PatternResult, SearchError,
    SearchHit, SearchSource, SourceStatus,
};
pub use scoring::{snippet, FoldedQuery, SNIPPET_CHARS};

use crate::storage::JsonStorage;
use std::path::Path;

/// Opens a search engine over a data directory without creating it
pub fn open_engine(data_dir: &Path) -> SearchEngine<JsonStorage> {
    SearchEngine::new(JsonStorage::open(data_dir))
}
