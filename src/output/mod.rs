//! Output module for reporting on the persisted corpora
//!
//! This module handles:
//! - Summarising the documentation and repository corpora
//! - Printing the summary for the `--stats` mode

pub mod stats;

pub use stats::{load_statistics, print_statistics, CorpusStatistics};
