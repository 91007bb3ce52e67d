//! Search relevance scoring and snippets.
//!
//! All matching is case-insensitive substring matching over characters; there
//! is no tokenization. Scores are additive per field:
//!
//! | Corpus | Field | Score |
//! |---|---|---|
//! | docs | title | +10 |
//! | docs | any heading | +5 |
//! | docs | body | +1 |
//! | github files | path | +8 |
//! | github files | content | +2, then +1 per further occurrence (max +5) |
//! | patterns | definition | +6 |
//! | patterns | path | +1 |

use crate::types::{Document, PatternRecord, RepositoryFile};

pub const TITLE_WEIGHT: u32 = 10;
pub const HEADING_WEIGHT: u32 = 5;
pub const BODY_WEIGHT: u32 = 1;
pub const FILE_PATH_WEIGHT: u32 = 8;
pub const FILE_CONTENT_WEIGHT: u32 = 2;
pub const EXTRA_OCCURRENCE_CAP: u32 = 5;
pub const DEFINITION_WEIGHT: u32 = 6;
pub const PATTERN_PATH_WEIGHT: u32 = 1;

/// Width of a result snippet in characters
pub const SNIPPET_CHARS: usize = 200;

/// A query lowered once, char by char
#[derive(Debug, Clone)]
pub struct FoldedQuery {
    chars: Vec<char>,
}

impl FoldedQuery {
    pub fn new(query: &str) -> Self {
        Self {
            chars: fold(query.trim()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    pub fn len(&self) -> usize {
        self.chars.len()
    }

    /// Char index of the first occurrence in `text`
    pub fn find_in(&self, text: &str) -> Option<usize> {
        find_from(&fold(text), &self.chars, 0)
    }

    pub fn matches(&self, text: &str) -> bool {
        self.find_in(text).is_some()
    }

    /// Non-overlapping occurrences in `text`
    pub fn count_in(&self, text: &str) -> usize {
        if self.chars.is_empty() {
            return 0;
        }

        let haystack = fold(text);
        let mut count = 0;
        let mut from = 0;
        while let Some(index) = find_from(&haystack, &self.chars, from) {
            count += 1;
            from = index + self.chars.len();
        }
        count
    }
}

/// Lowercases per char, keeping one output char per input char so indices line up
fn fold(text: &str) -> Vec<char> {
    text.chars()
        .map(|c| c.to_lowercase().next().unwrap_or(c))
        .collect()
}

fn find_from(haystack: &[char], needle: &[char], from: usize) -> Option<usize> {
    if needle.is_empty() || haystack.len() < needle.len() {
        return None;
    }
    (from..=haystack.len() - needle.len()).find(|&i| haystack[i..i + needle.len()] == *needle)
}

/// Scores a documentation page
pub fn score_document(document: &Document, query: &FoldedQuery) -> u32 {
    let mut score = 0;
    if query.matches(&document.title) {
        score += TITLE_WEIGHT;
    }
    if document.headings.iter().any(|h| query.matches(&h.text)) {
        score += HEADING_WEIGHT;
    }
    if query.matches(&document.content) {
        score += BODY_WEIGHT;
    }
    score
}

/// Scores a repository file
pub fn score_file(file: &RepositoryFile, query: &FoldedQuery) -> u32 {
    let mut score = 0;
    if query.matches(&file.path) {
        score += FILE_PATH_WEIGHT;
    }

    let occurrences = query.count_in(&file.content) as u32;
    if occurrences > 0 {
        score += FILE_CONTENT_WEIGHT + (occurrences - 1).min(EXTRA_OCCURRENCE_CAP);
    }
    score
}

/// Scores a pattern record
pub fn score_pattern(record: &PatternRecord, query: &FoldedQuery) -> u32 {
    let mut score = 0;
    if query.matches(&record.definition) {
        score += DEFINITION_WEIGHT;
    }
    if query.matches(&record.path) {
        score += PATTERN_PATH_WEIGHT;
    }
    score
}

/// Cuts a window of [`SNIPPET_CHARS`] around the first occurrence of `query`
///
/// Truncated ends are marked with `...`. Without an occurrence the window
/// starts at the beginning of `text`.
pub fn snippet(text: &str, query: &FoldedQuery) -> String {
    let chars: Vec<char> = text.chars().collect();
    if chars.len() <= SNIPPET_CHARS {
        return text.trim().to_string();
    }

    let start = match query.find_in(text) {
        Some(index) => {
            let centre = index + query.len() / 2;
            centre
                .saturating_sub(SNIPPET_CHARS / 2)
                .min(chars.len() - SNIPPET_CHARS)
        }
        None => 0,
    };
    let end = start + SNIPPET_CHARS;

    let mut out = String::with_capacity(SNIPPET_CHARS + 6);
    if start > 0 {
        out.push_str("...");
    }
    out.extend(&chars[start..end]);
    if end < chars.len() {
        out.push_str("...");
    }
    out
}
