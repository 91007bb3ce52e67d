//! Structural extraction from Onyx source
//!
//! [`PatternExtractor`] is the seam for anything that understands Onyx
//! structure. [`RegexExtractor`] is a line-oriented heuristic: it does not
//! parse, so nested braces and multi-line enum bodies are cut short.

use regex::Regex;
use std::sync::LazyLock;

/// Structural matches found in one file, in source order per kind
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedPatterns {
    pub imports: Vec<String>,
    pub functions: Vec<String>,
    pub structs: Vec<String>,
    pub enums: Vec<String>,
}

/// Extracts structural patterns and complexity signals from source text
pub trait PatternExtractor {
    /// Import statements, function headers, struct and enum definitions
    fn extract(&self, content: &str) -> ExtractedPatterns;

    /// Number of complex constructs (structs, enums, macros, polymorphic
    /// variables, interfaces)
    fn count_complex_constructs(&self, content: &str) -> usize;
}

// `#load "core/io"`, `#load_all "./src"`, `use core.io`, `use core {println}`
static IMPORT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?m)^[ \t]*(?:#load(?:_all)?[ \t]+"[^"\n]+"|use[ \t]+[\w.]+(?:[ \t]*\{[^}\n]*\})?)"#)
        .expect("import regex")
});

// `name :: (args) -> ret`, header only
static FUNCTION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^[ \t]*[A-Za-z_][\w.]*[ \t]*::[ \t]*\([^)\n]*\)(?:[ \t]*->[ \t]*[^{\n]+)?")
        .expect("function regex")
});

// Body runs to the first closing brace
static STRUCT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^[ \t]*[A-Za-z_]\w*[ \t]*::[ \t]*struct\b[^{]*\{[^}]*\}")
        .expect("struct regex")
});

// Single line, greedy to end of line
static ENUM: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^[ \t]*[A-Za-z_]\w*[ \t]*::[ \t]*enum\b.*").expect("enum regex")
});

static COMPLEX_CONSTRUCTS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"\bstruct\b",
        r"\benum\b",
        r"\bmacro\b",
        r"\$[A-Za-z_]\w*",
        r"\binterface\b",
    ]
    .iter()
    .map(|pattern| Regex::new(pattern).expect("complex construct regex"))
    .collect()
});

/// Regex-based [`PatternExtractor`]
#[derive(Debug, Clone, Copy, Default)]
pub struct RegexExtractor;

impl RegexExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl PatternExtractor for RegexExtractor {
    fn extract(&self, content: &str) -> ExtractedPatterns {
        ExtractedPatterns {
            imports: find_all(&IMPORT, content),
            functions: find_all(&FUNCTION, content),
            structs: find_all(&STRUCT, content),
            enums: find_all(&ENUM, content),
        }
    }

    fn count_complex_constructs(&self, content: &str) -> usize {
        COMPLEX_CONSTRUCTS
            .iter()
            .map(|regex| regex.find_iter(content).count())
            .sum()
    }
}

fn find_all(regex: &Regex, content: &str) -> Vec<String> {
    regex
        .find_iter(content)
        .map(|m| m.as_str().trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
