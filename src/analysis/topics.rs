//! Topic tagging
//!
//! Unlike file-type classification, every table here contributes: the topics
//! of a file are the union of all rules that fire.

use crate::analysis::patterns::PatternExtractor;
use crate::types::RepositoryFile;
use regex::Regex;
use std::collections::BTreeSet;
use std::sync::LazyLock;

/// Substrings of the lowercased path and the topic they imply
const PATH_KEYWORDS: &[(&str, &str)] = &[
    ("http", "http"),
    ("server", "http"),
    ("socket", "networking"),
    ("net", "networking"),
    ("json", "json"),
    ("test", "testing"),
    ("alloc", "memory"),
    ("memory", "memory"),
    ("thread", "concurrency"),
    ("sync", "concurrency"),
    ("wasi", "wasi"),
    ("wasm", "wasm"),
    ("math", "math"),
    ("string", "strings"),
    ("file", "filesystem"),
    ("game", "games"),
    ("graphics", "graphics"),
    ("opengl", "graphics"),
    ("cli", "cli"),
    ("parse", "parsing"),
    ("crypto", "crypto"),
    ("sql", "database"),
    ("web", "web"),
];

/// Import path segments and the topic they imply
const IMPORT_SEGMENTS: &[(&str, &str)] = &[
    ("net", "networking"),
    ("http", "http"),
    ("json", "json"),
    ("encoding", "encoding"),
    ("alloc", "memory"),
    ("memory", "memory"),
    ("thread", "concurrency"),
    ("sync", "concurrency"),
    ("os", "os"),
    ("io", "io"),
    ("time", "time"),
    ("random", "random"),
    ("math", "math"),
    ("string", "strings"),
    ("conv", "strings"),
    ("array", "collections"),
    ("map", "collections"),
    ("set", "collections"),
    ("list", "collections"),
    ("iter", "iterators"),
    ("test", "testing"),
    ("js", "web"),
    ("wasi", "wasi"),
    ("hash", "hashing"),
];

static SYNTAX_RULES: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| {
    compile(&[
        (r"\bstruct\b", "structs"),
        (r"\benum\b", "enums"),
        (r"\bmacro\b", "macros"),
        (r"\$[A-Za-z_]\w*", "polymorphism"),
        (r"\binterface\b", "interfaces"),
        (r"#operator\b", "operator-overloading"),
        (r"#overload\b", "overloading"),
        (r"\bdefer\b", "defer"),
        (r"\bswitch\b", "pattern-matching"),
        (r"\|>", "pipes"),
        (r"\biter\.", "iterators"),
        (r"\ballocator\b", "memory"),
        (r"\bthread\.spawn\b", "concurrency"),
    ])
});

static HTML_RULES: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| {
    compile(&[
        (r"(?i)<canvas\b", "graphics"),
        (r"(?i)<script\b", "javascript"),
        (r"WebAssembly\.", "wasm"),
        (r"\.wasm\b", "wasm"),
        (r"(?i)<form\b", "forms"),
        (r"\bfetch\(", "http"),
    ])
});

fn compile(rules: &[(&str, &'static str)]) -> Vec<(Regex, &'static str)> {
    rules
        .iter()
        .map(|(pattern, topic)| (Regex::new(pattern).expect("topic regex"), *topic))
        .collect()
}

/// Topic always given to HTML files
pub const WEB_TOPIC: &str = "web";

/// Assigns topics to repository files
pub struct TopicTagger<'a, E: PatternExtractor + ?Sized> {
    extractor: &'a E,
}

impl<'a, E: PatternExtractor + ?Sized> TopicTagger<'a, E> {
    pub fn new(extractor: &'a E) -> Self {
        Self { extractor }
    }

    /// Topics from the path and content passes
    pub fn tag(&self, file: &RepositoryFile) -> BTreeSet<String> {
        let mut topics = path_topics(&file.path);
        topics.extend(self.import_topics(&file.content));
        topics.extend(rule_topics(&SYNTAX_RULES, &file.content));
        topics
    }

    /// Topics for HTML files: path pass, HTML pass and always `web`
    pub fn tag_html(&self, file: &RepositoryFile) -> BTreeSet<String> {
        let mut topics = path_topics(&file.path);
        topics.extend(rule_topics(&HTML_RULES, &file.content));
        topics.insert(WEB_TOPIC.to_string());
        topics
    }

    fn import_topics(&self, content: &str) -> BTreeSet<String> {
        let imports = self.extractor.extract(content).imports;
        let mut topics = BTreeSet::new();

        for import in &imports {
            for segment in import
                .split(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
                .filter(|s| !s.is_empty())
            {
                if let Some((_, topic)) = IMPORT_SEGMENTS.iter().find(|(key, _)| *key == segment) {
                    topics.insert(topic.to_string());
                }
            }
        }

        topics
    }
}

fn path_topics(path: &str) -> BTreeSet<String> {
    let lower = path.to_ascii_lowercase();
    PATH_KEYWORDS
        .iter()
        .filter(|(keyword, _)| lower.contains(keyword))
        .map(|(_, topic)| topic.to_string())
        .collect()
}

fn rule_topics(rules: &[(Regex, &'static str)], content: &str) -> BTreeSet<String> {
    rules
        .iter()
        .filter(|(regex, _)| regex.is_match(content))
        .map(|(_, topic)| topic.to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::patterns::RegexExtractor;
    use crate::types::FileType;
    use chrono::Utc;

    fn file(path: &str, content: &str, file_type: FileType) -> RepositoryFile {
        RepositoryFile {
            repository: "onyx-lang/onyx".to_string(),
            path: path.to_string(),
            size: content.len() as u64,
            content: content.to_string(),
            file_type,
            url: format!("https://github.com/onyx-lang/onyx/blob/HEAD/{}", path),
            extracted_at: Utc::now(),
        }
    }

    #[test]
    fn test_union_of_path_import_and_syntax() {
        let extractor = RegexExtractor::new();
        let tagger = TopicTagger::new(&extractor);
        let source = file(
            "examples/http_demo.onyx",
            "use core.net\nuse core {println}\n\nRequest :: struct { path: str; }\n",
            FileType::Source,
        );

        let topics = tagger.tag(&source);
        assert!(topics.contains("http"));
        assert!(topics.contains("networking"));
        assert!(topics.contains("structs"));
        assert!(!topics.contains("web"));
    }

    #[test]
    fn test_import_segments_match_whole_words() {
        let extractor = RegexExtractor::new();
        let tagger = TopicTagger::new(&extractor);
        let source = file("src/a.onyx", "use core.iterator_tools\n", FileType::Source);

        assert!(!tagger.tag(&source).contains("iterators"));
    }

    #[test]
    fn test_html_always_web() {
        let extractor = RegexExtractor::new();
        let tagger = TopicTagger::new(&extractor);
        let page = file(
            "site/index.html",
            "<html><body><canvas id=\"c\"></canvas><script src=\"app.js\"></script></body></html>",
            FileType::WebIndex,
        );

        let topics = tagger.tag_html(&page);
        assert!(topics.contains("web"));
        assert!(topics.contains("graphics"));
        assert!(topics.contains("javascript"));

        let bare = file("index.html", "<p>hi</p>", FileType::WebIndex);
        assert_eq!(
            tagger.tag_html(&bare).into_iter().collect::<Vec<_>>(),
            vec!["web".to_string()]
        );
    }
}
