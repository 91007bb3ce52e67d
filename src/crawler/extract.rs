//! Content extraction from documentation pages
//!
//! Turns a parsed page into a [`Document`]: flattened text of the main region,
//! the heading outline, and code examples tagged with a language guess and the
//! section they appeared under.

use crate::types::{CodeExample, Document, Heading};
use chrono::Utc;
use scraper::{ElementRef, Html, Node, Selector};
use std::sync::LazyLock;
use url::Url;

/// Shortest trimmed code snippet kept as a code example
pub const MIN_CODE_LENGTH: usize = 20;

// Only the page-level header is chrome; article headers carry the title
const BOILERPLATE: &str = "nav, footer, body > header, script, style, noscript, aside, \
     .sidebar, #sidebar, .menu-bar, .nav-chapters, .nav-wrapper";

/// Main-region candidates, most specific first
const MAIN_CANDIDATES: &[&str] = &[
    "main",
    "article",
    "[role=main]",
    "#content",
    ".content",
    ".markdown-body",
    ".page",
];

/// Class tokens recognised as a language name on their own
const KNOWN_LANGUAGES: &[&str] = &[
    "onyx", "rust", "c", "cpp", "go", "javascript", "js", "typescript", "ts", "python", "bash",
    "sh", "shell", "json", "toml", "yaml", "kdl", "ini", "html", "css", "wasm", "wat",
];

const ONYX_MARKERS: &[&str] = &["::", "#load", "use core"];

/// Tags after which flattened text gets a break
const BLOCK_TAGS: &[&str] = &[
    "p", "div", "section", "li", "ul", "ol", "dl", "dt", "dd", "table", "tr", "td", "th",
    "blockquote", "br", "hr", "h1", "h2", "h3", "h4", "h5", "h6", "pre",
];

struct ExtractSelectors {
    boilerplate: Selector,
    candidates: Vec<Selector>,
    body: Selector,
    title: Selector,
    code: Selector,
}

static SELECTORS: LazyLock<ExtractSelectors> = LazyLock::new(|| ExtractSelectors {
    boilerplate: Selector::parse(BOILERPLATE).expect("boilerplate selector"),
    candidates: MAIN_CANDIDATES
        .iter()
        .map(|s| Selector::parse(s).expect("main candidate selector"))
        .collect(),
    body: Selector::parse("body").expect("body selector"),
    title: Selector::parse("title").expect("title selector"),
    code: Selector::parse("code").expect("code selector"),
});

/// Extracts a [`Document`] from a parsed page
///
/// # Arguments
///
/// * `document` - The parsed page
/// * `url` - Canonical URL of the page
///
/// # Returns
///
/// * `Some(Document)` - The page had visible main-region text
/// * `None` - Nothing but boilerplate (or nothing at all) was found
pub fn extract_document(document: &Html, url: &Url) -> Option<Document> {
    let root = pick_root(document);

    let mut collector = Collector::default();
    collector.walk(root);

    let content = collapse_whitespace(&collector.text);
    if content.is_empty() {
        return None;
    }

    let title = collector
        .headings
        .iter()
        .find(|h| h.level == 1)
        .map(|h| h.text.clone())
        .or_else(|| page_title(document))
        .unwrap_or_else(|| "Untitled".to_string());

    let code_examples = collector
        .code_blocks
        .into_iter()
        .map(|block| CodeExample {
            code: block.code,
            language: block.language,
            context: block.heading.unwrap_or_else(|| title.clone()),
        })
        .collect();

    Some(Document {
        url: url.to_string(),
        title,
        content,
        headings: collector.headings,
        code_examples,
        crawled_at: Utc::now(),
    })
}

fn pick_root(document: &Html) -> ElementRef<'_> {
    SELECTORS
        .candidates
        .iter()
        .find_map(|selector| document.select(selector).next())
        .or_else(|| document.select(&SELECTORS.body).next())
        .unwrap_or_else(|| document.root_element())
}

fn page_title(document: &Html) -> Option<String> {
    document
        .select(&SELECTORS.title)
        .next()
        .map(|element| collapse_whitespace(&element.text().collect::<String>()))
        .filter(|s| !s.is_empty())
}

struct CodeBlock {
    code: String,
    language: String,
    heading: Option<String>,
}

#[derive(Default)]
struct Collector {
    text: String,
    headings: Vec<Heading>,
    code_blocks: Vec<CodeBlock>,
}

impl Collector {
    fn walk(&mut self, element: ElementRef<'_>) {
        for child in element.children() {
            match child.value() {
                Node::Text(text) => self.text.push_str(text),
                Node::Element(_) => {
                    let Some(child) = ElementRef::wrap(child) else {
                        continue;
                    };
                    if SELECTORS.boilerplate.matches(&child) {
                        continue;
                    }
                    self.visit(child);
                }
                _ => {}
            }
        }
    }

    fn visit(&mut self, element: ElementRef<'_>) {
        let tag = element.value().name();

        if let Some(level) = heading_level(tag) {
            let text = collapse_whitespace(&element.text().collect::<String>());
            if !text.is_empty() {
                self.text.push('\n');
                self.text.push_str(&text);
                self.headings.push(Heading { level, text });
            }
        } else if tag == "pre" || tag == "code" {
            // `code` only reaches here when it is not inside a `pre`
            let raw: String = element.text().collect();
            self.text.push(' ');
            self.text.push_str(&raw);
            self.record_code(element, &raw);
        } else {
            self.walk(element);
        }

        if BLOCK_TAGS.contains(&tag) {
            self.text.push('\n');
        }
    }

    fn record_code(&mut self, element: ElementRef<'_>, raw: &str) {
        let code = raw.trim();
        if code.chars().count() < MIN_CODE_LENGTH {
            return;
        }

        self.code_blocks.push(CodeBlock {
            code: code.to_string(),
            language: guess_language(element, code),
            heading: self.headings.last().map(|h| h.text.clone()),
        });
    }
}

fn heading_level(tag: &str) -> Option<u8> {
    match tag {
        "h1" => Some(1),
        "h2" => Some(2),
        "h3" => Some(3),
        "h4" => Some(4),
        "h5" => Some(5),
        "h6" => Some(6),
        _ => None,
    }
}

/// Guesses a snippet's language from class hints on the element (and an
/// inner `code`), falling back to Onyx markers in the text
fn guess_language(element: ElementRef<'_>, code: &str) -> String {
    let mut classes: Vec<String> = element
        .value()
        .classes()
        .map(|c| c.to_ascii_lowercase())
        .collect();
    for inner in element.select(&SELECTORS.code) {
        classes.extend(inner.value().classes().map(|c| c.to_ascii_lowercase()));
    }

    let hinted = classes.iter().find_map(|class| {
        class
            .strip_prefix("language-")
            .or_else(|| class.strip_prefix("lang-"))
            .filter(|lang| !lang.is_empty())
    });
    if let Some(lang) = hinted {
        return lang.to_string();
    }

    if let Some(known) = classes
        .iter()
        .find(|class| KNOWN_LANGUAGES.contains(&class.as_str()))
    {
        return known.clone();
    }

    if ONYX_MARKERS.iter().any(|marker| code.contains(marker)) {
        "onyx".to_string()
    } else {
        "text".to_string()
    }
}

fn collapse_whitespace(input: &str) -> String {
    let mut buf = String::with_capacity(input.len());
    let mut last_space = false;
    for ch in input.chars() {
        if ch.is_whitespace() {
            if !last_space && !buf.is_empty() {
                buf.push(' ');
            }
            last_space = true;
        } else {
            buf.push(ch);
            last_space = false;
        }
    }
    buf.trim_end().to_string()
}
