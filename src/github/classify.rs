//! File-type rules for repository files
//!
//! Classification is a pure function of the path. Rules are evaluated in a
//! fixed order and the first match wins.

use crate::types::FileType;

/// Onyx package and tooling manifests
const PROJECT_MANIFESTS: &[&str] = &["onyx-pkg.kdl", "onyx-pkg.ini", "onyx-lsp.ini"];

/// Manifests of other ecosystems that show up next to Onyx code
const PACKAGE_MANIFESTS: &[&str] = &[
    "package.json",
    "cargo.toml",
    "wasmer.toml",
    "go.mod",
    "pyproject.toml",
    "makefile",
];

const DOC_DIRS: &[&str] = &["doc", "docs", "documentation"];
const DOC_EXTENSIONS: &[&str] = &["md", "txt", "rst", "html", "adoc"];
const EXAMPLE_DIRS: &[&str] = &["example", "examples"];
const WEB_EXTENSIONS: &[&str] = &["html", "htm", "css", "js"];
const CONFIG_EXTENSIONS: &[&str] = &["json", "yaml", "yml", "toml", "ini", "kdl"];
const TEXT_EXTENSIONS: &[&str] = &["txt", "rst"];

/// Binary payloads never filed as examples
const BINARY_EXTENSIONS: &[&str] = &[
    "wasm", "png", "jpg", "jpeg", "gif", "ico", "svg", "zip", "gz", "tar", "ttf", "woff",
    "woff2", "so", "dll", "exe",
];

/// Directories whose contents are never harvested
const VENDORED_DIRS: &[&str] = &["node_modules", ".git"];

/// Classifies a repository path
///
/// # Arguments
///
/// * `path` - Path relative to the repository root, `/`-separated
///
/// # Returns
///
/// The first matching [`FileType`], or [`FileType::Other`]
pub fn classify_file_type(path: &str) -> FileType {
    let lower = path.to_ascii_lowercase();
    let (dirs, name) = match lower.rsplit_once('/') {
        Some((dirs, name)) => (dirs, name),
        None => ("", lower.as_str()),
    };
    let stem = name.split('.').next().unwrap_or(name);
    let extension = name.rsplit_once('.').map(|(_, ext)| ext).unwrap_or("");
    let in_dir = |candidates: &[&str]| dirs.split('/').any(|d| candidates.contains(&d));

    if stem == "readme" {
        FileType::Readme
    } else if matches!(stem, "license" | "licence" | "copying") {
        FileType::License
    } else if matches!(stem, "changelog" | "changes") {
        FileType::Changelog
    } else if PROJECT_MANIFESTS.contains(&name) {
        FileType::ProjectConfig
    } else if PACKAGE_MANIFESTS.contains(&name) {
        FileType::PackageConfig
    } else if extension == "onyx" {
        FileType::Source
    } else if in_dir(DOC_DIRS) && DOC_EXTENSIONS.contains(&extension) {
        FileType::Documentation
    } else if in_dir(EXAMPLE_DIRS) && !BINARY_EXTENSIONS.contains(&extension) {
        FileType::Example
    } else if name == "index.html" {
        FileType::WebIndex
    } else if WEB_EXTENSIONS.contains(&extension) {
        FileType::WebContent
    } else if CONFIG_EXTENSIONS.contains(&extension) {
        FileType::Config
    } else if extension == "md" {
        FileType::Markdown
    } else if TEXT_EXTENSIONS.contains(&extension) {
        FileType::Text
    } else {
        FileType::Other
    }
}

/// Returns true if the path sits under a vendored directory
pub fn is_vendored(path: &str) -> bool {
    path.split('/').any(|segment| VENDORED_DIRS.contains(&segment))
}

/// Decides whether a tree entry is worth fetching
pub fn should_include(path: &str) -> bool {
    !is_vendored(path) && classify_file_type(path) != FileType::Other
}
