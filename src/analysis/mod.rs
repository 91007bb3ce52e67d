//! Code pattern analysis over harvested repository files
//!
//! # Components
//!
//! - `PatternExtractor` / `RegexExtractor`: structural matches in Onyx source
//! - `score_complexity`: line count plus construct penalty, bucketed into tiers
//! - `TopicTagger`: path, import, syntax and HTML topic rules

mod complexity;
mod patterns;
mod topics;

pub use complexity::{
    score_complexity, tier_for, ComplexityScore, COMPLEX_CONSTRUCT_PENALTY, INTERMEDIATE_CEILING,
    SIMPLE_CEILING,
};
pub use patterns::{ExtractedPatterns, PatternExtractor, RegexExtractor};
pub use topics::{TopicTagger, WEB_TOPIC};

use crate::types::{
    ComplexityTier, FileAnalysis, FileType, FileTypeBreakdown, PatternIndex, PatternRecord,
    RepositoryFile, TopicExample, TopicIndex,
};
use std::collections::BTreeSet;

/// Characters of file content kept as a topic example preview
pub const PREVIEW_CHARS: usize = 300;

/// Everything the analyzer derives from a set of files
#[derive(Debug, Clone, Default)]
pub struct AnalysisOutput {
    pub patterns: PatternIndex,
    pub topics: TopicIndex,
    pub file_analysis: Vec<FileAnalysis>,
    pub file_types: FileTypeBreakdown,
}

/// Runs pattern extraction, complexity scoring and topic tagging
pub struct PatternAnalyzer<E: PatternExtractor = RegexExtractor> {
    extractor: E,
}

impl PatternAnalyzer<RegexExtractor> {
    pub fn new() -> Self {
        Self {
            extractor: RegexExtractor::new(),
        }
    }
}

impl Default for PatternAnalyzer<RegexExtractor> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: PatternExtractor> PatternAnalyzer<E> {
    /// Creates an analyzer around a custom extractor
    pub fn with_extractor(extractor: E) -> Self {
        Self { extractor }
    }

    /// Analyses every file
    ///
    /// Source and example files get patterns, complexity and topics; HTML
    /// files get topics only. Every file counts toward the type breakdown.
    ///
    /// # Arguments
    ///
    /// * `files` - Files produced by the repository walker
    ///
    /// # Returns
    ///
    /// The aggregated [`AnalysisOutput`]
    pub fn analyze(&self, files: &[RepositoryFile]) -> AnalysisOutput {
        let tagger = TopicTagger::new(&self.extractor);
        let mut output = AnalysisOutput::default();

        for file in files {
            *output.file_types.entry(file.file_type).or_insert(0) += 1;

            match file.file_type {
                FileType::Source | FileType::Example => {
                    self.collect_patterns(file, &mut output.patterns);

                    let score = score_complexity(&self.extractor, &file.content);
                    let topics = tagger.tag(file);
                    file_topics(&mut output.topics, file, Some(score.tier), &topics);

                    output.file_analysis.push(FileAnalysis {
                        repository: file.repository.clone(),
                        path: file.path.clone(),
                        complexity: Some(score.tier),
                        complexity_score: Some(score.score),
                        topics: topics.into_iter().collect(),
                    });
                }
                file_type if file_type.is_html() => {
                    let topics = tagger.tag_html(file);
                    file_topics(&mut output.topics, file, None, &topics);

                    output.file_analysis.push(FileAnalysis {
                        repository: file.repository.clone(),
                        path: file.path.clone(),
                        complexity: None,
                        complexity_score: None,
                        topics: topics.into_iter().collect(),
                    });
                }
                _ => {}
            }
        }

        tracing::debug!(
            "Analysed {} files: {} patterns, {} topics",
            files.len(),
            output.patterns.total(),
            output.topics.len()
        );

        output
    }

    fn collect_patterns(&self, file: &RepositoryFile, index: &mut PatternIndex) {
        let extracted = self.extractor.extract(&file.content);
        let record = |definition: String| PatternRecord {
            definition,
            path: file.path.clone(),
            repository: file.repository.clone(),
            url: file.url.clone(),
        };

        index.imports.extend(extracted.imports.into_iter().map(record));
        index.functions.extend(extracted.functions.into_iter().map(record));
        index.structs.extend(extracted.structs.into_iter().map(record));
        index.enums.extend(extracted.enums.into_iter().map(record));
    }
}

fn file_topics(
    index: &mut TopicIndex,
    file: &RepositoryFile,
    complexity: Option<ComplexityTier>,
    topics: &BTreeSet<String>,
) {
    for topic in topics {
        index.entry(topic.clone()).or_default().push(TopicExample {
            repository: file.repository.clone(),
            path: file.path.clone(),
            url: file.url.clone(),
            file_type: file.file_type,
            complexity,
            preview: file.content.chars().take(PREVIEW_CHARS).collect(),
        });
    }
}
