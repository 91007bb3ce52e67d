//! Multi-source keyword search over the persisted corpora

use crate::search::results::{
    CombinedResults, DocResult, ExampleHit, ExampleResults, FileResult, PatternResult, SearchError,
    SearchHit, SearchSource, SourceStatus,
};
use crate::search::scoring::{score_document, score_file, score_pattern, snippet, FoldedQuery};
use crate::storage::{Collection, Storage, StorageResult};
use crate::types::{Document, PatternIndex, PatternRecord, RepositoryFile, TopicIndex};
use std::sync::{Arc, OnceLock};

type Cached<T> = OnceLock<Result<Arc<T>, SearchError>>;

/// Keyword search engine over one data directory
///
/// Each corpus is loaded on first use and kept for the engine's lifetime,
/// including a failed load: a corpus that was unavailable stays unavailable
/// until a new engine is created.
pub struct SearchEngine<S: Storage> {
    storage: S,
    documents: Cached<Vec<Document>>,
    files: Cached<Vec<RepositoryFile>>,
    patterns: Cached<PatternIndex>,
    topics: Cached<TopicIndex>,
}

impl<S: Storage> SearchEngine<S> {
    pub fn new(storage: S) -> Self {
        Self {
            storage,
            documents: OnceLock::new(),
            files: OnceLock::new(),
            patterns: OnceLock::new(),
            topics: OnceLock::new(),
        }
    }

    /// Ranks documentation pages against `query`
    ///
    /// Pages scoring zero are dropped; ties keep corpus order.
    ///
    /// # Arguments
    ///
    /// * `query` - Case-insensitive substring to look for
    /// * `limit` - Maximum number of results
    ///
    /// # Returns
    ///
    /// * `Ok(Vec<DocResult>)` - Results sorted by descending score
    /// * `Err(SearchError)` - The documentation corpus is not available
    pub fn search_docs(&self, query: &str, limit: usize) -> Result<Vec<DocResult>, SearchError> {
        let documents = self.documents()?;
        let query = FoldedQuery::new(query);
        if query.is_empty() || limit == 0 {
            return Ok(Vec::new());
        }

        let mut scored: Vec<(u32, &Document)> = documents
            .iter()
            .map(|doc| (score_document(doc, &query), doc))
            .filter(|(score, _)| *score > 0)
            .collect();
        scored.sort_by(|a, b| b.0.cmp(&a.0));

        Ok(scored
            .into_iter()
            .take(limit)
            .map(|(score, doc)| DocResult {
                url: doc.url.clone(),
                title: doc.title.clone(),
                score,
                snippet: snippet(&doc.content, &query),
            })
            .collect())
    }

    /// Finds repository examples filed under topics matching `topic`
    ///
    /// A topic matches when its name contains the query or the query contains
    /// the name. Examples are shared out evenly: each matched topic
    /// contributes at most `ceil(limit / matched)` before the list is cut to
    /// `limit`. With no match, the full sorted topic list is returned instead.
    pub fn search_github_examples(
        &self,
        topic: &str,
        limit: usize,
    ) -> Result<ExampleResults, SearchError> {
        let topics = self.topics()?;
        let query = topic.trim().to_lowercase();

        let matched: Vec<&String> = if query.is_empty() {
            Vec::new()
        } else {
            topics
                .keys()
                .filter(|name| {
                    let name = name.to_lowercase();
                    name.contains(&query) || query.contains(&name)
                })
                .collect()
        };

        if matched.is_empty() {
            return Ok(ExampleResults {
                query: topic.to_string(),
                matched_topics: Vec::new(),
                examples: Vec::new(),
                available_topics: topics.keys().cloned().collect(),
            });
        }

        let per_topic = limit.div_ceil(matched.len());
        let mut examples: Vec<ExampleHit> = matched
            .iter()
            .flat_map(|name| {
                topics[*name]
                    .iter()
                    .take(per_topic)
                    .map(move |example| ExampleHit {
                        topic: (*name).clone(),
                        example: example.clone(),
                    })
            })
            .collect();
        examples.truncate(limit);

        Ok(ExampleResults {
            query: topic.to_string(),
            matched_topics: matched.into_iter().cloned().collect(),
            examples,
            available_topics: Vec::new(),
        })
    }

    /// Ranks repository files against `query`
    pub fn search_github_files(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<FileResult>, SearchError> {
        let files = self.files()?;
        let query = FoldedQuery::new(query);
        if query.is_empty() || limit == 0 {
            return Ok(Vec::new());
        }

        let mut scored: Vec<(u32, &RepositoryFile)> = files
            .iter()
            .map(|file| (score_file(file, &query), file))
            .filter(|(score, _)| *score > 0)
            .collect();
        scored.sort_by(|a, b| b.0.cmp(&a.0));

        Ok(scored
            .into_iter()
            .take(limit)
            .map(|(score, file)| FileResult {
                repository: file.repository.clone(),
                path: file.path.clone(),
                url: file.url.clone(),
                file_type: file.file_type,
                score,
                snippet: snippet(&file.content, &query),
            })
            .collect())
    }

    /// Ranks extracted code patterns against `query`
    pub fn search_patterns(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<PatternResult>, SearchError> {
        let patterns = self.patterns()?;
        let query = FoldedQuery::new(query);
        if query.is_empty() || limit == 0 {
            return Ok(Vec::new());
        }

        let mut scored: Vec<(u32, &'static str, &PatternRecord)> = patterns
            .iter_all()
            .map(|(kind, record)| (score_pattern(record, &query), kind, record))
            .filter(|(score, _, _)| *score > 0)
            .collect();
        scored.sort_by(|a, b| b.0.cmp(&a.0));

        Ok(scored
            .into_iter()
            .take(limit)
            .map(|(score, kind, record)| PatternResult {
                kind: kind.to_string(),
                definition: record.definition.clone(),
                path: record.path.clone(),
                repository: record.repository.clone(),
                url: record.url.clone(),
                score,
            })
            .collect())
    }

    /// Searches several sources and merges the results by score
    ///
    /// Each source is asked for `ceil(limit / sources)` results. A source that
    /// fails is reported in `sources` with its error instead of failing the
    /// whole call. An empty `sources` list means every source.
    ///
    /// # Returns
    ///
    /// At most `limit` hits, sorted by descending score
    pub fn search_all(&self, query: &str, sources: &[SearchSource], limit: usize) -> CombinedResults {
        let mut selected: Vec<SearchSource> = Vec::new();
        for source in sources {
            if !selected.contains(source) {
                selected.push(*source);
            }
        }
        if selected.is_empty() {
            selected = SearchSource::ALL.to_vec();
        }

        let per_source = limit.div_ceil(selected.len());
        let mut results = Vec::new();
        let mut statuses = Vec::with_capacity(selected.len());

        for source in selected {
            let hits: Result<Vec<SearchHit>, SearchError> = match source {
                SearchSource::Docs => self
                    .search_docs(query, per_source)
                    .map(|r| r.into_iter().map(SearchHit::Docs).collect()),
                SearchSource::Github => self
                    .search_github_files(query, per_source)
                    .map(|r| r.into_iter().map(SearchHit::Github).collect()),
                SearchSource::Patterns => self
                    .search_patterns(query, per_source)
                    .map(|r| r.into_iter().map(SearchHit::Patterns).collect()),
            };

            match hits {
                Ok(hits) => {
                    statuses.push(SourceStatus {
                        source,
                        hits: hits.len(),
                        error: None,
                    });
                    results.extend(hits);
                }
                Err(e) => {
                    tracing::debug!("Source {} unavailable: {}", source, e);
                    statuses.push(SourceStatus {
                        source,
                        hits: 0,
                        error: Some(e),
                    });
                }
            }
        }

        results.sort_by_key(|hit| std::cmp::Reverse(hit.score()));
        results.truncate(limit);

        CombinedResults {
            query: query.to_string(),
            results,
            sources: statuses,
        }
    }

    fn documents(&self) -> Result<Arc<Vec<Document>>, SearchError> {
        cached(&self.documents, Collection::Documents, || {
            self.storage.load_documents()
        })
    }

    fn files(&self) -> Result<Arc<Vec<RepositoryFile>>, SearchError> {
        cached(&self.files, Collection::RepositoryFiles, || {
            self.storage.load_repository_files()
        })
    }

    fn patterns(&self) -> Result<Arc<PatternIndex>, SearchError> {
        cached(&self.patterns, Collection::Patterns, || {
            self.storage.load_patterns()
        })
    }

    fn topics(&self) -> Result<Arc<TopicIndex>, SearchError> {
        cached(&self.topics, Collection::Topics, || self.storage.load_topics())
    }
}

fn cached<T>(
    cell: &Cached<T>,
    collection: Collection,
    load: impl FnOnce() -> StorageResult<T>,
) -> Result<Arc<T>, SearchError> {
    cell.get_or_init(|| match load() {
        Ok(value) => {
            tracing::debug!("Loaded {} corpus", collection);
            Ok(Arc::new(value))
        }
        Err(e) => {
            tracing::warn!("Failed to load {} corpus: {}", collection, e);
            Err(SearchError::from_storage(collection, &e))
        }
    })
    .clone()
}
