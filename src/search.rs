//! Cross-document annotation search.
//!
//! The index keeps a lazily populated cache of annotation snapshots, one per
//! guide, fetched through the [`DocumentSource`] collaborator on first use.
//! A query is a trimmed, case-insensitive substring test over normalized
//! annotation content; results come back as a flat ranked list:
//!
//! 1. exact matches (full case-insensitive equality with the trimmed query)
//! 2. partial matches
//!
//! with ties ordered by document title, then cell content. Documents that
//! cannot be fetched are skipped, not fatal: search degrades gracefully over
//! partial data.
//!
//! The cache has no automatic invalidation. After a save mutates a cached
//! document's annotations, call [`SearchIndex::invalidate`] (wiring the
//! store's change events to it is the usual way) so the next query
//! re-fetches and the reader sees their own edits.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use tracing::{debug, warn};

use crate::cell_id::CellId;
use crate::config::SearchConfig;
use crate::models::{AnnotationRecord, DocumentRef, SearchResult};
use crate::normalize::normalize_for_comparison;
use crate::source::DocumentSource;

struct CachedDocument {
    title: String,
    records: IndexMap<String, AnnotationRecord>,
    /// When the snapshot was fetched; diagnostics only.
    fetched_at: DateTime<Utc>,
}

pub struct SearchIndex {
    source: Arc<dyn DocumentSource>,
    cache: HashMap<String, CachedDocument>,
    config: SearchConfig,
}

impl SearchIndex {
    pub fn new(source: Arc<dyn DocumentSource>, config: SearchConfig) -> Self {
        Self {
            source,
            cache: HashMap::new(),
            config,
        }
    }

    /// Run `query` across `documents`, fetching any store not yet cached.
    ///
    /// Queries below the configured length floor return an empty list
    /// without touching any store. Records whose mapping key fails to parse
    /// as a cell identifier are dropped with a warning.
    pub async fn search(&mut self, query: &str, documents: &[DocumentRef]) -> Vec<SearchResult> {
        let trimmed = query.trim();
        if trimmed.chars().count() < self.config.min_query_len {
            return Vec::new();
        }
        let needle = normalize_for_comparison(trimmed);
        if needle.chars().count() < self.config.min_query_len {
            return Vec::new();
        }

        let mut results = Vec::new();
        for doc in documents {
            let cached = match self.ensure_cached(doc).await {
                Some(cached) => cached,
                None => continue,
            };
            for (key, record) in &cached.records {
                if !normalize_for_comparison(&record.content).contains(needle.as_str()) {
                    continue;
                }
                let cell_id: CellId = match key.parse() {
                    Ok(parsed) => parsed,
                    Err(_) => {
                        warn!(
                            document_id = %doc.id,
                            key,
                            "dropping search hit with malformed identifier"
                        );
                        continue;
                    }
                };
                results.push(SearchResult {
                    document_id: doc.id.clone(),
                    document_title: cached.title.clone(),
                    cell_id,
                    content: record.content.clone(),
                    summary: record.summary.clone(),
                });
            }
        }

        rank(&mut results, &needle);
        results
    }

    /// Drop the cached snapshot for a document so the next query re-fetches.
    pub fn invalidate(&mut self, document_id: &str) {
        if self.cache.remove(document_id).is_some() {
            debug!(document_id, "search snapshot invalidated");
        }
    }

    pub fn invalidate_all(&mut self) {
        self.cache.clear();
    }

    /// Number of documents currently cached.
    pub fn cached_documents(&self) -> usize {
        self.cache.len()
    }

    async fn ensure_cached(&mut self, doc: &DocumentRef) -> Option<&CachedDocument> {
        if !self.cache.contains_key(&doc.id) {
            match self.source.load_document(&doc.id).await {
                Ok(payload) => {
                    let title = if payload.title.is_empty() {
                        doc.title.clone()
                    } else {
                        payload.title.clone()
                    };
                    self.cache.insert(
                        doc.id.clone(),
                        CachedDocument {
                            title,
                            records: payload.cell_data,
                            fetched_at: Utc::now(),
                        },
                    );
                }
                Err(err) => {
                    warn!(document_id = %doc.id, error = %err, "skipping document in search");
                    return None;
                }
            }
        }
        self.cache.get(&doc.id)
    }

    /// Fetch timestamp of a cached snapshot, if any.
    pub fn snapshot_age(&self, document_id: &str) -> Option<DateTime<Utc>> {
        self.cache.get(document_id).map(|c| c.fetched_at)
    }
}

/// Exact-match tier first, then case-insensitive title, then content. The
/// sort is stable, so equal keys keep their store insertion order.
fn rank(results: &mut [SearchResult], needle: &str) {
    results.sort_by(|a, b| {
        let a_exact = normalize_for_comparison(&a.content) == needle;
        let b_exact = normalize_for_comparison(&b.content) == needle;
        b_exact
            .cmp(&a_exact)
            .then_with(|| {
                a.document_title
                    .to_lowercase()
                    .cmp(&b.document_title.to_lowercase())
            })
            .then_with(|| a.content.to_lowercase().cmp(&b.content.to_lowercase()))
    });
}

/// One logical content value with every location it was found at.
///
/// Presentation-side grouping: the index's contract ends at the flat ranked
/// list, but callers usually want one entry per drug/term with all of its
/// occurrences.
#[derive(Debug, Clone)]
pub struct GroupedResult {
    pub content: String,
    pub summary: String,
    pub occurrences: Vec<Occurrence>,
}

#[derive(Debug, Clone)]
pub struct Occurrence {
    pub document_id: String,
    pub document_title: String,
    pub cell_id: CellId,
}

/// Group a ranked result list by normalized content, preserving rank order
/// of first appearance. The first non-empty summary in a group wins.
pub fn group_by_content(results: &[SearchResult]) -> Vec<GroupedResult> {
    let mut groups: IndexMap<String, GroupedResult> = IndexMap::new();
    for result in results {
        let key = normalize_for_comparison(&result.content);
        let group = groups.entry(key).or_insert_with(|| GroupedResult {
            content: result.content.clone(),
            summary: result.summary.clone(),
            occurrences: Vec::new(),
        });
        if group.summary.is_empty() && !result.summary.is_empty() {
            group.summary = result.summary.clone();
        }
        group.occurrences.push(Occurrence {
            document_id: result.document_id.clone(),
            document_title: result.document_title.clone(),
            cell_id: result.cell_id,
        });
    }
    groups.into_values().collect()
}
