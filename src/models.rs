//! Core data models for guide payloads, annotation records, and search
//! results.
//!
//! Field names follow the JSON produced by the guide conversion pipeline
//! (`cellData`, `lastUpdated`, `courseSlug`), so payloads load and export
//! byte-compatibly with what the converter and the hosting site exchange.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::cell_id::CellId;

/// Persisted `(content, summary, lastUpdated)` tuple for one cell.
///
/// `content` is always the normalizer's output, never raw markup; it is the
/// canonical cell text at the time the record was last reconciled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnotationRecord {
    #[serde(default)]
    pub content: String,
    /// Reader-authored free text; empty until the first edit.
    #[serde(default)]
    pub summary: String,
    /// ISO-8601 timestamp of the last write; absent until first written.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<String>,
}

impl AnnotationRecord {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            summary: String::new(),
            last_updated: None,
        }
    }
}

/// Partial update applied by
/// [`AnnotationStore::upsert`](crate::store::AnnotationStore::upsert).
/// Present fields win over the existing (or seeded) record.
#[derive(Debug, Clone, Default)]
pub struct AnnotationPatch {
    pub content: Option<String>,
    pub summary: Option<String>,
}

impl AnnotationPatch {
    pub fn content(value: impl Into<String>) -> Self {
        Self {
            content: Some(value.into()),
            summary: None,
        }
    }

    pub fn summary(value: impl Into<String>) -> Self {
        Self {
            content: None,
            summary: Some(value.into()),
        }
    }
}

/// One table extracted from a guide document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableData {
    #[serde(default)]
    pub headers: Vec<String>,
    #[serde(default)]
    pub rows: Vec<Vec<String>>,
}

/// Full guide document as produced by the conversion pipeline.
///
/// The annotation mapping is keyed by the textual cell identifier and may be
/// absent in older payloads (treated as empty). Unknown fields are captured
/// in `extra` so a load/export round trip is lossless.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentPayload {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub course: String,
    #[serde(default)]
    pub course_slug: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub tables: Vec<TableData>,
    #[serde(default)]
    pub cell_data: IndexMap<String, AnnotationRecord>,
    #[serde(flatten)]
    pub extra: IndexMap<String, Value>,
}

/// Entry from the guide index used to address a document in search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentRef {
    pub id: String,
    pub title: String,
}

impl DocumentRef {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
        }
    }
}

/// One search hit. Derived fresh per query, never persisted; the
/// table/row/column decomposition is carried by `cell_id`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    pub document_id: String,
    pub document_title: String,
    pub cell_id: CellId,
    pub content: String,
    pub summary: String,
}
