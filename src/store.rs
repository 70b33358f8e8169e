//! Per-document annotation store.
//!
//! Owns the live mapping from cell identifier to [`AnnotationRecord`] for the
//! currently loaded guide and writes every edit through to the backing
//! payload, so an export always reflects the latest state. At most one store
//! is the live write target at a time; swapping documents goes through
//! [`AnnotationStore::load`] / [`AnnotationStore::clear`], which replace the
//! contents wholesale (never a partial mix of two documents).
//!
//! Records keep their insertion order: the reconciler's first-match tie-break
//! depends on scanning the mapping in the order entries were added.

use chrono::{SecondsFormat, Utc};
use indexmap::IndexMap;

use crate::cell_id::CellId;
use crate::events::EventBus;
use crate::models::{AnnotationPatch, AnnotationRecord, DocumentPayload};

/// Published after every successful write or delete, so callers can
/// invalidate any search snapshot of this document.
#[derive(Debug, Clone)]
pub struct StoreEvent {
    pub document_id: String,
}

pub struct AnnotationStore {
    document_id: Option<String>,
    records: IndexMap<String, AnnotationRecord>,
    backing: Option<DocumentPayload>,
    version: u64,
    changes: EventBus<StoreEvent>,
}

impl Default for AnnotationStore {
    fn default() -> Self {
        Self::new()
    }
}

impl AnnotationStore {
    pub fn new() -> Self {
        Self {
            document_id: None,
            records: IndexMap::new(),
            backing: None,
            version: 0,
            changes: EventBus::new(),
        }
    }

    /// Replace the store contents with a freshly loaded document. A missing
    /// annotation mapping in the payload means an empty store, not an error.
    pub fn load(&mut self, document_id: impl Into<String>, payload: DocumentPayload) {
        self.records = payload.cell_data.clone();
        self.document_id = Some(document_id.into());
        self.backing = Some(payload);
        self.version += 1;
    }

    /// Drop the records and the backing payload reference.
    pub fn clear(&mut self) {
        self.records.clear();
        self.backing = None;
        self.document_id = None;
        self.version += 1;
    }

    pub fn document_id(&self) -> Option<&str> {
        self.document_id.as_deref()
    }

    /// Monotonically increasing counter, bumped on every mutation.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Change notifications; see [`StoreEvent`].
    pub fn changes(&self) -> &EventBus<StoreEvent> {
        &self.changes
    }

    pub fn get(&self, id: &CellId) -> Option<&AnnotationRecord> {
        self.records.get(&id.to_string())
    }

    /// Insert or update the record at `id`. A missing record is seeded with
    /// the patch's content (or empty) and an empty summary, then patch fields
    /// are merged over it. `last_updated` is stamped on every write, and the
    /// result is written through to the backing payload.
    pub fn upsert(&mut self, id: &CellId, patch: AnnotationPatch) -> AnnotationRecord {
        let key = id.to_string();
        let entry = self
            .records
            .entry(key.clone())
            .or_insert_with(|| AnnotationRecord {
                content: patch.content.clone().unwrap_or_default(),
                summary: String::new(),
                last_updated: None,
            });
        if let Some(content) = patch.content {
            entry.content = content;
        }
        if let Some(summary) = patch.summary {
            entry.summary = summary;
        }
        entry.last_updated = Some(Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true));
        let record = entry.clone();
        if let Some(payload) = self.backing.as_mut() {
            payload.cell_data.insert(key, record.clone());
        }
        self.bump();
        record
    }

    /// Remove the record at `id` from the store and the backing payload.
    /// Absent is a no-op, not an error.
    pub fn delete(&mut self, id: &CellId) {
        let key = id.to_string();
        let removed = self.records.shift_remove(&key).is_some();
        if let Some(payload) = self.backing.as_mut() {
            payload.cell_data.shift_remove(&key);
        }
        if removed {
            self.bump();
        }
    }

    /// The full current mapping; empty when nothing is loaded.
    pub fn export_all(&self) -> &IndexMap<String, AnnotationRecord> {
        &self.records
    }

    /// The backing payload with its annotation mapping replaced by the
    /// current in-memory mapping, so external writers always see the latest
    /// edits. `None` when no document is loaded.
    pub fn export_document(&self) -> Option<DocumentPayload> {
        self.backing.as_ref().map(|payload| {
            let mut out = payload.clone();
            out.cell_data = self.records.clone();
            out
        })
    }

    /// Records in insertion order, keys in their textual form.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &AnnotationRecord)> {
        self.records.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    fn bump(&mut self) {
        self.version += 1;
        if let Some(id) = &self.document_id {
            self.changes.publish(&StoreEvent {
                document_id: id.clone(),
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload_with(records: &[(&str, &str, &str)]) -> DocumentPayload {
        let mut payload = DocumentPayload {
            title: "Guide".into(),
            ..Default::default()
        };
        for (key, content, summary) in records {
            payload.cell_data.insert(
                key.to_string(),
                AnnotationRecord {
                    content: content.to_string(),
                    summary: summary.to_string(),
                    last_updated: None,
                },
            );
        }
        payload
    }

    #[test]
    fn upsert_seeds_then_merges() {
        let mut store = AnnotationStore::new();
        store.load("doc", DocumentPayload::default());
        let id = CellId::new(1, 1, 0);

        let seeded = store.upsert(&id, AnnotationPatch::content("Aspirin"));
        assert_eq!(seeded.content, "Aspirin");
        assert_eq!(seeded.summary, "");
        assert!(seeded.last_updated.is_some());

        let merged = store.upsert(&id, AnnotationPatch::summary("antiplatelet"));
        assert_eq!(merged.content, "Aspirin", "unpatched field kept");
        assert_eq!(merged.summary, "antiplatelet");
    }

    #[test]
    fn delete_is_noop_when_absent() {
        let mut store = AnnotationStore::new();
        store.load("doc", DocumentPayload::default());
        let before = store.version();
        store.delete(&CellId::new(9, 9, 9));
        assert_eq!(store.version(), before, "no-op delete must not bump");
    }

    #[test]
    fn export_document_reflects_writes_in_order() {
        let mut store = AnnotationStore::new();
        store.load(
            "doc",
            payload_with(&[("table_1_row_1_col_0", "Warfarin", "")]),
        );

        let a = CellId::new(1, 1, 0);
        let b = CellId::new(1, 2, 0);
        store.upsert(&a, AnnotationPatch::summary("first"));
        store.upsert(&b, AnnotationPatch::content("Heparin"));
        store.upsert(&a, AnnotationPatch::summary("second"));
        store.delete(&b);

        let exported = store.export_document().unwrap();
        assert_eq!(exported.cell_data.len(), 1);
        assert_eq!(
            exported.cell_data["table_1_row_1_col_0"].summary, "second",
            "last write wins per id"
        );

        // Re-loading the exported payload reproduces the store contents.
        let mut reloaded = AnnotationStore::new();
        reloaded.load("doc", exported);
        assert_eq!(reloaded.export_all(), store.export_all());
    }

    #[test]
    fn load_replaces_contents_wholesale() {
        let mut store = AnnotationStore::new();
        store.load("a", payload_with(&[("table_1_row_1_col_0", "X", "note")]));
        store.load("b", payload_with(&[("table_1_row_2_col_1", "Y", "")]));
        assert_eq!(store.len(), 1);
        assert!(store.get(&CellId::new(1, 1, 0)).is_none());
        assert_eq!(store.document_id(), Some("b"));
    }

    #[test]
    fn clear_drops_backing_payload() {
        let mut store = AnnotationStore::new();
        store.load("doc", payload_with(&[("table_1_row_1_col_0", "X", "")]));
        store.clear();
        assert!(store.is_empty());
        assert!(store.export_document().is_none());
        assert!(store.export_all().is_empty());
    }

    #[test]
    fn writes_publish_change_events() {
        use std::sync::{Arc, Mutex};

        let mut store = AnnotationStore::new();
        store.load("doc", DocumentPayload::default());
        let seen: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
        let sub = {
            let seen = Arc::clone(&seen);
            store.changes().subscribe(move |event: &StoreEvent| {
                seen.lock().unwrap().push(event.document_id.clone());
            })
        };

        let id = CellId::new(1, 0, 0);
        store.upsert(&id, AnnotationPatch::summary("note"));
        store.delete(&id);
        assert_eq!(*seen.lock().unwrap(), vec!["doc", "doc"]);
        sub.unsubscribe();
    }
}
