//! Cell identity reconciliation.
//!
//! Structural identifiers are derived from table/row/column position at
//! render time, and the same position can denote a different logical cell
//! across renders: rowspans collapse empty rows, re-parsing renumbers
//! tables, data edits move content around. The content of an annotated cell
//! is comparatively stable, so content equality outranks identifier equality
//! when deciding which record a rendered cell belongs to.
//!
//! Resolution order, strict:
//! 1. fast path — the record at the identifier already matches the live text
//! 2. exact normalized-content match anywhere in the store
//! 3. case-insensitive normalized-content match (non-empty text only)
//! 4. collision — a record exists at the identifier but for other content;
//!    its summary and timestamp are preserved on a fresh record
//! 5. seed — no prior record at all
//!
//! Steps 2 and 3 scan in the store's insertion order and take the first
//! match. That tie-break is user-visible policy, not an accident; see the
//! `first_match_in_insertion_order_wins` test.

use tracing::{debug, warn};

use crate::cell_id::CellId;
use crate::models::AnnotationRecord;
use crate::normalize::{normalize, normalize_for_comparison};
use crate::store::AnnotationStore;

/// How strong the content match behind a remap was.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchKind {
    /// Case-sensitive normalized-content equality.
    Exact,
    /// Case-insensitive normalized-content equality.
    CaseInsensitive,
}

/// How a [`Resolution`] was reached. Remaps and collisions are informational
/// signals, not errors; they are also reported on the tracing channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The record at the structural identifier already matches the live text.
    Unchanged,
    /// The record was found under a different identifier by content match.
    /// The caller may want to update its stored identifier.
    Remapped { from: CellId, kind: MatchKind },
    /// A record existed at the identifier but for different content. The
    /// prior summary is preserved rather than discarded, since the mismatch
    /// does not prove irrelevance.
    Collision { expected: String, found: String },
    /// No prior record; a fresh one was synthesized.
    Seeded,
}

/// The record a rendered cell belongs to, and the identifier it actually
/// lives under.
#[derive(Debug, Clone)]
pub struct Resolution {
    pub id: CellId,
    pub record: AnnotationRecord,
    pub outcome: Outcome,
}

/// Resolve the annotation record for the cell rendered at `id` with
/// `live_text` as its current content.
///
/// Read-only: synthesized or remapped records are returned to the caller,
/// which writes back through the store once the user actually edits.
pub fn resolve(id: &CellId, live_text: &str, store: &AnnotationStore) -> Resolution {
    let actual = normalize(live_text);
    let actual_cmp = normalize_for_comparison(live_text);

    let existing = store.get(id);

    // Fast path: no drift.
    if let Some(record) = existing {
        if normalize_for_comparison(&record.content) == actual_cmp {
            return Resolution {
                id: *id,
                record: record.clone(),
                outcome: Outcome::Unchanged,
            };
        }
    }

    if let Some(resolution) = scan(store, id, &actual, MatchKind::Exact) {
        return resolution;
    }
    if !actual_cmp.is_empty() {
        if let Some(resolution) = scan(store, id, &actual, MatchKind::CaseInsensitive) {
            return resolution;
        }
    }

    if let Some(existing) = existing {
        warn!(
            %id,
            expected = %actual,
            found = %existing.content,
            "cell identifier collision; preserving prior summary"
        );
        let outcome = Outcome::Collision {
            expected: actual.clone(),
            found: existing.content.clone(),
        };
        return Resolution {
            id: *id,
            record: AnnotationRecord {
                content: actual,
                summary: existing.summary.clone(),
                last_updated: existing.last_updated.clone(),
            },
            outcome,
        };
    }

    Resolution {
        id: *id,
        record: AnnotationRecord::new(actual),
        outcome: Outcome::Seeded,
    }
}

fn scan(
    store: &AnnotationStore,
    requested: &CellId,
    actual: &str,
    kind: MatchKind,
) -> Option<Resolution> {
    for (key, record) in store.iter() {
        let matched = match kind {
            MatchKind::Exact => normalize(&record.content) == actual,
            MatchKind::CaseInsensitive => {
                normalize_for_comparison(&record.content) == normalize_for_comparison(actual)
            }
        };
        if !matched {
            continue;
        }
        let matched_id: CellId = match key.parse() {
            Ok(parsed) => parsed,
            Err(_) => {
                warn!(key, "skipping record with malformed identifier");
                continue;
            }
        };
        debug!(
            from = %requested,
            to = %matched_id,
            ?kind,
            "cell identifier remapped by content match"
        );
        let mut record = record.clone();
        record.content = actual.to_string();
        return Some(Resolution {
            id: matched_id,
            record,
            outcome: Outcome::Remapped {
                from: *requested,
                kind,
            },
        });
    }
    None
}
