//! # Tablenotes
//!
//! Cell-level annotation, identity reconciliation, and cross-guide search
//! for tabular study documents.
//!
//! The hosting application renders guide tables and calls into this core:
//! per rendered cell it asks [`reconcile::resolve`] which annotation record
//! the cell belongs to (healing structural identifier drift), edits flow
//! through [`store::AnnotationStore`], and a search UI queries
//! [`search::SearchIndex`] across every known guide, jumping to hits with
//! [`navigate::Navigator`].
//!
//! ```text
//! ┌──────────┐  resolve(id, live text)   ┌────────────┐
//! │ Renderer │──────────────────────────▶│ Reconciler │
//! └────┬─────┘                           └─────┬──────┘
//!      │ upsert/delete                         │ get/iter
//!      ▼                                       ▼
//! ┌──────────────────┐   snapshots   ┌─────────────┐
//! │ AnnotationStore  │──────────────▶│ SearchIndex │
//! └──────────────────┘  (per guide)  └──────┬──────┘
//!                                           │ hits
//!                                           ▼
//!                                     ┌───────────┐
//!                                     │ Navigator │
//!                                     └───────────┘
//! ```
//!
//! Rendering, UI chrome, and persistence of exported payloads live behind
//! the [`source::DocumentSource`] and [`navigate::CellSurface`] traits.
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`cell_id`] | Structural cell identifiers (`table_<t>_row_<r>_col_<c>`) |
//! | [`normalize`] | Canonical text normalization |
//! | [`models`] | Payload, record, and result types |
//! | [`store`] | Per-document annotation store |
//! | [`reconcile`] | Cell identity reconciliation |
//! | [`search`] | Cross-document annotation search |
//! | [`navigate`] | Navigation to a rendered cell |
//! | [`schedule`] | Debounced, cancellable scheduled tasks |
//! | [`events`] | Publish/subscribe change notification |
//! | [`source`] | Document fetch collaborator trait |
//! | [`config`] | TOML configuration |
//! | [`error`] | Error taxonomy |

pub mod cell_id;
pub mod config;
pub mod error;
pub mod events;
pub mod models;
pub mod navigate;
pub mod normalize;
pub mod reconcile;
pub mod schedule;
pub mod search;
pub mod source;
pub mod store;

pub use cell_id::CellId;
pub use config::{Config, NavigationConfig, SearchConfig};
pub use error::Error;
pub use models::{
    AnnotationPatch, AnnotationRecord, DocumentPayload, DocumentRef, SearchResult, TableData,
};
pub use navigate::{CellSurface, NavigationOutcome, Navigator};
pub use reconcile::{resolve, MatchKind, Outcome, Resolution};
pub use search::{group_by_content, GroupedResult, Occurrence, SearchIndex};
pub use source::DocumentSource;
pub use store::{AnnotationStore, StoreEvent};
