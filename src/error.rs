//! Error taxonomy for the annotation core.
//!
//! Everything here is recovered close to where it occurs: malformed
//! identifiers drop the affected entry, fetch failures skip the affected
//! document in search, and a missing cell leaves the view in its last valid
//! state. Only [`Error::DocumentNotFound`] forces the caller to change
//! course, since navigation cannot proceed without the document.
//!
//! Content drift and identifier collisions are deliberately *not* errors;
//! they are reported as [`reconcile::Outcome`](crate::reconcile::Outcome)
//! variants plus tracing signals.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// A cell identifier string does not match the
    /// `table_<t>_row_<r>_col_<c>` pattern. Distinct from a missing key.
    #[error("malformed cell identifier: {raw:?}")]
    MalformedIdentifier { raw: String },

    /// A document's payload could not be retrieved from its source.
    #[error("failed to fetch document {document_id:?}: {reason}")]
    FetchFailure { document_id: String, reason: String },

    /// The requested document is not known to the rendering surface.
    #[error("document not found: {document_id:?}")]
    DocumentNotFound { document_id: String },

    /// The rendered cell never appeared within the retry budget.
    #[error("cell {cell_id} not found in document {document_id:?}")]
    CellNotFound { document_id: String, cell_id: String },
}
