//! Document fetch collaborator.

use async_trait::async_trait;

use crate::error::Error;
use crate::models::DocumentPayload;

/// Fetches a guide document's payload by id.
///
/// Implemented by the hosting application: an HTTP fetch of the converted
/// JSON in production, a map lookup in tests. Failures surface as
/// [`Error::FetchFailure`]; the search path skips such documents while the
/// document-load path reports them to the user.
#[async_trait]
pub trait DocumentSource: Send + Sync {
    async fn load_document(&self, document_id: &str) -> Result<DocumentPayload, Error>;
}
