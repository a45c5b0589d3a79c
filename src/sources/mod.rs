pub mod crossref;

pub use crossref::CrossrefProvider;

use async_trait::async_trait;

use crate::error::Result;
use crate::identifiers::Doi;
use crate::types::ResolvedMetadata;

/// External bibliographic metadata provider.
///
/// Both lookups may fail; the engine always treats a failure as "absent"
/// for the reference in question and never aborts a batch over it.
#[async_trait]
pub trait MetadataProvider: Send + Sync {
    /// Fetch structured metadata for a known identifier.
    async fn by_identifier(&self, doi: &Doi) -> Result<Option<ResolvedMetadata>>;

    /// Free-text bibliographic match, best hit first. Returns the top
    /// candidate's metadata when the provider has one.
    async fn by_bibliographic_query(&self, text: &str) -> Result<Option<ResolvedMetadata>>;
}
