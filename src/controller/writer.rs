//! Hands resolved identifiers to the target catalog

use crate::catalog::Catalog;
use crate::error::BatchError;

/// Adds `identifiers` to `playlist_id`, returning how many were submitted.
///
/// Chunking is left to the catalog, which knows its own per-call limit.
pub async fn write(catalog: &dyn Catalog, playlist_id: &str, identifiers: &[String]) -> Result<usize, BatchError> {
    if identifiers.is_empty() {
        tracing::debug!(catalog = catalog.name(), playlist_id, "Nothing to add");
        return Ok(0);
    }

    let calls = catalog.add_tracks(playlist_id, identifiers).await?;
    tracing::info!(
        catalog = catalog.name(),
        playlist_id,
        count = identifiers.len(),
        calls,
        "Tracks added"
    );
    Ok(identifiers.len())
}
