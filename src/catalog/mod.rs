//! Catalog module - Uniform access to the remote music services
//!
//! - `spotify`: Spotify Web API through rspotify
//! - `ytmusic`: YouTube Music InnerTube API over reqwest
//! - `memory`: In-memory catalog used by the tests

pub mod spotify;
pub mod ytmusic;

#[cfg(test)]
pub mod memory;

use anyhow::Result;
use async_trait::async_trait;

use crate::error::BatchError;
use crate::model::PlaylistSnapshot;

pub use spotify::SpotifyCatalog;
pub use ytmusic::YtMusicCatalog;

/// Operations the sync engine needs from a music service.
///
/// Implementations hide their pagination and per-call size limits; the engine
/// only sees whole playlists, single search hits and ordered adds.
#[async_trait]
pub trait Catalog: Send + Sync {
    /// Human readable service name, used in logs and errors
    fn name(&self) -> &str;

    /// Largest number of identifiers one mutation call may carry
    fn max_batch_size(&self) -> usize;

    /// Fails when the session cannot be used for API calls
    async fn ensure_ready(&self) -> Result<()>;

    /// Full playlist contents, following pagination until exhausted.
    /// Any failed page fails the whole listing.
    async fn list_playlist_tracks(&self, playlist_id: &str) -> Result<PlaylistSnapshot>;

    /// Identifier of the top search hit, `None` when the search is empty
    async fn find_track(&self, query: &str) -> Result<Option<String>>;

    /// One mutation call; `identifiers` never exceeds `max_batch_size`
    async fn add_batch(&self, playlist_id: &str, identifiers: &[String]) -> Result<()>;

    /// Adds `identifiers` in order, one call per chunk of `max_batch_size`.
    ///
    /// Stops at the first rejected chunk; chunks before it stay applied.
    /// Returns the number of calls issued.
    async fn add_tracks(&self, playlist_id: &str, identifiers: &[String]) -> Result<usize, BatchError> {
        let size = self.max_batch_size().max(1);
        let total_batches = identifiers.len().div_ceil(size);
        let mut applied_items = 0;

        for (index, chunk) in identifiers.chunks(size).enumerate() {
            if let Err(source) = self.add_batch(playlist_id, chunk).await {
                tracing::error!(
                    catalog = self.name(),
                    playlist_id,
                    batch = index + 1,
                    total_batches,
                    applied_items,
                    error = %source,
                    "Batch add failed"
                );
                return Err(BatchError {
                    applied_batches: index,
                    applied_items,
                    total_batches,
                    source,
                });
            }
            applied_items += chunk.len();
            tracing::debug!(
                catalog = self.name(),
                playlist_id,
                batch = index + 1,
                total_batches,
                size = chunk.len(),
                "Batch added"
            );
        }

        Ok(total_batches)
    }
}
