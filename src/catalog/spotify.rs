//! Spotify catalog backed by the rspotify Web API client

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use futures::TryStreamExt;
use rspotify::{
    model::{PlayableId, PlayableItem, PlaylistId, PlaylistItem, SearchResult, SearchType, TrackId},
    prelude::*,
    AuthCodeSpotify,
};

use super::Catalog;
use crate::config::SPOTIFY_MAX_BATCH;
use crate::model::{PlaylistSnapshot, Track};

/// Spotify Web API session wrapped as a [`Catalog`]
#[derive(Clone)]
pub struct SpotifyCatalog {
    client: Arc<AuthCodeSpotify>,
    max_batch_size: usize,
}

impl SpotifyCatalog {
    pub fn new(client: AuthCodeSpotify) -> Self {
        Self {
            client: Arc::new(client),
            max_batch_size: SPOTIFY_MAX_BATCH,
        }
    }

    pub fn with_max_batch_size(mut self, size: usize) -> Self {
        self.max_batch_size = size.max(1);
        self
    }

    fn playlist_id(playlist_id: &str) -> Result<PlaylistId<'_>> {
        Ok(PlaylistId::from_id_or_uri(playlist_id)?)
    }
}

/// Deleted or unavailable entries come back without an item and are skipped
fn track_from_item(item: PlaylistItem) -> Option<Track> {
    let track = match item.track? {
        PlayableItem::Track(track) => Track::new(
            track.name,
            track.artists.into_iter().next().map(|a| a.name).unwrap_or_default(),
        ),
        PlayableItem::Episode(episode) => Track::new(episode.name, episode.show.name),
        #[allow(unreachable_patterns)]
        _ => Track::default(),
    };
    Some(track)
}

#[async_trait]
impl Catalog for SpotifyCatalog {
    fn name(&self) -> &str {
        "Spotify"
    }

    fn max_batch_size(&self) -> usize {
        self.max_batch_size
    }

    async fn ensure_ready(&self) -> Result<()> {
        let user = self.client.me().await?;
        tracing::debug!(user_id = %user.id, "Spotify session ready");
        Ok(())
    }

    async fn list_playlist_tracks(&self, playlist_id: &str) -> Result<PlaylistSnapshot> {
        tracing::debug!(playlist_id, "API: playlist_items");
        let id = Self::playlist_id(playlist_id)?;

        // The stream walks the `next` cursor page by page; the first failed
        // page ends the collection with its error.
        let items: Vec<PlaylistItem> = self.client.playlist_items(id, None, None).try_collect().await?;
        let fetched = items.len();
        let tracks: PlaylistSnapshot = items.into_iter().filter_map(track_from_item).collect();

        tracing::info!(playlist_id, fetched, count = tracks.len(), "Spotify playlist listed");
        Ok(tracks)
    }

    async fn find_track(&self, query: &str) -> Result<Option<String>> {
        tracing::trace!(query, "API: search");
        let result = self
            .client
            .search(query, SearchType::Track, None, None, Some(1), None)
            .await?;

        let uri = match result {
            SearchResult::Tracks(page) => page
                .items
                .into_iter()
                .next()
                .and_then(|track| track.id)
                .map(|id| id.uri()),
            _ => None,
        };
        Ok(uri)
    }

    async fn add_batch(&self, playlist_id: &str, identifiers: &[String]) -> Result<()> {
        tracing::debug!(playlist_id, count = identifiers.len(), "API: playlist_add_items");
        let id = Self::playlist_id(playlist_id)?;
        let items = identifiers
            .iter()
            .map(|uri| Ok(PlayableId::Track(TrackId::from_id_or_uri(uri)?.into_static())))
            .collect::<Result<Vec<_>>>()?;

        self.client.playlist_add_items(id, items, None).await?;
        Ok(())
    }
}
