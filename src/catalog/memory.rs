//! In-memory catalog with failure injection, for exercising the sync engine

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use tokio::sync::Mutex;

use super::Catalog;
use crate::model::{PlaylistSnapshot, Track};

pub struct MemoryCatalog {
    name: String,
    max_batch_size: usize,
    ready: bool,
    playlists: Mutex<HashMap<String, Vec<Track>>>,
    // search query (lowercased) -> identifier
    search_index: HashMap<String, String>,
    // identifier -> track stored when the identifier is added
    songs: HashMap<String, Track>,
    search_delays: HashMap<String, Duration>,
    failing_listings: HashSet<String>,
    failing_queries: HashSet<String>,
    failing_batch: Option<usize>,
    batch_calls: AtomicUsize,
    batches: Mutex<Vec<(String, Vec<String>)>>,
    searches: Mutex<Vec<String>>,
}

impl MemoryCatalog {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            max_batch_size: 100,
            ready: true,
            playlists: Mutex::new(HashMap::new()),
            search_index: HashMap::new(),
            songs: HashMap::new(),
            search_delays: HashMap::new(),
            failing_listings: HashSet::new(),
            failing_queries: HashSet::new(),
            failing_batch: None,
            batch_calls: AtomicUsize::new(0),
            batches: Mutex::new(Vec::new()),
            searches: Mutex::new(Vec::new()),
        }
    }

    pub fn with_max_batch_size(mut self, size: usize) -> Self {
        self.max_batch_size = size;
        self
    }

    pub fn with_playlist(mut self, playlist_id: &str, tracks: Vec<Track>) -> Self {
        self.playlists.get_mut().insert(playlist_id.to_string(), tracks);
        self
    }

    /// Makes `track` findable by its search query under `identifier`
    pub fn with_song(mut self, track: Track, identifier: &str) -> Self {
        self.search_index
            .insert(track.search_query().to_lowercase(), identifier.to_string());
        self.songs.insert(identifier.to_string(), track);
        self
    }

    pub fn with_search_delay(mut self, query: &str, delay: Duration) -> Self {
        self.search_delays.insert(query.to_lowercase(), delay);
        self
    }

    pub fn not_ready(mut self) -> Self {
        self.ready = false;
        self
    }

    pub fn fail_listing(mut self, playlist_id: &str) -> Self {
        self.failing_listings.insert(playlist_id.to_string());
        self
    }

    pub fn fail_search(mut self, query: &str) -> Self {
        self.failing_queries.insert(query.to_lowercase());
        self
    }

    /// The `index`-th (zero based) mutation call is rejected
    pub fn fail_batch(mut self, index: usize) -> Self {
        self.failing_batch = Some(index);
        self
    }

    /// Successful mutation calls as `(playlist_id, identifiers)`
    pub async fn batches(&self) -> Vec<(String, Vec<String>)> {
        self.batches.lock().await.clone()
    }

    pub async fn searches(&self) -> Vec<String> {
        self.searches.lock().await.clone()
    }

    pub async fn playlist(&self, playlist_id: &str) -> Vec<Track> {
        self.playlists
            .lock()
            .await
            .get(playlist_id)
            .cloned()
            .unwrap_or_default()
    }
}

#[async_trait]
impl Catalog for MemoryCatalog {
    fn name(&self) -> &str {
        &self.name
    }

    fn max_batch_size(&self) -> usize {
        self.max_batch_size
    }

    async fn ensure_ready(&self) -> Result<()> {
        if self.ready {
            Ok(())
        } else {
            Err(anyhow!("{} session expired", self.name))
        }
    }

    async fn list_playlist_tracks(&self, playlist_id: &str) -> Result<PlaylistSnapshot> {
        if self.failing_listings.contains(playlist_id) {
            return Err(anyhow!("page 2 of {} returned 503", playlist_id));
        }
        self.playlists
            .lock()
            .await
            .get(playlist_id)
            .cloned()
            .ok_or_else(|| anyhow!("playlist {} not found", playlist_id))
    }

    async fn find_track(&self, query: &str) -> Result<Option<String>> {
        let key = query.to_lowercase();
        self.searches.lock().await.push(query.to_string());
        if let Some(delay) = self.search_delays.get(&key) {
            tokio::time::sleep(*delay).await;
        }
        if self.failing_queries.contains(&key) {
            return Err(anyhow!("search for {} timed out", query));
        }
        Ok(self.search_index.get(&key).cloned())
    }

    async fn add_batch(&self, playlist_id: &str, identifiers: &[String]) -> Result<()> {
        let call = self.batch_calls.fetch_add(1, Ordering::SeqCst);
        if self.failing_batch == Some(call) {
            return Err(anyhow!("mutation {} rejected with 500", call));
        }

        let mut playlists = self.playlists.lock().await;
        let playlist = playlists
            .get_mut(playlist_id)
            .ok_or_else(|| anyhow!("playlist {} not found", playlist_id))?;
        for identifier in identifiers {
            let track = self
                .songs
                .get(identifier)
                .cloned()
                .ok_or_else(|| anyhow!("unknown identifier {}", identifier))?;
            playlist.push(track);
        }
        drop(playlists);

        self.batches
            .lock()
            .await
            .push((playlist_id.to_string(), identifiers.to_vec()));
        Ok(())
    }
}
