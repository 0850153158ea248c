//! Resolves missing tracks to identifiers of the catalog they will be added to

use futures::{stream, StreamExt, TryStreamExt};

use crate::catalog::Catalog;
use crate::error::SearchFailure;
use crate::model::Track;

/// Searches `catalog` for every track and keeps the hits, in input order.
///
/// At most `concurrency` searches are in flight; results are buffered back
/// into input order. A track without a hit is skipped, a failed search call
/// stops the resolution.
pub async fn resolve(catalog: &dyn Catalog, tracks: &[Track], concurrency: usize) -> Result<Vec<String>, SearchFailure> {
    let hits: Vec<Option<String>> = stream::iter(tracks)
        .map(|track| async move {
            let query = track.search_query();
            match catalog.find_track(&query).await {
                Ok(Some(identifier)) => {
                    tracing::trace!(query = %query, identifier = %identifier, "Track resolved");
                    Ok(Some(identifier))
                }
                Ok(None) => {
                    tracing::debug!(
                        catalog = catalog.name(),
                        title = %track.title,
                        artist = %track.artist,
                        "No match found, skipping"
                    );
                    Ok(None)
                }
                Err(source) => Err(SearchFailure { query, source }),
            }
        })
        .buffered(concurrency.max(1))
        .try_collect()
        .await?;

    Ok(hits.into_iter().flatten().collect())
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::catalog::memory::MemoryCatalog;

    fn catalog() -> MemoryCatalog {
        MemoryCatalog::new("Fake")
            .with_song(Track::new("B", "Y"), "id123")
            .with_song(Track::new("C", "Z"), "id456")
            .with_song(Track::new("D", "W"), "id789")
    }

    #[tokio::test]
    async fn skips_tracks_without_a_match() {
        let missing = vec![Track::new("B", "Y"), Track::new("Nope", "Nobody"), Track::new("C", "Z")];

        let resolved = resolve(&catalog(), &missing, 4).await.unwrap();

        assert_eq!(resolved, vec!["id123", "id456"]);
        assert!(resolved.len() <= missing.len());
    }

    #[tokio::test]
    async fn searches_once_per_track_with_trimmed_query() {
        let catalog = catalog();
        let missing = vec![Track::new("B", "Y"), Track::new("Solo", "")];

        resolve(&catalog, &missing, 1).await.unwrap();

        assert_eq!(catalog.searches().await, vec!["B Y", "Solo"]);
    }

    #[tokio::test]
    async fn keeps_input_order_when_searches_finish_out_of_order() {
        let catalog = catalog()
            .with_search_delay("B Y", Duration::from_millis(60))
            .with_search_delay("C Z", Duration::from_millis(30));
        let missing = vec![Track::new("B", "Y"), Track::new("C", "Z"), Track::new("D", "W")];

        let resolved = resolve(&catalog, &missing, 3).await.unwrap();

        assert_eq!(resolved, vec!["id123", "id456", "id789"]);
    }

    #[tokio::test]
    async fn failed_search_is_reported_with_its_query() {
        let catalog = catalog().fail_search("C Z");
        let missing = vec![Track::new("B", "Y"), Track::new("C", "Z")];

        let err = resolve(&catalog, &missing, 2).await.unwrap_err();

        assert_eq!(err.query, "C Z");
    }

    #[tokio::test]
    async fn nothing_to_resolve() {
        assert!(resolve(&catalog(), &[], 4).await.unwrap().is_empty());
    }
}
