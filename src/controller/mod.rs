//! Controller module - Reconciliation of two playlists
//!
//! - `diff`: Missing-track computation
//! - `resolver`: Search-based identifier resolution
//! - `writer`: Submission of resolved identifiers

pub mod diff;
pub mod resolver;
pub mod writer;

use std::sync::Arc;

use tracing::Instrument;

use crate::catalog::Catalog;
use crate::config::{Leg, PlaylistPair, SyncDirection, SyncOptions};
use crate::error::SyncError;
use crate::model::{DirectionReport, SyncReport};

/// One side of a sync leg: a catalog and a playlist in it
#[derive(Clone, Copy)]
pub struct Side<'a> {
    pub catalog: &'a dyn Catalog,
    pub playlist_id: &'a str,
}

/// Copies into `target` every track of `source` it lacks.
///
/// Both playlists are listed concurrently, the missing tracks are searched on
/// the target catalog and the hits are added there in source order.
pub async fn sync_one_direction(
    source: Side<'_>,
    target: Side<'_>,
    leg: Leg,
    options: SyncOptions,
) -> Result<DirectionReport, SyncError> {
    let span = tracing::info_span!(
        "sync_one_direction",
        direction = %leg,
        from = source.catalog.name(),
        to = target.catalog.name()
    );

    async move {
        let (source_listing, target_listing) = futures::join!(
            source.catalog.list_playlist_tracks(source.playlist_id),
            target.catalog.list_playlist_tracks(target.playlist_id)
        );
        let listing_error = |side: Side<'_>, error: anyhow::Error| SyncError::Listing {
            direction: leg,
            catalog: side.catalog.name().to_string(),
            playlist_id: side.playlist_id.to_string(),
            source: error,
        };
        let source_tracks = source_listing.map_err(|e| listing_error(source, e))?;
        let target_tracks = target_listing.map_err(|e| listing_error(target, e))?;

        let missing = diff::missing(&target_tracks, &source_tracks);
        tracing::info!(
            source_tracks = source_tracks.len(),
            target_tracks = target_tracks.len(),
            missing = missing.len(),
            "Snapshots compared"
        );

        let identifiers = resolver::resolve(target.catalog, &missing, options.concurrency)
            .await
            .map_err(|error| SyncError::Search {
                direction: leg,
                catalog: target.catalog.name().to_string(),
                source: error,
            })?;
        tracing::info!(
            resolved = identifiers.len(),
            unresolved = missing.len() - identifiers.len(),
            "Missing tracks resolved"
        );

        let added = if options.dry_run {
            tracing::info!(would_add = identifiers.len(), "Dry run, nothing written");
            0
        } else {
            writer::write(target.catalog, target.playlist_id, &identifiers)
                .await
                .map_err(|error| SyncError::Write {
                    direction: leg,
                    catalog: target.catalog.name().to_string(),
                    playlist_id: target.playlist_id.to_string(),
                    applied: error.applied_items,
                    source: error,
                })?
        };

        Ok(DirectionReport {
            source_tracks: source_tracks.len(),
            target_tracks: target_tracks.len(),
            missing: missing.len(),
            resolved: identifiers.len(),
            added,
            dry_run: options.dry_run,
        })
    }
    .instrument(span)
    .await
}

/// Reconciles a playlist of the source catalog with one of the target catalog
#[derive(Clone)]
pub struct SyncController {
    source: Arc<dyn Catalog>,
    target: Arc<dyn Catalog>,
    playlists: PlaylistPair,
    options: SyncOptions,
}

impl SyncController {
    pub fn new(source: Arc<dyn Catalog>, target: Arc<dyn Catalog>, playlists: PlaylistPair, options: SyncOptions) -> Self {
        Self {
            source,
            target,
            playlists,
            options,
        }
    }

    fn source_side(&self) -> Side<'_> {
        Side {
            catalog: self.source.as_ref(),
            playlist_id: &self.playlists.source,
        }
    }

    fn target_side(&self) -> Side<'_> {
        Side {
            catalog: self.target.as_ref(),
            playlist_id: &self.playlists.target,
        }
    }

    /// Checks both sessions; nothing is listed or written when either fails
    pub async fn ensure_ready(&self) -> Result<(), SyncError> {
        for catalog in [&self.source, &self.target] {
            catalog.ensure_ready().await.map_err(|error| {
                tracing::error!(catalog = catalog.name(), error = %error, "Session not ready");
                SyncError::Auth {
                    catalog: catalog.name().to_string(),
                    source: error,
                }
            })?;
        }
        Ok(())
    }

    /// Runs a single leg
    pub async fn sync_leg(&self, leg: Leg) -> Result<DirectionReport, SyncError> {
        let (from, to) = match leg {
            Leg::SourceToTarget => (self.source_side(), self.target_side()),
            Leg::TargetToSource => (self.target_side(), self.source_side()),
        };
        sync_one_direction(from, to, leg, self.options).await
    }

    /// Runs both legs one after the other; a failed leg does not stop the other
    pub async fn sync_bidirectional(&self) -> SyncReport {
        self.sync_legs(SyncDirection::Both).await
    }

    /// Verifies both sessions, then runs the legs `direction` selects
    pub async fn run(&self, direction: SyncDirection) -> Result<SyncReport, SyncError> {
        self.ensure_ready().await?;
        Ok(self.sync_legs(direction).await)
    }

    async fn sync_legs(&self, direction: SyncDirection) -> SyncReport {
        let mut report = SyncReport::default();

        for &leg in direction.legs() {
            let outcome = self.sync_leg(leg).await;
            match &outcome {
                Ok(leg_report) => tracing::info!(
                    direction = %leg,
                    added = leg_report.added,
                    unresolved = leg_report.unresolved(),
                    "Direction synced"
                ),
                Err(error) => tracing::error!(
                    direction = %leg,
                    stage = error.stage(),
                    error = %error.describe(),
                    "Direction failed"
                ),
            }
            match leg {
                Leg::SourceToTarget => report.source_to_target = Some(outcome),
                Leg::TargetToSource => report.target_to_source = Some(outcome),
            }
        }

        report
    }
}
