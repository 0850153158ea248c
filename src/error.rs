//! Error types surfaced by the sync engine

use thiserror::Error;

use crate::config::Leg;

/// A chunked write stopped at its first rejected batch
#[derive(Debug, Error)]
#[error(
    "batch {} of {total_batches} rejected after {applied_items} identifiers were applied",
    .applied_batches + 1
)]
pub struct BatchError {
    pub applied_batches: usize,
    pub applied_items: usize,
    pub total_batches: usize,
    #[source]
    pub source: anyhow::Error,
}

/// A search call failed outright (an empty result is not a failure)
#[derive(Debug, Error)]
#[error("search for {query:?} failed")]
pub struct SearchFailure {
    pub query: String,
    #[source]
    pub source: anyhow::Error,
}

#[derive(Debug, Error)]
pub enum SyncError {
    /// Fatal to the whole run; raised before any side effect
    #[error("{catalog} session is not ready")]
    Auth {
        catalog: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("[{direction}] listing playlist {playlist_id} on {catalog} failed")]
    Listing {
        direction: Leg,
        catalog: String,
        playlist_id: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("[{direction}] resolving tracks on {catalog} failed")]
    Search {
        direction: Leg,
        catalog: String,
        #[source]
        source: SearchFailure,
    },

    #[error("[{direction}] writing to playlist {playlist_id} on {catalog} failed after {applied} identifiers")]
    Write {
        direction: Leg,
        catalog: String,
        playlist_id: String,
        applied: usize,
        #[source]
        source: BatchError,
    },
}

impl SyncError {
    /// Which pipeline stage failed, for logs
    pub fn stage(&self) -> &'static str {
        match self {
            SyncError::Auth { .. } => "auth",
            SyncError::Listing { .. } => "listing",
            SyncError::Search { .. } => "search",
            SyncError::Write { .. } => "write",
        }
    }

    /// The error and all of its causes on one line
    pub fn describe(&self) -> String {
        let mut message = self.to_string();
        let mut cause = std::error::Error::source(self);
        while let Some(error) = cause {
            message.push_str(": ");
            message.push_str(&error.to_string());
            cause = error.source();
        }
        message
    }

    pub fn direction(&self) -> Option<Leg> {
        match self {
            SyncError::Auth { .. } => None,
            SyncError::Listing { direction, .. }
            | SyncError::Search { direction, .. }
            | SyncError::Write { direction, .. } => Some(*direction),
        }
    }
}
