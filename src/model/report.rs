//! Counters produced by a sync run, handed to whoever renders them

use crate::error::SyncError;

/// Outcome of one directional sync
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DirectionReport {
    pub source_tracks: usize,
    pub target_tracks: usize,
    pub missing: usize,
    pub resolved: usize,
    pub added: usize,
    pub dry_run: bool,
}

impl DirectionReport {
    /// Missing tracks the target catalog's search found nothing for
    pub fn unresolved(&self) -> usize {
        self.missing - self.resolved
    }
}

/// Outcome of a whole run; a leg that was not selected stays `None`
#[derive(Debug, Default)]
pub struct SyncReport {
    pub source_to_target: Option<Result<DirectionReport, SyncError>>,
    pub target_to_source: Option<Result<DirectionReport, SyncError>>,
}

impl SyncReport {
    pub fn added_to_target(&self) -> usize {
        Self::added(&self.source_to_target)
    }

    pub fn added_to_source(&self) -> usize {
        Self::added(&self.target_to_source)
    }

    pub fn failures(&self) -> impl Iterator<Item = &SyncError> {
        [&self.source_to_target, &self.target_to_source]
            .into_iter()
            .filter_map(|leg| leg.as_ref().and_then(|r| r.as_ref().err()))
    }

    pub fn has_failures(&self) -> bool {
        self.failures().next().is_some()
    }

    fn added(leg: &Option<Result<DirectionReport, SyncError>>) -> usize {
        match leg {
            Some(Ok(report)) => report.added,
            _ => 0,
        }
    }
}
