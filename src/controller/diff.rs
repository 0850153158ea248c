//! Missing-track computation between two playlist snapshots

use std::collections::HashSet;

use crate::model::Track;

/// Tracks of `source` whose identity key does not appear in `target`, in source order.
///
/// Repeated tracks inside `source` are each tested against `target` on their
/// own, so a song listed twice in the source and absent from the target is
/// reported twice.
pub fn missing(target: &[Track], source: &[Track]) -> Vec<Track> {
    let target_keys: HashSet<String> = target.iter().map(Track::identity_key).collect();
    source
        .iter()
        .filter(|track| !target_keys.contains(&track.identity_key()))
        .cloned()
        .collect()
}
