//! Model module - Data types shared by the catalogs and the sync engine
//!
//! - `track`: Track value type and identity key
//! - `report`: Per-direction and per-run counters

mod track;
mod report;

pub use track::{PlaylistSnapshot, Track};

pub use report::{DirectionReport, SyncReport};
