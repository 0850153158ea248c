//! Track value type and the identity key used to compare tracks across catalogs

/// A track as listed by a catalog, reduced to what matching needs
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Track {
    pub title: String,
    pub artist: String,
}

/// Full contents of one playlist in one catalog, in catalog order
pub type PlaylistSnapshot = Vec<Track>;

impl Track {
    pub fn new(title: impl Into<String>, artist: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            artist: artist.into(),
        }
    }

    /// Case- and whitespace-insensitive key; two tracks are the same song iff keys match
    pub fn identity_key(&self) -> String {
        format!("{} {}", normalize(&self.title), normalize(&self.artist))
    }

    /// Query sent to a catalog's search when resolving this track
    pub fn search_query(&self) -> String {
        format!("{} {}", self.title, self.artist).trim().to_string()
    }
}

pub fn normalize(value: &str) -> String {
    value.trim().to_lowercase()
}
