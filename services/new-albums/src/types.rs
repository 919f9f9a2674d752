//!
//! src/types.rs  Andrew Belles  Oct 2025
//!
//! Typed records returned by the catalog, validated at the
//! deserialization boundary
//!

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

use crate::errors::CurateError;

pub type Genre = String;

/// Release dates must be full calendar dates, anything else aborts the run
fn calendar_date<'de, D>(d: D) -> Result<NaiveDate, D::Error>
where
    D: Deserializer<'de>
{
    let raw = String::deserialize(d)?;
    NaiveDate::parse_from_str(&raw, "%Y-%m-%d")
        .map_err(|e| serde::de::Error::custom(format!("release_date {raw:?}: {e}")))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlbumType {
    Album,
    Single,
    Compilation,
    #[serde(other)]
    Other
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtistRef {
    pub id: String,
    pub name: String
}

/// Full artist record, only the genres are kept
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artist {
    pub id: String,
    #[serde(default)]
    pub genres: Vec<Genre>
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Album {
    pub id: String,
    pub uri: String,
    pub name: String,
    #[serde(deserialize_with = "calendar_date")]
    pub release_date: NaiveDate,
    pub album_type: AlbumType,
    pub artists: Vec<ArtistRef>
}

impl Album {
    pub fn artist_names(&self) -> Vec<&str> {
        self.artists.iter().map(|a| a.name.as_str()).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    pub id: Option<String>,
    pub uri: String,
    pub name: String
}

/// Entry of a playlist; local or unavailable entries carry no track
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PlaylistItem {
    pub track: Option<Track>
}

/// Album joined with its full track listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlbumWithTracks {
    pub album: Album,
    pub tracks: Vec<Track>
}

/// Regional catalog view, `None` queries without a country filter
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Market(pub Option<String>);

impl Market {
    pub fn code(&self) -> Option<&str> {
        self.0.as_deref()
    }
}

impl fmt::Display for Market {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            Some(code) => write!(f, "{code}"),
            None => write!(f, "global")
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PlaylistId(pub String);

impl PlaylistId {
    /// Accepts a bare id, a `spotify:playlist:<id>` uri or an open.spotify.com url
    pub fn parse(raw: &str) -> Result<Self, CurateError> {
        let raw = raw.trim();
        let id = if let Some(rest) = raw.strip_prefix("spotify:playlist:") {
            rest.to_string()
        } else if raw.starts_with("http://") || raw.starts_with("https://") {
            let url = url::Url::parse(raw)
                .map_err(|e| CurateError::Config(format!("playlist url {raw}: {e}")))?;
            let mut segments = url.path_segments()
                .ok_or_else(|| CurateError::Config(format!("playlist url {raw}")))?;
            match (segments.next(), segments.next()) {
                (Some("playlist"), Some(id)) => id.to_string(),
                _ => return Err(CurateError::Config(
                    format!("not a playlist url: {raw}")
                ))
            }
        } else {
            raw.to_string()
        };

        if id.is_empty() || !id.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(CurateError::Config(format!("invalid playlist id: {raw:?}")));
        }
        Ok(Self(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlaylistId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
