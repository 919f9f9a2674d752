//!
//! src/fake.rs  Andrew Belles  Oct 2025
//!
//! In memory catalog used by the unit tests, records every call
//!

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::catalog::Catalog;
use crate::errors::CurateError;
use crate::types::{
    Album, AlbumType, Artist, ArtistRef, Market, PlaylistId, PlaylistItem, Track
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    NewReleases { market: Market, offset: u32 },
    AlbumTracks { album: String, offset: u32 },
    Artists(Vec<String>),
    PlaylistItems { offset: u32 },
    Remove(Vec<String>),
    Add(Vec<String>)
}

#[derive(Default)]
pub struct FakeCatalog {
    pub releases: HashMap<Market, Vec<Album>>,
    pub tracks: HashMap<String, Vec<Track>>,
    pub artists: HashMap<String, Artist>,
    pub playlist: Mutex<Vec<Track>>,
    pub calls: Mutex<Vec<Call>>
}

fn window<T: Clone>(items: &[T], limit: u32, offset: u32) -> Vec<T> {
    items.iter()
        .skip(offset as usize)
        .take(limit as usize)
        .cloned()
        .collect()
}

impl FakeCatalog {
    pub fn with_releases(mut self, market: Market, albums: Vec<Album>) -> Self {
        self.releases.insert(market, albums);
        self
    }

    pub fn with_tracks(mut self, album_id: &str, count: usize) -> Self {
        let tracks = (0..count)
            .map(|i| track(&format!("{album_id}-t{i}")))
            .collect();
        self.tracks.insert(album_id.to_string(), tracks);
        self
    }

    pub fn with_artist(mut self, id: &str, genres: &[&str]) -> Self {
        self.artists.insert(id.to_string(), Artist {
            id: id.to_string(),
            genres: genres.iter().map(|g| g.to_string()).collect()
        });
        self
    }

    pub fn with_playlist(self, tracks: Vec<Track>) -> Self {
        *self.playlist.lock().unwrap() = tracks;
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| pred(c)).count()
    }

    pub fn playlist_uris(&self) -> Vec<String> {
        self.playlist.lock().unwrap().iter().map(|t| t.uri.clone()).collect()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl Catalog for FakeCatalog {
    async fn new_releases(&self, market: &Market, limit: u32, offset: u32) ->
        Result<Vec<Album>, CurateError> {
        self.record(Call::NewReleases { market: market.clone(), offset });
        Ok(self.releases.get(market)
            .map(|albums| window(albums, limit, offset))
            .unwrap_or_default())
    }

    async fn album_tracks(&self, album_id: &str, limit: u32, offset: u32) ->
        Result<Vec<Track>, CurateError> {
        self.record(Call::AlbumTracks { album: album_id.to_string(), offset });
        self.tracks.get(album_id)
            .map(|tracks| window(tracks, limit, offset))
            .ok_or_else(|| CurateError::NotFound(format!("album {album_id}")))
    }

    async fn artists(&self, ids: &[String]) -> Result<Vec<Artist>, CurateError> {
        self.record(Call::Artists(ids.to_vec()));
        ids.iter()
            .map(|id| self.artists.get(id)
                .cloned()
                .ok_or_else(|| CurateError::NotFound(format!("artist {id}"))))
            .collect()
    }

    async fn playlist_items(&self, _playlist: &PlaylistId, limit: u32, offset: u32) ->
        Result<Vec<PlaylistItem>, CurateError> {
        self.record(Call::PlaylistItems { offset });
        let current = self.playlist.lock().unwrap();
        Ok(window(&current, limit, offset)
            .into_iter()
            .map(|t| PlaylistItem { track: Some(t) })
            .collect())
    }

    async fn playlist_remove_all(&self, _playlist: &PlaylistId, uris: &[String]) ->
        Result<(), CurateError> {
        self.record(Call::Remove(uris.to_vec()));
        self.playlist.lock().unwrap().retain(|t| !uris.contains(&t.uri));
        Ok(())
    }

    async fn playlist_add(&self, _playlist: &PlaylistId, uris: &[String]) ->
        Result<(), CurateError> {
        self.record(Call::Add(uris.to_vec()));
        let mut current = self.playlist.lock().unwrap();
        current.extend(uris.iter().map(|uri| Track {
            id: None,
            uri: uri.clone(),
            name: uri.clone()
        }));
        Ok(())
    }
}

pub fn market(code: &str) -> Market {
    Market(Some(code.to_string()))
}

pub fn track(id: &str) -> Track {
    Track {
        id: Some(id.to_string()),
        uri: format!("spotify:track:{id}"),
        name: id.to_string()
    }
}

/// Album whose artist ids double as their display names
pub fn album(id: &str, name: &str, date: &str, artists: &[&str]) -> Album {
    Album {
        id: id.to_string(),
        uri: format!("spotify:album:{id}"),
        name: name.to_string(),
        release_date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
        album_type: AlbumType::Album,
        artists: artists.iter()
            .map(|a| ArtistRef {
                id: a.to_string(),
                name: a.to_string()
            })
            .collect()
    }
}

pub fn single(id: &str, date: &str, artists: &[&str]) -> Album {
    Album { album_type: AlbumType::Single, ..album(id, id, date, artists) }
}
