//!
//! src/catalog.rs  Andrew Belles  Oct 2025
//!
//! Remote operations the pipeline relies on, plus the page
//! sources that adapt them to the paginator
//!

use async_trait::async_trait;

use crate::errors::CurateError;
use crate::paginate::{PageSource, Paginator};
use crate::types::{Album, Artist, Market, PlaylistId, PlaylistItem, Track};

/// Most ids the service accepts in a single artist lookup
pub const ARTIST_BATCH: usize = 50;
/// Most tracks the service accepts in a single playlist mutation
pub const MUTATION_BATCH: usize = 100;

#[async_trait]
pub trait Catalog: Send + Sync {
    async fn new_releases(&self, market: &Market, limit: u32, offset: u32) ->
        Result<Vec<Album>, CurateError>;

    async fn album_tracks(&self, album_id: &str, limit: u32, offset: u32) ->
        Result<Vec<Track>, CurateError>;

    /// Looks up at most `ARTIST_BATCH` artists in one request
    async fn artists(&self, ids: &[String]) -> Result<Vec<Artist>, CurateError>;

    async fn playlist_items(&self, playlist: &PlaylistId, limit: u32, offset: u32) ->
        Result<Vec<PlaylistItem>, CurateError>;

    /// Removes every occurrence of each uri, at most `MUTATION_BATCH` per call
    async fn playlist_remove_all(&self, playlist: &PlaylistId, uris: &[String]) ->
        Result<(), CurateError>;

    /// Appends uris in order, at most `MUTATION_BATCH` per call
    async fn playlist_add(&self, playlist: &PlaylistId, uris: &[String]) ->
        Result<(), CurateError>;
}

pub struct NewReleases<'a> {
    pub catalog: &'a dyn Catalog,
    pub market: Market
}

#[async_trait]
impl PageSource for NewReleases<'_> {
    type Item = Album;

    async fn fetch_page(&self, offset: u32, limit: u32) -> Result<Vec<Album>, CurateError> {
        self.catalog.new_releases(&self.market, limit, offset).await
    }
}

pub struct AlbumTracks<'a> {
    pub catalog: &'a dyn Catalog,
    pub album_id: String
}

#[async_trait]
impl PageSource for AlbumTracks<'_> {
    type Item = Track;

    async fn fetch_page(&self, offset: u32, limit: u32) -> Result<Vec<Track>, CurateError> {
        self.catalog.album_tracks(&self.album_id, limit, offset).await
    }
}

pub struct PlaylistItems<'a> {
    pub catalog: &'a dyn Catalog,
    pub playlist: PlaylistId
}

#[async_trait]
impl PageSource for PlaylistItems<'_> {
    type Item = PlaylistItem;

    async fn fetch_page(&self, offset: u32, limit: u32) ->
        Result<Vec<PlaylistItem>, CurateError> {
        self.catalog.playlist_items(&self.playlist, limit, offset).await
    }
}

pub fn new_releases<'a>(catalog: &'a dyn Catalog, market: &Market) ->
    Paginator<NewReleases<'a>> {
    Paginator::new(NewReleases { catalog, market: market.clone() })
}

pub fn album_tracks<'a>(catalog: &'a dyn Catalog, album: &Album) ->
    Paginator<AlbumTracks<'a>> {
    Paginator::new(AlbumTracks { catalog, album_id: album.id.clone() })
}

pub fn playlist_items<'a>(catalog: &'a dyn Catalog, playlist: &PlaylistId) ->
    Paginator<PlaylistItems<'a>> {
    Paginator::new(PlaylistItems { catalog, playlist: playlist.clone() })
}
