//!
//! src/filters.rs  Andrew Belles  Oct 2025
//!
//! Album admission rules applied to each market's releases
//! before sampling
//!

use crate::catalog::Catalog;
use crate::errors::CurateError;
use crate::genres::genres_for;
use crate::types::{Album, AlbumType, Genre};

/// Singles, compilations and anything else the service labels
/// differently never make it into the playlist
pub fn is_full_album(album: &Album) -> bool {
    album.album_type == AlbumType::Album
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenreMode {
    Include,
    Exclude
}

#[derive(Debug, Clone)]
pub struct GenreFilter {
    mode: GenreMode,
    genres: Vec<Genre>
}

impl GenreFilter {
    pub fn include(genres: &[Genre]) -> Self {
        Self { mode: GenreMode::Include, genres: genres.to_vec() }
    }

    pub fn exclude(genres: &[Genre]) -> Self {
        Self { mode: GenreMode::Exclude, genres: genres.to_vec() }
    }

    /// An empty list lets everything through untouched
    pub fn is_passthrough(&self) -> bool {
        self.genres.is_empty()
    }

    pub fn admits_genres(&self, album_genres: &[Genre]) -> bool {
        let hit = self.genres.iter().any(|g| album_genres.contains(g));
        match self.mode {
            GenreMode::Include => hit,
            GenreMode::Exclude => !hit
        }
    }

    pub async fn admits(&self, catalog: &dyn Catalog, album: &Album) ->
        Result<bool, CurateError> {
        if self.is_passthrough() {
            return Ok(true);
        }
        let album_genres = genres_for(catalog, &album.artists).await?;
        Ok(self.admits_genres(&album_genres))
    }
}

/// Album type first, then the include rule, then the exclude rule
#[derive(Debug, Clone)]
pub struct AlbumFilters {
    pub include: GenreFilter,
    pub exclude: GenreFilter
}

impl AlbumFilters {
    pub fn new(include: &[Genre], exclude: &[Genre]) -> Self {
        Self {
            include: GenreFilter::include(include),
            exclude: GenreFilter::exclude(exclude)
        }
    }

    pub async fn admits(&self, catalog: &dyn Catalog, album: &Album) ->
        Result<bool, CurateError> {
        Ok(is_full_album(album)
            && self.include.admits(catalog, album).await?
            && self.exclude.admits(catalog, album).await?)
    }
}
