//!
//! src/genres.rs  Andrew Belles  Oct 2025
//!
//! Resolves the genre tags attached to a set of artists
//!

use tracing::debug;

use crate::catalog::{Catalog, ARTIST_BATCH};
use crate::dedupe::dedupe_by;
use crate::errors::CurateError;
use crate::types::{ArtistRef, Genre};

/// Flattened, first-seen genres of every artist. One lookup per
/// `ARTIST_BATCH` artists, no lookup at all for an empty list
pub async fn genres_for(catalog: &dyn Catalog, artists: &[ArtistRef]) ->
    Result<Vec<Genre>, CurateError> {
    let mut genres = Vec::new();
    let ids: Vec<String> = artists.iter().map(|a| a.id.clone()).collect();

    for chunk in ids.chunks(ARTIST_BATCH) {
        let resolved = catalog.artists(chunk).await?;
        genres.extend(resolved.into_iter().flat_map(|artist| artist.genres));
    }

    let genres: Vec<Genre> = dedupe_by(genres, |g| g.clone()).collect();
    debug!(artists = artists.len(), genres = ?genres, "genres.resolved");
    Ok(genres)
}
