//!
//! src/pipeline.rs  Andrew Belles  Oct 2025
//!
//! Builds the ordered album selection: samples every market,
//! merges and dedupes the samples, orders them by release date
//! and attaches track listings until the limits are reached
//!

use tracing::{debug, info, instrument};

use crate::bounded::SelectionLimits;
use crate::catalog::{self, Catalog};
use crate::config::RunConfig;
use crate::dedupe::dedupe_by;
use crate::errors::CurateError;
use crate::filters::AlbumFilters;
use crate::genres::genres_for;
use crate::types::{Album, AlbumWithTracks, Market};

/// Name plus comma joined artist names, collapses re-issues of the
/// same release under another id. Exact match only
pub fn name_artist_key(album: &Album) -> String {
    format!("{}|{}", album.name, album.artist_names().join(","))
}

/// Concatenates samples in market order, then drops repeats by uri
/// and by name/artists, keeping first occurrences
pub fn merge_samples(samples: Vec<Vec<Album>>) -> Vec<Album> {
    let by_uri = dedupe_by(samples.into_iter().flatten(), |a| a.uri.clone());
    dedupe_by(by_uri, name_artist_key).collect()
}

/// Newest first; equal dates keep their merged order
pub fn sort_by_release(albums: &mut [Album]) {
    albums.sort_by(|a, b| b.release_date.cmp(&a.release_date));
}

pub struct Pipeline<'a> {
    catalog: &'a dyn Catalog,
    cfg: &'a RunConfig,
    filters: AlbumFilters
}

impl<'a> Pipeline<'a> {
    pub fn new(catalog: &'a dyn Catalog, cfg: &'a RunConfig) -> Self {
        let filters = AlbumFilters::new(&cfg.limit_genres, &cfg.exclude_genres);
        Self { catalog, cfg, filters }
    }

    pub async fn run(&self) -> Result<Vec<AlbumWithTracks>, CurateError> {
        info!(
            n_per_country = self.cfg.n_per_country,
            markets = self.cfg.markets.len(),
            "pipeline.sample"
        );
        let mut samples = Vec::with_capacity(self.cfg.markets.len());
        for market in &self.cfg.markets {
            samples.push(self.sample_market(market).await?);
        }

        info!("pipeline.merge");
        let mut albums = merge_samples(samples);

        info!(albums = albums.len(), "pipeline.sort");
        sort_by_release(&mut albums);

        info!(
            limit_n_albums = self.cfg.limit_n_albums,
            limit_n_tracks = self.cfg.limit_n_tracks,
            "pipeline.tracks"
        );
        self.attach_tracks(albums).await
    }

    /// Pulls new releases until `n_per_country` albums pass the filters
    #[instrument(skip_all, fields(market = %market))]
    pub async fn sample_market(&self, market: &Market) -> Result<Vec<Album>, CurateError> {
        let mut releases = catalog::new_releases(self.catalog, market);
        let mut sample = Vec::new();

        while sample.len() < self.cfg.n_per_country {
            let Some(album) = releases.next().await? else {
                break;
            };
            if self.filters.admits(self.catalog, &album).await? {
                sample.push(album);
            } else {
                debug!(album = %album.name, "sample.rejected");
            }
        }

        debug!(sampled = sample.len(), "sample.done");
        Ok(sample)
    }

    /// Fetches listings only for albums that can still join the selection
    async fn attach_tracks(&self, albums: Vec<Album>) ->
        Result<Vec<AlbumWithTracks>, CurateError> {
        let mut limits = SelectionLimits::new(
            self.cfg.limit_n_albums,
            self.cfg.limit_n_tracks
        );
        let mut selection = Vec::new();

        for album in albums {
            if limits.is_full() {
                break;
            }
            let tracks = catalog::album_tracks(self.catalog, &album)
                .collect_all()
                .await?;
            limits.admit(tracks.len());
            selection.push(AlbumWithTracks { album, tracks });
        }
        Ok(selection)
    }
}

/// One event per selected album, with genres when running verbose
pub async fn log_selection(
    catalog: &dyn Catalog,
    selection: &[AlbumWithTracks],
    verbose: bool
) -> Result<(), CurateError> {
    for entry in selection {
        let album = &entry.album;
        let tracks: Vec<&str> = entry.tracks.iter().map(|t| t.name.as_str()).collect();
        if verbose {
            let genres = genres_for(catalog, &album.artists).await?;
            info!(
                album = %album.name,
                release_date = %album.release_date,
                artists = ?album.artist_names(),
                tracks = ?tracks,
                genres = ?genres,
                "selection.album"
            );
        } else {
            info!(
                album = %album.name,
                release_date = %album.release_date,
                artists = ?album.artist_names(),
                tracks = ?tracks,
                "selection.album"
            );
        }
    }
    Ok(())
}
