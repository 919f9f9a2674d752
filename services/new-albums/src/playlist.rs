//!
//! src/playlist.rs  Andrew Belles  Oct 2025
//!
//! Replaces the contents of the target playlist: every current
//! track is removed, then the selection is appended in order.
//! Not transactional, a failure between the phases leaves the
//! playlist partially filled
//!

use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info, warn};

use crate::catalog::{self, Catalog, MUTATION_BATCH};
use crate::errors::CurateError;
use crate::types::{Album, AlbumWithTracks, PlaylistId, Track};

/// Track tagged with the album it was selected from
#[derive(Debug, Clone)]
pub struct PlaylistEntry<'a> {
    pub track: &'a Track,
    pub album: &'a Album
}

/// Album order first, track order within each album
pub fn flatten(selection: &[AlbumWithTracks]) -> Vec<PlaylistEntry<'_>> {
    selection.iter()
        .flat_map(|entry| entry.tracks.iter().map(move |track| PlaylistEntry {
            track,
            album: &entry.album
        }))
        .collect()
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MutationReport {
    pub removed: usize,
    pub remove_requests: usize,
    pub added: usize,
    pub add_requests: usize
}

pub struct PlaylistMutator<'a> {
    catalog: &'a dyn Catalog,
    playlist: PlaylistId,
    apply: bool,
    progress: bool
}

impl<'a> PlaylistMutator<'a> {
    pub fn new(catalog: &'a dyn Catalog, playlist: PlaylistId, apply: bool) -> Self {
        Self { catalog, playlist, apply, progress: false }
    }

    /// Draw progress bars instead of per-batch debug events
    pub fn with_progress(mut self, progress: bool) -> Self {
        self.progress = progress;
        self
    }

    fn bar(&self, len: usize, label: &'static str) -> ProgressBar {
        if !self.progress || !self.apply {
            return ProgressBar::hidden();
        }
        let bar = ProgressBar::new(len as u64).with_message(label);
        if let Ok(style) = ProgressStyle::with_template("{msg} {wide_bar} {pos}/{len}") {
            bar.set_style(style);
        }
        bar
    }

    pub async fn replace(&self, selection: &[AlbumWithTracks]) ->
        Result<MutationReport, CurateError> {
        let mut report = MutationReport::default();
        self.clear(&mut report).await?;
        if !self.apply {
            warn!("playlist.dry_run: run again with --update to alter the playlist");
        }
        self.fill(selection, &mut report).await?;
        info!(
            playlist = %self.playlist,
            applied = self.apply,
            removed = report.removed,
            remove_requests = report.remove_requests,
            added = report.added,
            add_requests = report.add_requests,
            "playlist.done"
        );
        Ok(report)
    }

    /// Removes every track currently present, re-added or not
    async fn clear(&self, report: &mut MutationReport) -> Result<(), CurateError> {
        let current: Vec<Track> = catalog::playlist_items(self.catalog, &self.playlist)
            .collect_all()
            .await?
            .into_iter()
            .filter_map(|item| item.track)
            .collect();
        info!(playlist = %self.playlist, tracks = current.len(), "playlist.current");

        if !self.apply {
            return Ok(());
        }

        let bar = self.bar(current.len(), "Removing from playlist");
        for batch in current.chunks(MUTATION_BATCH) {
            let names: Vec<&str> = batch.iter().map(|t| t.name.as_str()).collect();
            debug!(tracks = ?names, "playlist.remove");

            let uris: Vec<String> = batch.iter().map(|t| t.uri.clone()).collect();
            self.catalog.playlist_remove_all(&self.playlist, &uris).await?;
            report.removed += batch.len();
            report.remove_requests += 1;
            bar.inc(batch.len() as u64);
        }
        bar.finish_and_clear();
        Ok(())
    }

    async fn fill(&self, selection: &[AlbumWithTracks], report: &mut MutationReport) ->
        Result<(), CurateError> {
        let entries = flatten(selection);
        info!(playlist = %self.playlist, tracks = entries.len(), "playlist.selected");

        if !self.apply {
            return Ok(());
        }

        let bar = self.bar(entries.len(), "Adding to playlist");
        for batch in entries.chunks(MUTATION_BATCH) {
            let names: Vec<String> = batch.iter()
                .map(|e| format!("{} ({})", e.track.name, e.album.name))
                .collect();
            debug!(tracks = ?names, "playlist.add");

            let uris: Vec<String> = batch.iter().map(|e| e.track.uri.clone()).collect();
            self.catalog.playlist_add(&self.playlist, &uris).await?;
            report.added += batch.len();
            report.add_requests += 1;
            bar.inc(batch.len() as u64);
        }
        bar.finish_and_clear();
        Ok(())
    }
}
