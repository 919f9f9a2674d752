//!
//! src/cli.rs  Andrew Belles  Oct 2025
//!
//! Command line surface. Every option is optional here so that
//! unset flags fall through to the config file and then to defaults
//!

use std::path::PathBuf;

use clap::{ArgAction, Parser};

use crate::config::{FileConfig, LogFormat};

#[derive(Parser, Debug, Default)]
#[command(name = "new-albums")]
#[command(about = "Fill a Spotify playlist with newly released albums")]
#[command(version)]
pub struct Cli {
    /// TOML config file, command line flags take precedence
    #[arg(short = 'y', long = "config", env = "NEW_ALBUMS_CONFIG")]
    pub config: Option<PathBuf>,

    /// Write the resolved config to this file
    #[arg(short = 'Y', long = "dump-config")]
    pub dump_config: Option<PathBuf>,

    /// Playlist ID, URI or URL
    #[arg(short, long)]
    pub playlist: Option<String>,

    /// Country codes to draw new releases from
    #[arg(short, long, num_args = 0..)]
    pub country: Option<Vec<String>>,

    /// Number of new released albums to sample from each country code
    #[arg(short = 'C', long)]
    pub n_per_country: Option<usize>,

    /// Keep only albums whose artists carry one of these genres
    #[arg(short = 'g', long, num_args = 0..)]
    pub limit_genres: Option<Vec<String>>,

    /// Drop albums whose artists carry one of these genres
    #[arg(short = 'G', long, num_args = 0..)]
    pub exclude_genres: Option<Vec<String>>,

    /// Keep only the N most recent matching albums, 0 for no limit
    #[arg(short = 'a', long)]
    pub limit_n_albums: Option<usize>,

    /// Keep tracks from the most recent albums until N tracks, rounded up to a full album
    #[arg(short = 't', long)]
    pub limit_n_tracks: Option<usize>,

    /// Raise the logging level
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,

    /// Apply the changes to the playlist
    #[arg(short, long, action = ArgAction::Count)]
    pub update: u8,

    /// Log output format
    #[arg(long, value_enum)]
    pub log_format: Option<LogFormat>
}

impl Cli {
    /// The command line as a config layer
    pub fn layer(&self) -> FileConfig {
        FileConfig {
            playlist: self.playlist.clone(),
            country: self.country.clone(),
            n_per_country: self.n_per_country,
            limit_genres: self.limit_genres.clone(),
            exclude_genres: self.exclude_genres.clone(),
            limit_n_albums: self.limit_n_albums,
            limit_n_tracks: self.limit_n_tracks,
            verbose: (self.verbose > 0).then_some(self.verbose),
            update: (self.update > 0).then_some(true),
            log_format: self.log_format
        }
    }
}
