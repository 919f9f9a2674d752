//!
//! src/config.rs  Andrew Belles  Oct 2025
//!
//! Resolves the run configuration once at startup.
//! Precedence: command line > config file > defaults.
//! Credentials and endpoints come from the environment
//!

use std::path::Path;
use std::time;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::errors::CurateError;
use crate::types::{Genre, Market, PlaylistId};

/// Constants for HTTP Config
pub const HTTP_TIMEOUT: u64 = 8000;
pub const HTTP_CONNECT_TIMEOUT: u64 = 2000;
pub const HTTP_POOL_MAX_IDLE: usize = 4;
pub const HTTP_POOL_IDLE_TIMEOUT: u64 = 90000;
pub const HTTP_MAX_REDIRECTS: u8 = 4;

/// Defaults for the run
pub const DEFAULT_N_PER_COUNTRY: usize = 100;

/// Wrapper over env::var to return an invalid enviroment var error
fn env_check(s: &str) -> Result<String, CurateError> {
    match std::env::var(s) {
        Ok(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(CurateError::Config(format!("{s} was not set"))),
    }
}

/// Ensures that url is https
fn ensure_https(url: &Url) -> Result<(), String> {
    if url.scheme() == "https" {
        Ok(())
    } else {
        Err(format!("URL must be https: {url}"))
    }
}

fn ensure_host(url: &Url, expected_host: &str) -> Result<(), String> {
    match url.host_str() {
        Some(h) if h.eq_ignore_ascii_case(expected_host) => Ok(()),
        Some(h) => Err(
            format!("Unexpected host for {url} (got {h}, expected {expected_host})")
        ),
        None => Err(format!("URL missing host: {url}"))
    }
}

fn ensure_trailing_slash(url: &mut Url) {
    if !url.path().ends_with('/') {
        let mut path = url.path().to_string();
        path.push('/');
        url.set_path(&path);
    }
}

///
/// Configuration that Spotify expects when hitting endpoints
///
#[derive(Clone)]
pub struct SpotifyConfig {
    pub client_id: String,
    pub client_secret: String,
    pub refresh_token: String,
    pub token_url: Url,
    pub api_base: Url,
}

// secrets stay out of logs
impl std::fmt::Debug for SpotifyConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpotifyConfig")
            .field("client_id", &self.client_id)
            .field("token_url", &self.token_url.as_str())
            .field("api_base", &self.api_base.as_str())
            .finish_non_exhaustive()
    }
}

pub fn build_spotify() -> Result<SpotifyConfig, CurateError> {
    let client_id     = env_check("SPOTIFY_CLIENT_ID")?;
    let client_secret = env_check("SPOTIFY_CLIENT_SECRET")?;
    let refresh_token = env_check("SPOTIFY_REFRESH_TOKEN")?;

    // form urls
    let token_url = std::env::var("SPOTIFY_TOKEN_URL")
        .unwrap_or_else(|_| "https://accounts.spotify.com/api/token".to_string());

    let api_base  = std::env::var("SPOTIFY_API_BASE")
        .unwrap_or_else(|_| "https://api.spotify.com/v1/".to_string());

    let token_url = Url::parse(&token_url)
        .map_err(|e| CurateError::Config(format!("SPOTIFY_TOKEN_URL invalid {e}")))?;

    let mut api_base = Url::parse(&api_base)
        .map_err(|e| CurateError::Config(format!("SPOTIFY_API_BASE invalid {e}")))?;

    // ensure valid https and hostname for both urls
    ensure_https(&token_url).map_err(CurateError::Config)?;
    ensure_https(&api_base).map_err(CurateError::Config)?;
    ensure_host(&token_url, "accounts.spotify.com").map_err(CurateError::Config)?;
    ensure_host(&api_base, "api.spotify.com").map_err(CurateError::Config)?;

    ensure_trailing_slash(&mut api_base);

    Ok( SpotifyConfig { client_id, client_secret, refresh_token, token_url, api_base })
}

///
/// Configuration for Http timeouts, etc.
///
#[derive(Debug, Clone)]
pub struct HttpConfig {
    pub timeout: time::Duration,
    pub connect_timeout: time::Duration,
    pub pool_max_idle_per_host: usize,
    pub pool_idle_timeout: time::Duration,
    pub max_redirects: u8,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout: time::Duration::from_millis(HTTP_TIMEOUT),
            connect_timeout: time::Duration::from_millis(HTTP_CONNECT_TIMEOUT),
            pool_max_idle_per_host: HTTP_POOL_MAX_IDLE,
            pool_idle_timeout: time::Duration::from_millis(HTTP_POOL_IDLE_TIMEOUT),
            max_redirects: HTTP_MAX_REDIRECTS,
        }
    }
}

///
/// Configuration for Logger
///

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize,
    clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json
}

#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub filter_directives: String,
    pub format: LogFormat,
    pub with_ansi: bool,
    pub include_file_line: bool,
    pub include_target: bool,
}

impl LoggingConfig {
    /// Quiet runs log at info, any -v switches the crate to debug
    pub fn for_layer(layer: &FileConfig) -> Self {
        let verbose = layer.verbose.unwrap_or(0);
        let filter_directives = if verbose > 0 {
            "info,new_albums=debug,reqwest=warn"
        } else {
            "info,reqwest=warn"
        };
        Self {
            filter_directives: filter_directives.to_string(),
            format: layer.log_format.unwrap_or_default(),
            with_ansi: true,
            include_file_line: verbose > 1,
            include_target: verbose > 0,
        }
    }
}

///
/// One layer of run settings, as read from a file or the command
/// line. Unset fields fall through to the layer below
///
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub playlist: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub n_per_country: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit_genres: Option<Vec<Genre>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exclude_genres: Option<Vec<Genre>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit_n_albums: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit_n_tracks: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verbose: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub update: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_format: Option<LogFormat>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self, CurateError> {
        let raw = std::fs::read_to_string(path)?;
        toml::from_str(&raw)
            .map_err(|e| CurateError::Config(format!("{}: {e}", path.display())))
    }

    /// Fields set in `over` win
    pub fn overlay(self, over: FileConfig) -> FileConfig {
        FileConfig {
            playlist: over.playlist.or(self.playlist),
            country: over.country.or(self.country),
            n_per_country: over.n_per_country.or(self.n_per_country),
            limit_genres: over.limit_genres.or(self.limit_genres),
            exclude_genres: over.exclude_genres.or(self.exclude_genres),
            limit_n_albums: over.limit_n_albums.or(self.limit_n_albums),
            limit_n_tracks: over.limit_n_tracks.or(self.limit_n_tracks),
            verbose: over.verbose.or(self.verbose),
            update: over.update.or(self.update),
            log_format: over.log_format.or(self.log_format),
        }
    }
}

///
/// Fully resolved settings of one run
///
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    pub playlist: PlaylistId,
    pub markets: Vec<Market>,
    pub n_per_country: usize,
    pub limit_genres: Vec<Genre>,
    pub exclude_genres: Vec<Genre>,
    pub limit_n_albums: usize,
    pub limit_n_tracks: usize,
    pub verbose: u8,
    pub apply: bool,
}

impl RunConfig {
    /// Defaults for everything but the playlist: one global market,
    /// 100 albums per market, no genre filters, no limits, dry run
    pub fn new(playlist: PlaylistId) -> Self {
        Self {
            playlist,
            markets: vec![Market(None)],
            n_per_country: DEFAULT_N_PER_COUNTRY,
            limit_genres: Vec::new(),
            exclude_genres: Vec::new(),
            limit_n_albums: 0,
            limit_n_tracks: 0,
            verbose: 0,
            apply: false,
        }
    }

    pub fn from_layer(layer: &FileConfig) -> Result<Self, CurateError> {
        let playlist = layer.playlist.as_deref()
            .ok_or_else(|| CurateError::Config(
                "command line or config file must contain a playlist ID or URI".to_string()
            ))?;
        let mut cfg = Self::new(PlaylistId::parse(playlist)?);

        let countries: Vec<Market> = layer.country.iter()
            .flatten()
            .map(|code| code.trim())
            .filter(|code| !code.is_empty())
            .map(|code| Market(Some(code.to_string())))
            .collect();
        if !countries.is_empty() {
            cfg.markets = countries;
        }

        if let Some(n) = layer.n_per_country { cfg.n_per_country = n; }
        if let Some(g) = &layer.limit_genres { cfg.limit_genres = g.clone(); }
        if let Some(g) = &layer.exclude_genres { cfg.exclude_genres = g.clone(); }
        if let Some(n) = layer.limit_n_albums { cfg.limit_n_albums = n; }
        if let Some(n) = layer.limit_n_tracks { cfg.limit_n_tracks = n; }
        if let Some(v) = layer.verbose { cfg.verbose = v; }
        if let Some(u) = layer.update { cfg.apply = u; }

        Ok(cfg)
    }

    /// Resolved settings as a layer that reproduces this run when loaded
    pub fn to_layer(&self, log_format: Option<LogFormat>) -> FileConfig {
        FileConfig {
            playlist: Some(self.playlist.to_string()),
            country: Some(self.markets.iter()
                .filter_map(|m| m.code().map(str::to_string))
                .collect()),
            n_per_country: Some(self.n_per_country),
            limit_genres: Some(self.limit_genres.clone()),
            exclude_genres: Some(self.exclude_genres.clone()),
            limit_n_albums: Some(self.limit_n_albums),
            limit_n_tracks: Some(self.limit_n_tracks),
            verbose: Some(self.verbose),
            update: Some(self.apply),
            log_format,
        }
    }
}

pub fn render(layer: &FileConfig) -> Result<String, CurateError> {
    Ok(toml::to_string_pretty(layer)?)
}

pub fn dump(layer: &FileConfig, path: &Path) -> Result<(), CurateError> {
    std::fs::write(path, render(layer)?)?;
    Ok(())
}

///
/// Reads the file layer, if any, and puts the command line over it
///
pub fn load_layers(cli: &crate::cli::Cli) -> Result<FileConfig, CurateError> {
    dotenvy::dotenv().ok();

    let file = match &cli.config {
        Some(path) => FileConfig::load(path)?,
        None => FileConfig::default()
    };
    Ok(file.overlay(cli.layer()))
}
