//!
//! src/main.rs  Andrew Belles  Oct 2025
//!
//! Entry point of the new release curator: resolves config,
//! selects albums and rewrites the target playlist. Live tests
//! against Spotify sit at the bottom
//!

mod cli;
mod config;
mod errors;
mod logging;

mod bounded;
mod catalog;
mod dedupe;
mod fetch;
mod filters;
mod genres;
mod paginate;
mod pipeline;
mod playlist;
mod types;

#[cfg(test)]
mod fake;

use clap::Parser;

use crate::errors::CurateError;

#[tokio::main]
async fn main() -> Result<(), CurateError> {
    let args   = cli::Cli::parse();
    let layers = config::load_layers(&args)?;
    let _guard = logging::init_logging(&config::LoggingConfig::for_layer(&layers))?;

    tracing::info!(
        service="new-albums",
        version=%env!("CARGO_PKG_VERSION"),
        "starting"
    );

    finish(run(&args, &layers).await)
}

/// Failures reach the configured log output before the process exits
fn finish(result: Result<(), CurateError>) -> Result<(), CurateError> {
    result.inspect_err(|e| tracing::error!(error = %e, "run.failed"))
}

async fn run(args: &cli::Cli, layers: &config::FileConfig) -> Result<(), CurateError> {
    let cfg = config::RunConfig::from_layer(layers)?;

    let resolved = cfg.to_layer(layers.log_format);
    for line in config::render(&resolved)?.lines() {
        tracing::info!(line, "config");
    }
    if let Some(path) = &args.dump_config {
        config::dump(&resolved, path)?;
        tracing::info!(path = %path.display(), "config.dumped");
    }

    let spotify_cfg = config::build_spotify()?;
    let http_cfg    = config::HttpConfig::default();
    tracing::info!(scopes = ?fetch::SCOPES, "spotify.login");
    let mut spotify = fetch::SpotifyClient::new(&http_cfg, &spotify_cfg)?;
    spotify.authorize().await?;

    let selection = pipeline::Pipeline::new(&spotify, &cfg).run().await?;
    pipeline::log_selection(&spotify, &selection, cfg.verbose > 0).await?;

    let mutator = playlist::PlaylistMutator::new(&spotify, cfg.playlist.clone(), cfg.apply)
        .with_progress(cfg.verbose == 0);
    mutator.replace(&selection).await?;

    Ok(())
}
