//!
//! src/errors.rs  Andrew Belles  Oct 2025
//!
//! Defines enums and methods of error conversion
//! for errors the curator uses
//!
//!

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CurateError {
    #[error("config error: {0}")]
    Config(String),
    #[error("http error: {0}")]
    Http(String),
    #[error("rate limited: {0}")]
    RateLimited(String),
    #[error("parse error: {0}")]
    Parse(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error)
}

impl From<reqwest::Error> for CurateError {
    fn from(e: reqwest::Error) -> Self { CurateError::Http(e.to_string()) }
}

impl From<serde_json::Error> for CurateError {
    fn from(e: serde_json::Error) -> Self { CurateError::Parse(e.to_string()) }
}

impl From<toml::ser::Error> for CurateError {
    fn from(e: toml::ser::Error) -> Self { CurateError::Config(e.to_string()) }
}
