//! Configuration management for the playlist sampler.
//!
//! This module handles loading configuration values from environment variables
//! and `.env` files. All values are read once at start-up into [`Settings`],
//! which is then shared by the handlers.
//!
//! The configuration system follows a hierarchical approach:
//! 1. Environment variables (highest priority)
//! 2. `.env` file in the working directory
//! 3. `.env` file in the local data directory
//! 4. Application defaults (where applicable)

use std::{env, path::PathBuf};

use crate::error::ConfigError;

pub const DEFAULT_SCOPE: &str = "playlist-read-private playlist-read-collaborative playlist-modify-public playlist-modify-private";
pub const DEFAULT_AUTH_URL: &str = "https://accounts.spotify.com/authorize";
pub const DEFAULT_TOKEN_URL: &str = "https://accounts.spotify.com/api/token";
pub const DEFAULT_API_URL: &str = "https://api.spotify.com/v1";
pub const DEFAULT_SERVER_ADDRESS: &str = "127.0.0.1:5005";
pub const DEFAULT_SAMPLE_SIZE: usize = 20;

/// Loads environment variables from a `.env` file.
///
/// A `.env` in the working directory wins. Otherwise the file is looked up in
/// the platform-specific local data directory under `spotsample/.env`, which
/// is created if it does not exist yet. A missing file is not an error since
/// the variables may come from the process environment.
///
/// # Directory Structure
///
/// - Linux: `~/.local/share/spotsample/.env`
/// - macOS: `~/Library/Application Support/spotsample/.env`
/// - Windows: `%LOCALAPPDATA%/spotsample/.env`
///
/// # Errors
///
/// Returns an error string if the data directory cannot be created or an
/// existing `.env` file cannot be parsed.
pub async fn load_env() -> Result<(), String> {
    let local = PathBuf::from(".env");
    if local.exists() {
        return dotenv::from_path(&local).map_err(|e| e.to_string());
    }

    let path = data_dir().join(".env");
    if let Some(parent) = path.parent() {
        async_fs::create_dir_all(parent)
            .await
            .map_err(|e| e.to_string())?;
    }

    match dotenv::from_path(&path) {
        Ok(()) => Ok(()),
        Err(dotenv::Error::Io(_)) => Ok(()),
        Err(e) => Err(e.to_string()),
    }
}

/// Returns the application data directory (`<data_local_dir>/spotsample`).
pub fn data_dir() -> PathBuf {
    let mut path = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push("spotsample");
    path
}

/// Runtime settings read from the environment.
#[derive(Debug, Clone)]
pub struct Settings {
    /// `SPOTIFY_API_AUTH_CLIENT_ID`
    pub client_id: String,
    /// `SPOTIFY_API_AUTH_CLIENT_SECRET`, never logged
    pub client_secret: String,
    /// `SPOTIFY_API_REDIRECT_URI`, must match the registered redirect
    pub redirect_uri: String,
    /// `SPOTIFY_API_AUTH_SCOPE`
    pub scope: String,
    /// `SPOTIFY_API_AUTH_URL`
    pub auth_url: String,
    /// `SPOTIFY_API_TOKEN_URL`
    pub token_url: String,
    /// `SPOTIFY_API_URL`, without trailing slash
    pub api_url: String,
    /// `SAMPLE_SIZE`, number of tracks picked per run
    pub sample_size: usize,
    /// `SERVER_ADDRESS`
    pub server_addr: String,
    /// `DATABASE_PATH`
    pub database_path: PathBuf,
}

impl Settings {
    /// Reads all settings from the process environment.
    ///
    /// # Errors
    ///
    /// Fails with [`ConfigError::Missing`] when one of the client credentials
    /// or the redirect uri is unset, and with [`ConfigError::Invalid`] when
    /// `SAMPLE_SIZE` is not a positive integer.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds settings from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Blank values count as unset.
        let lookup = |var: &str| lookup(var).filter(|v| !v.trim().is_empty());
        let required = |var: &'static str| lookup(var).ok_or(ConfigError::Missing(var));
        let optional =
            |var: &str, default: &str| lookup(var).unwrap_or_else(|| default.to_string());

        let sample_size = match lookup("SAMPLE_SIZE") {
            Some(raw) => parse_sample_size(&raw)?,
            None => DEFAULT_SAMPLE_SIZE,
        };

        let database_path = lookup("DATABASE_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| data_dir().join("users.db"));

        Ok(Settings {
            client_id: required("SPOTIFY_API_AUTH_CLIENT_ID")?,
            client_secret: required("SPOTIFY_API_AUTH_CLIENT_SECRET")?,
            redirect_uri: required("SPOTIFY_API_REDIRECT_URI")?,
            scope: optional("SPOTIFY_API_AUTH_SCOPE", DEFAULT_SCOPE),
            auth_url: optional("SPOTIFY_API_AUTH_URL", DEFAULT_AUTH_URL),
            token_url: optional("SPOTIFY_API_TOKEN_URL", DEFAULT_TOKEN_URL),
            api_url: optional("SPOTIFY_API_URL", DEFAULT_API_URL)
                .trim_end_matches('/')
                .to_string(),
            sample_size,
            server_addr: optional("SERVER_ADDRESS", DEFAULT_SERVER_ADDRESS),
            database_path,
        })
    }
}

fn parse_sample_size(raw: &str) -> Result<usize, ConfigError> {
    match raw.trim().parse::<usize>() {
        Ok(0) => Err(ConfigError::Invalid {
            var: "SAMPLE_SIZE",
            reason: "must be greater than zero".to_string(),
        }),
        Ok(n) => Ok(n),
        Err(e) => Err(ConfigError::Invalid {
            var: "SAMPLE_SIZE",
            reason: e.to_string(),
        }),
    }
}
