//! Spotify Playlist Sampler Library
//!
//! This library backs a small web application that picks a random selection of
//! tracks from one of the user's Spotify playlists and writes them into a new or
//! an existing playlist. It includes modules for the web front end, the Spotify
//! Web API client, the sampling pipeline, session handling and configuration.
//!
//! # Modules
//!
//! - `api` - HTTP handlers and HTML pages of the web front end
//! - `config` - Configuration management and environment variables
//! - `error` - Error types shared by the pipeline and the storage layer
//! - `management` - Session contexts and the durable credential store
//! - `pipeline` - Track resolution, ordering and playlist rewriting
//! - `server` - Router construction and the listening server
//! - `spotify` - Spotify Web API client implementation
//! - `types` - Data structures and type definitions
//! - `utils` - Sampling, random tokens and other helpers
//!
//! # Example
//!
//! ```
//! use spotsample::{config, server};
//!
//! #[tokio::main]
//! async fn main() -> spotsample::Res<()> {
//!     config::load_env().await?;
//!     let settings = config::Settings::from_env()?;
//!     // Build the application state and start the server...
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod config;
pub mod error;
pub mod management;
pub mod pipeline;
pub mod server;
pub mod spotify;
pub mod types;
pub mod utils;

/// A convenient Result type alias for the binary and the server bootstrap.
///
/// Library code returns the typed errors from [`error`]; this alias is used
/// where those errors meet configuration, io and bind failures.
pub type Res<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// Prints an informational message with a blue bullet point.
///
/// # Example
///
/// ```
/// info!("Listening on {}", addr);
/// ```
#[macro_export]
macro_rules! info {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "o".blue().bold(), std::format_args!($($arg)*));
  })
}

/// Prints a success message with a green checkmark.
#[macro_export]
macro_rules! success {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "✓".green().bold(), std::format_args!($($arg)*));
  })
}

/// Prints an error message with a red exclamation mark and exits the program.
///
/// Only used while starting up, where there is nothing sensible left to do.
/// Request handlers never call it.
#[macro_export]
macro_rules! error {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "!".red().bold(), std::format_args!($($arg)*));
    std::process::exit(1);
  })
}

/// Prints a warning message with a yellow exclamation mark.
///
/// Used for every failed remote call and for recoverable problems such as a
/// track slot without track data.
///
/// # Example
///
/// ```
/// warning!("Refresh failed for user {}: {}", user_id, e);
/// ```
#[macro_export]
macro_rules! warning {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "!".yellow().bold(), std::format_args!($($arg)*));
  })
}
