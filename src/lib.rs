//! Spotify Playlist Mixer CLI Library
//!
//! This library automates playlist curation against the Spotify Web API. It
//! mixes several source playlists into one, extends a playlist with similar
//! tracks and shuffles a playlist in place.
//!
//! # Modules
//!
//! - `api` - HTTP API endpoints for the local callback server
//! - `cli` - Command-line interface implementations
//! - `config` - Configuration management and environment variables
//! - `management` - Token persistence and refresh
//! - `mixer` - Round-robin mixer over several ordered track sources
//! - `server` - Local HTTP server for OAuth callbacks
//! - `spotify` - Spotify Web API client implementation
//! - `types` - Data structures and type definitions
//! - `utils` - Utility functions and helpers
//!
//! # Example
//!
//! ```
//! use mixtape::{mixer::{self, MixOptions}, types::TrackRef};
//!
//! let sources = vec![vec![TrackRef::new("t1", "a1")], vec![TrackRef::new("t2", "a2")]];
//! let mixed = mixer::mix_tracks(&sources, MixOptions::default());
//! assert_eq!(mixed, vec!["t1", "t2"]);
//! ```

pub mod api;
pub mod cli;
pub mod config;
pub mod management;
pub mod mixer;
pub mod server;
pub mod spotify;
pub mod types;
pub mod utils;

/// Prints an informational line prefixed with a blue `o`.
///
/// Accepts the same arguments as `println!`.
///
/// ```
/// info!("Found {} playlists", count);
/// ```
#[macro_export]
macro_rules! info {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "o".blue().bold(), std::format_args!($($arg)*));
  })
}

/// Prints a success line prefixed with a green `✓`.
#[macro_export]
macro_rules! success {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "✓".green().bold(), std::format_args!($($arg)*));
  })
}

/// Prints an error line prefixed with a red `!` and exits with code 1.
///
/// Only for fatal conditions at the command boundary. The macro never
/// returns, so it can be used as the value of a `match` arm.
#[macro_export]
macro_rules! error {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "!".red().bold(), std::format_args!($($arg)*));
    std::process::exit(1);
  })
}

/// Prints a warning line prefixed with a yellow `!`.
///
/// For recoverable issues, e.g. a playlist that could not be found or a
/// rate limit that was hit.
#[macro_export]
macro_rules! warning {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "!".yellow().bold(), std::format_args!($($arg)*));
  })
}
