//! Configuration management for mixtape.
//!
//! Configuration values are read from environment variables, which are
//! populated from a `.env` file in the local data directory on startup.
//! Environment variables that are already set take priority over the file.

use std::{env, path::PathBuf};

pub const APP_DIR: &str = "mixtape";

/// Scope requested when `SPOTIFY_API_AUTH_SCOPE` is not set. Covers reading
/// and modifying the user's playlists and reading the saved library.
pub const DEFAULT_SCOPE: &str = "playlist-modify-public playlist-modify-private playlist-read-private playlist-read-collaborative user-library-read";

/// Returns the application directory inside the platform-specific local
/// data directory, e.g. `~/.local/share/mixtape` on Linux.
pub fn data_dir() -> PathBuf {
    let mut path = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push(APP_DIR);
    path
}

/// Loads environment variables from `<data dir>/mixtape/.env`.
///
/// Creates the application directory if it does not exist yet.
///
/// # Errors
///
/// Returns an error string if the directory cannot be created or the `.env`
/// file cannot be read or parsed.
pub async fn load_env() -> Result<(), String> {
    let path = data_dir().join(".env");
    if let Some(parent) = path.parent() {
        async_fs::create_dir_all(parent)
            .await
            .map_err(|e| e.to_string())?;
    }

    dotenv::from_path(&path).map_err(|e| format!("{}: {}", path.display(), e))?;
    Ok(())
}

/// Returns the address the local OAuth callback server binds to.
///
/// # Panics
///
/// Panics if the `SERVER_ADDRESS` environment variable is not set.
pub fn server_addr() -> String {
    env::var("SERVER_ADDRESS").expect("SERVER_ADDRESS must be set")
}

/// Returns the Spotify API client ID.
///
/// # Panics
///
/// Panics if the `SPOTIFY_API_AUTH_CLIENT_ID` environment variable is not set.
pub fn spotify_client_id() -> String {
    env::var("SPOTIFY_API_AUTH_CLIENT_ID").expect("SPOTIFY_API_AUTH_CLIENT_ID must be set")
}

/// Returns the OAuth redirect URI. Must match the one registered in the
/// Spotify application settings.
///
/// # Panics
///
/// Panics if the `SPOTIFY_API_REDIRECT_URI` environment variable is not set.
pub fn spotify_redirect_uri() -> String {
    env::var("SPOTIFY_API_REDIRECT_URI").expect("SPOTIFY_API_REDIRECT_URI must be set")
}

/// Returns the scope requested during authorization, falling back to
/// [`DEFAULT_SCOPE`].
pub fn spotify_scope() -> String {
    env::var("SPOTIFY_API_AUTH_SCOPE").unwrap_or_else(|_| DEFAULT_SCOPE.to_string())
}

/// Returns the Spotify OAuth authorization URL, e.g.
/// `https://accounts.spotify.com/authorize`.
///
/// # Panics
///
/// Panics if the `SPOTIFY_API_AUTH_URL` environment variable is not set.
pub fn spotify_apiauth_url() -> String {
    env::var("SPOTIFY_API_AUTH_URL").expect("SPOTIFY_API_AUTH_URL must be set")
}

/// Returns the Spotify Web API base URL, e.g. `https://api.spotify.com/v1`.
///
/// # Panics
///
/// Panics if the `SPOTIFY_API_URL` environment variable is not set.
pub fn spotify_apiurl() -> String {
    env::var("SPOTIFY_API_URL").expect("SPOTIFY_API_URL must be set")
}

/// Returns the Spotify OAuth token exchange URL, e.g.
/// `https://accounts.spotify.com/api/token`.
///
/// # Panics
///
/// Panics if the `SPOTIFY_API_TOKEN_URL` environment variable is not set.
pub fn spotify_apitoken_url() -> String {
    env::var("SPOTIFY_API_TOKEN_URL").expect("SPOTIFY_API_TOKEN_URL must be set")
}
