//! # Spotify Integration Module
//!
//! HTTP access to the Spotify Web API for everything mixtape needs around the
//! mixer: authentication, reading playlists, audio features and
//! recommendations, and creating or rewriting playlists.
//!
//! ## Architecture
//!
//! ```text
//! CLI (mix, extend, shuffle)
//!          ↓
//! Spotify Integration Layer
//!     ├── Authentication (OAuth 2.0 PKCE)
//!     ├── Playlist Operations (List, Read, Create, Add, Replace)
//!     ├── Track Metadata (Audio Features, Popularity)
//!     └── Recommendations
//!          ↓
//! HTTP Layer (reqwest, JSON)
//! ```
//!
//! ## Error Handling
//!
//! Every request goes through [`send`], which implements the retry policy
//! shared by all endpoints:
//! - `502 Bad Gateway` is retried after 10 seconds, up to
//!   [`MAX_BAD_GATEWAY_RETRIES`] times.
//! - `429 Too Many Requests` honors the `Retry-After` header as long as it
//!   asks for at most [`MAX_RETRY_AFTER`] seconds. Longer delays give up with
//!   [`SpotifyError::RateLimited`].
//! - Any other non-success status is returned as [`SpotifyError::Http`].
//!
//! ## Authentication
//!
//! Functions that talk to user endpoints take a [`TokenManager`], which
//! hands out a fresh access token for each request and refreshes it
//! transparently when it is about to expire.
//!
//! [`TokenManager`]: crate::management::TokenManager

pub mod auth;
pub mod playlist;
pub mod recommendations;
pub mod tracks;

use std::{fmt, time::Duration};

use reqwest::{RequestBuilder, Response, StatusCode, header::HeaderMap};
use tokio::time::sleep;

use crate::warning;

/// Longest `Retry-After` delay, in seconds, that is waited out.
pub const MAX_RETRY_AFTER: u64 = 120;
/// Number of retries for `502 Bad Gateway` responses.
pub const MAX_BAD_GATEWAY_RETRIES: u32 = 5;

const BAD_GATEWAY_DELAY: Duration = Duration::from_secs(10);

#[derive(Debug)]
pub enum SpotifyError {
    Http(reqwest::Error),
    RateLimited(u64),
    Request(String),
}

impl fmt::Display for SpotifyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SpotifyError::Http(e) => write!(f, "{}", e),
            SpotifyError::RateLimited(secs) => {
                write!(f, "rate limited by Spotify, retry after {} seconds", secs)
            }
            SpotifyError::Request(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for SpotifyError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SpotifyError::Http(e) => Some(e),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for SpotifyError {
    fn from(err: reqwest::Error) -> Self {
        SpotifyError::Http(err)
    }
}

/// Sends `request`, retrying on `502` and short `429` responses.
///
/// The request is cloned for every attempt, so bodies have to be cloneable
/// (JSON and form bodies are).
///
/// # Errors
///
/// - [`SpotifyError::RateLimited`] when `Retry-After` exceeds
///   [`MAX_RETRY_AFTER`]
/// - [`SpotifyError::Http`] for network errors and any other non-success
///   status, including a `502` that outlasted [`MAX_BAD_GATEWAY_RETRIES`]
/// - [`SpotifyError::Request`] when the request cannot be cloned
pub async fn send(request: RequestBuilder) -> Result<Response, SpotifyError> {
    let mut bad_gateway_retries = 0;

    loop {
        let attempt = request
            .try_clone()
            .ok_or_else(|| SpotifyError::Request("request cannot be retried".to_string()))?;
        let response = attempt.send().await?;

        match response.status() {
            StatusCode::BAD_GATEWAY if bad_gateway_retries < MAX_BAD_GATEWAY_RETRIES => {
                bad_gateway_retries += 1;
                sleep(BAD_GATEWAY_DELAY).await;
            }
            StatusCode::TOO_MANY_REQUESTS => {
                let retry_after = retry_after(response.headers());
                if retry_after > MAX_RETRY_AFTER {
                    warning!(
                        "Retry after has reached an abnormal high of {} seconds. Try again later.",
                        retry_after
                    );
                    return Err(SpotifyError::RateLimited(retry_after));
                }
                sleep(Duration::from_secs(retry_after)).await;
            }
            _ => return Ok(response.error_for_status()?),
        }
    }
}

/// Reads the `Retry-After` header in seconds, defaulting to `1` when it is
/// missing or malformed.
pub fn retry_after(headers: &HeaderMap) -> u64 {
    headers
        .get("retry-after")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim().parse::<u64>().ok())
        .unwrap_or(1)
}
