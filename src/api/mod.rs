//! # API Module
//!
//! HTTP endpoints served by the local callback server while `mixtape auth`
//! is running.
//!
//! - [`callback`] - Receives the redirect from Spotify's authorization
//!   server and exchanges the authorization code for a token (PKCE).
//! - [`health`] - Reports status and version.
//!
//! ```rust,ignore
//! use axum::{Router, routing::get};
//! use mixtape::api::{callback, health};
//!
//! let app = Router::new()
//!     .route("/callback", get(callback))
//!     .route("/health", get(health));
//! ```

mod callback;
mod health;

pub use callback::{callback, code_verifier, store_token};
pub use health::health;
