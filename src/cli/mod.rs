//! # CLI Module
//!
//! User-facing commands of mixtape. Each command loads the stored token,
//! talks to Spotify through [`crate::spotify`] and reports progress with
//! indicatif bars and the crate's output macros.
//!
//! ## Commands
//!
//! - [`auth`] - OAuth 2.0 PKCE login, stores the token locally
//! - [`mix`] - Mixes several source playlists into a new playlist using the
//!   round-robin [`crate::mixer::Mixer`]
//! - [`extend`] - Creates an extended copy of a playlist filled with
//!   recommendations that match its average audio features
//! - [`shuffle`] - Shuffles a playlist in place
//! - [`daily`] - `mix` with its defaults, then `shuffle` of the radio mix
//!   if the account has one
//!
//! ## Usage
//!
//! ```bash
//! mixtape auth
//! mixtape mix --group "Daily Mix 1,Daily Mix 2" --source "Discover Weekly"
//! mixtape extend "Road Trip" --limit 200
//! mixtape shuffle --playlist "[Mixer] Automated Radio Mix"
//! mixtape daily
//! ```
//!
//! ## Error Handling
//!
//! Missing tokens, unknown playlists and failed uploads end the command with
//! [`error!`](crate::error). Problems that leave a useful result behind, like
//! a single missing source playlist, are reported with
//! [`warning!`](crate::warning) and the command carries on.

mod auth;
mod extend;
mod mix;
mod shuffle;

pub use auth::auth;
pub use extend::extend;
pub use extend::{DEFAULT_EXTEND_LIMIT, extended_playlist_name};
pub use mix::{MixRequest, mix};
pub use shuffle::{DEFAULT_SHUFFLE_PLAYLIST, find_radio_mix, shuffle};

use crate::{error, management::TokenManager};

/// Runs `mix` with its defaults, then shuffles the radio mix playlist when
/// it exists.
pub async fn daily() {
    mix(MixRequest::default()).await;
    shuffle::shuffle_radio_mix().await;
}

async fn load_token_manager() -> TokenManager {
    match TokenManager::load().await {
        Ok(manager) => manager,
        Err(e) => {
            error!(
                "Failed to load token. Please run mixtape auth\n Error: {}",
                e
            );
        }
    }
}
