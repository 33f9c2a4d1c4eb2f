use rand::seq::SliceRandom;

use crate::{
    error, info, management::TokenManager, spotify, success, types::Playlist, utils, warning,
};

pub const DEFAULT_SHUFFLE_PLAYLIST: &str = "[Mixer] Automated Radio Mix";

/// Shuffles the tracks of `playlist_name` and writes them back in the new
/// order. Exits with an error when the playlist does not exist.
pub async fn shuffle(playlist_name: String) {
    let mut token_mgr = super::load_token_manager().await;

    let playlists = super::mix::fetch_user_playlists(&mut token_mgr).await;
    let Some(playlist) =
        spotify::playlist::find_playlist(&playlists, std::slice::from_ref(&playlist_name))
    else {
        error!("Playlist '{}' not found.", playlist_name);
    };

    shuffle_playlist(&mut token_mgr, playlist).await;
}

/// Looks up the radio mix shuffled by `daily`. Nothing in mixtape creates
/// it, so a missing radio mix is expected on fresh accounts.
pub fn find_radio_mix(playlists: &[Playlist]) -> Option<&Playlist> {
    spotify::playlist::find_playlist(playlists, &[DEFAULT_SHUFFLE_PLAYLIST])
}

/// Shuffles the radio mix if the user has one and skips it with a warning
/// otherwise.
pub(super) async fn shuffle_radio_mix() {
    let mut token_mgr = super::load_token_manager().await;

    let playlists = super::mix::fetch_user_playlists(&mut token_mgr).await;
    match find_radio_mix(&playlists) {
        Some(playlist) => shuffle_playlist(&mut token_mgr, playlist).await,
        None => warning!(
            "Playlist '{}' not found, skipping shuffle.",
            DEFAULT_SHUFFLE_PLAYLIST
        ),
    }
}

async fn shuffle_playlist(token_mgr: &mut TokenManager, playlist: &Playlist) {
    info!("Fetching tracks from playlist '{}' for shuffling...", playlist.name);
    let mut track_ids =
        match spotify::playlist::get_playlist_track_ids(token_mgr, &playlist.id).await {
            Ok(ids) => ids,
            Err(e) => error!("Failed to fetch tracks from '{}': {}", playlist.name, e),
        };

    track_ids.shuffle(&mut rand::rng());

    info!("Updating playlist with {} shuffled tracks...", track_ids.len());
    let pb = utils::progress_bar(track_ids.len() as u64, "Adding shuffled tracks");
    let replaced = spotify::playlist::replace_tracks(token_mgr, &playlist.id, &track_ids, |n| {
        pb.inc(n as u64)
    })
    .await;
    pb.finish_and_clear();

    match replaced {
        Ok(_) => success!("Playlist '{}' updated with shuffled tracks.", playlist.name),
        Err(e) => error!("Failed to update playlist '{}': {}", playlist.name, e),
    }
}
