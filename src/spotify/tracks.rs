use reqwest::Client;

use crate::{
    config,
    management::TokenManager,
    spotify::{self, SpotifyError},
    types::{AudioFeatures, AudioFeaturesResponse, FullTrack, GetSeveralTracksResponse},
    warning,
};

/// Maximum number of ids per `/audio-features` request.
pub const AUDIO_FEATURES_BATCH: usize = 100;
/// Maximum number of ids per `/tracks` request.
pub const TRACKS_BATCH: usize = 50;

/// Fetches audio features for `track_ids` in batches of
/// [`AUDIO_FEATURES_BATCH`].
///
/// # Arguments
///
/// * `token_mgr` - Token manager handing out a valid access token per batch
/// * `track_ids` - Spotify track IDs
/// * `on_batch` - Called with the size of each batch once it was fetched
///
/// # Returns
///
/// The features of every track Spotify has features for. Tracks without
/// features are skipped and counted in a single warning.
///
/// # Errors
///
/// Returns a [`SpotifyError`] when a batch cannot be fetched or parsed.
pub async fn get_audio_features(
    token_mgr: &mut TokenManager,
    track_ids: &[String],
    mut on_batch: impl FnMut(usize),
) -> Result<Vec<AudioFeatures>, SpotifyError> {
    let client = Client::new();
    let api_url = format!("{uri}/audio-features", uri = &config::spotify_apiurl());
    let mut features = Vec::with_capacity(track_ids.len());
    let mut missing = 0;

    for chunk in track_ids.chunks(AUDIO_FEATURES_BATCH) {
        let token = token_mgr.get_valid_token().await;
        let request = client
            .get(&api_url)
            .bearer_auth(token)
            .query(&[("ids", chunk.join(","))]);
        let res = spotify::send(request)
            .await?
            .json::<AudioFeaturesResponse>()
            .await?;

        for entry in res.audio_features {
            match entry {
                Some(f) => features.push(f),
                None => missing += 1,
            }
        }
        on_batch(chunk.len());
    }

    if missing > 0 {
        warning!("{} tracks have no audio features.", missing);
    }

    Ok(features)
}

/// Fetches full track objects for `track_ids` in batches of
/// [`TRACKS_BATCH`]. Unknown ids are dropped.
///
/// Used for the data audio features lack: popularity and artists.
///
/// # Errors
///
/// Returns a [`SpotifyError`] when a batch cannot be fetched or parsed.
pub async fn get_tracks(
    token_mgr: &mut TokenManager,
    track_ids: &[String],
    mut on_batch: impl FnMut(usize),
) -> Result<Vec<FullTrack>, SpotifyError> {
    let client = Client::new();
    let api_url = format!("{uri}/tracks", uri = &config::spotify_apiurl());
    let mut tracks = Vec::with_capacity(track_ids.len());

    for chunk in track_ids.chunks(TRACKS_BATCH) {
        let token = token_mgr.get_valid_token().await;
        let request = client
            .get(&api_url)
            .bearer_auth(token)
            .query(&[("ids", chunk.join(","))]);
        let res = spotify::send(request)
            .await?
            .json::<GetSeveralTracksResponse>()
            .await?;

        tracks.extend(res.tracks.into_iter().flatten());
        on_batch(chunk.len());
    }

    Ok(tracks)
}
