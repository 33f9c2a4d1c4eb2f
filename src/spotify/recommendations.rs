use std::collections::HashSet;

use rand::seq::SliceRandom;
use reqwest::Client;

use crate::{
    config,
    management::TokenManager,
    spotify::{self, SpotifyError},
    types::{Criteria, RecommendationsResponse, RecommendedTrack, SeedCombination, TargetRanges},
    utils, warning,
};

/// Maximum number of tracks per `/recommendations` request.
pub const RECOMMENDATIONS_PER_CALL: usize = 100;
/// Upper bound on the number of tracks requested over all calls.
pub const MAX_TOTAL_REQUESTED: usize = 10_000;

/// Builds the query parameters of a single `/recommendations` request.
///
/// Always contains `limit` and the `min_*`/`max_*` bounds of the five audio
/// attributes. The popularity bounds are only present when `ranges` has
/// them, and each seed list only when it is not empty.
pub fn recommendation_query(
    seeds: &SeedCombination,
    ranges: &TargetRanges,
    limit: usize,
) -> Vec<(&'static str, String)> {
    let mut query = vec![("limit", limit.to_string())];

    let attributes = [
        ("min_instrumentalness", "max_instrumentalness", ranges.instrumentalness),
        ("min_energy", "max_energy", ranges.energy),
        ("min_danceability", "max_danceability", ranges.danceability),
        ("min_valence", "max_valence", ranges.valence),
        ("min_acousticness", "max_acousticness", ranges.acousticness),
    ];
    for (min_key, max_key, (min, max)) in attributes {
        query.push((min_key, min.to_string()));
        query.push((max_key, max.to_string()));
    }
    if let Some((min, max)) = ranges.popularity {
        query.push(("min_popularity", min.to_string()));
        query.push(("max_popularity", max.to_string()));
    }

    if !seeds.seed_tracks.is_empty() {
        query.push(("seed_tracks", seeds.seed_tracks.join(",")));
    }
    if !seeds.seed_artists.is_empty() {
        query.push(("seed_artists", seeds.seed_artists.join(",")));
    }

    query
}

/// Requests one page of recommendations.
///
/// # Arguments
///
/// * `token_mgr` - Token manager handing out a valid access token
/// * `seeds` - Seed tracks and artists, at most five in total
/// * `ranges` - Attribute bounds the recommendations have to fall into
/// * `limit` - Number of tracks to ask for, at most
///   [`RECOMMENDATIONS_PER_CALL`]
///
/// # Errors
///
/// Returns a [`SpotifyError`] when the request fails or the response cannot
/// be parsed.
pub async fn get_recommendations(
    token_mgr: &mut TokenManager,
    seeds: &SeedCombination,
    ranges: &TargetRanges,
    limit: usize,
) -> Result<Vec<RecommendedTrack>, SpotifyError> {
    let api_url = format!("{uri}/recommendations", uri = &config::spotify_apiurl());
    let token = token_mgr.get_valid_token().await;

    let client = Client::new();
    let request = client
        .get(&api_url)
        .bearer_auth(token)
        .query(&recommendation_query(seeds, ranges, limit));
    let res = spotify::send(request)
        .await?
        .json::<RecommendationsResponse>()
        .await?;

    Ok(res.tracks)
}

/// Collects up to `limit` recommended track ids similar to `criteria`.
///
/// Seed combinations are cycled in order and reshuffled after every full
/// cycle. Tracks already in `original_track_ids` or fetched before are
/// skipped. Fetching stops early once [`MAX_TOTAL_REQUESTED`] tracks were
/// requested, on an empty response, or on an API error.
///
/// `on_new` is called once for every newly collected track.
pub async fn generate_recommendations(
    token_mgr: &mut TokenManager,
    criteria: &Criteria,
    seed_tracks: &[String],
    seed_artists: &[String],
    original_track_ids: &[String],
    limit: usize,
    mut on_new: impl FnMut(),
) -> Vec<String> {
    let ranges = utils::target_ranges(criteria);

    let mut seed_tracks = seed_tracks.to_vec();
    let mut seed_artists = seed_artists.to_vec();
    seed_tracks.shuffle(&mut rand::rng());
    seed_artists.shuffle(&mut rand::rng());

    let mut combinations = utils::seed_combinations(&seed_tracks, &seed_artists);
    if combinations.is_empty() {
        warning!("No seed tracks or artists available for recommendations.");
        return Vec::new();
    }

    let original: HashSet<&str> = original_track_ids.iter().map(String::as_str).collect();
    let mut fetched: HashSet<String> = HashSet::new();
    let mut recommendations: Vec<String> = Vec::new();
    let mut total_requested = 0;
    let mut index = 0;

    while recommendations.len() < limit && total_requested < MAX_TOTAL_REQUESTED {
        if index >= combinations.len() {
            index = 0;
            combinations.shuffle(&mut rand::rng());
        }
        let seeds = combinations[index].clone();
        index += 1;

        let request_limit = RECOMMENDATIONS_PER_CALL.min(limit - recommendations.len());
        let tracks = match get_recommendations(token_mgr, &seeds, &ranges, request_limit).await {
            Ok(tracks) => tracks,
            Err(e) => {
                warning!("Error fetching recommendations: {}", e);
                break;
            }
        };

        if tracks.is_empty() {
            warning!("No more recommendations available with the current seeds and criteria.");
            break;
        }

        for track in tracks {
            if original.contains(track.id.as_str()) || !fetched.insert(track.id.clone()) {
                continue;
            }
            recommendations.push(track.id);
            on_new();
            if recommendations.len() >= limit {
                break;
            }
        }
        total_requested += request_limit;
    }

    recommendations
}
