use tabled::Table;

use crate::{
    error, info,
    spotify::{self, recommendations},
    success, utils, warning,
};

pub const DEFAULT_EXTEND_LIMIT: usize = 1000;

pub fn extended_playlist_name(original: &str) -> String {
    format!("Extended {}", original)
}

fn extended_playlist_description(original: &str) -> String {
    format!(
        "An extended playlist based on '{}' with similar songs.",
        original
    )
}

/// Creates `Extended <playlist_name>` filled with up to `limit`
/// recommendations that match the playlist's average audio features.
pub async fn extend(playlist_name: String, limit: usize) {
    let mut token_mgr = super::load_token_manager().await;

    let playlists = super::mix::fetch_user_playlists(&mut token_mgr).await;
    let Some(playlist) =
        spotify::playlist::find_playlist(&playlists, std::slice::from_ref(&playlist_name))
    else {
        error!("Playlist '{}' not found.", playlist_name);
    };

    let pb = utils::spinner(format!("Fetching tracks from '{}'...", playlist.name));
    let track_ids = spotify::playlist::get_playlist_track_ids(&mut token_mgr, &playlist.id).await;
    pb.finish_and_clear();
    let track_ids = match track_ids {
        Ok(ids) if !ids.is_empty() => ids,
        Ok(_) => error!("No tracks found in playlist '{}'.", playlist.name),
        Err(e) => error!("Failed to fetch tracks from '{}': {}", playlist.name, e),
    };
    info!(
        "Total tracks fetched from '{}': {}",
        playlist.name,
        track_ids.len()
    );

    let pb = utils::progress_bar(track_ids.len() as u64, "Audio features fetched");
    let features =
        spotify::tracks::get_audio_features(&mut token_mgr, &track_ids, |n| pb.inc(n as u64))
            .await;
    pb.finish_and_clear();
    let features = match features {
        Ok(features) => features,
        Err(e) => error!("Failed to fetch audio features: {}", e),
    };

    // popularity is not part of the audio features
    let feature_ids: Vec<String> = features.iter().map(|f| f.id.clone()).collect();
    let pb = utils::progress_bar(feature_ids.len() as u64, "Popularity fetched");
    let tracks =
        spotify::tracks::get_tracks(&mut token_mgr, &feature_ids, |n| pb.inc(n as u64)).await;
    pb.finish_and_clear();
    let popularities: Vec<u32> = match tracks {
        Ok(tracks) => tracks.iter().map(|t| t.popularity).collect(),
        Err(e) => {
            warning!(
                "Failed to fetch track popularity, recommendations are not filtered by popularity: {}",
                e
            );
            Vec::new()
        }
    };

    let Some(criteria) = utils::calculate_average_criteria(&features, &popularities) else {
        error!("None of the tracks in '{}' have audio features.", playlist.name);
    };
    info!("Average criteria values:");
    println!("{}", Table::new(utils::criteria_table_rows(&criteria)));

    let seed_tracks = utils::pick_seed_tracks(&track_ids, &mut rand::rng());
    let seed_artists = match spotify::tracks::get_tracks(&mut token_mgr, &seed_tracks, |_| {}).await
    {
        Ok(tracks) => utils::unique_seed_artists(
            tracks
                .into_iter()
                .filter_map(|t| t.artists.into_iter().next().and_then(|a| a.id))
                .collect(),
        ),
        Err(e) => {
            warning!("Failed to fetch seed artists: {}", e);
            Vec::new()
        }
    };
    info!(
        "Selected {} seed tracks and {} seed artists.",
        seed_tracks.len(),
        seed_artists.len()
    );

    let pb = utils::progress_bar(limit as u64, "Recommendations fetched");
    let recommendations = recommendations::generate_recommendations(
        &mut token_mgr,
        &criteria,
        &seed_tracks,
        &seed_artists,
        &track_ids,
        limit,
        || pb.inc(1),
    )
    .await;
    pb.finish_and_clear();

    if recommendations.is_empty() {
        error!("No recommendations found based on the criteria.");
    }
    success!(
        "Total unique recommendations fetched: {}",
        recommendations.len()
    );

    let name = extended_playlist_name(&playlist.name);
    info!("Creating new playlist '{}'...", name);
    let created = match spotify::playlist::create(
        &mut token_mgr,
        &name,
        &extended_playlist_description(&playlist.name),
    )
    .await
    {
        Ok(created) => created,
        Err(e) => error!("Failed to create playlist '{}': {}", name, e),
    };

    let pb = utils::progress_bar(recommendations.len() as u64, "Tracks added to playlist");
    let added = spotify::playlist::add_tracks(&mut token_mgr, &created.id, &recommendations, |n| {
        pb.inc(n as u64)
    })
    .await;
    pb.finish_and_clear();

    if let Err(e) = added {
        error!("Failed to add tracks to playlist '{}': {}", name, e);
    }

    match created.external_urls.and_then(|urls| urls.spotify) {
        Some(url) => success!(
            "Extended playlist created successfully! You can view it here: {}",
            url
        ),
        None => success!("Extended playlist '{}' created successfully!", name),
    }
}
