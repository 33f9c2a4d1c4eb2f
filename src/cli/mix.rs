use rand::seq::SliceRandom;

use crate::{
    error, info,
    management::TokenManager,
    mixer::{MixOptions, Mixer},
    spotify, success,
    types::{Playlist, TrackRef},
    utils::{self, PlaylistGroup},
    warning,
};

pub const DEFAULT_MIX_NAME: &str = "[Mixer] Automated Daily Mix";

const DEFAULT_GROUPS: [&[&str]; 2] = [
    &["Daily Mix 1", "Daily Mix 2", "Daily Mix 3"],
    &["Daily Mix 4", "Daily Mix 5", "Daily Mix 6"],
];
const DEFAULT_SOURCES: [&str; 4] = [
    "On Repeat",
    "Repeat Rewind",
    "Radar des sorties",
    "Discover Weekly",
];

/// What to mix and how.
///
/// Every group contributes one randomly chosen playlist, every source
/// contributes the playlist with exactly that name. Groups come first in the
/// round-robin order, followed by the sources in the given order.
#[derive(Debug, Clone)]
pub struct MixRequest {
    pub groups: Vec<PlaylistGroup>,
    pub sources: Vec<String>,
    pub name: String,
    pub options: MixOptions,
}

impl Default for MixRequest {
    fn default() -> Self {
        Self {
            groups: DEFAULT_GROUPS
                .iter()
                .map(|names| PlaylistGroup(names.iter().map(|n| n.to_string()).collect()))
                .collect(),
            sources: DEFAULT_SOURCES.iter().map(|n| n.to_string()).collect(),
            name: DEFAULT_MIX_NAME.to_string(),
            options: MixOptions::default(),
        }
    }
}

impl MixRequest {
    pub fn description(&self) -> String {
        let mut names: Vec<String> = self.groups.iter().map(|g| g.to_string()).collect();
        names.extend(self.sources.iter().cloned());
        format!(
            "This playlist was created using the Mixer algorithm to combine tracks from your {} playlists.",
            names.join(", ")
        )
    }
}

pub async fn mix(request: MixRequest) {
    let mut token_mgr = super::load_token_manager().await;

    let playlists = fetch_user_playlists(&mut token_mgr).await;

    let mut sources: Vec<Vec<TrackRef>> = Vec::new();

    for group in &request.groups {
        match spotify::playlist::find_playlist(&playlists, group.names()) {
            Some(playlist) => {
                info!("Randomly selected playlist: '{}'", playlist.name);
                push_source(&mut sources, fetch_tracks(&mut token_mgr, playlist).await);
            }
            None => warning!("No playlist found for group '{}'.", group),
        }
    }

    for name in &request.sources {
        match spotify::playlist::find_playlist(&playlists, std::slice::from_ref(name)) {
            Some(playlist) => {
                push_source(&mut sources, fetch_tracks(&mut token_mgr, playlist).await);
            }
            None => warning!("Playlist '{}' not found.", name),
        }
    }

    if sources.is_empty() {
        warning!("No tracks available to mix.");
        return;
    }

    let mixed = mix_sources(&sources, request.options);
    if mixed.is_empty() {
        warning!("No tracks were mixed.");
        return;
    }
    success!("Total tracks mixed: {}", mixed.len());

    info!("Creating new playlist '{}'...", request.name);
    let playlist =
        match spotify::playlist::create(&mut token_mgr, &request.name, &request.description())
            .await
        {
            Ok(playlist) => playlist,
            Err(e) => error!("Failed to create playlist '{}': {}", request.name, e),
        };
    success!("Playlist '{}' created.", playlist.name);

    let pb = utils::progress_bar(mixed.len() as u64, "Tracks added to playlist");
    let added =
        spotify::playlist::add_tracks(&mut token_mgr, &playlist.id, &mixed, |n| pb.inc(n as u64))
            .await;
    pb.finish_and_clear();

    match added {
        Ok(_) => success!(
            "Mixed tracks successfully uploaded to playlist '{}'.",
            playlist.name
        ),
        Err(e) => error!("Failed to add tracks to playlist: {}", e),
    }
}

/// Shuffles a source and keeps it unless it is empty.
fn push_source(sources: &mut Vec<Vec<TrackRef>>, mut tracks: Vec<TrackRef>) {
    if tracks.is_empty() {
        return;
    }
    tracks.shuffle(&mut rand::rng());
    sources.push(tracks);
}

fn mix_sources(sources: &[Vec<TrackRef>], options: MixOptions) -> Vec<String> {
    info!("Mixing tracks from {} sources...", sources.len());

    let pb = utils::progress_bar(options.max_tracks as u64, "Tracks mixed");
    let mixed: Vec<String> = Mixer::new(sources, options)
        .take(options.max_tracks)
        .inspect(|_| pb.inc(1))
        .collect();
    pb.finish_and_clear();

    mixed
}

pub(super) async fn fetch_user_playlists(token_mgr: &mut TokenManager) -> Vec<Playlist> {
    let pb = utils::spinner("Fetching your playlists...");
    let mut fetched = 0;
    let playlists = spotify::playlist::get_user_playlists(token_mgr, |n| {
        fetched += n;
        pb.set_message(format!("Playlists fetched: {}", fetched));
    })
    .await;
    pb.finish_and_clear();

    match playlists {
        Ok(playlists) => {
            success!("Total playlists fetched: {}", playlists.len());
            playlists
        }
        Err(e) => error!("Failed to fetch playlists: {}", e),
    }
}

pub(super) async fn fetch_tracks(token_mgr: &mut TokenManager, playlist: &Playlist) -> Vec<TrackRef> {
    let pb = utils::progress_bar(0, format!("Tracks fetched from '{}'", playlist.name));
    let tracks = spotify::playlist::get_playlist_tracks(token_mgr, &playlist.id, |total, n| {
        if let Some(total) = total {
            pb.set_length(total);
        }
        pb.inc(n as u64);
    })
    .await;
    pb.finish_and_clear();

    match tracks {
        Ok(tracks) => {
            info!(
                "Total tracks fetched from '{}': {}",
                playlist.name,
                tracks.len()
            );
            tracks
        }
        Err(e) => {
            warning!("Failed to fetch tracks from '{}': {}", playlist.name, e);
            Vec::new()
        }
    }
}
