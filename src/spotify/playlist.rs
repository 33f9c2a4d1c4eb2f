use rand::seq::IndexedRandom;
use reqwest::Client;

use crate::{
    config,
    management::TokenManager,
    spotify::{self, SpotifyError},
    types::{
        AddTrackToPlaylistRequest, AddTrackToPlaylistResponse, CreatePlaylistRequest,
        CreatePlaylistResponse, CurrentUser, GetUserPlaylistsResponse, Playlist,
        PlaylistItemsResponse, TrackRef,
    },
    utils,
};

/// Page size for `/me/playlists`.
pub const PLAYLISTS_PAGE_LIMIT: usize = 50;
/// Page size for `/playlists/{id}/tracks`, also the maximum number of items
/// per add request.
pub const TRACKS_PAGE_LIMIT: usize = 100;

/// Fetches all playlists of the current user from `/me/playlists`.
///
/// Pages are requested with [`PLAYLISTS_PAGE_LIMIT`] items each until a
/// page comes back shorter than that.
///
/// # Arguments
///
/// * `token_mgr` - Token manager handing out a valid access token per page
/// * `on_page` - Called with the number of playlists in each page, e.g. to
///   update a spinner
///
/// # Returns
///
/// Every playlist the user owns or follows, in Spotify's order.
///
/// # Errors
///
/// Returns a [`SpotifyError`] when a page cannot be fetched or parsed. Pages
/// fetched before the failure are discarded.
///
/// # Example
///
/// ```
/// let playlists = get_user_playlists(&mut token_mgr, |n| println!("+{}", n)).await?;
/// ```
pub async fn get_user_playlists(
    token_mgr: &mut TokenManager,
    mut on_page: impl FnMut(usize),
) -> Result<Vec<Playlist>, SpotifyError> {
    let client = Client::new();
    let mut playlists = Vec::new();
    let mut offset = 0;

    loop {
        let api_url = format!(
            "{uri}/me/playlists?limit={limit}&offset={offset}",
            uri = &config::spotify_apiurl(),
            limit = PLAYLISTS_PAGE_LIMIT,
            offset = offset
        );

        let token = token_mgr.get_valid_token().await;
        let response = spotify::send(client.get(&api_url).bearer_auth(token)).await?;
        let page = response.json::<GetUserPlaylistsResponse>().await?;

        let count = page.items.len();
        on_page(count);
        playlists.extend(page.items);

        if count < PLAYLISTS_PAGE_LIMIT {
            break;
        }
        offset += PLAYLISTS_PAGE_LIMIT;
    }

    Ok(playlists)
}

/// Picks one playlist at random among those whose name is in `names`.
///
/// Names are compared exactly. Returns `None` when no playlist matches.
pub fn find_playlist<'a, S: AsRef<str>>(
    playlists: &'a [Playlist],
    names: &[S],
) -> Option<&'a Playlist> {
    let matching: Vec<&Playlist> = playlists
        .iter()
        .filter(|p| names.iter().any(|name| name.as_ref() == p.name))
        .collect();

    matching.choose(&mut rand::rng()).copied()
}

/// Fetches every track of a playlist that has both a track id and a first
/// artist id. Local files and episodes without those ids are skipped.
///
/// # Arguments
///
/// * `token_mgr` - Token manager handing out a valid access token per page
/// * `playlist_id` - Spotify ID of the playlist
/// * `on_page` - Called for each page with the total reported by Spotify and
///   the number of items in the page
///
/// # Returns
///
/// The playlist's tracks as [`TrackRef`]s, in playlist order.
///
/// # Errors
///
/// Returns a [`SpotifyError`] when a page cannot be fetched or parsed.
pub async fn get_playlist_tracks(
    token_mgr: &mut TokenManager,
    playlist_id: &str,
    mut on_page: impl FnMut(Option<u64>, usize),
) -> Result<Vec<TrackRef>, SpotifyError> {
    let mut tracks = Vec::new();
    fetch_playlist_items(
        token_mgr,
        playlist_id,
        "items(track(id,artists(id))),total",
        |page| {
            on_page(page.total, page.items.len());
            tracks.extend(
                page.items
                    .iter()
                    .filter_map(|item| item.track.as_ref())
                    .filter_map(|track| track.to_track_ref()),
            );
        },
    )
    .await?;

    Ok(tracks)
}

/// Fetches the ids of every track in a playlist, in playlist order.
///
/// Items without a track id, like local files, are skipped.
///
/// # Errors
///
/// Returns a [`SpotifyError`] when a page cannot be fetched or parsed.
pub async fn get_playlist_track_ids(
    token_mgr: &mut TokenManager,
    playlist_id: &str,
) -> Result<Vec<String>, SpotifyError> {
    let mut track_ids = Vec::new();
    fetch_playlist_items(token_mgr, playlist_id, "items(track(id)),total", |page| {
        track_ids.extend(
            page.items
                .iter()
                .filter_map(|item| item.track.as_ref())
                .filter_map(|track| track.id.clone()),
        );
    })
    .await?;

    Ok(track_ids)
}

async fn fetch_playlist_items(
    token_mgr: &mut TokenManager,
    playlist_id: &str,
    fields: &str,
    mut on_page: impl FnMut(&PlaylistItemsResponse),
) -> Result<(), SpotifyError> {
    let client = Client::new();
    let api_url = format!(
        "{uri}/playlists/{id}/tracks",
        uri = &config::spotify_apiurl(),
        id = playlist_id
    );
    let mut offset = 0;

    loop {
        let token = token_mgr.get_valid_token().await;
        let request = client.get(&api_url).bearer_auth(token).query(&[
            ("limit", TRACKS_PAGE_LIMIT.to_string()),
            ("offset", offset.to_string()),
            ("fields", fields.to_string()),
        ]);
        let page = spotify::send(request)
            .await?
            .json::<PlaylistItemsResponse>()
            .await?;

        on_page(&page);

        if page.items.len() < TRACKS_PAGE_LIMIT {
            return Ok(());
        }
        offset += TRACKS_PAGE_LIMIT;
    }
}

/// Returns the Spotify user ID of the authenticated user (`GET /me`).
///
/// # Errors
///
/// Returns a [`SpotifyError`] when the request fails or the response cannot
/// be parsed.
pub async fn current_user_id(token_mgr: &mut TokenManager) -> Result<String, SpotifyError> {
    let api_url = format!("{uri}/me", uri = &config::spotify_apiurl());
    let token = token_mgr.get_valid_token().await;

    let client = Client::new();
    let response = spotify::send(client.get(&api_url).bearer_auth(token)).await?;
    let user = response.json::<CurrentUser>().await?;
    Ok(user.id)
}

/// Creates a private, non-collaborative playlist for the current user.
///
/// # Arguments
///
/// * `token_mgr` - Token manager for the `/me` lookup and the create request
/// * `name` - Name of the new playlist
/// * `description` - Description shown in Spotify
///
/// # Returns
///
/// The created playlist, including its ID and, if Spotify sends one, its
/// public URL.
///
/// # Errors
///
/// Returns a [`SpotifyError`] when the user lookup or the create request
/// fails.
pub async fn create(
    token_mgr: &mut TokenManager,
    name: &str,
    description: &str,
) -> Result<CreatePlaylistResponse, SpotifyError> {
    let user_id = current_user_id(token_mgr).await?;
    let api_url = format!(
        "{uri}/users/{user_id}/playlists",
        uri = &config::spotify_apiurl(),
        user_id = user_id
    );

    let body = CreatePlaylistRequest {
        name: name.to_string(),
        description: description.to_string(),
        public: false,
        collaborative: false,
    };

    let token = token_mgr.get_valid_token().await;
    let client = Client::new();
    let response = spotify::send(client.post(&api_url).bearer_auth(token).json(&body)).await?;
    Ok(response.json::<CreatePlaylistResponse>().await?)
}

/// Appends tracks to a playlist in batches of [`TRACKS_PAGE_LIMIT`].
///
/// # Arguments
///
/// * `token_mgr` - Token manager handing out a valid access token per batch
/// * `playlist_id` - Spotify ID of the playlist
/// * `track_ids` - Track IDs in the order they should appear; they are sent
///   as `spotify:track:<id>` URIs
/// * `on_batch` - Called with the size of each batch once it was added
///
/// # Errors
///
/// Returns a [`SpotifyError`] on the first batch that fails. Batches added
/// before stay in the playlist.
pub async fn add_tracks(
    token_mgr: &mut TokenManager,
    playlist_id: &str,
    track_ids: &[String],
    mut on_batch: impl FnMut(usize),
) -> Result<(), SpotifyError> {
    let api_url = format!(
        "{uri}/playlists/{id}/tracks",
        uri = &config::spotify_apiurl(),
        id = playlist_id
    );
    let client = Client::new();

    for chunk in track_ids.chunks(TRACKS_PAGE_LIMIT) {
        let body = AddTrackToPlaylistRequest {
            uris: chunk.iter().map(|id| utils::track_uri(id)).collect(),
        };

        let token = token_mgr.get_valid_token().await;
        spotify::send(client.post(&api_url).bearer_auth(token).json(&body))
            .await?
            .json::<AddTrackToPlaylistResponse>()
            .await?;
        on_batch(chunk.len());
    }

    Ok(())
}

/// Replaces the content of a playlist: clears it, then adds `track_ids` in
/// order through [`add_tracks`].
///
/// # Errors
///
/// Returns a [`SpotifyError`] when clearing or adding fails. A failure while
/// adding leaves the playlist partially filled.
pub async fn replace_tracks(
    token_mgr: &mut TokenManager,
    playlist_id: &str,
    track_ids: &[String],
    on_batch: impl FnMut(usize),
) -> Result<(), SpotifyError> {
    let api_url = format!(
        "{uri}/playlists/{id}/tracks",
        uri = &config::spotify_apiurl(),
        id = playlist_id
    );

    let body = AddTrackToPlaylistRequest { uris: Vec::new() };
    let token = token_mgr.get_valid_token().await;
    let client = Client::new();
    spotify::send(client.put(&api_url).bearer_auth(token).json(&body)).await?;

    add_tracks(token_mgr, playlist_id, track_ids, on_batch).await
}
