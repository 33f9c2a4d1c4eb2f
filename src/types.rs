use serde::{Deserialize, Serialize};
use tabled::Tabled;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Token {
    pub access_token: String,
    pub refresh_token: String,
    pub scope: String,
    pub expires_in: u64,
    pub obtained_at: u64,
}

#[derive(Debug, Clone)]
pub struct PkceToken {
    pub code_verifier: String,
    pub token: Option<Token>,
}

/// A track as seen by the mixer: its id and the id of its first artist.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TrackRef {
    pub track_id: String,
    pub artist_id: String,
}

impl TrackRef {
    pub fn new(track_id: impl Into<String>, artist_id: impl Into<String>) -> Self {
        Self {
            track_id: track_id.into(),
            artist_id: artist_id.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentUser {
    pub id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetUserPlaylistsResponse {
    pub items: Vec<Playlist>,
    pub next: Option<String>,
    pub total: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Playlist {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub public: Option<bool>,
    pub collaborative: bool,
    pub snapshot_id: String,
    pub external_urls: Option<ExternalUrls>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExternalUrls {
    pub spotify: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaylistItemsResponse {
    pub items: Vec<PlaylistItem>,
    pub total: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaylistItem {
    pub track: Option<PlaylistTrack>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaylistTrack {
    pub id: Option<String>,
    #[serde(default)]
    pub artists: Vec<TrackArtist>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackArtist {
    pub id: Option<String>,
}

impl PlaylistTrack {
    /// Converts the track into a [`TrackRef`] when both the track id and the
    /// id of its first artist are present.
    pub fn to_track_ref(&self) -> Option<TrackRef> {
        let track_id = self.id.clone()?;
        let artist_id = self.artists.first()?.id.clone()?;
        Some(TrackRef {
            track_id,
            artist_id,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePlaylistRequest {
    pub name: String,
    pub description: String,
    pub public: bool,
    pub collaborative: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePlaylistResponse {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub public: Option<bool>,
    pub collaborative: bool,
    pub external_urls: Option<ExternalUrls>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddTrackToPlaylistRequest {
    pub uris: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddTrackToPlaylistResponse {
    pub snapshot_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioFeaturesResponse {
    pub audio_features: Vec<Option<AudioFeatures>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioFeatures {
    pub id: String,
    pub instrumentalness: f64,
    pub energy: f64,
    pub danceability: f64,
    pub valence: f64,
    pub acousticness: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetSeveralTracksResponse {
    pub tracks: Vec<Option<FullTrack>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FullTrack {
    pub id: Option<String>,
    pub popularity: u32,
    #[serde(default)]
    pub artists: Vec<TrackArtist>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendationsResponse {
    pub tracks: Vec<RecommendedTrack>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendedTrack {
    pub id: String,
}

/// Average audio attributes of a playlist, all on a 0-1 scale.
///
/// `popularity` is `None` when no popularity values were available.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Criteria {
    pub instrumentalness: f64,
    pub energy: f64,
    pub danceability: f64,
    pub valence: f64,
    pub acousticness: f64,
    pub popularity: Option<f64>,
}

#[derive(Tabled)]
pub struct CriteriaTableRow {
    pub criterion: String,
    pub value: String,
}

/// Seed tracks and artists for a single recommendations request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeedCombination {
    pub seed_tracks: Vec<String>,
    pub seed_artists: Vec<String>,
}

/// Inclusive bounds passed as `min_*` and `max_*` recommendation parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TargetRanges {
    pub instrumentalness: (f64, f64),
    pub energy: (f64, f64),
    pub danceability: (f64, f64),
    pub valence: (f64, f64),
    pub acousticness: (f64, f64),
    pub popularity: Option<(u32, u32)>,
}
