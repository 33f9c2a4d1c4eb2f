use std::{collections::HashSet, fmt, time::Duration};

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use indicatif::{ProgressBar, ProgressStyle};
use rand::{Rng, distr::Alphanumeric, seq::IndexedRandom};
use sha2::{Digest, Sha256};

use crate::types::{AudioFeatures, Criteria, CriteriaTableRow, SeedCombination, TargetRanges};

/// Maximum number of seeds (tracks and artists) Spotify accepts per request.
pub const MAX_SEEDS: usize = 5;
/// Half-width of the range built around each averaged audio attribute.
pub const CRITERIA_DELTA: f64 = 0.2;
/// Half-width of the popularity range, on Spotify's 0-100 scale.
pub const POPULARITY_DELTA: i64 = 20;

pub fn generate_code_verifier() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(128)
        .map(char::from)
        .collect()
}

pub fn generate_code_challenge(verifier: &str) -> String {
    let hash = Sha256::digest(verifier.as_bytes());
    URL_SAFE_NO_PAD.encode(hash)
}

pub fn track_uri(track_id: &str) -> String {
    format!("spotify:track:{}", track_id)
}

/// A set of playlist names of which one is picked at random when mixing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaylistGroup(pub Vec<String>);

impl fmt::Display for PlaylistGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.join(","))
    }
}

impl PlaylistGroup {
    pub fn names(&self) -> &[String] {
        &self.0
    }
}

/// Parses a comma separated list of playlist names, e.g.
/// `"Daily Mix 1,Daily Mix 2,Daily Mix 3"`.
pub fn parse_playlist_group(s: &str) -> Result<PlaylistGroup, String> {
    let names: Vec<String> = s
        .split(',')
        .map(|name| name.trim())
        .filter(|name| !name.is_empty())
        .map(String::from)
        .collect();

    if names.is_empty() {
        return Err("playlist group must contain at least one name".to_string());
    }

    Ok(PlaylistGroup(names))
}

/// Builds a `(min, max)` range of `delta` around `value`, clamped to
/// `[min_allowed, max_allowed]`.
pub fn prepare_range(value: f64, delta: f64, min_allowed: f64, max_allowed: f64) -> (f64, f64) {
    let min_value = (value - delta).max(min_allowed);
    let max_value = (value + delta).min(max_allowed);
    if min_value > max_value {
        (max_value, min_value)
    } else {
        (min_value, max_value)
    }
}

pub fn target_ranges(criteria: &Criteria) -> TargetRanges {
    let range = |value: f64| prepare_range(value, CRITERIA_DELTA, 0.0, 1.0);

    let popularity = criteria.popularity.map(|popularity| {
        let popularity = (popularity * 100.0) as i64;
        let min_popularity = (popularity - POPULARITY_DELTA).max(0);
        let max_popularity = (popularity + POPULARITY_DELTA).min(100);
        if min_popularity > max_popularity {
            (max_popularity as u32, min_popularity as u32)
        } else {
            (min_popularity as u32, max_popularity as u32)
        }
    });

    TargetRanges {
        instrumentalness: range(criteria.instrumentalness),
        energy: range(criteria.energy),
        danceability: range(criteria.danceability),
        valence: range(criteria.valence),
        acousticness: range(criteria.acousticness),
        popularity,
    }
}

/// Averages the audio attributes over `features` and the popularity over
/// `popularities` (0-100, normalized to 0-1).
///
/// Returns `None` when there are no features to average. The popularity is
/// left unset when `popularities` is empty, so no popularity range is
/// derived from it.
pub fn calculate_average_criteria(
    features: &[AudioFeatures],
    popularities: &[u32],
) -> Option<Criteria> {
    if features.is_empty() {
        return None;
    }

    let count = features.len() as f64;
    let average = |attribute: fn(&AudioFeatures) -> f64| {
        features.iter().map(attribute).sum::<f64>() / count
    };

    let popularity = (!popularities.is_empty()).then(|| {
        let total: u32 = popularities.iter().sum();
        total as f64 / popularities.len() as f64 / 100.0
    });

    Some(Criteria {
        instrumentalness: average(|f| f.instrumentalness),
        energy: average(|f| f.energy),
        danceability: average(|f| f.danceability),
        valence: average(|f| f.valence),
        acousticness: average(|f| f.acousticness),
        popularity,
    })
}

pub fn criteria_table_rows(criteria: &Criteria) -> Vec<CriteriaTableRow> {
    [
        ("Instrumentalness", Some(criteria.instrumentalness)),
        ("Energy", Some(criteria.energy)),
        ("Danceability", Some(criteria.danceability)),
        ("Valence", Some(criteria.valence)),
        ("Acousticness", Some(criteria.acousticness)),
        ("Popularity", criteria.popularity),
    ]
    .into_iter()
    .map(|(criterion, value)| CriteriaTableRow {
        criterion: criterion.to_string(),
        value: value.map_or_else(|| "n/a".to_string(), |v| format!("{:.2}", v)),
    })
    .collect()
}

/// Picks up to [`MAX_SEEDS`] random track ids.
pub fn pick_seed_tracks<R: Rng + ?Sized>(track_ids: &[String], rng: &mut R) -> Vec<String> {
    track_ids
        .choose_multiple(rng, track_ids.len().min(MAX_SEEDS))
        .cloned()
        .collect()
}

/// Removes duplicate artist ids while keeping their first occurrence, and
/// caps the result at [`MAX_SEEDS`].
pub fn unique_seed_artists(artist_ids: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    artist_ids
        .into_iter()
        .filter(|id| seen.insert(id.clone()))
        .take(MAX_SEEDS)
        .collect()
}

/// Builds the seed combinations cycled through while fetching
/// recommendations.
///
/// Up to two track offsets are paired with up to two artist offsets, each
/// taking three seed tracks and two seed artists. Falls back to tracks or
/// artists alone when the other list is empty.
pub fn seed_combinations(seed_tracks: &[String], seed_artists: &[String]) -> Vec<SeedCombination> {
    let seed_tracks = &seed_tracks[..seed_tracks.len().min(MAX_SEEDS)];
    let seed_artists = &seed_artists[..seed_artists.len().min(MAX_SEEDS)];

    let mut combinations = Vec::new();
    for i in 0..seed_tracks.len().min(2) {
        for j in 0..seed_artists.len().min(2) {
            combinations.push(SeedCombination {
                seed_tracks: window(seed_tracks, i, 3),
                seed_artists: window(seed_artists, j, 2),
            });
        }
    }

    if combinations.is_empty() {
        if !seed_tracks.is_empty() {
            combinations.push(SeedCombination {
                seed_tracks: seed_tracks.to_vec(),
                seed_artists: Vec::new(),
            });
        } else if !seed_artists.is_empty() {
            combinations.push(SeedCombination {
                seed_tracks: Vec::new(),
                seed_artists: seed_artists.to_vec(),
            });
        }
    }

    combinations
}

fn window(items: &[String], start: usize, len: usize) -> Vec<String> {
    let end = (start + len).min(items.len());
    items[start..end].to_vec()
}

/// Progress bar with a known length, styled like the spinner used
/// elsewhere in the CLI.
pub fn progress_bar(total: u64, message: impl Into<String>) -> ProgressBar {
    let pb = ProgressBar::new(total);
    pb.set_message(message.into());
    pb.set_style(
        ProgressStyle::with_template("{spinner:.blue} {msg} [{bar:30.blue}] {pos}/{len}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏ ")
            .progress_chars("=> "),
    );
    pb
}

pub fn spinner(message: impl Into<String>) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_message(message.into());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb.set_style(
        ProgressStyle::with_template("{spinner:.blue} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏ "),
    );
    pb
}
