use mixtape::cli::{DEFAULT_SHUFFLE_PLAYLIST, MixRequest, extended_playlist_name, find_radio_mix};
use mixtape::spotify::{self, playlist::find_playlist, recommendations::recommendation_query};
use mixtape::types::{Playlist, SeedCombination, TargetRanges};
use reqwest::header::{HeaderMap, HeaderValue};

fn create_test_playlist(id: &str, name: &str) -> Playlist {
    Playlist {
        id: id.to_string(),
        name: name.to_string(),
        description: None,
        public: Some(false),
        collaborative: false,
        snapshot_id: format!("snapshot-{}", id),
        external_urls: None,
    }
}

fn test_ranges() -> TargetRanges {
    TargetRanges {
        instrumentalness: (0.0, 0.2),
        energy: (0.3, 0.7),
        danceability: (0.4, 0.8),
        valence: (0.1, 0.5),
        acousticness: (0.6, 1.0),
        popularity: Some((40, 80)),
    }
}

fn query_value<'a>(query: &'a [(&'static str, String)], key: &str) -> Option<&'a str> {
    query
        .iter()
        .find(|(k, _)| *k == key)
        .map(|(_, v)| v.as_str())
}

#[test]
fn test_retry_after_header() {
    let mut headers = HeaderMap::new();
    assert_eq!(spotify::retry_after(&headers), 1);

    headers.insert("retry-after", HeaderValue::from_static("30"));
    assert_eq!(spotify::retry_after(&headers), 30);

    headers.insert("retry-after", HeaderValue::from_static("soon"));
    assert_eq!(spotify::retry_after(&headers), 1);
}

#[test]
fn test_rate_limited_error_message() {
    let err = spotify::SpotifyError::RateLimited(3600);
    assert!(err.to_string().contains("3600"));
}

#[test]
fn test_recommendation_query_with_seeds() {
    let seeds = SeedCombination {
        seed_tracks: vec!["t1".to_string(), "t2".to_string(), "t3".to_string()],
        seed_artists: vec!["a1".to_string(), "a2".to_string()],
    };
    let query = recommendation_query(&seeds, &test_ranges(), 100);

    assert_eq!(query[0], ("limit", "100".to_string()));
    assert_eq!(query_value(&query, "min_energy"), Some("0.3"));
    assert_eq!(query_value(&query, "max_acousticness"), Some("1"));
    assert_eq!(query_value(&query, "min_popularity"), Some("40"));
    assert_eq!(query_value(&query, "max_popularity"), Some("80"));
    assert_eq!(query_value(&query, "seed_tracks"), Some("t1,t2,t3"));
    assert_eq!(query_value(&query, "seed_artists"), Some("a1,a2"));
}

#[test]
fn test_recommendation_query_omits_empty_seeds() {
    let seeds = SeedCombination {
        seed_tracks: vec!["t1".to_string()],
        seed_artists: Vec::new(),
    };
    let query = recommendation_query(&seeds, &test_ranges(), 25);

    assert_eq!(query_value(&query, "limit"), Some("25"));
    assert_eq!(query_value(&query, "seed_tracks"), Some("t1"));
    assert!(query_value(&query, "seed_artists").is_none());
}

#[test]
fn test_recommendation_query_without_popularity() {
    let seeds = SeedCombination {
        seed_tracks: vec!["t1".to_string()],
        seed_artists: Vec::new(),
    };
    let ranges = TargetRanges {
        popularity: None,
        ..test_ranges()
    };
    let query = recommendation_query(&seeds, &ranges, 50);

    assert!(query_value(&query, "min_popularity").is_none());
    assert!(query_value(&query, "max_popularity").is_none());
    assert_eq!(query_value(&query, "min_energy"), Some("0.3"));
}

#[test]
fn test_find_playlist_by_name() {
    let playlists = vec![
        create_test_playlist("1", "On Repeat"),
        create_test_playlist("2", "Daily Mix 1"),
        create_test_playlist("3", "Discover Weekly"),
    ];

    let found = find_playlist(&playlists, &["Discover Weekly"]).unwrap();
    assert_eq!(found.id, "3");

    assert!(find_playlist(&playlists, &["Release Radar"]).is_none());
    assert!(find_playlist::<&str>(&playlists, &[]).is_none());
}

#[test]
fn test_find_playlist_picks_from_group() {
    let playlists = vec![
        create_test_playlist("1", "Daily Mix 1"),
        create_test_playlist("2", "Daily Mix 2"),
        create_test_playlist("3", "On Repeat"),
    ];
    let group = ["Daily Mix 1", "Daily Mix 2", "Daily Mix 3"];

    for _ in 0..20 {
        let found = find_playlist(&playlists, &group).unwrap();
        assert!(found.id == "1" || found.id == "2");
    }
}

#[test]
fn test_find_radio_mix() {
    let mut playlists = vec![
        create_test_playlist("1", "[Mixer] Automated Daily Mix"),
        create_test_playlist("2", "Discover Weekly"),
    ];

    // A fresh account has no radio mix, daily skips the shuffle
    assert!(find_radio_mix(&playlists).is_none());

    playlists.push(create_test_playlist("3", DEFAULT_SHUFFLE_PLAYLIST));
    assert_eq!(find_radio_mix(&playlists).unwrap().id, "3");
}

#[test]
fn test_default_mix_request() {
    let request = MixRequest::default();

    assert_eq!(request.groups.len(), 2);
    assert_eq!(request.groups[0].names().len(), 3);
    assert_eq!(request.sources.len(), 4);
    assert_eq!(request.name, "[Mixer] Automated Daily Mix");
    assert!(request.options.dedup);
    assert!(request.options.fail_fast);
    assert_eq!(request.options.min_artist_separation, 4);
    assert_eq!(request.options.max_tracks, 1000);

    let description = request.description();
    assert!(description.contains("Daily Mix 1,Daily Mix 2,Daily Mix 3"));
    assert!(description.contains("Discover Weekly"));
}

#[test]
fn test_extended_playlist_name() {
    assert_eq!(extended_playlist_name("Road Trip"), "Extended Road Trip");
}
