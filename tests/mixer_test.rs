use std::collections::{HashMap, HashSet};

use mixtape::mixer::{MixOptions, Mixer, mix_tracks};
use mixtape::types::TrackRef;
use rand::{Rng, SeedableRng, rngs::StdRng};

// Helper function to build a source from (track_id, artist_id) pairs
fn source(tracks: &[(&str, &str)]) -> Vec<TrackRef> {
    tracks
        .iter()
        .map(|(track, artist)| TrackRef::new(*track, *artist))
        .collect()
}

fn options(max_tracks: usize) -> MixOptions {
    MixOptions {
        max_tracks,
        ..MixOptions::default()
    }
}

fn drain(mixer: &mut Mixer<'_>) -> Vec<String> {
    let mut out = Vec::new();
    while let Some(track) = mixer.next_track() {
        out.push(track);
    }
    out
}

// Helper function to build random sources over a small artist pool
fn random_sources(rng: &mut StdRng) -> Vec<Vec<TrackRef>> {
    let channels = rng.random_range(0..5);
    (0..channels)
        .map(|_| {
            let len = rng.random_range(0..15);
            (0..len)
                .map(|_| {
                    TrackRef::new(
                        format!("t{}", rng.random_range(0..30)),
                        format!("a{}", rng.random_range(0..6)),
                    )
                })
                .collect()
        })
        .collect()
}

#[test]
fn test_default_options() {
    let opts = MixOptions::default();
    assert!(opts.dedup);
    assert!(opts.fail_fast);
    assert_eq!(opts.min_artist_separation, 4);
    assert_eq!(opts.max_tracks, 1000);
}

#[test]
fn test_same_artist_blocked_by_separation_window() {
    let sources = vec![source(&[("A1", "a"), ("A2", "a")]), source(&[("B1", "b")])];
    let mut mixer = Mixer::new(&sources, options(10));

    assert_eq!(mixer.next_track(), Some("A1".to_string()));
    assert_eq!(mixer.next_track(), Some("B1".to_string()));
    // A2 is consumed and rejected (artist a still in the window), then the
    // empty second channel completes a dead round.
    assert_eq!(mixer.next_track(), None);
    assert_eq!(mixer.cursor(0), Some(2));
    assert_eq!(mixer.cursor(1), Some(1));
    assert_eq!(mixer.emitted(), 2);
}

#[test]
fn test_same_artist_allowed_after_aging_out() {
    let sources = vec![source(&[("A1", "a"), ("A2", "a")]), source(&[("B1", "b")])];
    let opts = MixOptions {
        min_artist_separation: 1,
        ..options(10)
    };

    let mixed: Vec<String> = Mixer::new(&sources, opts).collect();
    assert_eq!(mixed, vec!["A1", "B1", "A2"]);
}

#[test]
fn test_single_track_source() {
    let sources = vec![source(&[("only", "x")])];
    let mut mixer = Mixer::new(&sources, options(5));

    assert_eq!(mixer.next_track(), Some("only".to_string()));
    assert_eq!(mixer.next_track(), None);
    assert_eq!(mixer.emitted(), 1);
}

#[test]
fn test_empty_sources_exhaust_immediately() {
    let sources: Vec<Vec<TrackRef>> = vec![Vec::new(), Vec::new()];
    let mut mixer = Mixer::new(&sources, MixOptions::default());

    assert_eq!(mixer.next_track(), None);
    assert_eq!(mixer.emitted(), 0);
}

#[test]
fn test_no_sources_exhaust_immediately() {
    let sources: Vec<Vec<TrackRef>> = Vec::new();
    let mut mixer = Mixer::new(&sources, MixOptions::default());

    assert_eq!(mixer.next_track(), None);
    assert_eq!(mixer.current_channel(), 0);
    assert_eq!(mixer.cursor(0), None);
}

#[test]
fn test_zero_max_tracks_exhausts_immediately() {
    let sources = vec![source(&[("t1", "a1"), ("t2", "a2")])];
    let mut mixer = Mixer::new(&sources, options(0));

    assert_eq!(mixer.next_track(), None);
    // nothing was consumed
    assert_eq!(mixer.cursor(0), Some(0));
}

#[test]
fn test_without_dedup_same_track_emitted_twice() {
    let sources = vec![source(&[("X", "a")]), source(&[("X", "b")])];
    let opts = MixOptions {
        dedup: false,
        ..options(10)
    };

    let mixed: Vec<String> = Mixer::new(&sources, opts).collect();
    assert_eq!(mixed, vec!["X", "X"]);
}

#[test]
fn test_with_dedup_same_track_emitted_once() {
    let sources = vec![source(&[("X", "a")]), source(&[("X", "b")])];

    let mixed: Vec<String> = Mixer::new(&sources, options(10)).collect();
    assert_eq!(mixed, vec!["X"]);
}

#[test]
fn test_without_dedup_artist_separation_still_applies() {
    let sources = vec![source(&[("X", "a")]), source(&[("X", "a")])];
    let opts = MixOptions {
        dedup: false,
        ..options(10)
    };

    let mixed: Vec<String> = Mixer::new(&sources, opts).collect();
    assert_eq!(mixed, vec!["X"]);
}

#[test]
fn test_fail_fast_stops_within_one_round() {
    let sources = vec![
        source(&[("a1", "a")]),
        source(&[("b1", "b")]),
        source(&[("c1", "c")]),
    ];
    let mut mixer = Mixer::new(&sources, MixOptions::default());

    assert_eq!(drain(&mut mixer), vec!["a1", "b1", "c1"]);

    // the dead round visits every channel exactly once
    assert_eq!(mixer.current_channel(), 0);
    assert_eq!(mixer.next_track(), None);
    assert_eq!(mixer.current_channel(), 0);
}

#[test]
fn test_fail_fast_gives_up_on_rejected_round() {
    let sources = vec![source(&[("A1", "a"), ("A2", "a"), ("B1", "b")])];
    let mut mixer = Mixer::new(&sources, MixOptions::default());

    assert_eq!(mixer.next_track(), Some("A1".to_string()));
    assert_eq!(mixer.next_track(), None);
    assert_eq!(mixer.cursor(0), Some(2));
}

#[test]
fn test_without_fail_fast_keeps_searching() {
    let sources = vec![source(&[("A1", "a"), ("A2", "a"), ("B1", "b")])];
    let opts = MixOptions {
        fail_fast: false,
        ..MixOptions::default()
    };
    let mut mixer = Mixer::new(&sources, opts);

    assert_eq!(drain(&mut mixer), vec!["A1", "B1"]);
    assert_eq!(mixer.cursor(0), Some(3));
}

#[test]
fn test_without_fail_fast_terminates_on_uneven_sources() {
    let sources = vec![
        source(&[("a1", "a"), ("a2", "a"), ("a3", "a"), ("a4", "a")]),
        Vec::new(),
        source(&[("b1", "b")]),
    ];
    let opts = MixOptions {
        fail_fast: false,
        min_artist_separation: 0,
        ..MixOptions::default()
    };

    let mixed: Vec<String> = Mixer::new(&sources, opts).collect();
    assert_eq!(mixed, vec!["a1", "b1", "a2", "a3", "a4"]);
}

#[test]
fn test_round_robin_order_without_rejections() {
    let sources = vec![
        source(&[("a1", "a1"), ("a2", "a2"), ("a3", "a3")]),
        source(&[("b1", "b1"), ("b2", "b2"), ("b3", "b3")]),
        source(&[("c1", "c1"), ("c2", "c2"), ("c3", "c3")]),
    ];

    let mixed = mix_tracks(&sources, MixOptions::default());
    assert_eq!(
        mixed,
        vec!["a1", "b1", "c1", "a2", "b2", "c2", "a3", "b3", "c3"]
    );
}

#[test]
fn test_channel_advances_after_every_attempt() {
    let sources = vec![
        source(&[("a1", "x"), ("a2", "y")]),
        source(&[("b1", "x")]),
        source(&[("c1", "z")]),
    ];
    let mut mixer = Mixer::new(&sources, MixOptions::default());

    assert_eq!(mixer.next_track(), Some("a1".to_string()));
    assert_eq!(mixer.current_channel(), 1);
    // b1 shares artist x with a1 and is dropped, c1 comes from channel 2
    assert_eq!(mixer.next_track(), Some("c1".to_string()));
    assert_eq!(mixer.current_channel(), 0);
    assert_eq!(mixer.next_track(), Some("a2".to_string()));
    assert_eq!(mixer.current_channel(), 1);
}

#[test]
fn test_max_tracks_caps_output() {
    let sources = vec![
        source(&[("a1", "a1"), ("a2", "a2"), ("a3", "a3")]),
        source(&[("b1", "b1"), ("b2", "b2"), ("b3", "b3")]),
    ];
    let mut mixer = Mixer::new(&sources, options(3));

    assert_eq!(drain(&mut mixer), vec!["a1", "b1", "a2"]);
    assert_eq!(mixer.emitted(), 3);
    assert_eq!(mixer.next_track(), None);
}

#[test]
fn test_duplicates_within_one_source_are_dropped() {
    let sources = vec![source(&[("t1", "a"), ("t1", "a"), ("t2", "b")])];
    let opts = MixOptions {
        fail_fast: false,
        min_artist_separation: 0,
        ..MixOptions::default()
    };

    let mixed = mix_tracks(&sources, opts);
    assert_eq!(mixed, vec!["t1", "t2"]);
}

#[test]
fn test_zero_separation_allows_back_to_back_artist() {
    let sources = vec![source(&[("t1", "a"), ("t2", "a"), ("t3", "a")])];
    let opts = MixOptions {
        min_artist_separation: 0,
        ..MixOptions::default()
    };
    let mut mixer = Mixer::new(&sources, opts);

    assert_eq!(drain(&mut mixer), vec!["t1", "t2", "t3"]);
    assert_eq!(mixer.recent_artists().count(), 0);
}

#[test]
fn test_recent_artists_window_evicts_oldest() {
    let sources = vec![source(&[
        ("t1", "a"),
        ("t2", "b"),
        ("t3", "c"),
        ("t4", "d"),
    ])];
    let opts = MixOptions {
        min_artist_separation: 2,
        ..MixOptions::default()
    };
    let mut mixer = Mixer::new(&sources, opts);

    drain(&mut mixer);
    let recent: Vec<&str> = mixer.recent_artists().collect();
    assert_eq!(recent, vec!["c", "d"]);
}

#[test]
fn test_iterator_matches_mix_tracks() {
    let sources = vec![
        source(&[("a1", "a"), ("a2", "b"), ("a3", "c")]),
        source(&[("b1", "d"), ("b2", "a"), ("b3", "e")]),
    ];

    let collected: Vec<String> = Mixer::new(&sources, MixOptions::default()).collect();
    assert_eq!(collected, mix_tracks(&sources, MixOptions::default()));
}

#[test]
fn test_random_sources_respect_invariants() {
    let mut rng = StdRng::seed_from_u64(7);

    for _ in 0..500 {
        let sources = random_sources(&mut rng);
        let opts = MixOptions {
            dedup: rng.random_bool(0.7),
            min_artist_separation: rng.random_range(0..5),
            fail_fast: rng.random_bool(0.5),
            max_tracks: rng.random_range(0..40),
        };
        let artist_of: HashMap<&str, Vec<&str>> =
            sources.iter().flatten().fold(HashMap::new(), |mut acc, t| {
                acc.entry(t.track_id.as_str())
                    .or_default()
                    .push(t.artist_id.as_str());
                acc
            });
        let total: usize = sources.iter().map(Vec::len).sum();

        let mut mixer = Mixer::new(&sources, opts);
        let mut emitted: Vec<(String, String)> = Vec::new();
        let mut calls = 0;
        loop {
            calls += 1;
            assert!(calls <= total + 2, "mixer did not terminate");

            let Some(track) = mixer.next_track() else {
                break;
            };
            let recent: Vec<&str> = mixer.recent_artists().collect();
            assert!(recent.len() <= opts.min_artist_separation);
            let artist = if opts.min_artist_separation > 0 {
                recent.last().map(|a| a.to_string()).unwrap()
            } else {
                artist_of[track.as_str()][0].to_string()
            };
            emitted.push((track, artist));
        }

        for (i, source) in sources.iter().enumerate() {
            assert!(mixer.cursor(i).unwrap() <= source.len());
        }
        if !sources.is_empty() {
            assert!(mixer.current_channel() < sources.len());
        }

        // cap
        assert!(emitted.len() <= opts.max_tracks);
        assert_eq!(mixer.emitted(), emitted.len());

        // dedup
        if opts.dedup {
            let unique: HashSet<&String> = emitted.iter().map(|(t, _)| t).collect();
            assert_eq!(unique.len(), emitted.len());
        }

        // separation
        let k = opts.min_artist_separation;
        if k > 0 {
            for (i, (_, artist)) in emitted.iter().enumerate() {
                for (_, other) in emitted.iter().skip(i + 1).take(k) {
                    assert_ne!(artist, other);
                }
            }
        }
    }
}
