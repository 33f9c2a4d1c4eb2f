//! Round-robin track mixer.
//!
//! The [`Mixer`] interleaves any number of ordered sources into a single
//! playlist. Each candidate is pulled from the current channel, checked
//! against the set of already emitted tracks and a sliding window of the
//! most recently emitted artists, and then either emitted or dropped. A
//! dropped candidate is never looked at again, so every attempt consumes
//! exactly one track reference and the mixer always terminates.
//!
//! The mixer performs no I/O and holds no randomness. Sources are borrowed
//! for the lifetime of the mixer; callers that want a random order shuffle
//! the sources before constructing it.
//!
//! # Example
//!
//! ```
//! use mixtape::{mixer::{MixOptions, Mixer}, types::TrackRef};
//!
//! let sources = vec![
//!     vec![TrackRef::new("a1", "a"), TrackRef::new("a2", "a")],
//!     vec![TrackRef::new("b1", "b")],
//! ];
//! let mixed: Vec<String> = Mixer::new(&sources, MixOptions::default()).collect();
//! assert_eq!(mixed, vec!["a1", "b1"]);
//! ```

use std::collections::{HashSet, VecDeque};

use crate::types::TrackRef;

pub const DEFAULT_MIN_ARTIST_SEPARATION: usize = 4;
pub const DEFAULT_MAX_TRACKS: usize = 1000;

/// Constraint knobs for a single mixing run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MixOptions {
    /// Never emit the same track id twice, even from different sources.
    pub dedup: bool,
    /// Number of most recent emissions an artist has to be absent from
    /// before it may be emitted again. `0` disables the check.
    pub min_artist_separation: usize,
    /// Stop as soon as one full round over all channels yields nothing.
    pub fail_fast: bool,
    /// Hard cap on the number of emitted tracks.
    pub max_tracks: usize,
}

impl Default for MixOptions {
    fn default() -> Self {
        Self {
            dedup: true,
            min_artist_separation: DEFAULT_MIN_ARTIST_SEPARATION,
            fail_fast: true,
            max_tracks: DEFAULT_MAX_TRACKS,
        }
    }
}

pub struct Mixer<'a> {
    sources: &'a [Vec<TrackRef>],
    options: MixOptions,
    cursors: Vec<usize>,
    channel: usize,
    // unread track references across all sources
    remaining: usize,
    seen_tracks: HashSet<&'a str>,
    recent_artists: VecDeque<&'a str>,
    emitted: usize,
}

impl<'a> Mixer<'a> {
    pub fn new(sources: &'a [Vec<TrackRef>], options: MixOptions) -> Self {
        Self {
            sources,
            options,
            cursors: vec![0; sources.len()],
            channel: 0,
            remaining: sources.iter().map(Vec::len).sum(),
            seen_tracks: HashSet::new(),
            recent_artists: VecDeque::with_capacity(options.min_artist_separation),
            emitted: 0,
        }
    }

    /// Produces the next track id, or `None` once the mixer is exhausted.
    ///
    /// Every attempt consumes one candidate from the current channel and
    /// moves on to the next channel, whether the candidate was accepted or
    /// not. With `fail_fast` the call gives up after one full round of
    /// failed attempts; otherwise it keeps going until every source is
    /// drained.
    pub fn next_track(&mut self) -> Option<String> {
        let channels = self.sources.len();
        if channels == 0 {
            return None;
        }

        let mut consecutive_fails = 0;
        while self.emitted < self.options.max_tracks {
            if self.options.fail_fast && consecutive_fails >= channels {
                return None;
            }
            if !self.options.fail_fast && self.remaining == 0 {
                return None;
            }

            let candidate = self.next_candidate();
            self.next_channel();

            match candidate {
                Some(track) if self.is_good_candidate(track) => {
                    self.add_to_history(track);
                    return Some(track.track_id.clone());
                }
                _ => consecutive_fails += 1,
            }
        }

        None
    }

    /// Number of tracks emitted so far.
    pub fn emitted(&self) -> usize {
        self.emitted
    }

    pub fn current_channel(&self) -> usize {
        self.channel
    }

    /// Next unread position in source `index`, if such a source exists.
    pub fn cursor(&self, index: usize) -> Option<usize> {
        self.cursors.get(index).copied()
    }

    /// Artist ids of the most recent emissions, oldest first.
    pub fn recent_artists(&self) -> impl Iterator<Item = &str> {
        self.recent_artists.iter().copied()
    }

    fn next_candidate(&mut self) -> Option<&'a TrackRef> {
        let sources: &'a [Vec<TrackRef>] = self.sources;
        let position = &mut self.cursors[self.channel];
        let track = sources[self.channel].get(*position)?;
        *position += 1;
        self.remaining -= 1;
        Some(track)
    }

    fn is_good_candidate(&self, track: &TrackRef) -> bool {
        if self.options.dedup && self.seen_tracks.contains(track.track_id.as_str()) {
            return false;
        }
        !self.recent_artists.contains(&track.artist_id.as_str())
    }

    fn add_to_history(&mut self, track: &'a TrackRef) {
        self.seen_tracks.insert(&track.track_id);
        self.emitted += 1;

        let window = self.options.min_artist_separation;
        if window == 0 {
            return;
        }
        if self.recent_artists.len() == window {
            self.recent_artists.pop_front();
        }
        self.recent_artists.push_back(&track.artist_id);
    }

    fn next_channel(&mut self) {
        self.channel = (self.channel + 1) % self.sources.len();
    }
}

impl Iterator for Mixer<'_> {
    type Item = String;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_track()
    }
}

/// Runs a fresh [`Mixer`] over `sources` until it is exhausted or
/// `max_tracks` tracks have been produced.
pub fn mix_tracks(sources: &[Vec<TrackRef>], options: MixOptions) -> Vec<String> {
    Mixer::new(sources, options)
        .take(options.max_tracks)
        .collect()
}
