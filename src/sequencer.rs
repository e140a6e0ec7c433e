use std::collections::HashSet;

use crate::features::{FeatureSource, FeatureVector, extract_features};
use crate::scoring::{TransitionScores, score_transition};
use crate::types::{Playlist, Track, TransitionRecord, TransitionStyle};

const NAME_PREFIX: &str = "DJ Mix - ";
const FALLBACK_NAME: &str = "Custom Mix";

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum InputError {
    #[error("seed tracks must include at least one track")]
    EmptySeeds,
    #[error("seed track at position {position} has no id")]
    MissingTrackId { position: usize },
}

/// Which feature vector stands in for the last appended track while ranking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LastTrackVector {
    /// Reuse the vector computed when the track entered the pool.
    #[default]
    Cached,
    /// Re-extract every step; with a random source this re-rolls the placeholders.
    Refresh,
}

#[derive(Debug, Clone)]
pub struct SequencerOptions {
    pub target_minutes: u32,
    pub style: TransitionStyle,
    pub last_track_vector: LastTrackVector,
}

impl Default for SequencerOptions {
    fn default() -> Self {
        Self {
            target_minutes: 60,
            style: TransitionStyle::Smooth,
            last_track_vector: LastTrackVector::Cached,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Candidate {
    pub track: Track,
    pub features: FeatureVector,
}

/// Tracks eligible for sequencing, in the order ties are broken.
///
/// Built from the seeds today, so a playlist can never outgrow the seed set.
#[derive(Debug, Clone, Default)]
pub struct CandidatePool {
    candidates: Vec<Candidate>,
}

impl CandidatePool {
    /// Keeps the first candidate for each track id.
    pub fn new(candidates: Vec<Candidate>) -> Self {
        let mut seen = HashSet::new();
        let candidates = candidates
            .into_iter()
            .filter(|candidate| {
                let fresh = seen.insert(candidate.track.id.clone());
                if !fresh {
                    tracing::debug!(track_id = %candidate.track.id, "dropping duplicate candidate");
                }
                fresh
            })
            .collect();
        Self { candidates }
    }

    pub fn from_seeds(seeds: &[Track], source: &mut impl FeatureSource) -> Self {
        Self::new(
            seeds
                .iter()
                .map(|track| Candidate {
                    track: track.clone(),
                    features: extract_features(track, source),
                })
                .collect(),
        )
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    pub fn get(&self, track_id: &str) -> Option<&Candidate> {
        self.candidates.iter().find(|c| c.track.id == track_id)
    }

    pub fn unused<'a, 'u>(
        &'a self,
        used: &'u HashSet<String>,
    ) -> impl Iterator<Item = &'a Candidate> {
        self.candidates
            .iter()
            .filter(move |candidate| !used.contains(&candidate.track.id))
    }
}

/// Build a playlist with default options apart from duration and style.
pub fn build_playlist(
    seeds: &[Track],
    target_minutes: u32,
    style: TransitionStyle,
    source: &mut impl FeatureSource,
) -> Result<Playlist, InputError> {
    let options = SequencerOptions {
        target_minutes,
        style,
        ..SequencerOptions::default()
    };
    build_playlist_with(seeds, &options, source)
}

/// Chain seed tracks greedily, starting from the first seed, until the
/// target duration is reached or the pool runs dry.
pub fn build_playlist_with(
    seeds: &[Track],
    options: &SequencerOptions,
    source: &mut impl FeatureSource,
) -> Result<Playlist, InputError> {
    let Some(first) = seeds.first() else {
        return Err(InputError::EmptySeeds);
    };
    if let Some(position) = seeds.iter().position(|track| track.id.trim().is_empty()) {
        return Err(InputError::MissingTrackId { position });
    }

    let pool = CandidatePool::from_seeds(seeds, source);
    build_from_pool(first, &pool, options, source)
}

/// Run the greedy loop over an arbitrary pool. `opening` need not be in the pool.
pub fn build_from_pool(
    opening: &Track,
    pool: &CandidatePool,
    options: &SequencerOptions,
    source: &mut impl FeatureSource,
) -> Result<Playlist, InputError> {
    if opening.id.trim().is_empty() {
        return Err(InputError::MissingTrackId { position: 0 });
    }

    let target_seconds = f64::from(options.target_minutes) * 60.0;
    let mut tracks = vec![opening.clone()];
    let mut used: HashSet<String> = HashSet::from([opening.id.clone()]);
    let mut transitions = Vec::new();
    let mut duration_seconds = opening.duration_seconds();
    let mut last_features = match pool.get(&opening.id) {
        Some(candidate) => candidate.features.clone(),
        None => extract_features(opening, source),
    };

    while duration_seconds < target_seconds {
        let from_features = match options.last_track_vector {
            LastTrackVector::Cached => last_features.clone(),
            LastTrackVector::Refresh => match tracks.last() {
                Some(last) => extract_features(last, source),
                None => break,
            },
        };

        let mut scored: Vec<(&Candidate, TransitionScores)> = pool
            .unused(&used)
            .map(|candidate| {
                (
                    candidate,
                    score_transition(&from_features, &candidate.features, options.style),
                )
            })
            .collect();
        // stable: equal scores keep pool order
        scored.sort_by(|left, right| {
            right
                .1
                .composite
                .partial_cmp(&left.1.composite)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        let Some((best, scores)) = scored.into_iter().next() else {
            tracing::debug!(
                duration_seconds,
                target_seconds,
                "candidate pool exhausted before reaching target duration"
            );
            break;
        };

        tracing::debug!(
            from = %tracks.len().saturating_sub(1),
            track_id = %best.track.id,
            composite = scores.composite,
            "appending best transition"
        );
        transitions.push(TransitionRecord {
            from_index: tracks.len() - 1,
            to_index: tracks.len(),
            scores,
        });
        used.insert(best.track.id.clone());
        duration_seconds += best.track.duration_seconds();
        last_features = best.features.clone();
        tracks.push(best.track.clone());
    }

    let title = opening.title.trim();
    let name = format!(
        "{NAME_PREFIX}{}",
        if title.is_empty() { FALLBACK_NAME } else { title }
    );
    let track_count = tracks.len();
    tracing::info!(
        name = %name,
        track_count,
        duration_seconds,
        style = %options.style,
        "built playlist"
    );

    Ok(Playlist {
        name,
        tracks,
        duration_seconds,
        transition_style: options.style,
        track_count,
        transitions,
    })
}
