//! Track feature extraction.
//!
//! Tempo and key come from track metadata. The five sonic qualities come from a
//! [`FeatureSource`], which today is either random placeholder data or a fixed
//! lookup table. Signature and cluster are derived from the qualities.

use std::collections::HashMap;
use std::fmt;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::types::Track;

const PLACEHOLDER_TEMPO_MIN: u32 = 90;
const PLACEHOLDER_TEMPO_MAX: u32 = 140;

/// Energy, danceability, acousticness, instrumentalness, valence.
const SIGNATURE_WEIGHTS: [f64; 5] = [0.3, 0.3, 0.2, 0.1, 0.1];

/// The five per-track qualities, each in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SonicQualities {
    pub energy: f64,
    pub danceability: f64,
    pub acousticness: f64,
    pub instrumentalness: f64,
    pub valence: f64,
}

impl SonicQualities {
    pub const NEUTRAL: Self = Self::uniform(0.5);

    pub const fn uniform(value: f64) -> Self {
        Self {
            energy: value,
            danceability: value,
            acousticness: value,
            instrumentalness: value,
            valence: value,
        }
    }

    fn clamped(self) -> Self {
        let unit = |v: f64| if v.is_nan() { 0.0 } else { v.clamp(0.0, 1.0) };
        Self {
            energy: unit(self.energy),
            danceability: unit(self.danceability),
            acousticness: unit(self.acousticness),
            instrumentalness: unit(self.instrumentalness),
            valence: unit(self.valence),
        }
    }

    pub fn signature(&self) -> f64 {
        let [w_energy, w_dance, w_acoustic, w_instrumental, w_valence] = SIGNATURE_WEIGHTS;
        w_energy * self.energy
            + w_dance * self.danceability
            + w_acoustic * self.acousticness
            + w_instrumental * self.instrumentalness
            + w_valence * self.valence
    }
}

/// Coarse sound bucket derived from the sonic signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SonicCluster {
    Ambient,
    Downtempo,
    Groovy,
    Energetic,
}

impl SonicCluster {
    pub fn from_signature(signature: f64) -> Self {
        if signature < 0.3 {
            Self::Ambient
        } else if signature < 0.5 {
            Self::Downtempo
        } else if signature < 0.7 {
            Self::Groovy
        } else {
            Self::Energetic
        }
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Ambient => "ambient",
            Self::Downtempo => "downtempo",
            Self::Groovy => "groovy",
            Self::Energetic => "energetic",
        }
    }
}

impl fmt::Display for SonicCluster {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    pub tempo: f64,
    pub key: String,
    pub energy: f64,
    pub danceability: f64,
    pub acousticness: f64,
    pub instrumentalness: f64,
    pub valence: f64,
    pub sonic_signature: f64,
    pub sonic_cluster: SonicCluster,
}

impl FeatureVector {
    pub fn from_parts(tempo: f64, key: impl Into<String>, qualities: SonicQualities) -> Self {
        let qualities = qualities.clamped();
        let sonic_signature = qualities.signature();
        Self {
            tempo,
            key: key.into(),
            energy: qualities.energy,
            danceability: qualities.danceability,
            acousticness: qualities.acousticness,
            instrumentalness: qualities.instrumentalness,
            valence: qualities.valence,
            sonic_signature,
            sonic_cluster: SonicCluster::from_signature(sonic_signature),
        }
    }

    pub fn qualities(&self) -> SonicQualities {
        SonicQualities {
            energy: self.energy,
            danceability: self.danceability,
            acousticness: self.acousticness,
            instrumentalness: self.instrumentalness,
            valence: self.valence,
        }
    }
}

/// Supplier of the values audio analysis would otherwise provide.
///
/// Implementations may be stateful (random sources advance on every call), so
/// callers pass them as `&mut`.
pub trait FeatureSource {
    /// Tempo used when the track carries none.
    fn placeholder_tempo(&mut self, track: &Track) -> f64;

    fn qualities(&mut self, track: &Track) -> SonicQualities;
}

/// Uniformly random placeholder features.
///
/// Every call draws new values, so two extractions of the same track differ.
#[derive(Debug, Clone)]
pub struct RandomPlaceholder {
    rng: StdRng,
}

impl RandomPlaceholder {
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn from_os_rng() -> Self {
        Self {
            rng: StdRng::from_os_rng(),
        }
    }

    /// Seeded when `seed` is given, otherwise independent.
    pub fn new(seed: Option<u64>) -> Self {
        seed.map_or_else(Self::from_os_rng, Self::seeded)
    }
}

impl FeatureSource for RandomPlaceholder {
    fn placeholder_tempo(&mut self, _track: &Track) -> f64 {
        f64::from(
            self.rng
                .random_range(PLACEHOLDER_TEMPO_MIN..=PLACEHOLDER_TEMPO_MAX),
        )
    }

    fn qualities(&mut self, _track: &Track) -> SonicQualities {
        SonicQualities {
            energy: self.rng.random(),
            danceability: self.rng.random(),
            acousticness: self.rng.random(),
            instrumentalness: self.rng.random(),
            valence: self.rng.random(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StubEntry {
    pub tempo: f64,
    pub qualities: SonicQualities,
}

/// Table-driven features keyed by track id. Tracks missing from the table
/// get the fallback entry.
#[derive(Debug, Clone)]
pub struct DeterministicStub {
    entries: HashMap<String, StubEntry>,
    fallback: StubEntry,
}

impl Default for DeterministicStub {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
            fallback: StubEntry {
                tempo: 120.0,
                qualities: SonicQualities::NEUTRAL,
            },
        }
    }
}

impl DeterministicStub {
    pub fn with_fallback(fallback: StubEntry) -> Self {
        Self {
            entries: HashMap::new(),
            fallback,
        }
    }

    pub fn insert(&mut self, track_id: impl Into<String>, entry: StubEntry) -> &mut Self {
        self.entries.insert(track_id.into(), entry);
        self
    }

    /// Adds an entry that differs from the fallback only in energy.
    pub fn with_energy(mut self, track_id: impl Into<String>, energy: f64) -> Self {
        let mut entry = self.fallback;
        entry.qualities.energy = energy;
        self.insert(track_id, entry);
        self
    }

    fn entry(&self, track: &Track) -> &StubEntry {
        self.entries.get(&track.id).unwrap_or(&self.fallback)
    }
}

impl FeatureSource for DeterministicStub {
    fn placeholder_tempo(&mut self, track: &Track) -> f64 {
        self.entry(track).tempo
    }

    fn qualities(&mut self, track: &Track) -> SonicQualities {
        self.entry(track).qualities
    }
}

/// Build the feature vector for one track.
pub fn extract_features(track: &Track, source: &mut impl FeatureSource) -> FeatureVector {
    let tempo = match track.known_bpm() {
        Some(bpm) => bpm,
        None => source.placeholder_tempo(track),
    };
    let qualities = source.qualities(track);
    FeatureVector::from_parts(tempo, track.key_or_empty(), qualities)
}
