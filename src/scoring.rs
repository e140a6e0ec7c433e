use serde::{Deserialize, Serialize};

use crate::features::FeatureVector;
use crate::keys::{self, key_compatibility};
use crate::types::TransitionStyle;

/// Tempo gap (BPM) at which the tempo term saturates.
const TEMPO_DIFF_SCALE: f64 = 50.0;
const CLUSTER_MATCH: f64 = 1.0;
const CLUSTER_MISMATCH: f64 = 0.5;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AxisScore {
    pub value: f64,
    pub label: String,
}

/// Per-term breakdown of one transition. `composite` is the ranking value.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransitionScores {
    pub tempo_diff: AxisScore,
    pub key: AxisScore,
    pub energy_diff: AxisScore,
    pub cluster: AxisScore,
    pub composite: f64,
}

/// Signed weights for tempo-diff, key, energy-diff and cluster-match.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StyleWeights {
    pub tempo_diff: f64,
    pub key: f64,
    pub energy_diff: f64,
    pub cluster: f64,
}

pub fn style_weights(style: TransitionStyle) -> StyleWeights {
    match style {
        TransitionStyle::Smooth => StyleWeights {
            tempo_diff: -1.2,
            key: 1.5,
            energy_diff: -0.7,
            cluster: 0.8,
        },
        // rewards energy contrast for build-style sets
        TransitionStyle::Energetic => StyleWeights {
            tempo_diff: -0.5,
            key: 0.8,
            energy_diff: 0.6,
            cluster: 0.4,
        },
        TransitionStyle::Minimal => StyleWeights {
            tempo_diff: -1.5,
            key: 1.2,
            energy_diff: -1.0,
            cluster: 1.0,
        },
    }
}

/// Relative quality of moving from `from` to `to`. Higher is better; only
/// meaningful for ranking.
pub fn transition_score(from: &FeatureVector, to: &FeatureVector, style: TransitionStyle) -> f64 {
    score_transition(from, to, style).composite
}

pub fn score_transition(
    from: &FeatureVector,
    to: &FeatureVector,
    style: TransitionStyle,
) -> TransitionScores {
    let tempo_diff = score_tempo_axis(from.tempo, to.tempo);
    let key = score_key_axis(&from.key, &to.key);
    let energy_diff = score_energy_axis(from.energy, to.energy);
    let cluster = score_cluster_axis(from, to);

    let weights = style_weights(style);
    let composite = weights.tempo_diff * tempo_diff.value
        + weights.key * key.value
        + weights.energy_diff * energy_diff.value
        + weights.cluster * cluster.value;

    TransitionScores {
        tempo_diff,
        key,
        energy_diff,
        cluster,
        composite,
    }
}

fn score_tempo_axis(from_tempo: f64, to_tempo: f64) -> AxisScore {
    let delta = (from_tempo - to_tempo).abs();
    AxisScore {
        value: (delta / TEMPO_DIFF_SCALE).min(1.0),
        label: format!("delta {:.1} BPM", delta),
    }
}

fn score_key_axis(from_key: &str, to_key: &str) -> AxisScore {
    let value = key_compatibility(from_key, to_key);
    let label = if value == keys::SAME_KEY {
        "Same key"
    } else if value == keys::NEIGHBOR_KEY {
        "Fifth or relative"
    } else if value == keys::UNKNOWN_KEY {
        "Unknown key"
    } else {
        "Distant key"
    };
    AxisScore {
        value,
        label: label.to_string(),
    }
}

fn score_energy_axis(from_energy: f64, to_energy: f64) -> AxisScore {
    let signed = to_energy - from_energy;
    let direction = if signed > 0.0 {
        "rising"
    } else if signed < 0.0 {
        "dropping"
    } else {
        "flat"
    };
    AxisScore {
        value: signed.abs(),
        label: format!("{direction} (delta {:.2})", signed.abs()),
    }
}

fn score_cluster_axis(from: &FeatureVector, to: &FeatureVector) -> AxisScore {
    if from.sonic_cluster == to.sonic_cluster {
        AxisScore {
            value: CLUSTER_MATCH,
            label: format!("Same cluster ({})", to.sonic_cluster),
        }
    } else {
        AxisScore {
            value: CLUSTER_MISMATCH,
            label: format!("{} -> {}", from.sonic_cluster, to.sonic_cluster),
        }
    }
}
