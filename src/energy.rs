use serde::{Deserialize, Serialize};

use crate::features::{FeatureSource, SonicCluster, extract_features};
use crate::types::Playlist;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnergyLevel {
    Low,
    Medium,
    High,
}

impl EnergyLevel {
    pub fn from_energy(energy: f64) -> Self {
        if energy > 0.7 {
            Self::High
        } else if energy > 0.4 {
            Self::Medium
        } else {
            Self::Low
        }
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnergyProfileEntry {
    pub title: String,
    pub energy: f64,
    pub danceability: f64,
    pub tempo: f64,
    pub key: String,
    pub sonic_cluster: SonicCluster,
    pub energy_level: EnergyLevel,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EnergyAnalysis {
    pub energy_profile: Vec<EnergyProfileEntry>,
    pub avg_energy: f64,
    pub energy_variance: f64,
    pub avg_energy_change: f64,
    pub max_energy: f64,
    pub min_energy: f64,
}

/// Summarize the energy flow of a playlist, track by track in playback order.
pub fn analyze_energy(playlist: &Playlist, source: &mut impl FeatureSource) -> EnergyAnalysis {
    let energy_profile: Vec<EnergyProfileEntry> = playlist
        .tracks
        .iter()
        .map(|track| {
            let features = extract_features(track, source);
            EnergyProfileEntry {
                title: if track.title.trim().is_empty() {
                    "Unknown".to_string()
                } else {
                    track.title.clone()
                },
                energy: features.energy,
                danceability: features.danceability,
                tempo: features.tempo,
                key: features.key,
                sonic_cluster: features.sonic_cluster,
                energy_level: EnergyLevel::from_energy(features.energy),
            }
        })
        .collect();

    let energies: Vec<f64> = energy_profile.iter().map(|entry| entry.energy).collect();
    let changes: Vec<f64> = energies
        .windows(2)
        .map(|pair| (pair[1] - pair[0]).abs())
        .collect();

    let avg_energy = mean(&energies);
    let energy_variance = if energies.is_empty() {
        0.0
    } else {
        energies
            .iter()
            .map(|energy| (energy - avg_energy).powi(2))
            .sum::<f64>()
            / energies.len() as f64
    };

    EnergyAnalysis {
        avg_energy,
        energy_variance,
        avg_energy_change: mean(&changes),
        max_energy: energies.iter().copied().reduce(f64::max).unwrap_or(0.0),
        min_energy: energies.iter().copied().reduce(f64::min).unwrap_or(0.0),
        energy_profile,
    }
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::{DeterministicStub, RandomPlaceholder};
    use crate::types::{Track, TransitionStyle};

    fn playlist_of(ids: &[&str]) -> Playlist {
        let tracks: Vec<Track> = ids
            .iter()
            .map(|id| Track {
                id: id.to_string(),
                title: format!("Title {id}"),
                artist: "Test".to_string(),
                duration_ms: 60_000,
                genre: None,
                bpm: Some(124.0),
                key: Some("Am".to_string()),
                playback_count: 0,
                likes_count: 0,
                permalink_url: None,
            })
            .collect();
        Playlist {
            name: "DJ Mix - test".to_string(),
            duration_seconds: tracks.len() as f64 * 60.0,
            track_count: tracks.len(),
            tracks,
            transition_style: TransitionStyle::Smooth,
            transitions: Vec::new(),
        }
    }

    #[test]
    fn empty_playlist_yields_all_zero_aggregates() {
        let mut source = RandomPlaceholder::seeded(1);
        let analysis = analyze_energy(&playlist_of(&[]), &mut source);
        assert!(analysis.energy_profile.is_empty());
        assert_eq!(analysis.avg_energy, 0.0);
        assert_eq!(analysis.energy_variance, 0.0);
        assert_eq!(analysis.avg_energy_change, 0.0);
        assert_eq!(analysis.max_energy, 0.0);
        assert_eq!(analysis.min_energy, 0.0);
    }

    #[test]
    fn single_track_has_no_change_and_zero_variance() {
        let mut source = DeterministicStub::default().with_energy("a", 0.9);
        let analysis = analyze_energy(&playlist_of(&["a"]), &mut source);
        assert_eq!(analysis.energy_profile.len(), 1);
        assert_eq!(analysis.avg_energy, 0.9);
        assert_eq!(analysis.energy_variance, 0.0);
        assert_eq!(analysis.avg_energy_change, 0.0);
        assert_eq!(analysis.max_energy, 0.9);
        assert_eq!(analysis.min_energy, 0.9);
        assert_eq!(analysis.energy_profile[0].energy_level, EnergyLevel::High);
    }

    #[test]
    fn aggregates_match_hand_computed_values() {
        let mut source = DeterministicStub::default()
            .with_energy("a", 0.2)
            .with_energy("b", 0.8)
            .with_energy("c", 0.5);
        let analysis = analyze_energy(&playlist_of(&["a", "b", "c"]), &mut source);

        assert_eq!(analysis.energy_profile.len(), 3);
        assert_eq!(
            analysis
                .energy_profile
                .iter()
                .map(|e| e.title.as_str())
                .collect::<Vec<_>>(),
            vec!["Title a", "Title b", "Title c"]
        );
        assert!((analysis.avg_energy - 0.5).abs() < 1e-12);
        // population variance: (0.09 + 0.09 + 0) / 3
        assert!((analysis.energy_variance - 0.06).abs() < 1e-12);
        // two deltas: 0.6 and 0.3
        assert!((analysis.avg_energy_change - 0.45).abs() < 1e-12);
        assert_eq!(analysis.max_energy, 0.8);
        assert_eq!(analysis.min_energy, 0.2);
        assert_eq!(analysis.energy_profile[0].energy_level, EnergyLevel::Low);
        assert_eq!(analysis.energy_profile[2].energy_level, EnergyLevel::Medium);
    }

    #[test]
    fn profile_carries_tempo_key_and_cluster() {
        let mut source = DeterministicStub::default();
        let analysis = analyze_energy(&playlist_of(&["a", "b"]), &mut source);
        for entry in &analysis.energy_profile {
            assert_eq!(entry.tempo, 124.0);
            assert_eq!(entry.key, "Am");
            assert_eq!(entry.sonic_cluster, SonicCluster::Groovy);
            assert_eq!(entry.danceability, 0.5);
        }
    }

    #[test]
    fn random_source_keeps_shape_and_bounds() {
        let playlist = playlist_of(&["a", "b", "c", "d", "e"]);
        let mut source = RandomPlaceholder::seeded(8);
        let first = analyze_energy(&playlist, &mut source);
        let second = analyze_energy(&playlist, &mut source);
        assert_eq!(first.energy_profile.len(), 5);
        assert_eq!(second.energy_profile.len(), 5);
        assert_ne!(first.avg_energy, second.avg_energy);
        for analysis in [&first, &second] {
            assert!(analysis.min_energy <= analysis.avg_energy);
            assert!(analysis.avg_energy <= analysis.max_energy);
            assert!(analysis.energy_variance >= 0.0);
            assert!((0.0..=1.0).contains(&analysis.avg_energy_change));
        }
    }

    #[test]
    fn energy_levels_use_strict_thresholds() {
        assert_eq!(EnergyLevel::from_energy(0.71), EnergyLevel::High);
        assert_eq!(EnergyLevel::from_energy(0.7), EnergyLevel::Medium);
        assert_eq!(EnergyLevel::from_energy(0.41), EnergyLevel::Medium);
        assert_eq!(EnergyLevel::from_energy(0.4), EnergyLevel::Low);
        assert_eq!(EnergyLevel::High.as_str(), "high");
    }
}
