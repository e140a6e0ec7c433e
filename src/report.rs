//! Console summaries and JSON reports for built playlists and analyzed tracks.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::energy::{EnergyAnalysis, EnergyLevel};
use crate::features::FeatureVector;
use crate::keys::{camelot_label, key_compatibility};
use crate::types::{Playlist, Track};

const BAR_WIDTH: usize = 50;
const FILE_STEM_MAX_CHARS: usize = 30;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaylistReport {
    #[serde(flatten)]
    pub playlist: Playlist,
    pub energy_analysis: EnergyAnalysis,
    pub generated_at: String,
}

impl PlaylistReport {
    pub fn new(playlist: Playlist, energy_analysis: EnergyAnalysis) -> Self {
        Self {
            playlist,
            energy_analysis,
            generated_at: chrono::Utc::now().to_rfc3339(),
        }
    }

    pub fn file_name(&self) -> String {
        format!(
            "playlist_{}_{}.json",
            safe_file_stem(&self.playlist.name),
            self.playlist.transition_style
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackAnalysisReport {
    pub track_info: Track,
    pub analysis: FeatureVector,
}

impl TrackAnalysisReport {
    pub fn file_name(&self) -> String {
        let title = if self.track_info.title.is_empty() {
            "unknown"
        } else {
            self.track_info.title.as_str()
        };
        let id = if self.track_info.id.is_empty() {
            "unknown"
        } else {
            self.track_info.id.as_str()
        };
        format!("analysis_{}_{id}.json", safe_file_stem(title))
    }
}

/// Format milliseconds as `m:ss`.
pub fn format_duration(ms: u64) -> String {
    let total_seconds = ms / 1000;
    format!("{}:{:02}", total_seconds / 60, total_seconds % 60)
}

/// Keep alphanumerics, spaces, `-` and `_`, truncated to 30 characters.
pub fn safe_file_stem(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_alphanumeric() || matches!(c, ' ' | '-' | '_'))
        .take(FILE_STEM_MAX_CHARS)
        .collect()
}

/// Write `value` as pretty JSON to `dir/file_name`, creating `dir` if needed.
pub fn save_json<T: Serialize>(dir: &Path, file_name: &str, value: &T) -> io::Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let path = dir.join(file_name);
    let json = serde_json::to_string_pretty(value).map_err(io::Error::other)?;
    fs::write(&path, json)?;
    Ok(path)
}

pub fn render_track_info(track: &Track) -> String {
    let mut lines = vec![
        format!("{} by {}", display_title(track), track.artist),
        format!("  Duration: {}", format_duration(track.duration_ms)),
        format!("  Genre: {}", track.genre.as_deref().unwrap_or("Unknown")),
        format!(
            "  BPM: {}",
            track
                .known_bpm()
                .map_or_else(|| "Unknown".to_string(), |bpm| format!("{bpm:.1}"))
        ),
        format!("  Key: {}", display_key(track.key_or_empty())),
    ];
    if track.playback_count > 0 || track.likes_count > 0 {
        lines.push(format!(
            "  Plays: {}  Likes: {}",
            track.playback_count, track.likes_count
        ));
    }
    lines.join("\n")
}

pub fn render_playlist_summary(playlist: &Playlist, energy: &EnergyAnalysis) -> String {
    let total_seconds = playlist.duration_seconds.max(0.0).round() as u64;
    let mut lines = vec![
        "===== PLAYLIST SUMMARY =====".to_string(),
        format!("Name: {}", playlist.name),
        format!(
            "Duration: {} minutes {} seconds",
            total_seconds / 60,
            total_seconds % 60
        ),
        format!("Tracks: {}", playlist.track_count),
        format!("Style: {}", playlist.transition_style),
        format!("Average Energy: {:.2}", energy.avg_energy),
        format!(
            "Energy range: {:.2}-{:.2} (variance {:.3}, mean change {:.2})",
            energy.min_energy, energy.max_energy, energy.energy_variance, energy.avg_energy_change
        ),
        String::new(),
        "Tracks in playlist:".to_string(),
    ];

    for (i, track) in playlist.tracks.iter().enumerate() {
        lines.push(format!(
            "{}. {} by {} ({})",
            i + 1,
            display_title(track),
            track.artist,
            format_duration(track.duration_ms)
        ));

        let (Some(next), Some(current), Some(upcoming)) = (
            playlist.tracks.get(i + 1),
            energy.energy_profile.get(i),
            energy.energy_profile.get(i + 1),
        ) else {
            continue;
        };
        lines.push(format!("   -> Transition to: {}", display_title(next)));
        lines.push(format!(
            "     BPM: {:.1} -> {:.1}",
            current.tempo, upcoming.tempo
        ));
        lines.push(format!(
            "     Key: {} -> {}",
            display_key(&current.key),
            display_key(&upcoming.key)
        ));
        lines.push(format!(
            "     Compatibility: {:.2}",
            key_compatibility(&current.key, &upcoming.key)
        ));
        if let Some(record) = playlist.transitions.iter().find(|r| r.to_index == i + 1) {
            lines.push(format!(
                "     Score: {:.3} ({}; {}; {})",
                record.scores.composite,
                record.scores.key.label,
                record.scores.energy_diff.label,
                record.scores.cluster.label
            ));
        }
    }
    lines.join("\n")
}

pub fn render_track_analysis(track: &Track, features: &FeatureVector) -> String {
    let level = EnergyLevel::from_energy(features.energy);
    let mut lines = vec![
        "===== TRACK INFO =====".to_string(),
        render_track_info(track),
        String::new(),
        "===== EXTRACTED FEATURES =====".to_string(),
        format!("Tempo: {:.1}", features.tempo),
        format!("Key: {}", display_key(&features.key)),
        format!("Energy: {:.2}", features.energy),
        format!("Danceability: {:.2}", features.danceability),
        format!("Acousticness: {:.2}", features.acousticness),
        format!("Instrumentalness: {:.2}", features.instrumentalness),
        format!("Valence: {:.2}", features.valence),
        String::new(),
        "===== CLASSIFICATION =====".to_string(),
        format!("Sonic Signature: {:.2}", features.sonic_signature),
        format!("Sonic Cluster: {}", features.sonic_cluster),
        format!(
            "Classified as: {} track with {} energy",
            features.sonic_cluster,
            level.as_str()
        ),
        String::new(),
        "===== FEATURE VISUALIZATION =====".to_string(),
    ];
    for (name, value) in [
        ("Energy", features.energy),
        ("Danceability", features.danceability),
        ("Acousticness", features.acousticness),
        ("Instrumentalness", features.instrumentalness),
        ("Valence", features.valence),
    ] {
        lines.push(format!("{name:15} [{}] {value:.2}", feature_bar(value)));
    }
    lines.join("\n")
}

fn feature_bar(value: f64) -> String {
    let filled = ((value.clamp(0.0, 1.0) * BAR_WIDTH as f64) as usize).min(BAR_WIDTH);
    format!("{}{}", "█".repeat(filled), "░".repeat(BAR_WIDTH - filled))
}

fn display_title(track: &Track) -> &str {
    if track.title.is_empty() {
        "Unknown"
    } else {
        &track.title
    }
}

/// Key as given plus its Camelot position when recognised, e.g. `Am (8A)`.
fn display_key(key: &str) -> String {
    if key.trim().is_empty() {
        return "Unknown".to_string();
    }
    match camelot_label(key) {
        Some(label) if !label.eq_ignore_ascii_case(key.trim()) => format!("{key} ({label})"),
        _ => key.to_string(),
    }
}
