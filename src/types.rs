use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

use crate::scoring::TransitionScores;

/// A catalog track as handed to the playlist core. Never mutated by the core.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    #[serde(default, deserialize_with = "deserialize_id")]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub artist: String,
    #[serde(default)]
    pub duration_ms: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub genre: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bpm: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(default)]
    pub playback_count: u64,
    #[serde(default)]
    pub likes_count: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub permalink_url: Option<String>,
}

impl Track {
    /// Stated tempo, or None when missing or non-positive.
    pub fn known_bpm(&self) -> Option<f64> {
        self.bpm.filter(|bpm| bpm.is_finite() && *bpm > 0.0)
    }

    pub fn duration_seconds(&self) -> f64 {
        self.duration_ms as f64 / 1000.0
    }

    pub fn key_or_empty(&self) -> &str {
        self.key.as_deref().unwrap_or("")
    }
}

/// Catalog ids arrive as integers; local track files may use strings.
pub(crate) fn deserialize_id<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<String, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Int(i64),
        Text(String),
        Missing(Option<()>),
    }

    Ok(match RawId::deserialize(deserializer)? {
        RawId::Int(id) => id.to_string(),
        RawId::Text(id) => id,
        RawId::Missing(_) => String::new(),
    })
}

/// Named weighting profile used to rank transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransitionStyle {
    #[default]
    Smooth,
    Energetic,
    Minimal,
}

impl TransitionStyle {
    pub const ALL: &[Self] = &[Self::Smooth, Self::Energetic, Self::Minimal];

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Smooth => "smooth",
            Self::Energetic => "energetic",
            Self::Minimal => "minimal",
        }
    }
}

impl fmt::Display for TransitionStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransitionStyle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .find(|style| style.as_str().eq_ignore_ascii_case(s.trim()))
            .copied()
            .ok_or_else(|| {
                format!(
                    "unknown transition style '{s}' (expected one of: {})",
                    Self::ALL
                        .iter()
                        .map(|style| style.as_str())
                        .collect::<Vec<_>>()
                        .join(", ")
                )
            })
    }
}

/// One chosen hop in a built playlist.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransitionRecord {
    pub from_index: usize,
    pub to_index: usize,
    pub scores: TransitionScores,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Playlist {
    pub name: String,
    pub tracks: Vec<Track>,
    pub duration_seconds: f64,
    pub transition_style: TransitionStyle,
    pub track_count: usize,
    #[serde(default)]
    pub transitions: Vec<TransitionRecord>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn track_deserializes_numeric_and_string_ids() {
        let numeric: Track = serde_json::from_value(serde_json::json!({
            "id": 123456,
            "title": "Numeric",
            "duration_ms": 1000
        }))
        .unwrap();
        assert_eq!(numeric.id, "123456");

        let text: Track = serde_json::from_value(serde_json::json!({
            "id": "t1",
            "title": "Text"
        }))
        .unwrap();
        assert_eq!(text.id, "t1");
        assert_eq!(text.duration_ms, 0);
        assert_eq!(text.bpm, None);
    }

    #[test]
    fn track_without_id_deserializes_to_empty_id() {
        let track: Track = serde_json::from_value(serde_json::json!({ "title": "No id" })).unwrap();
        assert_eq!(track.id, "");

        let null_id: Track =
            serde_json::from_value(serde_json::json!({ "id": null, "title": "Null id" })).unwrap();
        assert_eq!(null_id.id, "");
    }

    #[test]
    fn known_bpm_treats_zero_and_negative_as_unknown() {
        let mut track: Track = serde_json::from_value(serde_json::json!({ "id": "x" })).unwrap();
        assert_eq!(track.known_bpm(), None);
        track.bpm = Some(0.0);
        assert_eq!(track.known_bpm(), None);
        track.bpm = Some(-4.0);
        assert_eq!(track.known_bpm(), None);
        track.bpm = Some(124.0);
        assert_eq!(track.known_bpm(), Some(124.0));
    }

    #[test]
    fn duration_seconds_converts_from_millis() {
        let track: Track =
            serde_json::from_value(serde_json::json!({ "id": "x", "duration_ms": 240000 }))
                .unwrap();
        assert_eq!(track.duration_seconds(), 240.0);
    }

    #[test]
    fn transition_style_parses_case_insensitively() {
        assert_eq!("smooth".parse::<TransitionStyle>(), Ok(TransitionStyle::Smooth));
        assert_eq!("Energetic".parse::<TransitionStyle>(), Ok(TransitionStyle::Energetic));
        assert_eq!(" MINIMAL ".parse::<TransitionStyle>(), Ok(TransitionStyle::Minimal));
        let err = "chaotic".parse::<TransitionStyle>().unwrap_err();
        assert!(err.contains("smooth, energetic, minimal"), "{err}");
    }

    #[test]
    fn transition_style_serializes_lowercase() {
        for style in TransitionStyle::ALL {
            let json = serde_json::to_value(style).unwrap();
            assert_eq!(json, serde_json::Value::String(style.to_string()));
        }
    }
}
