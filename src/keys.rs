//! Harmonic key compatibility on the circle of fifths.

/// Twelve major keys in fifths order, each with its relative minor. Adjacent
/// rows are a fifth apart and the table wraps. Row `n` is Camelot `n+1`.
const CIRCLE_OF_FIFTHS: [(&str, &str); 12] = [
    ("B", "G#"),
    ("F#", "D#"),
    ("C#", "A#"),
    ("G#", "F"),
    ("D#", "C"),
    ("A#", "G"),
    ("F", "D"),
    ("C", "A"),
    ("G", "E"),
    ("D", "B"),
    ("A", "F#"),
    ("E", "C#"),
];

pub const SAME_KEY: f64 = 1.0;
pub const NEIGHBOR_KEY: f64 = 0.8;
pub const UNKNOWN_KEY: f64 = 0.5;
pub const DISTANT_KEY: f64 = 0.3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Major,
    Minor,
}

/// A key located on the wheel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WheelKey {
    position: u8,
    mode: Mode,
}

impl WheelKey {
    fn is_neighbor_of(self, other: WheelKey) -> bool {
        let clockwise = (other.position + 12 - self.position) % 12;
        match (self.mode == other.mode, clockwise) {
            (true, 1 | 11) => true,
            (false, 0) => true,
            _ => false,
        }
    }
}

/// Score how well two keys mix: 1.0 same, 0.8 neighbors, 0.5 unknown, 0.3 otherwise.
pub fn key_compatibility(key1: &str, key2: &str) -> f64 {
    let (key1, key2) = (key1.trim(), key2.trim());
    if key1.is_empty() || key2.is_empty() {
        return UNKNOWN_KEY;
    }
    if key1 == key2 {
        return SAME_KEY;
    }
    match (parse_key(key1), parse_key(key2)) {
        (Some(from), Some(to)) if from == to => SAME_KEY,
        (Some(from), Some(to)) if from.is_neighbor_of(to) => NEIGHBOR_KEY,
        _ => DISTANT_KEY,
    }
}

/// Locate a key given as standard notation ("Am", "Bb major", "F♯m") or Camelot ("8A").
pub fn parse_key(raw_key: &str) -> Option<WheelKey> {
    parse_camelot(raw_key).or_else(|| parse_standard(raw_key))
}

/// Render a parsed key in Camelot notation, e.g. "8A".
pub fn camelot_label(raw_key: &str) -> Option<String> {
    parse_key(raw_key).map(|key| {
        let letter = match key.mode {
            Mode::Minor => 'A',
            Mode::Major => 'B',
        };
        format!("{}{letter}", key.position + 1)
    })
}

fn parse_camelot(raw_key: &str) -> Option<WheelKey> {
    let trimmed = raw_key.trim().to_ascii_uppercase();
    let letter = trimmed.chars().last()?;
    let number = &trimmed[..trimmed.len() - letter.len_utf8()];
    let mode = match letter {
        'A' => Mode::Minor,
        'B' => Mode::Major,
        _ => return None,
    };
    let number: u8 = number.parse().ok()?;
    if !(1..=12).contains(&number) {
        return None;
    }
    Some(WheelKey {
        position: number - 1,
        mode,
    })
}

fn parse_standard(raw_key: &str) -> Option<WheelKey> {
    let normalized = raw_key
        .trim()
        .replace('\u{266F}', "#")
        .replace('\u{266D}', "b");
    if normalized.is_empty() {
        return None;
    }
    let lower = normalized.to_ascii_lowercase();

    let (root_raw, mode) = if let Some(root) = strip_suffix_ci(&normalized, &lower, "minor") {
        (root, Mode::Minor)
    } else if let Some(root) = strip_suffix_ci(&normalized, &lower, "min") {
        (root, Mode::Minor)
    } else if let Some(root) = strip_suffix_ci(&normalized, &lower, "major") {
        (root, Mode::Major)
    } else if let Some(root) = strip_suffix_ci(&normalized, &lower, "maj") {
        (root, Mode::Major)
    } else if let Some(root) = normalized.strip_suffix('m').filter(|r| !r.is_empty()) {
        (root, Mode::Minor)
    } else {
        (normalized.as_str(), Mode::Major)
    };
    let root = sharp_root(root_raw)?;

    let position = CIRCLE_OF_FIFTHS.iter().position(|(major, minor)| match mode {
        Mode::Major => *major == root,
        Mode::Minor => *minor == root,
    })?;
    Some(WheelKey {
        position: position as u8,
        mode,
    })
}

fn strip_suffix_ci<'a>(key: &'a str, lower: &str, suffix: &str) -> Option<&'a str> {
    if lower.ends_with(suffix) && key.len() > suffix.len() {
        Some(&key[..key.len() - suffix.len()])
    } else {
        None
    }
}

/// Normalize a root note to its sharp spelling ("Bb" -> "A#", "E#" -> "F").
fn sharp_root(root: &str) -> Option<&'static str> {
    const SHARP_NAMES: [&str; 12] = [
        "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
    ];

    let stripped: String = root.chars().filter(|ch| !ch.is_whitespace()).collect();
    let mut chars = stripped.chars();
    let letter = chars.next()?.to_ascii_uppercase();
    let natural: i8 = match letter {
        'C' => 0,
        'D' => 2,
        'E' => 4,
        'F' => 5,
        'G' => 7,
        'A' => 9,
        'B' => 11,
        _ => return None,
    };
    let shift: i8 = match chars.next() {
        Some('#') => 1,
        Some('b') | Some('B') => -1,
        Some(_) => return None,
        None => 0,
    };
    if chars.next().is_some() {
        return None;
    }
    Some(SHARP_NAMES[(natural + shift).rem_euclid(12) as usize])
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_KEYS: &[&str] = &[
        "C", "G", "D", "A", "E", "B", "F#", "C#", "G#", "D#", "A#", "F", "Am", "Em", "Bm", "F#m",
        "C#m", "G#m", "D#m", "A#m", "Fm", "Cm", "Gm", "Dm",
    ];

    #[test]
    fn every_key_is_perfectly_compatible_with_itself() {
        for key in ALL_KEYS.iter().chain(["8A", "weird-key", "Bb major"].iter()) {
            assert_eq!(key_compatibility(key, key), 1.0, "{key}");
        }
    }

    #[test]
    fn empty_key_is_neutral_on_either_side() {
        for key in ALL_KEYS.iter().chain(["", "  "].iter()) {
            assert_eq!(key_compatibility("", key), 0.5, "'' vs {key}");
            assert_eq!(key_compatibility(key, ""), 0.5, "{key} vs ''");
        }
    }

    #[test]
    fn scores_stay_in_the_fixed_set() {
        let allowed = [DISTANT_KEY, UNKNOWN_KEY, NEIGHBOR_KEY, SAME_KEY];
        for from in ALL_KEYS.iter().chain(["", "H", "12B"].iter()) {
            for to in ALL_KEYS.iter().chain(["", "H", "12B"].iter()) {
                let score = key_compatibility(from, to);
                assert!(allowed.contains(&score), "{from} -> {to} = {score}");
            }
        }
    }

    #[test]
    fn fifths_and_relative_minor_are_neighbors() {
        assert_eq!(key_compatibility("C", "G"), 0.8);
        assert_eq!(key_compatibility("C", "F"), 0.8);
        assert_eq!(key_compatibility("C", "Am"), 0.8);
        assert_eq!(key_compatibility("A", "E"), 0.8);
        assert_eq!(key_compatibility("Am", "Em"), 0.8);
        assert_eq!(key_compatibility("Am", "Dm"), 0.8);
        assert_eq!(key_compatibility("E", "B"), 0.8);
        // wheel wraps between E (12B) and B (1B)
        assert_eq!(key_compatibility("B", "E"), 0.8);
    }

    #[test]
    fn unrelated_keys_score_distant() {
        assert_eq!(key_compatibility("C", "D"), 0.3);
        assert_eq!(key_compatibility("C", "D#"), 0.3);
        assert_eq!(key_compatibility("C", "Em"), 0.3);
        assert_eq!(key_compatibility("Am", "G"), 0.3);
        assert_eq!(key_compatibility("C", "not-a-key"), 0.3);
    }

    #[test]
    fn neighbor_relation_is_symmetric() {
        for from in ALL_KEYS {
            for to in ALL_KEYS {
                assert_eq!(
                    key_compatibility(from, to),
                    key_compatibility(to, from),
                    "{from} <-> {to}"
                );
            }
        }
    }

    #[test]
    fn each_key_has_exactly_three_neighbors() {
        for from in ALL_KEYS {
            let neighbors = ALL_KEYS
                .iter()
                .filter(|to| key_compatibility(from, to) == NEIGHBOR_KEY)
                .count();
            assert_eq!(neighbors, 3, "{from}");
        }
    }

    #[test]
    fn enharmonic_and_camelot_spellings_match() {
        assert_eq!(key_compatibility("Bb", "A#"), 1.0);
        assert_eq!(key_compatibility("Am", "8A"), 1.0);
        assert_eq!(key_compatibility("A minor", "Amin"), 1.0);
        assert_eq!(key_compatibility("C major", "8b"), 1.0);
        assert_eq!(key_compatibility("F\u{266F}m", "F#m"), 1.0);
        assert_eq!(key_compatibility("Db", "Ab"), 0.8);
    }

    #[test]
    fn keys_ending_in_unicode_accidentals_parse() {
        assert_eq!(key_compatibility("F\u{266F}", "F#"), 1.0);
        assert_eq!(key_compatibility("C", "E\u{266D}"), 0.3);
        assert_eq!(key_compatibility("E\u{266D}", "D#"), 1.0);
        assert_eq!(key_compatibility("B\u{266D}", "F"), 0.8);
        assert_eq!(camelot_label("B\u{266D}").as_deref(), Some("6B"));
        assert_eq!(camelot_label("\u{266F}"), None);
        assert_eq!(camelot_label("1\u{266D}"), None);
    }

    #[test]
    fn camelot_labels_follow_the_wheel() {
        assert_eq!(camelot_label("Am").as_deref(), Some("8A"));
        assert_eq!(camelot_label("C").as_deref(), Some("8B"));
        assert_eq!(camelot_label("F#m").as_deref(), Some("11A"));
        assert_eq!(camelot_label("Bb").as_deref(), Some("6B"));
        assert_eq!(camelot_label("Dbm").as_deref(), Some("12A"));
        assert_eq!(camelot_label("8a").as_deref(), Some("8A"));
        assert_eq!(camelot_label("not-a-key"), None);
        assert_eq!(camelot_label(""), None);
    }
}
