// Harmony generation: progression templates realized in a key.
//
// A progression is a list of diatonic degrees. Realizing it in a key takes
// the degree's scale note as the chord root and the degree's diatonic
// quality from one of two tables: natural minor when the scale name contains
// "minor", major otherwise. One chord fills each bar, and the progression
// repeats when there are more bars than degrees.
//
// Also offers substitution suggestions for a single chord (relative
// major/minor swap, seventh and sus variants, tritone substitution).
// These are advisory; the caller decides whether to apply them.

use crate::theory::{ChordType, Pitch, PitchClass, Progression, Scale, pitch_class};
use crate::time::{Duration, Position};
use serde::{Deserialize, Serialize};

/// One chord in a harmony track.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Chord {
    pub root: PitchClass,
    #[serde(rename = "type")]
    pub chord_type: ChordType,
    pub duration: Duration,
    pub start_time: Position,
}

impl Chord {
    /// Chord tones voiced upward from `octave`.
    pub fn notes(&self, octave: i32) -> Vec<Pitch> {
        self.chord_type.notes(self.root, octave)
    }
}

/// Diatonic triad qualities on degrees I..vii of a major scale.
const MAJOR_QUALITIES: [ChordType; 7] = [
    ChordType::Major,
    ChordType::Minor,
    ChordType::Minor,
    ChordType::Major,
    ChordType::Major,
    ChordType::Minor,
    ChordType::Diminished,
];

/// Diatonic triad qualities on degrees i..VII of natural minor.
const MINOR_QUALITIES: [ChordType; 7] = [
    ChordType::Minor,
    ChordType::Diminished,
    ChordType::Major,
    ChordType::Minor,
    ChordType::Minor,
    ChordType::Major,
    ChordType::Major,
];

/// Roman numerals for degrees 0..6, as shown next to a progression.
const NUMERALS: [&str; 7] = ["I", "ii", "iii", "IV", "V", "vi", "vii°"];

/// Quality table for a scale name. Matches on the raw name, so any name
/// containing "minor" gets the minor table even if the scale itself is
/// unknown and falls back to major notes.
pub fn diatonic_qualities(scale_name: &str) -> &'static [ChordType; 7] {
    if scale_name.contains("minor") {
        &MINOR_QUALITIES
    } else {
        &MAJOR_QUALITIES
    }
}

/// A progression step resolved in a key, for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressionStep {
    pub root: PitchClass,
    #[serde(rename = "type")]
    pub chord_type: ChordType,
    pub numeral: &'static str,
}

/// Resolve degree `degree` against a scale and its quality table.
///
/// Scales with fewer than seven notes (pentatonic, blues) wrap the degree
/// around the scale rather than running off its end.
fn degree_chord(
    scale_notes: &[PitchClass],
    qualities: &[ChordType; 7],
    degree: usize,
) -> (PitchClass, ChordType) {
    let root = scale_notes[degree % scale_notes.len()];
    (root, qualities[degree % qualities.len()])
}

/// Generate one chord per bar for `bar_count` bars.
///
/// Unknown progression names and non-positive bar counts yield an empty
/// list; callers treat that as "nothing to generate".
pub fn generate_harmony(
    key: &str,
    scale_name: &str,
    progression_name: &str,
    bar_count: i32,
) -> Vec<Chord> {
    let Some(progression) = Progression::by_name(progression_name) else {
        log::warn!("unknown progression '{progression_name}', no chords generated");
        return Vec::new();
    };
    if bar_count <= 0 {
        return Vec::new();
    }

    let scale_notes = Scale::lookup(scale_name).notes(pitch_class(key));
    let qualities = diatonic_qualities(scale_name);

    let chords: Vec<Chord> = (0..bar_count as u32)
        .map(|bar| {
            let degree = progression.degrees[bar as usize % progression.degrees.len()];
            let (root, chord_type) = degree_chord(&scale_notes, qualities, degree);
            Chord {
                root,
                chord_type,
                duration: Duration::Whole,
                start_time: Position::bar_start(bar),
            }
        })
        .collect();

    log::debug!(
        "harmony: {} chords from '{}' in {} {}",
        chords.len(),
        progression.name,
        key,
        scale_name
    );
    chords
}

/// The chords of one pass through a progression, with roman numerals.
pub fn progression_steps(
    key: &str,
    scale_name: &str,
    progression_name: &str,
) -> Vec<ProgressionStep> {
    let Some(progression) = Progression::by_name(progression_name) else {
        return Vec::new();
    };
    let scale_notes = Scale::lookup(scale_name).notes(pitch_class(key));
    let qualities = diatonic_qualities(scale_name);

    progression
        .degrees
        .iter()
        .map(|&degree| {
            let (root, chord_type) = degree_chord(&scale_notes, qualities, degree);
            ProgressionStep {
                root,
                chord_type,
                numeral: NUMERALS[degree % NUMERALS.len()],
            }
        })
        .collect()
}

/// Suggest replacements for `chord`, in a fixed order.
///
/// - major: relative minor, major seventh, sus4
/// - minor: relative major, minor seventh
/// - dominant seventh: tritone substitution
///
/// Other qualities get no suggestions. Timing is copied from the input.
pub fn suggest_substitutions(chord: &Chord) -> Vec<Chord> {
    let with = |root: PitchClass, chord_type: ChordType| Chord {
        root,
        chord_type,
        ..*chord
    };

    let mut subs = Vec::new();
    match chord.chord_type {
        ChordType::Major => {
            subs.push(with(chord.root.transpose(-3), ChordType::Minor));
            subs.push(with(chord.root, ChordType::Major7));
            subs.push(with(chord.root, ChordType::Sus4));
        }
        ChordType::Minor => {
            subs.push(with(chord.root.transpose(3), ChordType::Major));
            subs.push(with(chord.root, ChordType::Minor7));
        }
        ChordType::Dominant7 => {
            subs.push(with(chord.root.transpose(6), ChordType::Dominant7));
        }
        _ => {}
    }
    subs
}

#[cfg(test)]
mod tests {
    use super::*;
    use PitchClass::*;
    use pretty_assertions::assert_eq;

    fn chord(root: PitchClass, chord_type: ChordType) -> Chord {
        Chord {
            root,
            chord_type,
            duration: Duration::Whole,
            start_time: Position::bar_start(2),
        }
    }

    #[test]
    fn test_one_four_five_one_in_c_major() {
        let chords = generate_harmony("C", "major", "I-IV-V-I", 4);
        assert_eq!(chords.len(), 4);
        let roots: Vec<PitchClass> = chords.iter().map(|c| c.root).collect();
        assert_eq!(roots, vec![C, F, G, C]);
        assert!(chords.iter().all(|c| c.chord_type == ChordType::Major));
        assert!(chords.iter().all(|c| c.duration == Duration::Whole));
        let starts: Vec<String> = chords.iter().map(|c| c.start_time.to_string()).collect();
        assert_eq!(starts, vec!["0:0:0", "1:0:0", "2:0:0", "3:0:0"]);
    }

    #[test]
    fn test_unknown_progression_is_empty() {
        assert!(generate_harmony("C", "major", "unknown-name", 4).is_empty());
        assert!(progression_steps("C", "major", "unknown-name").is_empty());
    }

    #[test]
    fn test_non_positive_bar_count_is_empty() {
        assert!(generate_harmony("C", "major", "I-IV-V-I", 0).is_empty());
        assert!(generate_harmony("C", "major", "I-IV-V-I", -3).is_empty());
    }

    #[test]
    fn test_progression_repeats_cyclically() {
        let chords = generate_harmony("G", "major", "ii-V-I", 7);
        let roots: Vec<PitchClass> = chords.iter().map(|c| c.root).collect();
        assert_eq!(roots, vec![A, D, G, A, D, G, A]);
        assert_eq!(chords[0].chord_type, ChordType::Minor);
        assert_eq!(chords[6].start_time, Position::bar_start(6));
    }

    #[test]
    fn test_minor_scale_uses_minor_qualities() {
        let chords = generate_harmony("A", "minor", "I-V-vi-IV", 4);
        let realized: Vec<(PitchClass, ChordType)> =
            chords.iter().map(|c| (c.root, c.chord_type)).collect();
        assert_eq!(
            realized,
            vec![
                (A, ChordType::Minor),
                (E, ChordType::Minor),
                (F, ChordType::Major),
                (D, ChordType::Minor),
            ]
        );
    }

    #[test]
    fn test_dorian_uses_major_quality_table() {
        assert_eq!(diatonic_qualities("dorian"), &MAJOR_QUALITIES);
        assert_eq!(diatonic_qualities("harmonic minor"), &MINOR_QUALITIES);
    }

    #[test]
    fn test_short_scales_wrap_degrees() {
        // C pentatonic is C D E G A; degree 5 wraps to C.
        let chords = generate_harmony("C", "pentatonic", "vi-IV-I-V", 4);
        let roots: Vec<PitchClass> = chords.iter().map(|c| c.root).collect();
        assert_eq!(roots, vec![C, G, C, A]);
    }

    #[test]
    fn test_steps_carry_numerals() {
        let steps = progression_steps("D", "major", "I-vi-IV-V");
        let shown: Vec<String> = steps
            .iter()
            .map(|s| format!("{} {}{}", s.numeral, s.root, s.chord_type))
            .collect();
        assert_eq!(shown, vec!["I Dmajor", "vi Bminor", "IV Gmajor", "V Amajor"]);
    }

    #[test]
    fn test_major_substitutions() {
        let subs = suggest_substitutions(&chord(C, ChordType::Major));
        assert_eq!(
            subs,
            vec![
                chord(A, ChordType::Minor),
                chord(C, ChordType::Major7),
                chord(C, ChordType::Sus4),
            ]
        );
    }

    #[test]
    fn test_minor_substitutions() {
        let subs = suggest_substitutions(&chord(E, ChordType::Minor));
        assert_eq!(subs, vec![chord(G, ChordType::Major), chord(E, ChordType::Minor7)]);
    }

    #[test]
    fn test_tritone_substitution() {
        let subs = suggest_substitutions(&chord(G, ChordType::Dominant7));
        assert_eq!(subs, vec![chord(CSharp, ChordType::Dominant7)]);
    }

    #[test]
    fn test_other_qualities_have_no_substitutions() {
        assert!(suggest_substitutions(&chord(B, ChordType::Diminished)).is_empty());
        assert!(suggest_substitutions(&chord(F, ChordType::Sus2)).is_empty());
    }

    #[test]
    fn test_chord_serializes_with_type_field() {
        let json = serde_json::to_string(&chord(FSharp, ChordType::Minor7)).unwrap();
        assert_eq!(
            json,
            r#"{"root":"F#","type":"min7","duration":"1n","startTime":"2:0:0"}"#
        );
    }
}
