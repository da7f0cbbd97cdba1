// Melody generation: rhythm + contour over a scale.
//
// The pipeline for one melody:
//   1. Size: total beats from bar count and the time signature numerator,
//      target note count from density or a syllable pattern (rhythm.rs).
//   2. Rhythm: note lengths filling the span (rhythm.rs).
//   3. Contour: one shape chosen for the whole melody (contour.rs).
//   4. Pitches: each rhythm slot gets a scale degree from the contour and an
//      octave from the degree's band.
//   5. Timing: a running sixteenth count gives each note's start position on
//      the fixed 16-per-bar grid (time.rs).
//
// Each call is a pure function of its inputs and the random source it is
// handed. Nothing is cached between calls.

use crate::contour::{Contour, ContourWalker, octave_for_degree};
use crate::lyrics::fit_lyrics;
use crate::rhythm::{RhythmThresholds, generate_rhythm, target_note_count};
use crate::theory::{Pitch, Scale, pitch_class};
use crate::time::{Duration, Position};
use serde::{Deserialize, Serialize};
use songsmith_prng::RandomSource;

/// Musical settings shared by melody generation, playback and export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MelodyConfig {
    /// Key root as a pitch-class name, e.g. `"F#"`.
    pub key: String,
    /// Scale name from the scale table.
    pub scale: String,
    /// Quarter-note beats per minute.
    pub tempo: u32,
    /// (numerator, denominator). Only the numerator affects generation.
    pub time_signature: (u32, u32),
}

impl Default for MelodyConfig {
    fn default() -> Self {
        MelodyConfig {
            key: "C".to_string(),
            scale: "major".to_string(),
            tempo: 120,
            time_signature: (4, 4),
        }
    }
}

impl MelodyConfig {
    pub fn beats_per_bar(&self) -> u32 {
        self.time_signature.0
    }
}

/// A single melody note.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub pitch: Pitch,
    pub duration: Duration,
    pub start_time: Position,
}

/// Generate a melody with the default rhythm thresholds.
///
/// `bar_count <= 0` gives an empty melody. An empty syllable pattern is the
/// same as none.
pub fn generate_melody(
    config: &MelodyConfig,
    bar_count: i32,
    syllables: Option<&[u32]>,
    rng: &mut impl RandomSource,
) -> Vec<Note> {
    generate_melody_with(config, bar_count, syllables, &RhythmThresholds::default(), rng)
}

/// Generate a melody with explicit rhythm thresholds.
pub fn generate_melody_with(
    config: &MelodyConfig,
    bar_count: i32,
    syllables: Option<&[u32]>,
    thresholds: &RhythmThresholds,
    rng: &mut impl RandomSource,
) -> Vec<Note> {
    if bar_count <= 0 {
        return Vec::new();
    }

    let scale_notes = Scale::lookup(&config.scale).notes(pitch_class(&config.key));
    let total_beats = (bar_count as u32).saturating_mul(config.beats_per_bar());
    let target = target_note_count(total_beats, syllables);
    let rhythm = generate_rhythm(total_beats, target, thresholds, rng);
    let contour = Contour::choose(rng);

    log::debug!(
        "melody: {} beats, target {} notes, {} generated, contour {:?}",
        total_beats,
        target,
        rhythm.len(),
        contour
    );

    let mut walker = ContourWalker::new(contour, scale_notes.len());
    let mut position = 0u32;
    let mut notes = Vec::with_capacity(rhythm.len());

    for (index, &length) in rhythm.iter().enumerate() {
        let degree = walker.next_degree(index, rhythm.len(), rng);
        let octave = octave_for_degree(degree, scale_notes.len());
        notes.push(Note {
            pitch: Pitch::new(scale_notes[degree], octave),
            duration: Duration::from_sixteenths(length),
            start_time: Position::from_sixteenths(position),
        });
        position += length;
    }

    notes
}

/// Generate a melody sized to a lyric.
///
/// The syllable target is estimated from the word count, and the bar count
/// is raised so no bar carries more than eight words.
pub fn generate_melody_for_lyrics<S: AsRef<str>>(
    config: &MelodyConfig,
    lines: &[S],
    bars: i32,
    rng: &mut impl RandomSource,
) -> Vec<Note> {
    let fit = fit_lyrics(lines, bars);
    generate_melody(config, fit.bars, Some(&[fit.syllables]), rng)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::theory::PitchClass;
    use pretty_assertions::assert_eq;
    use songsmith_prng::{SequenceRng, SongRng};

    fn config(key: &str, scale: &str) -> MelodyConfig {
        MelodyConfig {
            key: key.to_string(),
            scale: scale.to_string(),
            ..MelodyConfig::default()
        }
    }

    fn span_end(note: &Note) -> u32 {
        note.start_time.to_sixteenths() + note.duration.sixteenths()
    }

    #[test]
    fn test_non_positive_bars_are_empty() {
        let mut rng = SongRng::new(1);
        assert!(generate_melody(&MelodyConfig::default(), 0, None, &mut rng).is_empty());
        assert!(generate_melody(&MelodyConfig::default(), -2, None, &mut rng).is_empty());
    }

    #[test]
    fn test_melody_stays_inside_its_bars() {
        for seed in 0..100u64 {
            let mut rng = SongRng::new(seed);
            let bars = (seed % 8 + 1) as i32;
            let notes = generate_melody(&MelodyConfig::default(), bars, None, &mut rng);
            assert!(!notes.is_empty());
            let last = notes.last().unwrap();
            assert!(span_end(last) <= bars as u32 * 16, "seed {seed}");
        }
    }

    #[test]
    fn test_dense_syllables_fill_bars_exactly() {
        for seed in 0..100u64 {
            let mut rng = SongRng::new(seed);
            let bars = (seed % 6 + 1) as i32;
            let notes =
                generate_melody(&MelodyConfig::default(), bars, Some(&[40, 40]), &mut rng);
            let total: u32 = notes.iter().map(|n| n.duration.sixteenths()).sum();
            assert_eq!(total, bars as u32 * 16, "seed {seed}");
            assert!(span_end(notes.last().unwrap()) <= bars as u32 * 16, "seed {seed}");
            assert!(notes.iter().any(|n| n.duration == Duration::Sixteenth));
        }
    }

    #[test]
    fn test_huge_syllable_counts_do_not_overflow() {
        let mut rng = SongRng::new(8);
        let notes =
            generate_melody(&MelodyConfig::default(), 1, Some(&[u32::MAX, 1]), &mut rng);
        assert_eq!(notes.len(), 16);
        assert!(notes.iter().all(|n| n.duration == Duration::Sixteenth));
    }

    #[test]
    fn test_starts_are_increasing_and_contiguous() {
        let mut rng = SongRng::new(11);
        let notes = generate_melody(&MelodyConfig::default(), 4, None, &mut rng);
        for pair in notes.windows(2) {
            assert_eq!(pair[1].start_time.to_sixteenths(), span_end(&pair[0]));
        }
        assert_eq!(notes[0].start_time, Position::default());
    }

    #[test]
    fn test_default_density_is_two_notes_per_beat() {
        let mut rng = SongRng::new(5);
        let notes = generate_melody(&MelodyConfig::default(), 4, None, &mut rng);
        assert_eq!(notes.len(), 32);
        assert!(notes.iter().all(|n| n.duration == Duration::Eighth));
    }

    #[test]
    fn test_syllables_raise_note_count() {
        let mut rng = SongRng::new(5);
        let notes = generate_melody(&MelodyConfig::default(), 2, Some(&[12, 12, 12]), &mut rng);
        assert_eq!(notes.len(), 32);
        assert!(notes.iter().all(|n| n.duration == Duration::Sixteenth));
    }

    #[test]
    fn test_empty_syllables_match_none() {
        let a = generate_melody(&MelodyConfig::default(), 3, Some(&[]), &mut SongRng::new(9));
        let b = generate_melody(&MelodyConfig::default(), 3, None, &mut SongRng::new(9));
        assert_eq!(a, b);
    }

    #[test]
    fn test_same_seed_same_melody() {
        let cfg = config("D", "dorian");
        let a = generate_melody(&cfg, 8, None, &mut SongRng::new(77));
        let b = generate_melody(&cfg, 8, None, &mut SongRng::new(77));
        assert_eq!(a, b);
    }

    #[test]
    fn test_pitches_come_from_the_scale() {
        let cfg = config("E", "pentatonic");
        let allowed = Scale::Pentatonic.notes(PitchClass::E);
        for seed in 0..50 {
            let notes = generate_melody(&cfg, 4, None, &mut SongRng::new(seed));
            for note in &notes {
                assert!(allowed.contains(&note.pitch.class));
                assert!((3..=5).contains(&note.pitch.octave));
            }
        }
    }

    #[test]
    fn test_scripted_ascending_melody() {
        // Four syllables are under the default density, so the target stays
        // at 8 eighths and the rhythm draws nothing. The one scripted value
        // then picks the ascending contour.
        let mut rng = SequenceRng::new(vec![0.1]);
        let cfg = MelodyConfig::default();
        let notes = generate_melody(&cfg, 1, Some(&[4]), &mut rng);
        let shown: Vec<String> = notes
            .iter()
            .map(|n| format!("{}@{}/{}", n.pitch, n.start_time, n.duration))
            .collect();
        assert_eq!(
            shown,
            vec![
                "C3@0:0:0/8n",
                "C3@0:0:2/8n",
                "D3@0:1:0/8n",
                "E4@0:1:2/8n",
                "F4@0:2:0/8n",
                "F4@0:2:2/8n",
                "G4@0:3:0/8n",
                "A5@0:3:2/8n",
            ]
        );
    }

    #[test]
    fn test_three_four_time_uses_numerator_for_length() {
        let cfg = MelodyConfig {
            time_signature: (3, 4),
            ..MelodyConfig::default()
        };
        let notes = generate_melody(&cfg, 4, None, &mut SongRng::new(2));
        let total: u32 = notes.iter().map(|n| n.duration.sixteenths()).sum();
        assert_eq!(total, 4 * 3 * 4);
        // Positions stay on the 16-per-bar grid, so 48 sixteenths reach
        // only into bar index 2.
        assert_eq!(notes.last().unwrap().start_time.bar, 2);
    }

    #[test]
    fn test_lyrics_extend_bars_and_density() {
        let lines = [
            "the river runs beneath the silver moonlit sky tonight",
            "and every word I never said comes back",
        ];
        // 17 words -> 3 bars; ceil(17 * 1.3) = 23 syllables, under the
        // default 24 notes for 12 beats.
        let notes =
            generate_melody_for_lyrics(&MelodyConfig::default(), &lines, 1, &mut SongRng::new(4));
        let total: u32 = notes.iter().map(|n| n.duration.sixteenths()).sum();
        assert_eq!(total, 3 * 16);
        assert_eq!(notes.len(), 24);
    }

    #[test]
    fn test_note_serializes_in_playback_format() {
        let note = Note {
            pitch: Pitch::new(PitchClass::FSharp, 5),
            duration: Duration::Sixteenth,
            start_time: Position::new(1, 3, 2),
        };
        assert_eq!(
            serde_json::to_string(&note).unwrap(),
            r#"{"pitch":"F#5","duration":"16n","startTime":"1:3:2"}"#
        );
    }

    #[test]
    fn test_config_round_trips_with_array_time_signature() {
        let json = r#"{"key":"A","scale":"minor","tempo":90,"timeSignature":[6,8]}"#;
        let cfg: MelodyConfig = serde_json::from_str(json).unwrap();
        assert_eq!(cfg.time_signature, (6, 8));
        assert_eq!(serde_json::to_string(&cfg).unwrap(), json);
    }
}
