// Rhythm pattern generation.
//
// Produces a list of note lengths (in sixteenth-units) that exactly fills
// the melody's span. The generator is greedy and target-driven: at each step
// it divides the remaining sixteenths by the notes still wanted and picks the
// note value tier closest to that ideal, so the final count lands near the
// target instead of wandering. Only the middle tier is random (quarter vs.
// eighth). The last wanted note absorbs whatever is left.
//
// The tier cutoffs are empirically tuned values carried over unchanged; they
// are exposed through `RhythmThresholds` so they can be adjusted from a JSON
// file without touching the algorithm.

use crate::error::Result;
use crate::time::SIXTEENTHS_PER_BEAT;
use serde::{Deserialize, Serialize};
use songsmith_prng::RandomSource;
use std::path::Path;

/// Tier cutoffs for the greedy rhythm picker, in sixteenth-units of ideal
/// remaining length per note.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RhythmThresholds {
    /// Ideal length at or above which a quarter note is always chosen.
    pub quarter_min: f64,
    /// Ideal length at or above which quarter and eighth are mixed.
    pub mixed_min: f64,
    /// Ideal length at or above which an eighth note is chosen.
    pub eighth_min: f64,
    /// Probability of a quarter in the mixed tier.
    pub quarter_weight: f64,
    /// Hard cap on notes, as a multiple of the target count.
    pub overshoot_factor: f64,
}

impl Default for RhythmThresholds {
    fn default() -> Self {
        RhythmThresholds {
            quarter_min: 6.0,
            mixed_min: 3.0,
            eighth_min: 1.5,
            quarter_weight: 0.6,
            overshoot_factor: 1.5,
        }
    }
}

impl RhythmThresholds {
    /// Load thresholds from a JSON file. Missing fields keep their defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path)?;
        let thresholds = serde_json::from_str(&data)?;
        Ok(thresholds)
    }

    /// Note length for an ideal per-note length.
    fn pick(&self, ideal: f64, rng: &mut impl RandomSource) -> u32 {
        if ideal >= self.quarter_min {
            4
        } else if ideal >= self.mixed_min {
            if rng.chance(self.quarter_weight) { 4 } else { 2 }
        } else if ideal >= self.eighth_min {
            2
        } else {
            1
        }
    }
}

/// How many notes a melody over `total_beats` should aim for.
///
/// Two notes per beat by default. A syllable pattern raises the target to
/// its total when that is larger; an empty pattern counts as absent. Totals
/// saturate at `u32::MAX`.
pub fn target_note_count(total_beats: u32, syllables: Option<&[u32]>) -> u32 {
    let density = total_beats.saturating_mul(2);
    match syllables {
        Some(pattern) if !pattern.is_empty() => pattern
            .iter()
            .fold(0u32, |sum, &n| sum.saturating_add(n))
            .max(density),
        _ => density,
    }
}

/// Generate note lengths filling `total_beats * 4` sixteenths.
///
/// Never holds more than `target * overshoot_factor` notes. With the default
/// factor the cap cannot bind before the tail note is emitted, so the result
/// sums to exactly the span (or is empty when the span is zero).
pub fn generate_rhythm(
    total_beats: u32,
    target_notes: u32,
    thresholds: &RhythmThresholds,
    rng: &mut impl RandomSource,
) -> Vec<u32> {
    let mut remaining = total_beats.saturating_mul(SIXTEENTHS_PER_BEAT);
    let limit = target_notes as f64 * thresholds.overshoot_factor;
    let mut rhythm = Vec::new();

    while remaining > 0 && (rhythm.len() as f64) < limit {
        let notes_left = target_notes as i64 - rhythm.len() as i64;
        if notes_left <= 1 {
            rhythm.push(remaining);
            break;
        }

        let ideal = remaining as f64 / notes_left as f64;
        let length = thresholds.pick(ideal, rng).clamp(1, remaining);
        rhythm.push(length);
        remaining -= length;
    }

    rhythm
}
