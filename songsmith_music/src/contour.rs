// Melodic contours: the shape a generated melody traces over scale degrees.
//
// A contour is chosen once per melody. The deterministic shapes map
// normalized progress through the melody (0.0 at the first note, just under
// 1.0 at the last) straight to a scale degree. The random walk is the only
// stateful shape: it moves from the previous degree by a step or a small
// leap.
//
// Degrees also pick the octave: the bottom two degrees sit in octave 3, the
// top two in octave 5, the rest in octave 4. That spreads a 5-7 note scale
// over roughly two octaves without tracking octave movement explicitly.

use serde::{Deserialize, Serialize};
use songsmith_prng::RandomSource;
use std::f64::consts::PI;

/// Probability that a random-walk move is a step (±1) rather than a leap (±2).
const STEP_PROBABILITY: f64 = 0.7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Contour {
    Ascending,
    Descending,
    /// Up to the top of the scale at the midpoint, then back down.
    Arch,
    /// Two full sine periods across the melody.
    Wave,
    RandomWalk,
}

impl Contour {
    pub const ALL: [Contour; 5] = [
        Contour::Ascending,
        Contour::Descending,
        Contour::Arch,
        Contour::Wave,
        Contour::RandomWalk,
    ];

    /// Uniform choice over all contours.
    pub fn choose(rng: &mut impl RandomSource) -> Self {
        Self::ALL[rng.index(Self::ALL.len())]
    }
}

/// Walks a contour note by note, remembering the previous degree for the
/// random walk.
#[derive(Debug, Clone)]
pub struct ContourWalker {
    contour: Contour,
    scale_len: usize,
    prev_degree: usize,
}

impl ContourWalker {
    /// The random walk starts from the middle degree, so its first note is
    /// already one move away from the middle.
    pub fn new(contour: Contour, scale_len: usize) -> Self {
        ContourWalker {
            contour,
            scale_len,
            prev_degree: scale_len / 2,
        }
    }

    /// Scale degree for note `index` of `total` notes.
    pub fn next_degree(&mut self, index: usize, total: usize, rng: &mut impl RandomSource) -> usize {
        let top = self.scale_len.saturating_sub(1);
        let span = top as f64;
        let progress = if total == 0 { 0.0 } else { index as f64 / total as f64 };

        let degree = match self.contour {
            Contour::Ascending => (progress * span).floor() as usize,
            Contour::Descending => ((1.0 - progress) * span).floor() as usize,
            Contour::Arch => {
                if progress < 0.5 {
                    (progress * 2.0 * span).floor() as usize
                } else {
                    ((1.0 - progress) * 2.0 * span).floor() as usize
                }
            }
            Contour::Wave => {
                let height = ((progress * PI * 4.0).sin() + 1.0) / 2.0;
                (height * span).floor() as usize
            }
            Contour::RandomWalk => {
                let magnitude = if rng.chance(STEP_PROBABILITY) { 1 } else { 2 };
                let step = if rng.chance(0.5) { -magnitude } else { magnitude };
                (self.prev_degree as i64 + step).clamp(0, top as i64) as usize
            }
        };

        let degree = degree.min(top);
        self.prev_degree = degree;
        degree
    }
}

/// Octave for a scale degree: bottom two degrees low, top two high.
pub fn octave_for_degree(degree: usize, scale_len: usize) -> i32 {
    if degree < 2 {
        3
    } else if degree + 3 > scale_len {
        5
    } else {
        4
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use songsmith_prng::{SequenceRng, SongRng};

    fn walk(contour: Contour, scale_len: usize, total: usize) -> Vec<usize> {
        let mut walker = ContourWalker::new(contour, scale_len);
        let mut rng = SongRng::new(1);
        (0..total).map(|i| walker.next_degree(i, total, &mut rng)).collect()
    }

    #[test]
    fn test_ascending_and_descending_are_monotonic() {
        let up = walk(Contour::Ascending, 7, 8);
        assert_eq!(up, vec![0, 0, 1, 2, 3, 3, 4, 5]);
        let down = walk(Contour::Descending, 7, 8);
        assert_eq!(down, vec![6, 5, 4, 3, 3, 2, 1, 0]);
    }

    #[test]
    fn test_arch_peaks_in_the_middle() {
        let arch = walk(Contour::Arch, 7, 8);
        assert_eq!(arch, vec![0, 1, 3, 4, 6, 4, 3, 1]);
    }

    #[test]
    fn test_wave_makes_two_periods() {
        let wave = walk(Contour::Wave, 7, 8);
        // Quarter periods: middle, top, middle, bottom, then again.
        assert_eq!(wave[0], 3);
        assert_eq!(wave[1], 6);
        assert_eq!(wave[3], 0);
        assert_eq!(wave[7], 0);
        assert!(wave[4] == 2 || wave[4] == 3);
    }

    #[test]
    fn test_random_walk_moves_by_step_or_leap() {
        let mut walker = ContourWalker::new(Contour::RandomWalk, 7);
        // (step?, down?) pairs: step down, leap up, step up, leap down.
        let mut rng = SequenceRng::new(vec![0.1, 0.1, 0.9, 0.9, 0.1, 0.9, 0.9, 0.1]);
        let degrees: Vec<usize> = (0..4).map(|i| walker.next_degree(i, 4, &mut rng)).collect();
        assert_eq!(degrees, vec![2, 4, 5, 3]);
    }

    #[test]
    fn test_random_walk_clamps_to_scale() {
        let mut walker = ContourWalker::new(Contour::RandomWalk, 5);
        // Always leap down.
        let mut rng = SequenceRng::new(vec![0.9, 0.1]);
        let degrees: Vec<usize> = (0..4).map(|i| walker.next_degree(i, 4, &mut rng)).collect();
        assert_eq!(degrees, vec![0, 0, 0, 0]);
    }

    #[test]
    fn test_every_contour_stays_in_range() {
        for contour in Contour::ALL {
            for scale_len in [5, 6, 7] {
                for total in [1, 3, 16, 97] {
                    for degree in walk(contour, scale_len, total) {
                        assert!(degree < scale_len, "{contour:?} gave {degree}");
                    }
                }
            }
        }
    }

    #[test]
    fn test_choose_is_uniform_over_table() {
        let mut rng = SequenceRng::new(vec![0.0, 0.25, 0.5, 0.7, 0.95]);
        let picks: Vec<Contour> = (0..5).map(|_| Contour::choose(&mut rng)).collect();
        assert_eq!(picks, Contour::ALL.to_vec());
    }

    #[test]
    fn test_octave_bands() {
        let seven: Vec<i32> = (0..7).map(|d| octave_for_degree(d, 7)).collect();
        assert_eq!(seven, vec![3, 3, 4, 4, 4, 5, 5]);
        let five: Vec<i32> = (0..5).map(|d| octave_for_degree(d, 5)).collect();
        assert_eq!(five, vec![3, 3, 4, 5, 5]);
    }
}
