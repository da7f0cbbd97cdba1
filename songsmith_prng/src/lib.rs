// Injectable random sources for Songsmith generation.
//
// Every random decision in the melody generator (contour choice, rhythm
// tier tie-breaks, random-walk steps) draws from a `RandomSource` passed in
// by the caller. Nothing in the generators touches a global RNG, so a caller
// that wants reproducible output passes a seeded `SongRng`, and a test that
// wants to force a particular branch passes a `SequenceRng` with scripted
// values.
//
// `SongRng` is xoshiro256++ (Blackman & Vigna, 2019) with SplitMix64 seeding.
// The core generator is integer-only so a seed produces the same stream on
// every platform.

use serde::{Deserialize, Serialize};

/// A source of uniformly distributed randomness.
///
/// Implementors only need `next_u64`; the unit-interval and selection
/// helpers are derived from it. `SequenceRng` overrides `next_f64` so
/// scripted values come back exactly.
pub trait RandomSource {
    /// Next raw 64-bit value.
    fn next_u64(&mut self) -> u64;

    /// Uniform `f64` in [0, 1), built from the upper 53 bits.
    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// `true` with probability `p`. `p <= 0.0` never fires, `p >= 1.0`
    /// always does.
    fn chance(&mut self, p: f64) -> bool {
        self.next_f64() < p
    }

    /// Uniform index in `[0, len)`, or 0 when `len == 0`.
    ///
    /// Scales a unit-interval draw rather than rejection sampling, so a
    /// scripted value `v` always selects `floor(v * len)`.
    fn index(&mut self, len: usize) -> usize {
        if len == 0 {
            return 0;
        }
        let i = (self.next_f64() * len as f64) as usize;
        i.min(len - 1)
    }
}

impl<R: RandomSource + ?Sized> RandomSource for &mut R {
    fn next_u64(&mut self) -> u64 {
        (**self).next_u64()
    }

    fn next_f64(&mut self) -> f64 {
        (**self).next_f64()
    }
}

/// Seedable xoshiro256++ generator.
///
/// Two instances built from the same seed yield identical streams. The
/// state serializes, so a half-consumed generator can be saved with a
/// project and resumed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SongRng {
    s: [u64; 4],
}

impl SongRng {
    /// Expand a `u64` seed into the 256-bit state via SplitMix64.
    pub fn new(seed: u64) -> Self {
        let mut sm = seed;
        Self {
            s: [
                splitmix64(&mut sm),
                splitmix64(&mut sm),
                splitmix64(&mut sm),
                splitmix64(&mut sm),
            ],
        }
    }
}

impl RandomSource for SongRng {
    fn next_u64(&mut self) -> u64 {
        let result = (self.s[0].wrapping_add(self.s[3]))
            .rotate_left(23)
            .wrapping_add(self.s[0]);

        let t = self.s[1] << 17;

        self.s[2] ^= self.s[0];
        self.s[3] ^= self.s[1];
        self.s[1] ^= self.s[2];
        self.s[0] ^= self.s[3];

        self.s[2] ^= t;
        self.s[3] = self.s[3].rotate_left(45);

        result
    }
}

fn splitmix64(state: &mut u64) -> u64 {
    *state = state.wrapping_add(0x9e37_79b9_7f4a_7c15);
    let mut z = *state;
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    z ^ (z >> 31)
}

/// Replays a fixed list of unit-interval values, wrapping around at the end.
///
/// Values are clamped into [0, 1) when constructed. An empty script always
/// yields 0.0.
#[derive(Clone, Debug, Default)]
pub struct SequenceRng {
    values: Vec<f64>,
    pos: usize,
}

impl SequenceRng {
    pub fn new(values: impl Into<Vec<f64>>) -> Self {
        let values = values
            .into()
            .into_iter()
            .map(|v| v.clamp(0.0, 1.0 - f64::EPSILON))
            .collect();
        Self { values, pos: 0 }
    }

    /// How many values have been consumed so far (not wrapped).
    pub fn consumed(&self) -> usize {
        self.pos
    }
}

impl RandomSource for SequenceRng {
    fn next_u64(&mut self) -> u64 {
        ((self.next_f64() * (1u64 << 53) as f64) as u64) << 11
    }

    fn next_f64(&mut self) -> f64 {
        if self.values.is_empty() {
            return 0.0;
        }
        let v = self.values[self.pos % self.values.len()];
        self.pos += 1;
        v
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_seed_same_stream() {
        let mut a = SongRng::new(42);
        let mut b = SongRng::new(42);
        for _ in 0..1000 {
            assert_eq!(a.next_u64(), b.next_u64());
        }
    }

    #[test]
    fn test_different_seeds_diverge() {
        let mut a = SongRng::new(42);
        let mut b = SongRng::new(43);
        assert_ne!(a.next_u64(), b.next_u64());
    }

    #[test]
    fn test_unit_interval_stays_in_range() {
        let mut rng = SongRng::new(12345);
        for _ in 0..10_000 {
            let v = rng.next_f64();
            assert!((0.0..1.0).contains(&v), "f64 out of range: {v}");
        }
    }

    #[test]
    fn test_index_covers_every_slot() {
        let mut rng = SongRng::new(7);
        let mut seen = [false; 5];
        for _ in 0..10_000 {
            let i = rng.index(5);
            assert!(i < 5);
            seen[i] = true;
        }
        assert!(seen.iter().all(|&s| s), "some index never drawn: {seen:?}");
    }

    #[test]
    fn test_index_of_empty_range_is_zero() {
        let mut rng = SongRng::new(1);
        assert_eq!(rng.index(0), 0);
    }

    #[test]
    fn test_chance_roughly_matches_probability() {
        let mut rng = SongRng::new(42);
        let n = 10_000;
        let hits = (0..n).filter(|_| rng.chance(0.7)).count();
        let pct = hits as f64 / n as f64;
        assert!((0.65..0.75).contains(&pct), "chance(0.7) gave {:.1}%", pct * 100.0);
    }

    #[test]
    fn test_chance_extremes() {
        let mut rng = SongRng::new(42);
        for _ in 0..100 {
            assert!(!rng.chance(0.0));
            assert!(rng.chance(1.0));
        }
    }

    #[test]
    fn test_sequence_replays_and_wraps() {
        let mut rng = SequenceRng::new(vec![0.1, 0.9]);
        assert_eq!(rng.next_f64(), 0.1);
        assert_eq!(rng.next_f64(), 0.9);
        assert_eq!(rng.next_f64(), 0.1);
        assert_eq!(rng.consumed(), 3);
    }

    #[test]
    fn test_sequence_index_is_floor_of_scaled_value() {
        let mut rng = SequenceRng::new(vec![0.0, 0.2, 0.45, 0.99]);
        let picks: Vec<usize> = (0..4).map(|_| rng.index(5)).collect();
        assert_eq!(picks, vec![0, 1, 2, 4]);
    }

    #[test]
    fn test_sequence_clamps_out_of_range_values() {
        let mut rng = SequenceRng::new(vec![1.0, -3.0]);
        assert!(rng.next_f64() < 1.0);
        assert_eq!(rng.next_f64(), 0.0);
    }

    #[test]
    fn test_empty_sequence_yields_zero() {
        let mut rng = SequenceRng::default();
        assert_eq!(rng.next_f64(), 0.0);
        assert!(!rng.chance(0.0));
    }

    #[test]
    fn test_borrowed_source_advances_owner() {
        let mut rng = SongRng::new(9);
        let mut reference = rng.clone();
        fn draw(mut source: impl RandomSource) -> u64 {
            source.next_u64()
        }
        draw(&mut rng);
        reference.next_u64();
        assert_eq!(rng, reference);
    }

    #[test]
    fn test_serialization_roundtrip_resumes_stream() {
        let mut rng = SongRng::new(42);
        for _ in 0..100 {
            rng.next_u64();
        }
        let json = serde_json::to_string(&rng).unwrap();
        let mut restored: SongRng = serde_json::from_str(&json).unwrap();
        for _ in 0..100 {
            assert_eq!(rng.next_u64(), restored.next_u64());
        }
    }
}
