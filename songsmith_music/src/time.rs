// Durations and musical positions on the canonical sixteenth-note grid.
//
// Generation always counts time in sixteenth-units on a fixed grid of
// 4 beats per bar and 4 sixteenths per beat (16 per bar). This grid does NOT
// follow the configured time signature: a 3/4 melody still has its positions
// written against 16-sixteenth bars. Playback and export read the
// "bar:beat:sixteenth" strings literally, so changing the grid would shift
// every note they schedule.
//
// Serialized forms are load-bearing for external consumers:
// - `Position` is always three colon-separated non-negative integers.
// - `Duration` is always one of `1n`, `2n`, `4n`, `8n`, `16n`.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

pub const SIXTEENTHS_PER_BEAT: u32 = 4;
pub const BEATS_PER_BAR: u32 = 4;
pub const SIXTEENTHS_PER_BAR: u32 = SIXTEENTHS_PER_BEAT * BEATS_PER_BAR;

/// Symbolic note value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Duration {
    Whole,
    Half,
    Quarter,
    Eighth,
    Sixteenth,
}

impl Duration {
    pub const ALL: [Duration; 5] = [
        Duration::Whole,
        Duration::Half,
        Duration::Quarter,
        Duration::Eighth,
        Duration::Sixteenth,
    ];

    /// Length in sixteenth-units.
    pub fn sixteenths(self) -> u32 {
        match self {
            Duration::Whole => 16,
            Duration::Half => 8,
            Duration::Quarter => 4,
            Duration::Eighth => 2,
            Duration::Sixteenth => 1,
        }
    }

    /// Playback-clock token.
    pub fn token(self) -> &'static str {
        match self {
            Duration::Whole => "1n",
            Duration::Half => "2n",
            Duration::Quarter => "4n",
            Duration::Eighth => "8n",
            Duration::Sixteenth => "16n",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Duration::Whole => "whole",
            Duration::Half => "half",
            Duration::Quarter => "quarter",
            Duration::Eighth => "eighth",
            Duration::Sixteenth => "sixteenth",
        }
    }

    /// Parse a token or long name. Anything unrecognized is a quarter.
    pub fn from_token(token: &str) -> Self {
        let token = token.trim();
        Self::ALL
            .into_iter()
            .find(|d| d.token() == token || d.name() == token)
            .unwrap_or(Duration::Quarter)
    }

    /// Exact sixteenth-unit match; any other length maps to an eighth.
    pub fn from_sixteenths(units: u32) -> Self {
        match units {
            1 => Duration::Sixteenth,
            2 => Duration::Eighth,
            4 => Duration::Quarter,
            8 => Duration::Half,
            16 => Duration::Whole,
            _ => Duration::Eighth,
        }
    }

    /// Length in MIDI ticks at `ppq` ticks per quarter note.
    pub fn ticks(self, ppq: u32) -> u32 {
        self.sixteenths() * ppq / SIXTEENTHS_PER_BEAT
    }

    /// Length in seconds at `tempo` quarter-note beats per minute.
    pub fn seconds(self, tempo: u32) -> f64 {
        sixteenths_to_seconds(self.sixteenths(), tempo)
    }
}

impl fmt::Display for Duration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

impl Serialize for Duration {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.token())
    }
}

impl<'de> Deserialize<'de> for Duration {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let token = String::deserialize(deserializer)?;
        Ok(Duration::from_token(&token))
    }
}

/// A bar:beat:sixteenth timestamp on the fixed 16-per-bar grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Position {
    pub bar: u32,
    pub beat: u32,
    pub sixteenth: u32,
}

impl Position {
    pub fn new(bar: u32, beat: u32, sixteenth: u32) -> Self {
        Position { bar, beat, sixteenth }
    }

    /// Start of `bar`.
    pub fn bar_start(bar: u32) -> Self {
        Position::new(bar, 0, 0)
    }

    pub fn from_sixteenths(n: u32) -> Self {
        Position {
            bar: n / SIXTEENTHS_PER_BAR,
            beat: (n % SIXTEENTHS_PER_BAR) / SIXTEENTHS_PER_BEAT,
            sixteenth: n % SIXTEENTHS_PER_BEAT,
        }
    }

    pub fn to_sixteenths(self) -> u32 {
        self.bar * SIXTEENTHS_PER_BAR + self.beat * SIXTEENTHS_PER_BEAT + self.sixteenth
    }

    pub fn ticks(self, ppq: u32) -> u32 {
        self.to_sixteenths() * ppq / SIXTEENTHS_PER_BEAT
    }

    pub fn seconds(self, tempo: u32) -> f64 {
        sixteenths_to_seconds(self.to_sixteenths(), tempo)
    }

    /// Parse `"bar:beat:sixteenth"`. Fields are not range-checked, so
    /// `"0:5:0"` is accepted and means the same instant as `"1:1:0"`.
    pub fn parse(text: &str) -> Option<Self> {
        let mut parts = text.trim().split(':').map(|p| p.trim().parse::<u32>());
        let bar = parts.next()?.ok()?;
        let beat = parts.next()?.ok()?;
        let sixteenth = parts.next()?.ok()?;
        if parts.next().is_some() {
            return None;
        }
        Some(Position { bar, beat, sixteenth })
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.bar, self.beat, self.sixteenth)
    }
}

impl Serialize for Position {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Position {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Position::parse(&text)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid position '{text}'")))
    }
}

/// Position of the `n`th sixteenth-unit.
pub fn position_from_sixteenths(n: u32) -> Position {
    Position::from_sixteenths(n)
}

/// Duration token for a length in sixteenth-units.
pub fn duration_from_sixteenths(units: u32) -> Duration {
    Duration::from_sixteenths(units)
}

fn sixteenths_to_seconds(sixteenths: u32, tempo: u32) -> f64 {
    let beats = sixteenths as f64 / SIXTEENTHS_PER_BEAT as f64;
    beats * 60.0 / tempo.max(1) as f64
}
