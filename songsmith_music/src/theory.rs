// Music theory primitives: pitch classes, pitches, scales, chords, and the
// progression table.
//
// Everything here is pure lookup and integer arithmetic over 12-tone equal
// temperament with sharp spellings. The scale, chord-type and progression
// tables are fixed vocabularies: pickers enumerate them in the order given
// here, so the `ALL` arrays and `PROGRESSIONS` must keep their order.
//
// Lookups by name never fail. Unknown note names resolve to C, unknown
// scales to major, unknown chord types to a major triad. The string-facing
// helpers (`note_index`, `scale_notes`, `chord_notes`, ...) exist for callers
// that hold names from a UI or a project file; the typed methods are what
// the generators use internally.
//
// Consumed by harmony.rs, melody.rs, contour.rs and midi.rs.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// One of the 12 equal-tempered note names, spelled with sharps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PitchClass {
    C,
    #[serde(rename = "C#")]
    CSharp,
    D,
    #[serde(rename = "D#")]
    DSharp,
    E,
    F,
    #[serde(rename = "F#")]
    FSharp,
    G,
    #[serde(rename = "G#")]
    GSharp,
    A,
    #[serde(rename = "A#")]
    ASharp,
    B,
}

impl PitchClass {
    pub const ALL: [PitchClass; 12] = [
        PitchClass::C,
        PitchClass::CSharp,
        PitchClass::D,
        PitchClass::DSharp,
        PitchClass::E,
        PitchClass::F,
        PitchClass::FSharp,
        PitchClass::G,
        PitchClass::GSharp,
        PitchClass::A,
        PitchClass::ASharp,
        PitchClass::B,
    ];

    /// Semitones above C (C = 0, B = 11).
    pub fn index(self) -> u8 {
        self as u8
    }

    /// Pitch class for any integer, negative values included (floor-mod 12).
    pub fn from_index(index: i64) -> Self {
        Self::ALL[index.rem_euclid(12) as usize]
    }

    pub fn name(self) -> &'static str {
        match self {
            PitchClass::C => "C",
            PitchClass::CSharp => "C#",
            PitchClass::D => "D",
            PitchClass::DSharp => "D#",
            PitchClass::E => "E",
            PitchClass::F => "F",
            PitchClass::FSharp => "F#",
            PitchClass::G => "G",
            PitchClass::GSharp => "G#",
            PitchClass::A => "A",
            PitchClass::ASharp => "A#",
            PitchClass::B => "B",
        }
    }

    /// Exact match against the canonical sharp names.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|pc| pc.name() == name)
    }

    pub fn transpose(self, semitones: i64) -> Self {
        Self::from_index(self.index() as i64 + semitones)
    }
}

impl fmt::Display for PitchClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A pitch class in a specific octave. Middle C is `C4`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Pitch {
    pub class: PitchClass,
    pub octave: i32,
}

impl Pitch {
    pub fn new(class: PitchClass, octave: i32) -> Self {
        Pitch { class, octave }
    }

    /// Strict parse of `<name><octave>` such as `"F#5"` or `"C-1"`.
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        let split = text.find(|c: char| c.is_ascii_digit() || c == '-')?;
        let (name, octave) = text.split_at(split);
        Some(Pitch {
            class: PitchClass::from_name(name)?,
            octave: octave.parse().ok()?,
        })
    }

    /// MIDI note number (C4 = 60). Not clamped to 0..=127.
    pub fn midi(self) -> i32 {
        (self.octave + 1) * 12 + self.class.index() as i32
    }

    /// MIDI number for a pitch string, falling back to middle C when the
    /// string does not parse.
    pub fn midi_or_middle_c(text: &str) -> i32 {
        Pitch::parse(text).map_or(60, Pitch::midi)
    }
}

impl fmt::Display for Pitch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.class, self.octave)
    }
}

impl Serialize for Pitch {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Pitch {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Pitch::parse(&text)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid pitch '{text}'")))
    }
}

/// Named interval sets, in user-facing order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scale {
    Major,
    /// Natural minor.
    Minor,
    Pentatonic,
    Blues,
    Dorian,
    Mixolydian,
}

impl Scale {
    pub const ALL: [Scale; 6] = [
        Scale::Major,
        Scale::Minor,
        Scale::Pentatonic,
        Scale::Blues,
        Scale::Dorian,
        Scale::Mixolydian,
    ];

    /// Semitone offsets from the root.
    pub fn intervals(self) -> &'static [u8] {
        match self {
            Scale::Major => &[0, 2, 4, 5, 7, 9, 11],
            Scale::Minor => &[0, 2, 3, 5, 7, 8, 10],
            Scale::Pentatonic => &[0, 2, 4, 7, 9],
            Scale::Blues => &[0, 3, 5, 6, 7, 10],
            Scale::Dorian => &[0, 2, 3, 5, 7, 9, 10],
            Scale::Mixolydian => &[0, 2, 4, 5, 7, 9, 10],
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Scale::Major => "major",
            Scale::Minor => "minor",
            Scale::Pentatonic => "pentatonic",
            Scale::Blues => "blues",
            Scale::Dorian => "dorian",
            Scale::Mixolydian => "mixolydian",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.name() == name)
    }

    /// Like `from_name`, but unknown names resolve to major.
    pub fn lookup(name: &str) -> Self {
        Self::from_name(name).unwrap_or_else(|| {
            log::warn!("unknown scale '{name}', using major");
            Scale::Major
        })
    }

    /// Ordered pitch classes of this scale starting on `root`.
    pub fn notes(self, root: PitchClass) -> Vec<PitchClass> {
        self.intervals()
            .iter()
            .map(|&iv| root.transpose(iv as i64))
            .collect()
    }
}

/// Chord qualities with their interval sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChordType {
    #[serde(rename = "major")]
    Major,
    #[serde(rename = "minor")]
    Minor,
    #[serde(rename = "dim")]
    Diminished,
    #[serde(rename = "aug")]
    Augmented,
    #[serde(rename = "7", alias = "dominant7")]
    Dominant7,
    #[serde(rename = "maj7", alias = "major7")]
    Major7,
    #[serde(rename = "min7", alias = "minor7")]
    Minor7,
    #[serde(rename = "sus2")]
    Sus2,
    #[serde(rename = "sus4")]
    Sus4,
}

impl ChordType {
    pub const ALL: [ChordType; 9] = [
        ChordType::Major,
        ChordType::Minor,
        ChordType::Diminished,
        ChordType::Augmented,
        ChordType::Dominant7,
        ChordType::Major7,
        ChordType::Minor7,
        ChordType::Sus2,
        ChordType::Sus4,
    ];

    pub fn intervals(self) -> &'static [u8] {
        match self {
            ChordType::Major => &[0, 4, 7],
            ChordType::Minor => &[0, 3, 7],
            ChordType::Diminished => &[0, 3, 6],
            ChordType::Augmented => &[0, 4, 8],
            ChordType::Dominant7 => &[0, 4, 7, 10],
            ChordType::Major7 => &[0, 4, 7, 11],
            ChordType::Minor7 => &[0, 3, 7, 10],
            ChordType::Sus2 => &[0, 2, 7],
            ChordType::Sus4 => &[0, 5, 7],
        }
    }

    /// Short name used in files and pickers.
    pub fn name(self) -> &'static str {
        match self {
            ChordType::Major => "major",
            ChordType::Minor => "minor",
            ChordType::Diminished => "dim",
            ChordType::Augmented => "aug",
            ChordType::Dominant7 => "7",
            ChordType::Major7 => "maj7",
            ChordType::Minor7 => "min7",
            ChordType::Sus2 => "sus2",
            ChordType::Sus4 => "sus4",
        }
    }

    /// Accepts the short names plus the spelled-out seventh names.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "dominant7" => Some(ChordType::Dominant7),
            "major7" => Some(ChordType::Major7),
            "minor7" => Some(ChordType::Minor7),
            _ => Self::ALL.into_iter().find(|t| t.name() == name),
        }
    }

    /// Like `from_name`, but unknown names resolve to a major triad.
    pub fn lookup(name: &str) -> Self {
        Self::from_name(name).unwrap_or_else(|| {
            log::warn!("unknown chord type '{name}', using major");
            ChordType::Major
        })
    }

    /// Chord tones from `root` upward, starting in `octave`.
    ///
    /// The octave of each tone is derived from its absolute semitone offset,
    /// so an interval that wraps past B lands in the next octave (A minor in
    /// octave 3 is A3 C4 E4).
    pub fn notes(self, root: PitchClass, octave: i32) -> Vec<Pitch> {
        let root_index = root.index() as i32;
        self.intervals()
            .iter()
            .map(|&iv| {
                let semis = root_index + iv as i32;
                Pitch::new(PitchClass::from_index(semis as i64), octave + semis / 12)
            })
            .collect()
    }
}

impl fmt::Display for ChordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A named chord template: diatonic degrees (0-based) in playing order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progression {
    pub name: &'static str,
    pub degrees: &'static [usize],
}

/// Built-in progressions, in user-facing order.
pub static PROGRESSIONS: [Progression; 6] = [
    Progression { name: "I-IV-V-I", degrees: &[0, 3, 4, 0] },
    Progression { name: "I-V-vi-IV", degrees: &[0, 4, 5, 3] },
    Progression { name: "ii-V-I", degrees: &[1, 4, 0] },
    Progression { name: "I-vi-IV-V", degrees: &[0, 5, 3, 4] },
    Progression { name: "vi-IV-I-V", degrees: &[5, 3, 0, 4] },
    Progression { name: "I-IV-vi-V", degrees: &[0, 3, 5, 4] },
];

impl Progression {
    pub fn by_name(name: &str) -> Option<&'static Progression> {
        PROGRESSIONS.iter().find(|p| p.name == name)
    }
}

/// Pitch-class index (0-11) of a note name, ignoring any octave suffix.
///
/// `"F#5"` and `"F#"` both give 6. Unrecognized names give 0 (C).
pub fn note_index(name: &str) -> u8 {
    let base = name
        .trim()
        .trim_end_matches(|c: char| c.is_ascii_digit() || c == '-');
    match PitchClass::from_name(base) {
        Some(pc) => pc.index(),
        None => {
            log::warn!("unknown note name '{name}', treating as C");
            0
        }
    }
}

/// Pitch class for any integer index (floor-mod 12).
pub fn note_name(index: i64) -> PitchClass {
    PitchClass::from_index(index)
}

/// Pitch class for a note name, with the same fallback as `note_index`.
pub fn pitch_class(name: &str) -> PitchClass {
    note_name(note_index(name) as i64)
}

/// Ordered pitch classes of `scale_name` rooted on `root`.
pub fn scale_notes(root: &str, scale_name: &str) -> Vec<PitchClass> {
    Scale::lookup(scale_name).notes(pitch_class(root))
}

/// Interval set of `chord_type`; unknown types give the major triad.
pub fn chord_intervals(chord_type: &str) -> &'static [u8] {
    ChordType::lookup(chord_type).intervals()
}

/// Chord tones of `root` + `chord_type` starting in `octave`.
pub fn chord_notes(root: &str, chord_type: &str, octave: i32) -> Vec<Pitch> {
    ChordType::lookup(chord_type).notes(pitch_class(root), octave)
}
