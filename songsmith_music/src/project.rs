// Project files: the whole song (lyrics, melody, harmony, mixer) as JSON.
//
// The layout is camelCase JSON with notes and chords in their playback form
// (pitch strings, duration tokens, bar:beat:sixteenth positions), so a file
// saved here loads directly into the playback and notation views. Files
// written by the browser app carry the same keys and round-trip unchanged.
//
// `version`, `lyrics`, `melody` and `harmony` are required. Timestamps and
// the instrument list are optional on load.

use crate::error::{Result, SongsmithError};
use crate::harmony::Chord;
use crate::melody::{MelodyConfig, Note};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Format version written by this crate.
pub const PROJECT_VERSION: &str = "1.0.0";

/// Mixer volume given to newly added instruments.
pub const DEFAULT_VOLUME: f64 = 0.7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SectionKind {
    Intro,
    Verse,
    Chorus,
    Bridge,
    Outro,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SongSection {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: SectionKind,
    pub lines: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LyricsSheet {
    pub theme: String,
    pub mood: String,
    pub genre: String,
    /// Target syllables per line, if the writer set one.
    pub syllables_per_line: Option<u32>,
    pub words_per_line: Option<u32>,
    /// Rhyme pattern such as `"ABAB"`. Empty when unset.
    pub rhyme_scheme: String,
    pub sections: Vec<SongSection>,
}

impl LyricsSheet {
    /// Every lyric line in section order.
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.sections
            .iter()
            .flat_map(|s| s.lines.iter().map(String::as_str))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MelodyPart {
    pub config: MelodyConfig,
    pub notes: Vec<Note>,
    pub bars: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HarmonyPart {
    pub chords: Vec<Chord>,
    #[serde(default)]
    pub progression_name: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InstrumentKind {
    Melody,
    Chords,
    Bass,
    Drums,
}

/// One mixer strip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Instrument {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: InstrumentKind,
    /// Linear gain in 0.0..=1.0.
    pub volume: f64,
    #[serde(default)]
    pub muted: bool,
    #[serde(default)]
    pub solo: bool,
}

impl Instrument {
    pub fn new(id: impl Into<String>, name: impl Into<String>, kind: InstrumentKind) -> Self {
        Instrument {
            id: id.into(),
            name: name.into(),
            kind,
            volume: DEFAULT_VOLUME,
            muted: false,
            solo: false,
        }
    }

    /// The melody, chords and bass strips matching the MIDI export tracks.
    pub fn standard_set() -> Vec<Instrument> {
        vec![
            Instrument::new("piano", "Piano", InstrumentKind::Melody),
            Instrument::new("strings", "Strings", InstrumentKind::Chords),
            Instrument::new("bass", "Bass", InstrumentKind::Bass),
        ]
    }

    /// Unmuted, and soloed whenever any strip is soloed.
    pub fn is_audible(&self, any_solo: bool) -> bool {
        !self.muted && (!any_solo || self.solo)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub version: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    pub lyrics: LyricsSheet,
    pub melody: MelodyPart,
    pub harmony: HarmonyPart,
    #[serde(default)]
    pub instruments: Vec<Instrument>,
}

impl Project {
    /// A new project stamped with the current time and no instruments.
    pub fn new(title: impl Into<String>, melody: MelodyPart, harmony: HarmonyPart) -> Self {
        let now = Utc::now();
        Project {
            version: PROJECT_VERSION.to_string(),
            title: title.into(),
            created_at: Some(now),
            updated_at: Some(now),
            lyrics: LyricsSheet::default(),
            melody,
            harmony,
            instruments: Vec::new(),
        }
    }

    /// Mark the project as modified now.
    pub fn touch(&mut self) {
        self.updated_at = Some(Utc::now());
    }

    /// Instruments that should sound given the mute and solo flags.
    pub fn audible_instruments(&self) -> impl Iterator<Item = &Instrument> {
        let any_solo = self.instruments.iter().any(|i| i.solo);
        self.instruments.iter().filter(move |i| i.is_audible(any_solo))
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse a project. Missing lyrics, melody or harmony sections,
    /// malformed pitches and malformed positions are all rejected.
    pub fn from_json(json: &str) -> Result<Self> {
        let project: Project = serde_json::from_str(json)?;
        if project.version.trim().is_empty() {
            return Err(SongsmithError::InvalidProject("missing version".to_string()));
        }
        Ok(project)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        std::fs::write(path, self.to_json()?)?;
        log::info!("saved project '{}' to {}", self.title, path.display());
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path)?;
        let project = Self::from_json(&data)?;
        log::info!(
            "loaded project '{}' ({} notes, {} chords, {} instruments)",
            project.title,
            project.melody.notes.len(),
            project.harmony.chords.len(),
            project.instruments.len()
        );
        Ok(project)
    }
}
