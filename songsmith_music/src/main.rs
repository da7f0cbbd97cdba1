// Songsmith CLI: generate melodies and chord progressions from the terminal.
//
// Subcommands:
//   melody      generate a melody (optionally sized to a lyric file)
//   harmony     realize a progression in a key
//   song        melody + harmony, optionally written to MIDI and/or JSON
//   substitute  list substitution suggestions for one chord
//   tables      list the scale, chord-type and progression vocabularies
//
// Without --seed a seed is derived from the clock and printed, so any run can
// be reproduced.

use clap::{ArgAction, Args, Parser, Subcommand};
use songsmith_music::harmony::{Chord, generate_harmony, progression_steps, suggest_substitutions};
use songsmith_music::lyrics::fit_lyrics;
use songsmith_music::melody::{MelodyConfig, Note, generate_melody_with};
use songsmith_music::midi::write_midi;
use songsmith_music::project::{
    HarmonyPart, Instrument, MelodyPart, Project, SectionKind, SongSection,
};
use songsmith_music::rhythm::RhythmThresholds;
use songsmith_music::theory::{ChordType, PROGRESSIONS, Scale, pitch_class};
use songsmith_music::time::{Duration, Position};
use songsmith_music::{Result, SongsmithError};
use songsmith_prng::SongRng;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "songsmith", about = "Procedural melody and harmony generator", version)]
struct Cli {
    /// Log more (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args)]
struct MusicArgs {
    /// Key root, e.g. C or F#
    #[arg(long, default_value = "C")]
    key: String,

    /// Scale name (see `songsmith tables`)
    #[arg(long, default_value = "major")]
    scale: String,

    /// Tempo in BPM
    #[arg(long, default_value_t = 120)]
    tempo: u32,

    /// Time signature as N/D
    #[arg(long, default_value = "4/4", value_parser = parse_time_signature)]
    time_signature: (u32, u32),

    /// Number of bars
    #[arg(long, default_value_t = 4)]
    bars: i32,

    /// RNG seed for reproducible output
    #[arg(long)]
    seed: Option<u64>,
}

impl MusicArgs {
    fn config(&self) -> MelodyConfig {
        MelodyConfig {
            key: self.key.clone(),
            scale: self.scale.clone(),
            tempo: self.tempo,
            time_signature: self.time_signature,
        }
    }

    fn rng(&self) -> SongRng {
        let seed = self.seed.unwrap_or_else(clock_seed);
        println!("Seed: {seed}");
        SongRng::new(seed)
    }
}

#[derive(Args)]
struct MelodyArgs {
    /// Syllables per lyric line, comma separated
    #[arg(long, value_delimiter = ',')]
    syllables: Vec<u32>,

    /// Size the melody to the words in this lyric file
    #[arg(long, conflicts_with = "syllables")]
    lyrics: Option<PathBuf>,

    /// JSON file overriding the rhythm tier thresholds
    #[arg(long)]
    rhythm_config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Command {
    /// Generate a melody
    Melody {
        #[command(flatten)]
        music: MusicArgs,
        #[command(flatten)]
        melody: MelodyArgs,
    },

    /// Realize a chord progression
    Harmony {
        #[command(flatten)]
        music: MusicArgs,
        /// Progression name (see `songsmith tables`)
        #[arg(long, default_value = "I-V-vi-IV")]
        progression: String,
    },

    /// Generate melody and harmony together
    Song {
        #[command(flatten)]
        music: MusicArgs,
        #[command(flatten)]
        melody: MelodyArgs,
        /// Progression name (see `songsmith tables`)
        #[arg(long, default_value = "I-V-vi-IV")]
        progression: String,
        /// Song title for exported files
        #[arg(long, default_value = "Untitled")]
        title: String,
        /// Write a MIDI file
        #[arg(long)]
        midi: Option<PathBuf>,
        /// Write a JSON project file
        #[arg(long)]
        json: Option<PathBuf>,
    },

    /// Suggest substitutions for a chord
    Substitute {
        /// Chord root, e.g. G
        root: String,
        /// Chord type, e.g. major, minor, 7
        chord_type: String,
    },

    /// List scales, chord types and progressions
    Tables,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(cli.command) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn run(command: Command) -> Result<()> {
    match command {
        Command::Melody { music, melody } => {
            let lyrics = read_lyrics(melody.lyrics.as_deref())?;
            let (notes, _) = make_melody(&music, &melody, &lyrics)?;
            print_notes(&notes);
        }
        Command::Harmony { music, progression } => {
            print_progression(&music, &progression);
            let chords = generate_harmony(&music.key, &music.scale, &progression, music.bars);
            print_chords(&chords);
        }
        Command::Song {
            music,
            melody,
            progression,
            title,
            midi,
            json,
        } => {
            let lyrics = read_lyrics(melody.lyrics.as_deref())?;
            let (notes, chords, bars) = song_parts(&music, &melody, &progression, &lyrics)?;
            println!("Title: {title}");
            print_progression(&music, &progression);
            print_notes(&notes);
            print_chords(&chords);

            if let Some(path) = midi {
                write_midi(&path, &notes, &chords, music.tempo, &title)?;
                println!("Wrote MIDI to {}", path.display());
            }
            if let Some(path) = json {
                let bars = notes
                    .last()
                    .map_or(0, |n| n.start_time.bar + 1)
                    .max(bars.max(0) as u32);
                let mut project = Project::new(
                    title,
                    MelodyPart {
                        config: music.config(),
                        notes,
                        bars,
                    },
                    HarmonyPart {
                        chords,
                        progression_name: Some(progression),
                    },
                );
                project.instruments = Instrument::standard_set();
                if !lyrics.is_empty() {
                    project.lyrics.sections.push(SongSection {
                        id: "verse-1".to_string(),
                        kind: SectionKind::Verse,
                        lines: lyrics,
                    });
                }
                project.save(&path)?;
                println!("Wrote project to {}", path.display());
            }
        }
        Command::Substitute { root, chord_type } => {
            let chord = Chord {
                root: pitch_class(&root),
                chord_type: ChordType::lookup(&chord_type),
                duration: Duration::Whole,
                start_time: Position::default(),
            };
            let subs = suggest_substitutions(&chord);
            if subs.is_empty() {
                println!("No substitutions for {}{}", chord.root, chord.chord_type);
            }
            for sub in subs {
                println!("{}{}", sub.root, sub.chord_type);
            }
        }
        Command::Tables => {
            let scales: Vec<&str> = Scale::ALL.iter().map(|s| s.name()).collect();
            let chord_types: Vec<&str> = ChordType::ALL.iter().map(|c| c.name()).collect();
            println!("Scales: {}", scales.join(", "));
            println!("Chord types: {}", chord_types.join(", "));
            println!("Progressions:");
            for p in &PROGRESSIONS {
                println!("  {:<10} {:?}", p.name, p.degrees);
            }
        }
    }
    Ok(())
}

/// Melody plus the bar count it was generated for, which a lyric may raise
/// above `--bars`.
fn make_melody(
    music: &MusicArgs,
    args: &MelodyArgs,
    lyrics: &[String],
) -> Result<(Vec<Note>, i32)> {
    let thresholds = match &args.rhythm_config {
        Some(path) => RhythmThresholds::load(path)?,
        None => RhythmThresholds::default(),
    };
    let config = music.config();
    let mut rng = music.rng();

    if args.lyrics.is_some() {
        let fit = fit_lyrics(lyrics, music.bars);
        println!(
            "Lyrics: {} words, ~{} syllables, {} bars",
            fit.words, fit.syllables, fit.bars
        );
        let notes =
            generate_melody_with(&config, fit.bars, Some(&[fit.syllables]), &thresholds, &mut rng);
        return Ok((notes, fit.bars));
    }
    let syllables = args.syllables.as_slice();
    let notes = generate_melody_with(&config, music.bars, Some(syllables), &thresholds, &mut rng);
    Ok((notes, music.bars))
}

/// Melody and harmony over the same bar count.
fn song_parts(
    music: &MusicArgs,
    melody: &MelodyArgs,
    progression: &str,
    lyrics: &[String],
) -> Result<(Vec<Note>, Vec<Chord>, i32)> {
    let (notes, bars) = make_melody(music, melody, lyrics)?;
    let chords = generate_harmony(&music.key, &music.scale, progression, bars);
    Ok((notes, chords, bars))
}

fn read_lyrics(path: Option<&Path>) -> Result<Vec<String>> {
    let Some(path) = path else {
        return Ok(Vec::new());
    };
    let text = std::fs::read_to_string(path)?;
    Ok(text
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(String::from)
        .collect())
}

fn print_progression(music: &MusicArgs, progression: &str) {
    let steps = progression_steps(&music.key, &music.scale, progression);
    if steps.is_empty() {
        println!("Unknown progression '{progression}'");
        return;
    }
    let shown: Vec<String> = steps
        .iter()
        .map(|s| format!("{} ({}{})", s.numeral, s.root, s.chord_type))
        .collect();
    println!("Progression: {}", shown.join(" - "));
}

fn print_notes(notes: &[Note]) {
    println!("Melody: {} notes", notes.len());
    for note in notes {
        println!(
            "  {:<8} {:<4} {}",
            note.start_time.to_string(),
            note.duration.token(),
            note.pitch
        );
    }
}

fn print_chords(chords: &[Chord]) {
    println!("Chords: {}", chords.len());
    for chord in chords {
        println!(
            "  {:<8} {:<4} {}{}",
            chord.start_time.to_string(),
            chord.duration.token(),
            chord.root,
            chord.chord_type
        );
    }
}

fn parse_time_signature(text: &str) -> std::result::Result<(u32, u32), SongsmithError> {
    let invalid = || SongsmithError::InvalidTimeSignature(text.to_string());
    let (num, den) = text.split_once('/').ok_or_else(invalid)?;
    let num: u32 = num.trim().parse().map_err(|_| invalid())?;
    let den: u32 = den.trim().parse().map_err(|_| invalid())?;
    if num == 0 || den == 0 {
        return Err(invalid());
    }
    Ok((num, den))
}

fn clock_seed() -> u64 {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map_or(0, |d| d.as_nanos() as u64);
    nanos ^ ((std::process::id() as u64) << 32)
}

/// `-v` raises the level; `RUST_LOG` still overrides it.
fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        _ => log::LevelFilter::Debug,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .format_timestamp(None)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn music(bars: i32) -> MusicArgs {
        MusicArgs {
            key: "C".to_string(),
            scale: "major".to_string(),
            tempo: 120,
            time_signature: (4, 4),
            bars,
            seed: Some(7),
        }
    }

    fn lyric_args() -> MelodyArgs {
        MelodyArgs {
            syllables: Vec::new(),
            lyrics: Some(PathBuf::from("verse.txt")),
            rhythm_config: None,
        }
    }

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_song_harmony_covers_lyric_bars() {
        // 17 words need 3 bars, more than the 1 requested.
        let lyrics = vec![
            "the river runs beneath the silver moonlit sky tonight".to_string(),
            "and every word I never said comes back".to_string(),
        ];
        let (notes, chords, bars) =
            song_parts(&music(1), &lyric_args(), "I-V-vi-IV", &lyrics).unwrap();
        assert_eq!(bars, 3);
        assert_eq!(chords.len(), 3);
        let last_bar = notes.last().unwrap().start_time.bar;
        assert_eq!(chords.last().unwrap().start_time.bar, last_bar);
    }

    #[test]
    fn test_song_without_lyrics_keeps_requested_bars() {
        let args = MelodyArgs {
            syllables: vec![6, 6],
            lyrics: None,
            rhythm_config: None,
        };
        let (_, chords, bars) = song_parts(&music(4), &args, "I-IV-V-I", &[]).unwrap();
        assert_eq!(bars, 4);
        assert_eq!(chords.len(), 4);
    }

    #[test]
    fn test_time_signature_parsing() {
        assert_eq!(parse_time_signature("6/8").unwrap(), (6, 8));
        assert_eq!(parse_time_signature(" 3 / 4 ").unwrap(), (3, 4));
        assert!(parse_time_signature("4").is_err());
        assert!(parse_time_signature("0/4").is_err());
        assert!(parse_time_signature("x/4").is_err());
    }
}
