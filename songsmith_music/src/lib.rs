// Songsmith music engine
//
// Turns songwriting parameters (key, scale, progression, bar count, and an
// optional syllable pattern from the lyric editor) into time-stamped notes and
// chords. The outputs feed the playback scheduler, the notation view and the
// MIDI/JSON exporters, all of which rely on the string forms defined here:
// pitches as `<name><octave>`, durations as `1n`..`16n`, positions as
// `bar:beat:sixteenth`.
//
// Architecture:
// - theory.rs: Pitch classes, pitches, scale/chord/progression tables
// - time.rs: Durations and positions on the fixed 16-per-bar grid
// - harmony.rs: Progression realization and chord substitution suggestions
// - rhythm.rs: Greedy target-driven rhythm patterns (tunable thresholds)
// - contour.rs: Melodic contour shapes and degree-to-octave banding
// - melody.rs: Melody assembly from rhythm + contour
// - lyrics.rs: Word counts and syllable estimates for sizing melodies
// - midi.rs: Standard MIDI File export (melody, chords, bass)
// - project.rs: JSON project files
// - error.rs: Error type for the I/O-facing layer
//
// Randomness comes only from the `RandomSource` handed to each call (see the
// songsmith_prng crate), so a seeded source reproduces a melody exactly.

pub mod contour;
pub mod error;
pub mod harmony;
pub mod lyrics;
pub mod melody;
pub mod midi;
pub mod project;
pub mod rhythm;
pub mod theory;
pub mod time;

pub use error::{Result, SongsmithError};
