// MIDI export of generated melodies and chord tracks.
//
// Writes a Standard MIDI File (format 1) with a conductor track carrying
// tempo, time signature and title, then up to three instrument tracks:
// - Melody: one note per melody Note, channel 0.
// - Chords: every chord tone voiced from octave 3, channel 1.
// - Bass: the chord root in octave 2, channel 2.
// Empty note or chord lists leave their tracks out.
//
// Timing reads the bar:beat:sixteenth positions on the fixed 16-per-bar grid,
// so the file always declares 4/4 regardless of the melody's configured time
// signature.
//
// Uses the `midly` crate for encoding.

use crate::error::Result;
use crate::harmony::Chord;
use crate::melody::Note;
use crate::theory::Pitch;
use midly::{
    Format, Header, MetaMessage, MidiMessage, Smf, Timing, Track, TrackEvent, TrackEventKind,
    num::{u4, u7, u15, u24, u28},
};
use std::path::Path;

/// Ticks per quarter note in MIDI output.
pub const TICKS_PER_QUARTER: u16 = 480;

const MELODY_VELOCITY: u8 = 102;
const CHORD_VELOCITY: u8 = 76;
const BASS_VELOCITY: u8 = 89;

const CHORD_OCTAVE: i32 = 3;
const BASS_OCTAVE: i32 = 2;

/// Largest value a MIDI variable-length delta can hold.
const MAX_DELTA: u32 = 0x0FFF_FFFF;

/// A sounding note in absolute ticks.
#[derive(Debug, Clone, Copy)]
struct NoteSpan {
    start: u32,
    length: u32,
    key: u8,
    velocity: u8,
}

impl NoteSpan {
    fn new(pitch: Pitch, start: u32, length: u32, velocity: u8) -> Self {
        NoteSpan {
            start,
            length,
            key: pitch.midi().clamp(0, 127) as u8,
            velocity,
        }
    }
}

/// Instrument settings for one exported track.
struct TrackSpec {
    name: &'static str,
    channel: u8,
    program: u8,
}

const MELODY_TRACK: TrackSpec = TrackSpec { name: "Melody", channel: 0, program: 0 };
const CHORDS_TRACK: TrackSpec = TrackSpec { name: "Chords", channel: 1, program: 48 };
const BASS_TRACK: TrackSpec = TrackSpec { name: "Bass", channel: 2, program: 33 };

/// Encode a song and write it to `path`.
pub fn write_midi(
    path: &Path,
    notes: &[Note],
    chords: &[Chord],
    tempo: u32,
    title: &str,
) -> Result<()> {
    let smf = song_to_smf(notes, chords, tempo, title);
    let mut buf = Vec::new();
    smf.write_std(&mut buf)?;
    std::fs::write(path, &buf)?;
    log::info!(
        "wrote {} ({} tracks, {} bytes)",
        path.display(),
        smf.tracks.len(),
        buf.len()
    );
    Ok(())
}

/// Build an in-memory SMF for a melody and its chords.
pub fn song_to_smf<'a>(notes: &[Note], chords: &[Chord], tempo: u32, title: &'a str) -> Smf<'a> {
    let ppq = TICKS_PER_QUARTER as u32;
    let mut smf = Smf::new(Header::new(
        Format::Parallel,
        Timing::Metrical(u15::new(TICKS_PER_QUARTER)),
    ));
    smf.tracks.push(conductor_track(tempo, title));

    if !notes.is_empty() {
        let spans: Vec<NoteSpan> = notes
            .iter()
            .map(|n| {
                NoteSpan::new(
                    n.pitch,
                    n.start_time.ticks(ppq),
                    n.duration.ticks(ppq),
                    MELODY_VELOCITY,
                )
            })
            .collect();
        smf.tracks.push(instrument_track(&MELODY_TRACK, &spans));
    }

    if !chords.is_empty() {
        let mut chord_spans = Vec::new();
        let mut bass_spans = Vec::new();
        for chord in chords {
            let start = chord.start_time.ticks(ppq);
            let length = chord.duration.ticks(ppq);
            for pitch in chord.notes(CHORD_OCTAVE) {
                chord_spans.push(NoteSpan::new(pitch, start, length, CHORD_VELOCITY));
            }
            bass_spans.push(NoteSpan::new(
                Pitch::new(chord.root, BASS_OCTAVE),
                start,
                length,
                BASS_VELOCITY,
            ));
        }
        smf.tracks.push(instrument_track(&CHORDS_TRACK, &chord_spans));
        smf.tracks.push(instrument_track(&BASS_TRACK, &bass_spans));
    }

    smf
}

fn meta(message: MetaMessage<'_>) -> TrackEvent<'_> {
    TrackEvent {
        delta: u28::new(0),
        kind: TrackEventKind::Meta(message),
    }
}

/// Track 0: title, tempo and a 4/4 time signature.
fn conductor_track(tempo: u32, title: &str) -> Track<'_> {
    let micros_per_quarter = (60_000_000 / tempo.max(1)).min(0xFF_FFFF);
    vec![
        meta(MetaMessage::TrackName(title.as_bytes())),
        meta(MetaMessage::Tempo(u24::new(micros_per_quarter))),
        // 4/4, 24 clocks per click, 8 32nds per quarter.
        meta(MetaMessage::TimeSignature(4, 2, 24, 8)),
        meta(MetaMessage::EndOfTrack),
    ]
}

fn instrument_track(spec: &TrackSpec, spans: &[NoteSpan]) -> Track<'static> {
    let channel = u4::new(spec.channel);
    let mut track: Track<'static> = vec![
        meta(MetaMessage::TrackName(spec.name.as_bytes())),
        TrackEvent {
            delta: u28::new(0),
            kind: TrackEventKind::Midi {
                channel,
                message: MidiMessage::ProgramChange {
                    program: u7::new(spec.program),
                },
            },
        },
    ];

    // (tick, is_on, key, velocity). Offs sort before ons at the same tick so
    // repeated keys retrigger cleanly.
    let mut events: Vec<(u32, bool, u8, u8)> = Vec::with_capacity(spans.len() * 2);
    for span in spans {
        events.push((span.start, true, span.key, span.velocity));
        events.push((span.start + span.length, false, span.key, 0));
    }
    events.sort_by_key(|&(tick, is_on, key, _)| (tick, is_on, key));

    let mut last_tick = 0u32;
    for (tick, is_on, key, velocity) in events {
        let delta = (tick - last_tick).min(MAX_DELTA);
        last_tick = tick;
        let key = u7::new(key);
        let message = if is_on {
            MidiMessage::NoteOn { key, vel: u7::new(velocity) }
        } else {
            MidiMessage::NoteOff { key, vel: u7::new(0) }
        };
        track.push(TrackEvent {
            delta: u28::new(delta),
            kind: TrackEventKind::Midi { channel, message },
        });
    }

    track.push(meta(MetaMessage::EndOfTrack));
    track
}
