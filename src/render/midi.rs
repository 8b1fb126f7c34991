// MIDI output for evolved melodies.
//
// Writes SMF format 1 with three tracks: tempo, melody (channel 0) and a
// block-chord accompaniment (channel 1). One melody step is
// TICKS_PER_QUARTER / steps_per_beat ticks.

use crate::config::{AppConfig, MusicConfig, RenderConfig};
use crate::error::Result;
use crate::types::REST;
use midly::{
    num::{u15, u24, u28, u4, u7},
    Format, Header, MetaMessage, MidiMessage, Smf, Timing, Track, TrackEvent, TrackEventKind,
};
use rand::Rng;
use std::path::Path;

/// Ticks per quarter note in MIDI output.
const TICKS_PER_QUARTER: u16 = 480;

const MELODY_CHANNEL: u8 = 0;
const CHORD_CHANNEL: u8 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct NoteSpan {
    start: u32,
    length: u32,
    key: u8,
    velocity: u8,
}

/// Keys of the triad played over `root`: minor on ii, iii, vi and vii,
/// diminished fifth on vii. Keys above 127 are dropped.
pub fn chord_notes(root: u8) -> Vec<u8> {
    let root_pc = root % 12;
    let third = if matches!(root_pc, 2 | 4 | 9 | 11) { 3 } else { 4 };
    let fifth = if root_pc == 11 { 6 } else { 7 };
    [0u16, third, fifth]
        .iter()
        .map(|offset| root as u16 + offset)
        .filter(|key| *key <= 127)
        .map(|key| key as u8)
        .collect()
}

/// Build the in-memory MIDI file for `melody`.
///
/// Runs of an identical pitch merge into one note, except that each held
/// step is re-struck with probability `sustain_split_prob`. The chord track
/// cycles `chord_progression` (or the configured roots), `chord_duration`
/// beats per chord, until the melody is covered.
pub fn render_smf<R: Rng>(
    melody: &[u8],
    tempo: u16,
    chord_progression: Option<&[u8]>,
    music: &MusicConfig,
    render: &RenderConfig,
    rng: &mut R,
) -> Smf<'static> {
    let ticks_per_step = (TICKS_PER_QUARTER as u32 / music.steps_per_beat.max(1) as u32).max(1);

    let mut smf = Smf::new(Header::new(
        Format::Parallel,
        Timing::Metrical(u15::new(TICKS_PER_QUARTER)),
    ));
    smf.tracks.push(tempo_track(tempo));

    let melody_notes = melody_spans(melody, ticks_per_step, render, rng);
    smf.tracks.push(note_track(b"Melody", MELODY_CHANNEL, &melody_notes));

    let progression = match chord_progression {
        Some(roots) if !roots.is_empty() => roots,
        _ => &music.chord_roots[..],
    };
    let total_ticks = melody.len() as u32 * ticks_per_step;
    let accompaniment =
        chord_spans(progression, music.chord_duration, total_ticks, render.chord_velocity);
    smf.tracks.push(note_track(b"Chords", CHORD_CHANNEL, &accompaniment));

    smf
}

/// Render and write a `.mid` file.
pub fn write_midi<P: AsRef<Path>, R: Rng>(
    path: P,
    melody: &[u8],
    tempo: u16,
    chord_progression: Option<&[u8]>,
    config: &AppConfig,
    rng: &mut R,
) -> Result<()> {
    let smf = render_smf(melody, tempo, chord_progression, &config.music, &config.render, rng);
    let mut buf = Vec::new();
    smf.write_std(&mut buf)?;
    std::fs::write(path.as_ref(), &buf)?;
    log::info!("Saved MIDI to: {}", path.as_ref().display());
    Ok(())
}

fn tempo_track(tempo: u16) -> Track<'static> {
    let micros = (60_000_000 / tempo.max(1) as u32).min(0xFF_FFFF);
    vec![
        TrackEvent {
            delta: u28::new(0),
            kind: TrackEventKind::Meta(MetaMessage::Tempo(u24::new(micros))),
        },
        TrackEvent {
            delta: u28::new(0),
            kind: TrackEventKind::Meta(MetaMessage::EndOfTrack),
        },
    ]
}

fn melody_spans<R: Rng>(
    melody: &[u8],
    ticks_per_step: u32,
    render: &RenderConfig,
    rng: &mut R,
) -> Vec<NoteSpan> {
    let mut spans = Vec::new();
    let Some(&first) = melody.first() else {
        return spans;
    };

    let mut emit = |pitch: u8, start: usize, length: usize| {
        if pitch != REST {
            spans.push(NoteSpan {
                start: start as u32 * ticks_per_step,
                length: length as u32 * ticks_per_step,
                key: pitch.min(127),
                velocity: render.melody_velocity,
            });
        }
    };

    let (mut current, mut start, mut length) = (first, 0usize, 1usize);
    for (i, &note) in melody.iter().enumerate().skip(1) {
        if note == current && note != REST {
            if rng.gen::<f64>() < render.sustain_split_prob {
                emit(current, start, length);
                start = i;
                length = 1;
            } else {
                length += 1;
            }
        } else {
            emit(current, start, length);
            current = note;
            start = i;
            length = 1;
        }
    }
    emit(current, start, length);

    spans
}

fn chord_spans(
    progression: &[u8],
    chord_beats: usize,
    total_ticks: u32,
    velocity: u8,
) -> Vec<NoteSpan> {
    let chord_ticks = chord_beats.max(1) as u32 * TICKS_PER_QUARTER as u32;
    let mut spans = Vec::new();
    if progression.is_empty() {
        return spans;
    }

    let mut tick = 0;
    for root in progression.iter().cycle() {
        if tick >= total_ticks {
            break;
        }
        for key in chord_notes(*root) {
            spans.push(NoteSpan {
                start: tick,
                length: chord_ticks,
                key,
                velocity,
            });
        }
        tick += chord_ticks;
    }
    spans
}

fn note_track(name: &'static [u8], channel: u8, notes: &[NoteSpan]) -> Track<'static> {
    let channel = u4::new(channel);

    // (tick, is_on, key, velocity); note-offs sort before note-ons at equal ticks.
    let mut events: Vec<(u32, bool, u8, u8)> = notes
        .iter()
        .flat_map(|n| {
            [
                (n.start, true, n.key, n.velocity),
                (n.start + n.length, false, n.key, 0),
            ]
        })
        .collect();
    events.sort_by_key(|(tick, is_on, key, _)| (*tick, *is_on, *key));

    let mut track: Track<'static> = vec![TrackEvent {
        delta: u28::new(0),
        kind: TrackEventKind::Meta(MetaMessage::TrackName(name)),
    }];

    let mut last_tick = 0;
    for (tick, is_on, key, velocity) in events {
        let message = if is_on {
            MidiMessage::NoteOn {
                key: u7::new(key),
                vel: u7::new(velocity),
            }
        } else {
            MidiMessage::NoteOff {
                key: u7::new(key),
                vel: u7::new(0),
            }
        };
        track.push(TrackEvent {
            delta: u28::new(tick - last_tick),
            kind: TrackEventKind::Midi { channel, message },
        });
        last_tick = tick;
    }

    track.push(TrackEvent {
        delta: u28::new(0),
        kind: TrackEventKind::Meta(MetaMessage::EndOfTrack),
    });
    track
}
