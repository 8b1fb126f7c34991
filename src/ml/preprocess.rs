//! Turn MIDI files into token sequences for model training.

use crate::config::MusicConfig;
use crate::error::{MelodyError, Result};
use crate::ml::tokenizer::SUSTAIN_TOKEN;
use midly::{MidiMessage, Smf, Timing, TrackEventKind};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

const DRUM_CHANNEL: u8 = 9;

#[derive(Debug, Clone, Copy)]
struct NoteSpan {
    start: u64,
    end: u64,
    key: u8,
}

/// Tokenize the melody of a MIDI file onto the configured step grid.
///
/// The melody is the first track with non-drum notes; at each step the
/// highest sounding key wins. Output is padded with rests or truncated to
/// `music.total_steps()`. Returns `None` when the file has no melodic notes.
pub fn midi_to_tokens(bytes: &[u8], music: &MusicConfig) -> Result<Option<Vec<u16>>> {
    let smf = Smf::parse(bytes)?;
    let ticks_per_beat = match smf.header.timing {
        Timing::Metrical(tpq) => tpq.as_int() as u64,
        Timing::Timecode(..) => {
            return Err(MelodyError::Midi("SMPTE timecode files are not supported".to_string()))
        }
    };
    let ticks_per_step = (ticks_per_beat / music.steps_per_beat.max(1) as u64).max(1);

    let Some(notes) = smf.tracks.iter().map(|t| melodic_notes(t)).find(|n| !n.is_empty()) else {
        return Ok(None);
    };

    let total_steps = music.total_steps();
    let mut tokens = Vec::with_capacity(total_steps);
    let mut last_pitch: Option<u8> = None;
    for step in 0..total_steps as u64 {
        let from = step * ticks_per_step;
        let to = from + ticks_per_step;
        let top = notes
            .iter()
            .filter(|n| n.start < to && n.end > from)
            .map(|n| n.key)
            .max();
        match top {
            None => {
                tokens.push(0);
                last_pitch = None;
            }
            Some(key) if last_pitch == Some(key) => tokens.push(SUSTAIN_TOKEN),
            Some(key) => {
                tokens.push(key as u16);
                last_pitch = Some(key);
            }
        }
    }
    Ok(Some(tokens))
}

fn melodic_notes(track: &[midly::TrackEvent]) -> Vec<NoteSpan> {
    let mut tick: u64 = 0;
    let mut open: HashMap<(u8, u8), u64> = HashMap::new();
    let mut notes = Vec::new();

    for event in track {
        tick += event.delta.as_int() as u64;
        let TrackEventKind::Midi { channel, message } = event.kind else {
            continue;
        };
        let channel = channel.as_int();
        if channel == DRUM_CHANNEL {
            continue;
        }
        match message {
            MidiMessage::NoteOn { key, vel } if vel.as_int() > 0 => {
                open.entry((channel, key.as_int())).or_insert(tick);
            }
            MidiMessage::NoteOn { key, .. } | MidiMessage::NoteOff { key, .. } => {
                if let Some(start) = open.remove(&(channel, key.as_int())) {
                    notes.push(NoteSpan {
                        start,
                        end: tick,
                        key: key.as_int(),
                    });
                }
            }
            _ => {}
        }
    }

    // Notes still held at the end of the track last until its final tick.
    for ((_, key), start) in open {
        notes.push(NoteSpan { start, end: tick, key });
    }
    notes.retain(|n| n.key > 0 && n.end > n.start);
    notes
}

/// Tokenize every `.mid`/`.midi` file under `dir` (not recursive).
/// Unreadable or note-less files are skipped with a warning.
pub fn load_corpus<P: AsRef<Path>>(dir: P, music: &MusicConfig) -> Result<Vec<Vec<u16>>> {
    let mut paths: Vec<PathBuf> = std::fs::read_dir(dir.as_ref())?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| {
            p.extension()
                .and_then(|e| e.to_str())
                .map(|e| e.eq_ignore_ascii_case("mid") || e.eq_ignore_ascii_case("midi"))
                .unwrap_or(false)
        })
        .collect();
    paths.sort();

    let mut corpus = Vec::new();
    for path in paths {
        let parsed = std::fs::read(&path)
            .map_err(MelodyError::from)
            .and_then(|bytes| midi_to_tokens(&bytes, music));
        match parsed {
            Ok(Some(tokens)) => corpus.push(tokens),
            Ok(None) => log::warn!("Skipping {}: no melodic notes", path.display()),
            Err(e) => log::warn!("Skipping {}: {}", path.display(), e),
        }
    }
    log::info!("Loaded {} sequences from {}", corpus.len(), dir.as_ref().display());
    Ok(corpus)
}
