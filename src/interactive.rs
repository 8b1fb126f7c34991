//! Reading a chord progression from the terminal.

use crate::config::MAX_CHORD_ROOT;
use std::io::{BufRead, Write};

/// Result of parsing one line of chord input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChordInput {
    Empty,
    Roots(Vec<u8>),
    Invalid(String),
}

/// Parse comma-separated MIDI root numbers, e.g. `"48, 43, 45, 41"`.
///
/// Roots above [`MAX_CHORD_ROOT`] are invalid: their triads would leave the
/// MIDI range.
pub fn parse_chord_roots(line: &str) -> ChordInput {
    let line = line.trim();
    if line.is_empty() {
        return ChordInput::Empty;
    }

    let mut roots = Vec::new();
    for item in line.split(',') {
        let item = item.trim();
        match item.parse::<i64>() {
            Ok(value) if (0..=MAX_CHORD_ROOT as i64).contains(&value) => roots.push(value as u8),
            Ok(value) => {
                return ChordInput::Invalid(format!(
                    "{} is not a chord root (0-{})",
                    value, MAX_CHORD_ROOT
                ))
            }
            Err(_) => return ChordInput::Invalid(format!("'{}' is not a number", item)),
        }
    }
    ChordInput::Roots(roots)
}

/// Ask for a chord progression and read one line.
///
/// Returns `None` for empty input, a failed read, or a line that does not
/// parse; the caller then keeps the configured progression.
pub fn prompt_chord_progression<R: BufRead, W: Write>(
    reader: &mut R,
    writer: &mut W,
) -> Option<Vec<u8>> {
    let _ = writeln!(writer);
    let _ = writeln!(
        writer,
        "Enter chord roots as MIDI numbers, comma separated (default: 48, 43, 45, 41)"
    );
    let _ = writeln!(
        writer,
        "Reference: C3=48, D3=50, E3=52, F3=53, G3=55, A3=57, B3=59"
    );
    let _ = write!(writer, "Chords > ");
    let _ = writer.flush();

    let mut line = String::new();
    if let Err(e) = reader.read_line(&mut line) {
        log::warn!("Could not read chord input: {}", e);
        return None;
    }

    match parse_chord_roots(&line) {
        ChordInput::Empty => None,
        ChordInput::Roots(roots) => {
            log::info!("Using custom chords: {:?}", roots);
            Some(roots)
        }
        ChordInput::Invalid(reason) => {
            let _ = writeln!(writer, "Invalid input ({}), using the default progression.", reason);
            log::warn!("Ignoring chord input: {}", reason);
            None
        }
    }
}
