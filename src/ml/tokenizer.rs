//! Token view of melodies for sequence models.
//!
//! `0` is a rest, `1..=127` a freshly struck pitch and [`SUSTAIN_TOKEN`] a
//! step that holds the previous pitch.

use crate::types::REST;

pub const SUSTAIN_TOKEN: u16 = 128;
pub const VOCAB_SIZE: usize = 130;

pub fn melody_to_tokens(melody: &[u8]) -> Vec<u16> {
    melody
        .iter()
        .enumerate()
        .map(|(i, note)| match *note {
            REST => 0,
            pitch if i > 0 && melody[i - 1] == pitch => SUSTAIN_TOKEN,
            pitch => pitch as u16,
        })
        .collect()
}
