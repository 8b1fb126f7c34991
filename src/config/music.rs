use super::traits::{invalid, ConfigSection};
use crate::error::MelodyError;
use serde::{Deserialize, Serialize};

/// Highest chord root whose triad (up to a fifth above) stays inside MIDI.
pub const MAX_CHORD_ROOT: u8 = 127 - 7;

/// Musical frame every melody is generated and scored in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MusicConfig {
    pub bars: usize,
    pub beats_per_bar: usize,
    pub steps_per_beat: usize,
    pub pitch_min: u8,
    pub pitch_max: u8,
    pub rest_prob: f64,
    /// Pitch classes of the scale, ascending.
    pub scale: Vec<u8>,
    /// Bass roots of the accompaniment, one per bar, cycled.
    pub chord_roots: Vec<u8>,
    /// Length of one accompaniment chord, in beats.
    pub chord_duration: usize,
}

impl Default for MusicConfig {
    fn default() -> Self {
        Self {
            bars: 4,
            beats_per_bar: 4,
            steps_per_beat: 2,
            pitch_min: 60,
            pitch_max: 84,
            rest_prob: 0.3,
            scale: vec![0, 2, 4, 5, 7, 9, 11],
            chord_roots: vec![48, 43, 45, 41],
            chord_duration: 4,
        }
    }
}

impl MusicConfig {
    pub fn steps_per_bar(&self) -> usize {
        self.beats_per_bar * self.steps_per_beat
    }

    /// Total number of steps in one melody.
    pub fn total_steps(&self) -> usize {
        self.bars * self.steps_per_bar()
    }

    pub fn in_range(&self, pitch: i32) -> bool {
        (self.pitch_min as i32..=self.pitch_max as i32).contains(&pitch)
    }

    pub fn clamp_pitch(&self, pitch: i32) -> u8 {
        pitch.clamp(self.pitch_min as i32, self.pitch_max as i32) as u8
    }

    pub fn in_scale(&self, pitch_class: u8) -> bool {
        self.scale.contains(&(pitch_class % 12))
    }
}

impl ConfigSection for MusicConfig {
    fn section_name() -> &'static str {
        "music"
    }

    fn validate(&self) -> Result<(), MelodyError> {
        if self.bars == 0 || self.beats_per_bar == 0 || self.steps_per_beat == 0 {
            return Err(invalid::<Self>("Bars, beats per bar and steps per beat must be positive"));
        }
        if self.pitch_min == 0 {
            return Err(invalid::<Self>("Minimum pitch must be above 0 (0 marks a rest)"));
        }
        if self.pitch_min > self.pitch_max || self.pitch_max > 127 {
            return Err(invalid::<Self>(format!(
                "Pitch range {}..={} is not a valid MIDI range",
                self.pitch_min, self.pitch_max
            )));
        }
        if !(0.0..=1.0).contains(&self.rest_prob) {
            return Err(invalid::<Self>("Rest probability must be between 0 and 1"));
        }
        if self.scale.is_empty() || self.scale.iter().any(|pc| *pc >= 12) {
            return Err(invalid::<Self>("Scale must list pitch classes in 0..12"));
        }
        if !(self.pitch_min..=self.pitch_max).any(|p| self.in_scale(p)) {
            return Err(invalid::<Self>(format!(
                "Pitch range {}..={} holds no scale tone",
                self.pitch_min, self.pitch_max
            )));
        }
        if self.chord_roots.is_empty() {
            return Err(invalid::<Self>("At least one chord root is required"));
        }
        if self.chord_roots.iter().any(|r| *r > MAX_CHORD_ROOT) {
            return Err(invalid::<Self>("Chord roots must leave room for a fifth above"));
        }
        if self.chord_duration == 0 {
            return Err(invalid::<Self>("Chord duration must be positive"));
        }
        Ok(())
    }
}
