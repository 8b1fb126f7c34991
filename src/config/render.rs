use super::traits::{invalid, ConfigSection};
use crate::error::MelodyError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub tempo: u16,
    /// Chance that a sustained step is re-struck as a new note.
    pub sustain_split_prob: f64,
    pub melody_velocity: u8,
    pub chord_velocity: u8,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            tempo: 80,
            sustain_split_prob: 0.3,
            melody_velocity: 100,
            chord_velocity: 55,
        }
    }
}

impl ConfigSection for RenderConfig {
    fn section_name() -> &'static str {
        "render"
    }

    fn validate(&self) -> Result<(), MelodyError> {
        if self.tempo == 0 {
            return Err(invalid::<Self>("Tempo must be positive"));
        }
        if !(0.0..=1.0).contains(&self.sustain_split_prob) {
            return Err(invalid::<Self>("Sustain split probability must be between 0 and 1"));
        }
        if self.melody_velocity > 127 || self.chord_velocity > 127 {
            return Err(invalid::<Self>("Velocities must be at most 127"));
        }
        Ok(())
    }
}
