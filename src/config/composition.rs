use super::traits::{invalid, ConfigSection};
use crate::error::MelodyError;
use serde::{Deserialize, Serialize};

/// Plan of the four-section movement (theme, variation, contrast, coda).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompositionConfig {
    pub theme_generations: usize,
    pub variation_generations: usize,
    pub contrast_generations: usize,
    pub contrast_mutation_rate: f64,
    pub contrast_pitch_min: u8,
    pub contrast_pitch_max: u8,
    pub contrast_rest_prob: f64,
    pub tempo: u16,
}

impl Default for CompositionConfig {
    fn default() -> Self {
        Self {
            theme_generations: 300,
            variation_generations: 50,
            contrast_generations: 200,
            contrast_mutation_rate: 0.1,
            contrast_pitch_min: 72,
            contrast_pitch_max: 96,
            contrast_rest_prob: 0.1,
            tempo: 96,
        }
    }
}

impl ConfigSection for CompositionConfig {
    fn section_name() -> &'static str {
        "composition"
    }

    fn validate(&self) -> Result<(), MelodyError> {
        if self.theme_generations == 0
            || self.variation_generations == 0
            || self.contrast_generations == 0
        {
            return Err(invalid::<Self>("Every section needs at least one generation"));
        }
        if self.contrast_pitch_min == 0 || self.contrast_pitch_min > self.contrast_pitch_max {
            return Err(invalid::<Self>("Contrast pitch range is empty"));
        }
        if !(0.0..=1.0).contains(&self.contrast_mutation_rate)
            || !(0.0..=1.0).contains(&self.contrast_rest_prob)
        {
            return Err(invalid::<Self>("Contrast probabilities must be between 0 and 1"));
        }
        if self.tempo == 0 {
            return Err(invalid::<Self>("Tempo must be positive"));
        }
        Ok(())
    }
}
