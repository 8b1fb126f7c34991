use super::traits::{invalid, ConfigSection};
use crate::error::MelodyError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FitnessConfig {
    /// Score with the learned sequence model instead of the weighted sum.
    pub use_learned_model: bool,
    pub model_path: String,
    pub weights: FitnessWeights,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FitnessWeights {
    pub melody: f64,
    pub harmony: f64,
    pub rhythm: f64,
    pub stability: f64,
    pub structure: f64,
}

impl Default for FitnessWeights {
    fn default() -> Self {
        Self {
            melody: 2.0,
            harmony: 3.0,
            rhythm: 4.0,
            stability: 2.1,
            structure: 2.0,
        }
    }
}

impl Default for FitnessConfig {
    fn default() -> Self {
        Self {
            use_learned_model: false,
            model_path: "melody_model.json".to_string(),
            weights: FitnessWeights::default(),
        }
    }
}

impl ConfigSection for FitnessConfig {
    fn section_name() -> &'static str {
        "fitness"
    }

    fn validate(&self) -> Result<(), MelodyError> {
        let w = &self.weights;
        if [w.melody, w.harmony, w.rhythm, w.stability, w.structure]
            .iter()
            .any(|x| *x < 0.0)
        {
            return Err(invalid::<Self>("Fitness weights must be non-negative"));
        }
        if self.use_learned_model && self.model_path.trim().is_empty() {
            return Err(invalid::<Self>("A model path is required for learned scoring"));
        }
        Ok(())
    }
}
