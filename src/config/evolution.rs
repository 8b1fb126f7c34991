use super::traits::{invalid, ConfigSection};
use crate::error::MelodyError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvolutionConfig {
    pub population_size: usize,
    pub generations: usize,
    /// Base probability that a child is passed through the mutation pool.
    pub mutation_rate: f64,
    /// Capped at the population size when applied.
    pub elitism_count: usize,
    pub tournament_size: usize,

    // Stagnation control
    pub improvement_epsilon: f64,
    pub stagnation_boost_after: usize,
    pub mutation_boost_factor: f64,
    pub max_mutation_rate: f64,
    pub cataclysm_after: usize,
    pub cataclysm_survivors: usize,

    /// Mutation rate used to spread a seeded population around its seed.
    pub seed_mutation_rate: f64,
    pub seed: Option<u64>,
    pub operator_weights: OperatorWeights,
}

/// Selection weights of the mutation operator pool. They must sum to 1.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OperatorWeights {
    pub pitch_nudge: f64,
    pub transpose: f64,
    pub smooth_contour: f64,
    pub echo: f64,
    pub motif_clone: f64,
    pub retrograde: f64,
    pub inversion: f64,
    pub reset: f64,
}

impl Default for OperatorWeights {
    fn default() -> Self {
        Self {
            pitch_nudge: 0.30,
            transpose: 0.10,
            smooth_contour: 0.10,
            echo: 0.15,
            motif_clone: 0.10,
            retrograde: 0.05,
            inversion: 0.05,
            reset: 0.15,
        }
    }
}

impl OperatorWeights {
    pub fn total(&self) -> f64 {
        self.pitch_nudge
            + self.transpose
            + self.smooth_contour
            + self.echo
            + self.motif_clone
            + self.retrograde
            + self.inversion
            + self.reset
    }
}

impl Default for EvolutionConfig {
    fn default() -> Self {
        Self {
            population_size: 1000,
            generations: 200,
            mutation_rate: 0.05,
            elitism_count: 200,
            tournament_size: 5,
            improvement_epsilon: 0.1,
            stagnation_boost_after: 10,
            mutation_boost_factor: 2.0,
            max_mutation_rate: 0.8,
            cataclysm_after: 50,
            cataclysm_survivors: 5,
            seed_mutation_rate: 0.2,
            seed: None,
            operator_weights: OperatorWeights::default(),
        }
    }
}

impl ConfigSection for EvolutionConfig {
    fn section_name() -> &'static str {
        "evolution"
    }

    fn validate(&self) -> Result<(), MelodyError> {
        if self.population_size < 2 {
            return Err(invalid::<Self>("Population size must be at least 2"));
        }
        if self.generations == 0 {
            return Err(invalid::<Self>("At least one generation is required"));
        }
        for (name, rate) in [
            ("Mutation rate", self.mutation_rate),
            ("Maximum mutation rate", self.max_mutation_rate),
            ("Seed mutation rate", self.seed_mutation_rate),
        ] {
            if !(0.0..=1.0).contains(&rate) {
                return Err(invalid::<Self>(format!("{} must be between 0 and 1", name)));
            }
        }
        if self.tournament_size == 0 {
            return Err(invalid::<Self>("Tournament size must be positive"));
        }
        if self.mutation_boost_factor < 1.0 {
            return Err(invalid::<Self>("Mutation boost factor must be at least 1"));
        }
        if self.cataclysm_after <= self.stagnation_boost_after {
            return Err(invalid::<Self>(
                "Cataclysm threshold must be above the mutation boost threshold",
            ));
        }
        let w = &self.operator_weights;
        let weights = [
            w.pitch_nudge,
            w.transpose,
            w.smooth_contour,
            w.echo,
            w.motif_clone,
            w.retrograde,
            w.inversion,
            w.reset,
        ];
        if weights.iter().any(|x| *x < 0.0) || (w.total() - 1.0).abs() > 1e-6 {
            return Err(invalid::<Self>(format!(
                "Operator weights must be non-negative and sum to 1 (got {:.4})",
                w.total()
            )));
        }
        Ok(())
    }
}
