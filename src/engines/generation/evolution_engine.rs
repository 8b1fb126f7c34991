use crate::config::{AppConfig, ConfigOverride, EvolutionConfig};
use crate::engines::evaluation::fitness::ALL_REST_SCORE;
use crate::engines::evaluation::scorer::{scorer_from_config, Scorer};
use crate::engines::generation::{
    melody::generate_random_melody,
    operators::{crossover, mutate, tournament_selection},
};
use crate::error::{MelodyError, Result};
use crate::types::{Individual, Melody};
use rand::rngs::StdRng;
use rand::SeedableRng;

/// Adaptive state of one `train` call.
#[derive(Debug, Clone, PartialEq)]
pub struct RunState {
    pub best_score: f64,
    pub stagnation_count: usize,
    pub mutation_rate: f64,
}

/// What the engine does after scoring a generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Reproduce,
    Cataclysm,
}

impl RunState {
    pub fn new(base_mutation_rate: f64) -> Self {
        Self {
            best_score: ALL_REST_SCORE,
            stagnation_count: 0,
            mutation_rate: base_mutation_rate,
        }
    }

    /// Fold in the best score of a generation and decide the next step.
    ///
    /// Improvement resets stagnation and the mutation rate. Stagnation past
    /// `stagnation_boost_after` raises the rate; past `cataclysm_after` it
    /// triggers a cataclysm, after which the state returns to baseline.
    pub fn observe(&mut self, generation_best: f64, evo: &EvolutionConfig) -> Transition {
        if generation_best > self.best_score + evo.improvement_epsilon {
            self.stagnation_count = 0;
            self.best_score = generation_best;
            self.mutation_rate = evo.mutation_rate;
        } else {
            self.stagnation_count += 1;
            if self.stagnation_count > evo.stagnation_boost_after {
                self.mutation_rate =
                    (evo.mutation_rate * evo.mutation_boost_factor).min(evo.max_mutation_rate);
            }
        }

        if self.stagnation_count > evo.cataclysm_after {
            self.stagnation_count = 0;
            self.mutation_rate = evo.mutation_rate;
            Transition::Cataclysm
        } else {
            Transition::Reproduce
        }
    }
}

/// Snapshot handed to progress callbacks after each generation.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationStats {
    pub generation: usize,
    pub total_generations: usize,
    pub best_fitness: f64,
    pub run_best: f64,
    pub mutation_rate: f64,
    pub stagnation_count: usize,
}

pub trait ProgressCallback {
    fn on_generation_start(&mut self, generation: usize);
    fn on_generation_complete(&mut self, stats: &GenerationStats);
    fn on_cataclysm(&mut self, generation: usize, survivors: usize);
}

pub struct EvolutionEngine {
    config: AppConfig,
    scorer: Box<dyn Scorer>,
    rng: StdRng,
}

impl EvolutionEngine {
    /// Build an engine, choosing the scorer from `config.fitness`.
    pub fn new(config: AppConfig) -> Result<Self> {
        let scorer = scorer_from_config(&config)?;
        Self::with_scorer(config, scorer)
    }

    pub fn with_scorer(config: AppConfig, scorer: Box<dyn Scorer>) -> Result<Self> {
        config.validate()?;
        let rng = match config.evolution.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        log::debug!("Evolution engine ready with {} scorer", scorer.name());
        Ok(Self { config, scorer, rng })
    }

    /// The base configuration; `train` never modifies it.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Run the genetic algorithm and return the best individual of the
    /// final generation.
    ///
    /// `initial_seed` spreads the first population around an existing
    /// melody instead of starting from random walks. `overrides` are
    /// layered over the base configuration for this call only.
    pub fn train<C: ProgressCallback>(
        &mut self,
        initial_seed: Option<&[u8]>,
        overrides: Option<&ConfigOverride>,
        callback: &mut C,
    ) -> Result<Individual> {
        let config = match overrides {
            Some(o) => o.apply(&self.config)?,
            None => self.config.clone(),
        };
        if config.evolution.seed != self.config.evolution.seed {
            if let Some(seed) = config.evolution.seed {
                self.rng = StdRng::seed_from_u64(seed);
            }
        }

        let evo = &config.evolution;
        let length = config.music.total_steps();
        if let Some(seed) = initial_seed {
            if seed.len() != length {
                return Err(MelodyError::InvalidSeed {
                    expected: length,
                    actual: seed.len(),
                });
            }
        }

        let mut population = self.initialize_population(initial_seed, &config);
        let mut state = RunState::new(evo.mutation_rate);
        log::info!("Start training: {} generations", evo.generations);

        let mut best = None;
        for generation in 0..evo.generations {
            callback.on_generation_start(generation);

            let scored = self.evaluate_population(population, &config)?;
            let leader = scored
                .first()
                .cloned()
                .ok_or_else(|| MelodyError::Scoring("Population is empty".to_string()))?;
            let transition = state.observe(leader.fitness, evo);

            callback.on_generation_complete(&GenerationStats {
                generation,
                total_generations: evo.generations,
                best_fitness: leader.fitness,
                run_best: state.best_score,
                mutation_rate: state.mutation_rate,
                stagnation_count: state.stagnation_count,
            });
            best = Some(leader);

            if generation + 1 == evo.generations {
                break;
            }

            population = match transition {
                Transition::Cataclysm => {
                    let survivors = evo.cataclysm_survivors.min(scored.len());
                    log::info!(
                        "Cataclysm at generation {}: keeping {} elites",
                        generation,
                        survivors
                    );
                    callback.on_cataclysm(generation, survivors);
                    self.cataclysm(&scored, survivors, &config)
                }
                Transition::Reproduce => {
                    self.create_next_generation(&scored, state.mutation_rate, &config)
                }
            };
        }

        best.ok_or_else(|| MelodyError::Configuration("No generations were run".to_string()))
    }

    fn initialize_population(
        &mut self,
        initial_seed: Option<&[u8]>,
        config: &AppConfig,
    ) -> Vec<Melody> {
        let evo = &config.evolution;
        match initial_seed {
            Some(seed) => {
                log::info!("[Init] Population initialized from seed");
                (0..evo.population_size)
                    .map(|_| {
                        mutate(
                            seed,
                            evo.seed_mutation_rate,
                            &config.music,
                            &evo.operator_weights,
                            &mut self.rng,
                        )
                    })
                    .collect()
            }
            None => {
                log::info!("[Init] Population initialized randomly (random walk)");
                self.random_population(evo.population_size, config)
            }
        }
    }

    fn random_population(&mut self, count: usize, config: &AppConfig) -> Vec<Melody> {
        let length = config.music.total_steps();
        (0..count)
            .map(|_| generate_random_melody(length, &config.music, &mut self.rng))
            .collect()
    }

    /// Score every melody and sort best first (stable on ties).
    fn evaluate_population(
        &mut self,
        population: Vec<Melody>,
        config: &AppConfig,
    ) -> Result<Vec<Individual>> {
        let mut valid: Vec<Melody> = population.into_iter().filter(|m| !m.is_empty()).collect();
        if valid.is_empty() {
            log::warn!("Population collapsed; injecting fresh random melodies");
            valid = self.random_population(config.evolution.population_size, config);
        }

        let scores = self.scorer.score_batch(&valid, config)?;
        if scores.len() != valid.len() {
            return Err(MelodyError::Scoring(format!(
                "Scorer '{}' returned {} scores for {} melodies",
                self.scorer.name(),
                scores.len(),
                valid.len()
            )));
        }

        let mut scored: Vec<Individual> = valid
            .into_iter()
            .zip(scores)
            .map(|(melody, fitness)| Individual::new(melody, fitness))
            .collect();
        scored.sort_by(|a, b| {
            b.fitness
                .partial_cmp(&a.fitness)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        Ok(scored)
    }

    fn cataclysm(
        &mut self,
        scored: &[Individual],
        survivors: usize,
        config: &AppConfig,
    ) -> Vec<Melody> {
        let target = config.evolution.population_size;
        let mut population: Vec<Melody> = scored
            .iter()
            .take(survivors.min(target))
            .map(|ind| ind.melody.clone())
            .collect();
        let missing = target - population.len();
        population.extend(self.random_population(missing, config));
        population
    }

    fn create_next_generation(
        &mut self,
        scored: &[Individual],
        mutation_rate: f64,
        config: &AppConfig,
    ) -> Vec<Melody> {
        let evo = &config.evolution;
        let target = evo.population_size;

        // Elitism: copy top performers
        let mut next_generation: Vec<Melody> = scored
            .iter()
            .take(evo.elitism_count.min(target))
            .map(|ind| ind.melody.clone())
            .collect();

        while next_generation.len() < target {
            let parent1 = tournament_selection(scored, evo.tournament_size, &mut self.rng);
            let parent2 = tournament_selection(scored, evo.tournament_size, &mut self.rng);
            let (Some(parent1), Some(parent2)) = (parent1, parent2) else {
                break;
            };

            let (child1, child2) = crossover(&parent1.melody, &parent2.melody, &mut self.rng);
            let weights = &evo.operator_weights;
            let child1 = mutate(&child1, mutation_rate, &config.music, weights, &mut self.rng);
            let child2 = mutate(&child2, mutation_rate, &config.music, weights, &mut self.rng);

            next_generation.push(child1);
            next_generation.push(child2);
        }

        next_generation.truncate(target);
        next_generation
    }
}
