pub mod analysis;
pub mod grooves;
pub mod fitness;
pub mod scorer;

pub use analysis::MelodyAnalysis;
pub use fitness::{get_fitness, FitnessBreakdown};
pub use scorer::{scorer_from_config, HeuristicScorer, LearnedScorer, Scorer};
