pub mod melody;
pub mod operators;
pub mod evolution_engine;
pub mod progress;

pub use melody::{generate_random_melody, scale_notes};
pub use operators::{crossover, mutate, tournament_selection, MutationOperator};
pub use evolution_engine::{
    EvolutionEngine, GenerationStats, ProgressCallback, RunState, Transition,
};
pub use progress::{ConsoleProgressCallback, RecordingProgress, SilentProgress};
