use super::evolution_engine::{GenerationStats, ProgressCallback};

/// How often the console reporter logs a generation.
const REPORT_EVERY: usize = 20;

pub struct ConsoleProgressCallback;

impl ProgressCallback for ConsoleProgressCallback {
    fn on_generation_start(&mut self, _generation: usize) {}

    fn on_generation_complete(&mut self, stats: &GenerationStats) {
        let last = stats.generation + 1 == stats.total_generations;
        if stats.generation % REPORT_EVERY == 0 || last {
            log::info!(
                "Gen {}: Best Score = {:.2}, Mut Rate = {:.2}, Stagnation = {}",
                stats.generation,
                stats.best_fitness,
                stats.mutation_rate,
                stats.stagnation_count
            );
        }
    }

    fn on_cataclysm(&mut self, generation: usize, survivors: usize) {
        log::warn!(
            "Gen {}: stagnation limit reached, population reset around {} survivors",
            generation,
            survivors
        );
    }
}

/// Ignores every event. Used by tests and nested runs.
pub struct SilentProgress;

impl ProgressCallback for SilentProgress {
    fn on_generation_start(&mut self, _generation: usize) {}

    fn on_generation_complete(&mut self, _stats: &GenerationStats) {}

    fn on_cataclysm(&mut self, _generation: usize, _survivors: usize) {}
}

/// Keeps every generation's stats in memory.
#[derive(Debug, Default)]
pub struct RecordingProgress {
    pub history: Vec<GenerationStats>,
    pub cataclysms: Vec<usize>,
}

impl ProgressCallback for RecordingProgress {
    fn on_generation_start(&mut self, _generation: usize) {}

    fn on_generation_complete(&mut self, stats: &GenerationStats) {
        self.history.push(stats.clone());
    }

    fn on_cataclysm(&mut self, generation: usize, _survivors: usize) {
        self.cataclysms.push(generation);
    }
}
