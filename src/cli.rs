use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug, Clone)]
#[command(
    author,
    version,
    about = "Evolve melodies with a genetic algorithm and write them as MIDI"
)]
pub struct Args {
    /// Path to a TOML or JSON config file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Seed for reproducible runs (overrides config)
    #[arg(long, global = true)]
    pub seed: Option<u64>,

    /// Number of generations (overrides config and the command's default)
    #[arg(long, global = true)]
    pub generations: Option<usize>,

    /// Population size (overrides config)
    #[arg(long, global = true)]
    pub population: Option<usize>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Evolve a single melody over a chord progression
    Melody {
        /// Output MIDI file
        #[arg(long, short, default_value = "music.mid")]
        output: PathBuf,

        /// Skip the chord progression prompt
        #[arg(long, default_value_t = false)]
        no_prompt: bool,

        /// Chord roots as comma-separated MIDI numbers (skips the prompt)
        #[arg(long)]
        chords: Option<String>,
    },

    /// Compose a four-section movement (A A' B A)
    Compose {
        /// Output MIDI file
        #[arg(long, short, default_value = "movement_full.mid")]
        output: PathBuf,
    },

    /// Train the learned fitness model from a directory of MIDI files
    TrainModel {
        /// Directory containing .mid files
        #[arg(value_name = "MIDI_DIR")]
        midi_dir: PathBuf,

        /// Where to write the model (defaults to fitness.model_path)
        #[arg(long, short)]
        output: Option<PathBuf>,

        /// Add-alpha smoothing constant
        #[arg(long, default_value_t = 0.1)]
        alpha: f64,
    },
}

/// Generations for the single-melody command when neither the command
/// line nor a config file sets them.
pub const MELODY_GENERATIONS: usize = 500;
