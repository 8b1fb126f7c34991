mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Args, Command, MELODY_GENERATIONS};
use melodyga::composer::compose_movement;
use melodyga::config::{AppConfig, ConfigManager, ConfigOverride};
use melodyga::engines::generation::{ConsoleProgressCallback, EvolutionEngine};
use melodyga::interactive::{parse_chord_roots, prompt_chord_progression, ChordInput};
use melodyga::ml::{preprocess::load_corpus, NgramModel};
use melodyga::render::write_midi;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::Path;

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let manager = ConfigManager::new();
    manager
        .load_layered(args.config.as_deref())
        .context("Failed to load configuration")?;

    // The melody command's generation budget applies unless a config file
    // or --generations chooses one.
    let default_generations = match (&args.command, &args.config) {
        (Command::Melody { .. }, None) => Some(MELODY_GENERATIONS),
        _ => None,
    };
    manager
        .update(|c| {
            if let Some(generations) = args.generations.or(default_generations) {
                c.evolution.generations = generations;
            }
            if let Some(population) = args.population {
                c.evolution.population_size = population;
                c.evolution.elitism_count = c.evolution.elitism_count.min(population / 5);
            }
            if let Some(seed) = args.seed {
                c.evolution.seed = Some(seed);
            }
        })
        .context("Invalid command-line settings")?;
    let config = manager.get();

    match &args.command {
        Command::Melody {
            output,
            no_prompt,
            chords,
        } => run_melody(&config, output, *no_prompt, chords.as_deref()),
        Command::Compose { output } => run_compose(&config, output),
        Command::TrainModel {
            midi_dir,
            output,
            alpha,
        } => {
            let output = output
                .clone()
                .unwrap_or_else(|| config.fitness.model_path.clone().into());
            run_train_model(&config, midi_dir, &output, *alpha)
        }
    }
}

fn render_rng(config: &AppConfig) -> StdRng {
    match config.evolution.seed {
        Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(1)),
        None => StdRng::from_entropy(),
    }
}

fn run_melody(
    config: &AppConfig,
    output: &Path,
    no_prompt: bool,
    chords: Option<&str>,
) -> Result<()> {
    let progression = match chords {
        Some(line) => match parse_chord_roots(line) {
            ChordInput::Roots(roots) => Some(roots),
            ChordInput::Empty => None,
            ChordInput::Invalid(reason) => anyhow::bail!("Invalid --chords value: {}", reason),
        },
        None if no_prompt => None,
        None => {
            let stdin = std::io::stdin();
            prompt_chord_progression(&mut stdin.lock(), &mut std::io::stdout())
        }
    };

    let mut overrides = ConfigOverride::new();
    if let Some(roots) = &progression {
        overrides.insert("chord_roots", roots.clone());
    }

    let mut engine =
        EvolutionEngine::new(config.clone()).context("Failed to build the evolution engine")?;
    let best = engine
        .train(None, Some(&overrides), &mut ConsoleProgressCallback)
        .context("Training failed")?;
    log::info!("Best melody scored {:.2}: {:?}", best.fitness, best.melody);

    write_midi(
        output,
        &best.melody,
        config.render.tempo,
        progression.as_deref(),
        config,
        &mut render_rng(config),
    )
    .with_context(|| format!("Failed to write {}", output.display()))?;
    Ok(())
}

fn run_compose(config: &AppConfig, output: &Path) -> Result<()> {
    let movement =
        compose_movement(config, &mut ConsoleProgressCallback).context("Composition failed")?;
    for (name, section) in movement.sections() {
        log::info!("Section {}: {} steps", name, section.len());
    }
    log::info!("Movement: {} steps", movement.len());

    write_midi(
        output,
        &movement.concatenated(),
        config.composition.tempo,
        None,
        config,
        &mut render_rng(config),
    )
    .with_context(|| format!("Failed to write {}", output.display()))?;
    Ok(())
}

fn run_train_model(config: &AppConfig, midi_dir: &Path, output: &Path, alpha: f64) -> Result<()> {
    let corpus = load_corpus(midi_dir, &config.music)
        .with_context(|| format!("Failed to read MIDI files from {}", midi_dir.display()))?;
    if corpus.is_empty() {
        anyhow::bail!("No usable MIDI files in {}", midi_dir.display());
    }

    let model = NgramModel::train(&corpus, alpha).context("Model training failed")?;
    let loss = model.corpus_loss(&corpus)?;
    log::info!("Training loss: {:.4}", loss);

    model
        .save(output)
        .with_context(|| format!("Failed to save model to {}", output.display()))?;
    log::info!("Model saved to {}", output.display());
    Ok(())
}
