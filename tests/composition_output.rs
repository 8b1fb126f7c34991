use melodyga::composer::compose_movement;
use melodyga::config::AppConfig;
use melodyga::engines::generation::SilentProgress;
use melodyga::ml::preprocess::midi_to_tokens;
use melodyga::ml::tokenizer::melody_to_tokens;
use melodyga::render::write_midi;
use rand::rngs::StdRng;
use rand::SeedableRng;

fn quick_config() -> AppConfig {
    let mut config = AppConfig::default();
    config.evolution.population_size = 12;
    config.evolution.elitism_count = 2;
    config.evolution.seed = Some(99);
    config.composition.theme_generations = 3;
    config.composition.variation_generations = 2;
    config.composition.contrast_generations = 3;
    config
}

#[test]
fn test_movement_sections() {
    let config = quick_config();
    let movement = compose_movement(&config, &mut SilentProgress).unwrap();
    let steps = config.music.total_steps();

    assert_eq!(movement.theme.len(), steps);
    assert_eq!(movement.variation.len(), steps);
    assert_eq!(movement.contrast.len(), steps);
    assert_eq!(movement.coda, movement.theme);
    assert_eq!(movement.concatenated().len(), 4 * steps);

    let plan = &config.composition;
    let (low, high) = (plan.contrast_pitch_min, plan.contrast_pitch_max);
    assert!(movement.contrast.iter().all(|n| *n == 0 || (low..=high).contains(n)));
}

#[test]
fn test_written_midi_reads_back() {
    let mut config = AppConfig::default();
    config.render.sustain_split_prob = 0.0;
    let melody: Vec<u8> = [60u8, 60, 0, 62, 64, 0, 67, 67].repeat(4);

    let path = std::env::temp_dir().join(format!("melodyga_render_{}.mid", std::process::id()));
    let mut rng = StdRng::seed_from_u64(0);
    write_midi(&path, &melody, 80, Some(&[48u8, 53][..]), &config, &mut rng).unwrap();
    let bytes = std::fs::read(&path).unwrap();
    let _ = std::fs::remove_file(&path);

    let tokens = midi_to_tokens(&bytes, &config.music).unwrap().unwrap();
    assert_eq!(tokens, melody_to_tokens(&melody));
}
