use melodyga::config::{FitnessWeights, MusicConfig};
use melodyga::engines::evaluation::analysis::{derive_chords, extract_events, MelodyAnalysis};
use melodyga::engines::evaluation::fitness::{
    get_fitness, harmonic_quality, ALL_REST_SCORE, NO_EVENTS_SCORE,
};
use melodyga::engines::generation::generate_random_melody;
use melodyga::types::PitchClassSet;
use rand::rngs::StdRng;
use rand::SeedableRng;

#[test]
fn test_all_rest_melody_gets_sentinel() {
    let music = MusicConfig::default();
    let weights = FitnessWeights::default();

    assert_eq!(get_fitness(&[0u8; 16], &music, &weights), ALL_REST_SCORE);
    assert_eq!(get_fitness(&[], &music, &weights), ALL_REST_SCORE);
}

#[test]
fn test_sentinel_only_for_silence() {
    let music = MusicConfig::default();
    let weights = FitnessWeights::default();
    let mut rng = StdRng::seed_from_u64(11);

    for _ in 0..200 {
        let melody = generate_random_melody(music.total_steps(), &music, &mut rng);
        assert_ne!(get_fitness(&melody, &music, &weights), ALL_REST_SCORE);
    }

    // A single sounding step among rests is still scored normally.
    let mut lonely = vec![0u8; 32];
    lonely[31] = 60;
    let score = get_fitness(&lonely, &music, &weights);
    assert_ne!(score, ALL_REST_SCORE);
    assert_ne!(score, NO_EVENTS_SCORE);
}

#[test]
fn test_alternating_tonic_scores_chord_tone_on_every_onset() {
    // One C major chord for the whole melody.
    let music = MusicConfig {
        chord_roots: vec![48],
        ..MusicConfig::default()
    };
    let melody: Vec<u8> = [60u8, 0].repeat(8);

    let events = extract_events(&melody);
    let summary: Vec<(usize, u8)> = events.iter().map(|e| (e.position, e.pitch)).collect();
    assert_eq!(
        summary,
        vec![(0, 60), (2, 60), (4, 60), (6, 60), (8, 60), (10, 60), (12, 60), (14, 60)]
    );

    let analysis = MelodyAnalysis::new(&melody, &music);
    assert_eq!(harmonic_quality(&analysis, &music), 8.0 * 10.0);
}

#[test]
fn test_chord_derivation_is_deterministic() {
    let scale = [0u8, 2, 4, 5, 7, 9, 11];
    let roots = [48u8, 43, 45, 41, 49];

    let first = derive_chords(&roots, &scale);
    let second = derive_chords(&roots, &scale);
    assert_eq!(first, second);

    assert_eq!(first[0], PitchClassSet::from_classes([0, 4, 7]));
    assert_eq!(first[1], PitchClassSet::from_classes([7, 11, 2]));
    assert_eq!(first[2], PitchClassSet::from_classes([9, 0, 4]));
    assert_eq!(first[3], PitchClassSet::from_classes([5, 9, 0]));
    // C# is outside the scale: plain major triad.
    assert_eq!(first[4], PitchClassSet::from_classes([1, 5, 8]));
}

#[test]
fn test_in_key_beats_out_of_key() {
    let music = MusicConfig::default();
    let weights = FitnessWeights::default();

    let diatonic = [60u8, 0, 62, 0, 64, 0, 65, 0].repeat(4);
    let chromatic = [61u8, 0, 63, 0, 66, 0, 68, 0].repeat(4);
    assert!(get_fitness(&diatonic, &music, &weights) > get_fitness(&chromatic, &music, &weights));
}
