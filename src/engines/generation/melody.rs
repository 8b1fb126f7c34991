use crate::config::MusicConfig;
use crate::types::{Melody, REST};
use rand::seq::SliceRandom;
use rand::Rng;

/// One octave of C major, used when the configured range holds no scale tone.
/// Validated configs always hold one.
const FALLBACK_SCALE: [u8; 7] = [60, 62, 64, 65, 67, 69, 71];

/// Starting register for the random walk: one octave up from middle C.
const START_REGISTER: std::ops::RangeInclusive<u8> = 60..=72;

/// Stepwise moves, biased towards small motion.
const WALK_STEPS: [i32; 8] = [-2, -1, -1, 0, 0, 1, 1, 2];

/// Occasional leaps (in scale degrees).
const LEAP_STEPS: [i32; 5] = [-4, -3, 3, 4, 5];
const LEAP_PROB: f64 = 0.05;

/// All scale tones inside the configured pitch range, ascending.
pub fn scale_notes(music: &MusicConfig) -> Vec<u8> {
    let notes: Vec<u8> = (music.pitch_min..=music.pitch_max)
        .filter(|p| music.in_scale(*p))
        .collect();
    if notes.is_empty() {
        FALLBACK_SCALE.to_vec()
    } else {
        notes
    }
}

/// A uniformly chosen scale tone inside the configured range.
pub fn random_scale_pitch<R: Rng>(music: &MusicConfig, rng: &mut R) -> u8 {
    let notes = scale_notes(music);
    notes.choose(rng).copied().unwrap_or(FALLBACK_SCALE[0])
}

/// Generate a random-walk melody of `length` steps.
///
/// The first step of every bar always sounds; other steps rest with
/// probability `rest_prob`. Sounding steps walk the scale by small degrees
/// with an occasional leap, clamped to the available scale tones.
pub fn generate_random_melody<R: Rng>(length: usize, music: &MusicConfig, rng: &mut R) -> Melody {
    let notes = scale_notes(music);
    let steps_per_bar = music.steps_per_bar().max(1);

    let start_candidates: Vec<u8> = notes
        .iter()
        .copied()
        .filter(|p| START_REGISTER.contains(p))
        .collect();
    let start_pool = if start_candidates.is_empty() {
        &notes
    } else {
        &start_candidates
    };
    let mut current = start_pool.choose(rng).copied().unwrap_or(notes[0]);

    let last_idx = notes.len() as i32 - 1;
    let mut melody = Vec::with_capacity(length);

    for i in 0..length {
        let should_rest = if i % steps_per_bar == 0 {
            false
        } else {
            rng.gen::<f64>() < music.rest_prob
        };

        if should_rest {
            melody.push(REST);
            continue;
        }

        let curr_idx = notes
            .iter()
            .position(|p| *p == current)
            .unwrap_or(notes.len() / 2) as i32;

        let step = *WALK_STEPS.choose(rng).unwrap_or(&0);
        let mut next_idx = (curr_idx + step).clamp(0, last_idx);
        if rng.gen::<f64>() < LEAP_PROB {
            let leap = *LEAP_STEPS.choose(rng).unwrap_or(&0);
            next_idx = (curr_idx + leap).clamp(0, last_idx);
        }

        current = notes[next_idx as usize];
        melody.push(current);
    }

    melody
}
