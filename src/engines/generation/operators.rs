use crate::config::{MusicConfig, OperatorWeights};
use crate::engines::generation::melody::{generate_random_melody, random_scale_pitch};
use crate::types::{Individual, Melody, REST};
use rand::seq::SliceRandom;
use rand::Rng;

const NUDGE_SHIFTS: [i32; 4] = [-2, -1, 1, 2];
const TRANSPOSE_INTERVALS: [i32; 8] = [-12, -7, -5, -2, 2, 5, 7, 12];
/// A peak or trough must stand out by more than this many semitones.
const CONTOUR_THRESHOLD: i32 = 4;
const ECHO_PROB: f64 = 0.3;
/// Width of the retrograde and inversion windows.
const WINDOW: usize = 4;
/// Mirror axis used when a window starts on a rest.
const DEFAULT_MIRROR_AXIS: i32 = 72;

/// Tournament selection: best of `tournament_size` distinct random members.
///
/// Ties keep the first candidate drawn. Returns `None` on an empty population.
pub fn tournament_selection<'a, R: Rng>(
    population: &'a [Individual],
    tournament_size: usize,
    rng: &mut R,
) -> Option<&'a Individual> {
    let size = tournament_size.clamp(1, population.len().max(1));
    population
        .choose_multiple(rng, size)
        .fold(None, |best: Option<&Individual>, candidate| match best {
            Some(b) if b.fitness >= candidate.fitness => Some(b),
            _ => Some(candidate),
        })
}

/// Single-point crossover: swap melody tails at a random cut.
pub fn crossover<R: Rng>(parent1: &[u8], parent2: &[u8], rng: &mut R) -> (Melody, Melody) {
    let len = parent1.len().min(parent2.len());
    if len < 2 {
        return (parent1.to_vec(), parent2.to_vec());
    }

    let point = rng.gen_range(1..len);
    crossover_at(parent1, parent2, point)
}

/// Crossover at a fixed cut: `child1 = p1[..point] + p2[point..]` and vice versa.
pub fn crossover_at(parent1: &[u8], parent2: &[u8], point: usize) -> (Melody, Melody) {
    let point = point.min(parent1.len()).min(parent2.len());

    let mut child1 = parent1[..point].to_vec();
    child1.extend_from_slice(&parent2[point..]);
    let mut child2 = parent2[..point].to_vec();
    child2.extend_from_slice(&parent1[point..]);

    (child1, child2)
}

/// The mutation operator pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MutationOperator {
    /// Shift one sounding step by one or two semitones.
    PitchNudge,
    /// Shift every sounding step by a common musical interval.
    Transpose,
    /// Flatten isolated peaks and troughs.
    SmoothContour,
    /// Hold a note into the rest that follows it.
    Echo,
    /// Copy the rhythm of bar 0 onto bar 2.
    MotifClone,
    /// Reverse a short window.
    Retrograde,
    /// Mirror a short window around its first pitch.
    Inversion,
    /// Replace the melody with a fresh random one.
    Reset,
}

impl MutationOperator {
    pub const ALL: [MutationOperator; 8] = [
        MutationOperator::PitchNudge,
        MutationOperator::Transpose,
        MutationOperator::SmoothContour,
        MutationOperator::Echo,
        MutationOperator::MotifClone,
        MutationOperator::Retrograde,
        MutationOperator::Inversion,
        MutationOperator::Reset,
    ];

    pub fn weight(self, weights: &OperatorWeights) -> f64 {
        match self {
            MutationOperator::PitchNudge => weights.pitch_nudge,
            MutationOperator::Transpose => weights.transpose,
            MutationOperator::SmoothContour => weights.smooth_contour,
            MutationOperator::Echo => weights.echo,
            MutationOperator::MotifClone => weights.motif_clone,
            MutationOperator::Retrograde => weights.retrograde,
            MutationOperator::Inversion => weights.inversion,
            MutationOperator::Reset => weights.reset,
        }
    }

    /// Map a draw in `[0, 1)` onto the cumulative weight table.
    pub fn from_draw(draw: f64, weights: &OperatorWeights) -> Option<Self> {
        let mut cumulative = 0.0;
        for op in Self::ALL {
            cumulative += op.weight(weights);
            if draw < cumulative {
                return Some(op);
            }
        }
        None
    }

    pub fn apply<R: Rng>(self, melody: &[u8], music: &MusicConfig, rng: &mut R) -> Melody {
        let mut out = melody.to_vec();
        match self {
            MutationOperator::PitchNudge => pitch_nudge(&mut out, music, rng),
            MutationOperator::Transpose => {
                let interval = *TRANSPOSE_INTERVALS.choose(rng).unwrap_or(&12);
                transpose(&mut out, interval, music);
            }
            MutationOperator::SmoothContour => smooth_contour(&mut out),
            MutationOperator::Echo => echo(&mut out, rng),
            MutationOperator::MotifClone => motif_clone(&mut out, music, rng),
            MutationOperator::Retrograde => {
                if let Some(start) = random_window(out.len(), rng) {
                    reverse_window(&mut out, start);
                }
            }
            MutationOperator::Inversion => {
                if let Some(start) = random_window(out.len(), rng) {
                    invert_window(&mut out, start, music);
                }
            }
            MutationOperator::Reset => return generate_random_melody(melody.len(), music, rng),
        }
        out
    }
}

/// Mutation dispatcher.
///
/// With probability `1 - rate` the melody is returned unchanged; otherwise
/// one operator is drawn from the weight table and applied once.
pub fn mutate<R: Rng>(
    melody: &[u8],
    rate: f64,
    music: &MusicConfig,
    weights: &OperatorWeights,
    rng: &mut R,
) -> Melody {
    if rng.gen::<f64>() >= rate {
        return melody.to_vec();
    }

    match MutationOperator::from_draw(rng.gen::<f64>(), weights) {
        Some(op) => op.apply(melody, music, rng),
        None => melody.to_vec(),
    }
}

fn pitch_nudge<R: Rng>(melody: &mut [u8], music: &MusicConfig, rng: &mut R) {
    let sounding: Vec<usize> = (0..melody.len()).filter(|i| melody[*i] != REST).collect();
    let Some(&idx) = sounding.choose(rng) else {
        return;
    };
    let shift = *NUDGE_SHIFTS.choose(rng).unwrap_or(&1);
    let candidate = melody[idx] as i32 + shift;
    if music.in_range(candidate) {
        melody[idx] = candidate as u8;
    }
}

/// Shift all sounding steps by `interval`; steps that would leave the range
/// keep their pitch.
pub fn transpose(melody: &mut [u8], interval: i32, music: &MusicConfig) {
    for note in melody.iter_mut().filter(|n| **n != REST) {
        let candidate = *note as i32 + interval;
        if music.in_range(candidate) {
            *note = candidate as u8;
        }
    }
}

fn smooth_contour(melody: &mut [u8]) {
    for i in 1..melody.len().saturating_sub(1) {
        let (prev, curr, next) = (
            melody[i - 1] as i32,
            melody[i] as i32,
            melody[i + 1] as i32,
        );
        if prev == 0 || curr == 0 || next == 0 {
            continue;
        }
        let peak = curr > prev + CONTOUR_THRESHOLD && curr > next + CONTOUR_THRESHOLD;
        let trough = curr < prev - CONTOUR_THRESHOLD && curr < next - CONTOUR_THRESHOLD;
        if peak || trough {
            melody[i] = ((prev + next) / 2) as u8;
        }
    }
}

fn echo<R: Rng>(melody: &mut [u8], rng: &mut R) {
    for i in 0..melody.len().saturating_sub(1) {
        if melody[i] != REST && melody[i + 1] == REST && rng.gen::<f64>() < ECHO_PROB {
            melody[i + 1] = melody[i];
            return;
        }
    }
}

fn motif_clone<R: Rng>(melody: &mut [u8], music: &MusicConfig, rng: &mut R) {
    let steps_per_bar = music.steps_per_bar();
    if melody.len() < 3 * steps_per_bar {
        return;
    }
    let bar2 = 2 * steps_per_bar;
    for i in 0..steps_per_bar {
        if melody[i] != REST {
            if melody[bar2 + i] == REST {
                melody[bar2 + i] = random_scale_pitch(music, rng);
            }
        } else {
            melody[bar2 + i] = REST;
        }
    }
}

fn random_window<R: Rng>(len: usize, rng: &mut R) -> Option<usize> {
    if len <= WINDOW {
        return None;
    }
    Some(rng.gen_range(0..=len - WINDOW))
}

/// Reverse the `WINDOW` steps starting at `start`.
pub fn reverse_window(melody: &mut [u8], start: usize) {
    let end = (start + WINDOW).min(melody.len());
    if start < end {
        melody[start..end].reverse();
    }
}

/// Mirror sounding steps of the window at `start` around its first pitch
/// (or the default axis when it starts on a rest), clamped to the range.
pub fn invert_window(melody: &mut [u8], start: usize, music: &MusicConfig) {
    let end = (start + WINDOW).min(melody.len());
    if start >= end {
        return;
    }
    let axis = match melody[start] {
        REST => DEFAULT_MIRROR_AXIS,
        pitch => pitch as i32,
    };
    for note in melody[start..end].iter_mut().filter(|n| **n != REST) {
        *note = music.clamp_pitch(2 * axis - *note as i32);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn music() -> MusicConfig {
        MusicConfig::default()
    }

    #[test]
    fn test_crossover_at_partitions_parents() {
        let p1 = vec![60, 62, 64, 65, 67];
        let p2 = vec![72, 71, 69, 67, 65];
        let (c1, c2) = crossover_at(&p1, &p2, 2);
        assert_eq!(c1, vec![60, 62, 69, 67, 65]);
        assert_eq!(c2, vec![72, 71, 64, 65, 67]);
    }

    #[test]
    fn test_crossover_keeps_length() {
        let mut rng = StdRng::seed_from_u64(1);
        let p1 = vec![60; 32];
        let p2 = vec![72; 32];
        for _ in 0..50 {
            let (c1, c2) = crossover(&p1, &p2, &mut rng);
            assert_eq!(c1.len(), 32);
            assert_eq!(c2.len(), 32);
            // The cut is never at 0, so child1 always starts with parent1.
            assert_eq!(c1[0], 60);
            assert_eq!(c2[0], 72);
        }
    }

    #[test]
    fn test_tournament_picks_fittest_of_whole_population() {
        let population = vec![
            Individual::new(vec![60], 1.0),
            Individual::new(vec![62], 5.0),
            Individual::new(vec![64], 3.0),
        ];
        let mut rng = StdRng::seed_from_u64(0);
        // Tournament larger than the population samples everyone.
        let winner = tournament_selection(&population, 5, &mut rng).unwrap();
        assert_eq!(winner.melody, vec![62]);
        assert!(tournament_selection(&[], 5, &mut rng).is_none());
    }

    #[test]
    fn test_from_draw_follows_cumulative_weights() {
        let w = OperatorWeights::default();
        assert_eq!(MutationOperator::from_draw(0.0, &w), Some(MutationOperator::PitchNudge));
        assert_eq!(MutationOperator::from_draw(0.35, &w), Some(MutationOperator::Transpose));
        assert_eq!(MutationOperator::from_draw(0.62, &w), Some(MutationOperator::Echo));
        assert_eq!(MutationOperator::from_draw(0.90, &w), Some(MutationOperator::Reset));
        assert_eq!(MutationOperator::from_draw(1.5, &w), None);
    }

    #[test]
    fn test_zero_rate_is_identity() {
        let mut rng = StdRng::seed_from_u64(4);
        let melody = vec![60, 0, 64, 64, 67, 0, 0, 72];
        for _ in 0..20 {
            let out = mutate(&melody, 0.0, &music(), &OperatorWeights::default(), &mut rng);
            assert_eq!(out, melody);
        }
    }

    #[test]
    fn test_transpose_inverse_restores_in_range_pitches() {
        let m = music();
        let original = vec![60, 0, 64, 67, 67, 0, 71, 72];
        let mut melody = original.clone();
        transpose(&mut melody, 5, &m);
        assert_eq!(melody, vec![65, 0, 69, 72, 72, 0, 76, 77]);
        transpose(&mut melody, -5, &m);
        assert_eq!(melody, original);
    }

    #[test]
    fn test_transpose_keeps_out_of_range_steps() {
        let m = music();
        let mut melody = vec![80, 60];
        transpose(&mut melody, 7, &m);
        assert_eq!(melody, vec![80, 67]);
    }

    #[test]
    fn test_reverse_window_touches_only_its_window() {
        let original = vec![60, 62, 0, 64, 65, 67, 0, 69];
        let mut melody = original.clone();
        reverse_window(&mut melody, 2);
        assert_eq!(melody, vec![60, 62, 67, 65, 64, 0, 0, 69]);
        reverse_window(&mut melody, 2);
        assert_eq!(melody, original);

        // A window running off the end reverses what is left.
        let mut tail = vec![60, 62, 64, 65, 67];
        reverse_window(&mut tail, 3);
        assert_eq!(tail, vec![60, 62, 64, 67, 65]);
        reverse_window(&mut tail, 9);
        assert_eq!(tail, vec![60, 62, 64, 67, 65]);
    }

    #[test]
    fn test_inversion_is_involutive() {
        let m = music();
        let original = vec![0, 67, 69, 0, 65, 64, 0, 0];
        let mut melody = original.clone();
        invert_window(&mut melody, 1, &m);
        assert_eq!(&melody[1..5], &[67, 65, 0, 69]);
        invert_window(&mut melody, 1, &m);
        assert_eq!(melody, original);
    }

    #[test]
    fn test_inversion_uses_default_axis_on_rest() {
        let m = music();
        let mut melody = vec![0, 70, 74, 72, 60];
        invert_window(&mut melody, 0, &m);
        assert_eq!(melody, vec![0, 74, 70, 72, 60]);
    }

    #[test]
    fn test_inversion_clamps() {
        let m = music();
        let mut melody = vec![62, 84, 0, 0, 0];
        invert_window(&mut melody, 0, &m);
        assert_eq!(melody[1], 60);
    }

    #[test]
    fn test_smooth_contour_flattens_spike() {
        let mut melody = vec![60, 72, 62, 64];
        smooth_contour(&mut melody);
        assert_eq!(melody, vec![60, 61, 62, 64]);

        let mut gentle = vec![60, 64, 60];
        smooth_contour(&mut gentle);
        assert_eq!(gentle, vec![60, 64, 60]);
    }

    #[test]
    fn test_echo_edits_at_most_once() {
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..50 {
            let mut melody = vec![60, 0, 64, 0, 67, 0, 69, 0];
            echo(&mut melody, &mut rng);
            let filled = melody.iter().filter(|n| **n != 0).count();
            assert!(filled == 4 || filled == 5);
        }
    }

    #[test]
    fn test_motif_clone_copies_rhythm_to_bar_two() {
        let m = music();
        let mut rng = StdRng::seed_from_u64(5);
        let mut melody = vec![0u8; 32];
        melody[0] = 60;
        melody[3] = 64;
        for step in 16..24 {
            melody[step] = 67;
        }
        motif_clone(&mut melody, &m, &mut rng);
        for i in 0..8 {
            if i == 0 || i == 3 {
                assert_eq!(melody[16 + i], 67);
            } else {
                assert_eq!(melody[16 + i], 0);
            }
        }
    }

    #[test]
    fn test_every_operator_respects_bounds_and_length() {
        let m = MusicConfig {
            pitch_min: 64,
            pitch_max: 76,
            ..MusicConfig::default()
        };
        let mut rng = StdRng::seed_from_u64(21);
        let seed = generate_random_melody(m.total_steps(), &m, &mut rng);
        for op in MutationOperator::ALL {
            for _ in 0..25 {
                let out = op.apply(&seed, &m, &mut rng);
                assert_eq!(out.len(), seed.len(), "{:?} changed length", op);
                assert!(
                    out.iter().all(|p| *p == 0 || (64..=76).contains(p)),
                    "{:?} left the pitch range: {:?}",
                    op,
                    out
                );
            }
        }
    }
}
