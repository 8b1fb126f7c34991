use crate::config::{FitnessWeights, MusicConfig};
use crate::engines::evaluation::analysis::{onset_pattern, MelodyAnalysis};
use crate::engines::evaluation::grooves::match_groove;
use crate::types::{is_onset, Event, REST};

/// Score of a melody that never sounds.
pub const ALL_REST_SCORE: f64 = -9999.0;
/// Score of a melody with no onsets.
pub const NO_EVENTS_SCORE: f64 = -999.0;

/// Per-criterion scores of one melody, before weighting.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FitnessBreakdown {
    pub melody: f64,
    pub harmony: f64,
    pub rhythm: f64,
    pub structure: f64,
    pub stability: f64,
}

impl FitnessBreakdown {
    pub fn weighted_total(&self, w: &FitnessWeights) -> f64 {
        w.melody * self.melody
            + w.harmony * self.harmony
            + w.rhythm * self.rhythm
            + w.stability * self.stability
            + w.structure * self.structure
    }
}

/// Short-circuit score for degenerate melodies, if any applies.
pub fn degenerate_score(melody: &[u8]) -> Option<f64> {
    if melody.iter().all(|n| *n == REST) {
        return Some(ALL_REST_SCORE);
    }
    if !(0..melody.len()).any(|i| is_onset(melody, i)) {
        return Some(NO_EVENTS_SCORE);
    }
    None
}

/// Criterion scores, or `None` for degenerate melodies.
pub fn breakdown(melody: &[u8], music: &MusicConfig) -> Option<FitnessBreakdown> {
    if degenerate_score(melody).is_some() {
        return None;
    }
    let analysis = MelodyAnalysis::new(melody, music);
    Some(FitnessBreakdown {
        melody: melodic_flow(&analysis),
        harmony: harmonic_quality(&analysis, music),
        rhythm: rhythm_groove(&analysis),
        structure: structure_coherence(&analysis),
        stability: beat_stability(&analysis),
    })
}

/// Weighted heuristic fitness; higher is better.
pub fn get_fitness(melody: &[u8], music: &MusicConfig, weights: &FitnessWeights) -> f64 {
    if let Some(sentinel) = degenerate_score(melody) {
        return sentinel;
    }
    breakdown(melody, music)
        .map(|b| b.weighted_total(weights))
        .unwrap_or(NO_EVENTS_SCORE)
}

fn interval_score(interval: i32) -> f64 {
    match interval {
        0..=2 => 5.0,
        3..=4 => 2.0,
        i if i > 12 => -20.0,
        i if i > 7 => -10.0,
        _ => 0.0,
    }
}

/// Interval sizes, leap recovery, stepwise inertia and tension resolution.
pub fn melodic_flow(analysis: &MelodyAnalysis) -> f64 {
    let events = &analysis.events;
    if events.len() < 2 {
        return 0.0;
    }
    let pitches: Vec<i32> = events.iter().map(|e| e.pitch as i32).collect();
    let mut score = 0.0;

    for i in 0..pitches.len() - 1 {
        let d1 = pitches[i + 1] - pitches[i];
        score += interval_score(d1.abs());

        if let Some(next_next) = pitches.get(i + 2) {
            let d2 = next_next - pitches[i + 1];
            if d1.abs() > 5 {
                // Gap fill: a leap should turn back or hold.
                score += if d1 * d2 < 0 || d2 == 0 { 10.0 } else { -5.0 };
            } else if d1.abs() <= 4 && d2.abs() <= 4 && d1 * d2 > 0 {
                score += 5.0;
            }
        }
    }

    for pair in events.windows(2) {
        score += tension_resolution(analysis, &pair[0], &pair[1]);
    }

    score
}

fn tension_resolution(analysis: &MelodyAnalysis, curr: &Event, next: &Event) -> f64 {
    let curr_chord = analysis.chord_at(curr.position);
    if curr_chord.contains(curr.pitch_class()) {
        return 0.0;
    }
    let next_chord = analysis.chord_at(next.position);
    let step = (next.pitch as i32 - curr.pitch as i32).abs();
    if step <= 2 && next_chord.contains(next.pitch_class()) {
        30.0
    } else {
        0.0
    }
}

/// Chord tones reward, more so on the beat; out-of-key notes cost a lot.
pub fn harmonic_quality(analysis: &MelodyAnalysis, music: &MusicConfig) -> f64 {
    analysis
        .events
        .iter()
        .map(|event| {
            let pc = event.pitch_class();
            let strong = event.position % analysis.steps_per_beat == 0;
            if analysis.chord_at(event.position).contains(pc) {
                if strong {
                    10.0
                } else {
                    5.0
                }
            } else if music.in_scale(pc) {
                -2.0
            } else {
                -30.0
            }
        })
        .sum()
}

/// Groove template matches per bar, plus a heavy cost for silent downbeats.
pub fn rhythm_groove(analysis: &MelodyAnalysis) -> f64 {
    let mut score = 0.0;
    for bar in &analysis.bars {
        let pattern = onset_pattern(bar);
        match match_groove(&pattern) {
            Some(template) => score += template.reward,
            None => {
                let onsets = pattern.iter().filter(|x| **x == 1).count();
                if onsets > 6 {
                    score -= 5.0;
                }
                if onsets <= 1 {
                    score -= 5.0;
                }
            }
        }
        if pattern.first() != Some(&1) {
            score -= 50.0;
        }
    }
    score
}

/// Cadence, half-cadence tension and restatement of bar 0 in bar 2.
pub fn structure_coherence(analysis: &MelodyAnalysis) -> f64 {
    let Some(last) = analysis.events.last() else {
        return -100.0;
    };
    let mut score = 0.0;

    match last.pitch_class() {
        0 => score += 20.0,
        7 | 11 => score += 5.0,
        _ => {}
    }

    let spb = analysis.steps_per_bar;
    let second_bar_last = analysis
        .events
        .iter()
        .filter(|e| (spb..2 * spb).contains(&e.position))
        .last();
    if let Some(event) = second_bar_last {
        if matches!(event.pitch_class(), 2 | 7 | 11) {
            score += 15.0;
        }
    }

    if analysis.bars.len() >= 3 {
        let r0 = onset_pattern(analysis.bars[0]);
        let r2 = onset_pattern(analysis.bars[2]);
        if r0 == r2 {
            score += 15.0;
        } else {
            let agreement = r0.iter().zip(&r2).filter(|(a, b)| a == b).count();
            if agreement as f64 >= r0.len() as f64 * 0.75 {
                score += 10.0;
            }
        }
    }

    score
}

/// Note density, downbeat anchoring and off-beat onset control.
pub fn beat_stability(analysis: &MelodyAnalysis) -> f64 {
    let melody = analysis.melody;
    if melody.is_empty() {
        return 0.0;
    }
    let mut score = 0.0;

    let changes = melody.windows(2).filter(|w| w[0] != w[1]).count();
    let density = changes as f64 / melody.len() as f64;
    if density > 0.1 && density <= 0.5 {
        score += 7.0;
    } else {
        score -= 6.0;
    }

    let spb = analysis.steps_per_bar;
    let mid_bar = spb / 2;
    for (i, note) in melody.iter().enumerate() {
        let step_in_bar = i % spb;
        if step_in_bar == 0 {
            if *note == REST {
                score -= 100.0;
            } else if is_onset(melody, i) {
                score += 20.0;
            } else {
                score -= 20.0;
            }
        } else if step_in_bar == mid_bar && *note == REST {
            score -= 20.0;
        }

        if i % analysis.steps_per_beat != 0 && is_onset(melody, i) {
            score -= 15.0;
        }
    }

    score
}

#[cfg(test)]
mod tests {
    use super::*;

    fn analyse<'a>(melody: &'a [u8], music: &MusicConfig) -> MelodyAnalysis<'a> {
        MelodyAnalysis::new(melody, music)
    }

    #[test]
    fn test_interval_table() {
        assert_eq!(interval_score(0), 5.0);
        assert_eq!(interval_score(2), 5.0);
        assert_eq!(interval_score(4), 2.0);
        assert_eq!(interval_score(6), 0.0);
        assert_eq!(interval_score(9), -10.0);
        assert_eq!(interval_score(14), -20.0);
    }

    #[test]
    fn test_leap_then_reversal_rewarded() {
        let music = MusicConfig::default();
        // 60 -> 67 (leap up), 67 -> 65 (turn back): +0 +10 for the gap fill,
        // +5 for the step. Tension: 65 over C is off-chord, next none.
        let back = [60u8, 0, 67, 0, 65, 0, 0, 0];
        let onward = [60u8, 0, 67, 0, 69, 0, 0, 0];
        let a = melodic_flow(&analyse(&back, &music));
        let b = melodic_flow(&analyse(&onward, &music));
        assert_eq!(a - b, 15.0);
    }

    #[test]
    fn test_tension_resolution_bonus() {
        let music = MusicConfig {
            chord_roots: vec![48],
            ..MusicConfig::default()
        };
        // D (off-chord) resolving down a step to C (chord tone).
        let melody = [62u8, 0, 60, 0, 0, 0, 0, 0];
        // interval 2: +5, resolution: +30
        assert_eq!(melodic_flow(&analyse(&melody, &music)), 35.0);
    }

    #[test]
    fn test_harmonic_quality_weights() {
        let music = MusicConfig {
            chord_roots: vec![48],
            ..MusicConfig::default()
        };
        // on-beat chord tone, off-beat chord tone, scale tone, chromatic tone
        let melody = [60u8, 64, 62, 61, 0, 0, 0, 0];
        assert_eq!(harmonic_quality(&analyse(&melody, &music), &music), 10.0 + 5.0 - 2.0 - 30.0);
    }

    #[test]
    fn test_rhythm_penalizes_silent_downbeat() {
        let music = MusicConfig::default();
        let tresillo = [60u8, 0, 0, 62, 0, 0, 64, 0];
        let shifted = [0u8, 60, 0, 0, 62, 0, 0, 64];
        assert_eq!(rhythm_groove(&analyse(&tresillo, &music)), 15.0);
        assert_eq!(rhythm_groove(&analyse(&shifted, &music)), -50.0);
    }

    #[test]
    fn test_rhythm_sparse_and_dense_penalties() {
        let music = MusicConfig::default();
        let sparse = [60u8, 60, 60, 60, 60, 60, 60, 60];
        let dense = [60u8, 62, 60, 62, 60, 62, 60, 0];
        assert_eq!(rhythm_groove(&analyse(&sparse, &music)), -5.0);
        assert_eq!(rhythm_groove(&analyse(&dense, &music)), -5.0);
    }

    #[test]
    fn test_structure_cadence_and_restatement() {
        let music = MusicConfig::default();
        let mut melody = vec![0u8; 24];
        melody[0] = 64;
        melody[8] = 67; // second bar ends on G
        melody[16] = 60; // bar 2 repeats bar 0's rhythm, final tonic
        // tonic +20, tension +15, identical patterns +15
        assert_eq!(structure_coherence(&analyse(&melody, &music)), 50.0);
    }

    #[test]
    fn test_beat_stability_downbeats() {
        let music = MusicConfig::default();
        let held = [60u8; 16];
        // density 0 -> -6; bar 0 downbeat onset +20; bar 1 downbeat sustained -20
        assert_eq!(beat_stability(&analyse(&held, &music)), -6.0);

        let mut silent = [0u8; 16];
        silent[1] = 60;
        // density 2/16 -> +7; two silent downbeats -200; two silent mid-bars -40;
        // off-beat onset at 1 -> -15
        assert_eq!(beat_stability(&analyse(&silent, &music)), 7.0 - 200.0 - 40.0 - 15.0);
    }

    #[test]
    fn test_sentinels() {
        let music = MusicConfig::default();
        let w = FitnessWeights::default();
        assert_eq!(get_fitness(&[0; 16], &music, &w), ALL_REST_SCORE);
        assert_eq!(get_fitness(&[], &music, &w), ALL_REST_SCORE);
        assert_ne!(get_fitness(&[0, 0, 0, 60], &music, &w), ALL_REST_SCORE);
        assert!(breakdown(&[0; 8], &music).is_none());
    }
}
