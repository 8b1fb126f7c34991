//! Derived views of a melody shared by the fitness criteria: note onsets,
//! bar slices, per-bar onset patterns and the chord active at each bar.

use crate::config::MusicConfig;
use crate::types::{is_onset, Event, PitchClassSet};

/// Onsets of `melody`: positions where a new note starts.
pub fn extract_events(melody: &[u8]) -> Vec<Event> {
    (0..melody.len())
        .filter(|i| is_onset(melody, *i))
        .map(|i| Event {
            position: i,
            pitch: melody[i],
        })
        .collect()
}

/// Consecutive bar slices; the last one may be short.
pub fn split_bars(melody: &[u8], steps_per_bar: usize) -> Vec<&[u8]> {
    melody.chunks(steps_per_bar.max(1)).collect()
}

/// Onset pattern of one bar (`1` where a note starts). The first step of the
/// bar counts as an onset whenever it sounds.
pub fn onset_pattern(bar: &[u8]) -> Vec<u8> {
    (0..bar.len()).map(|i| is_onset(bar, i) as u8).collect()
}

/// Triads built on each chord root.
///
/// Roots in the scale get the diatonic triad (scale degrees `d`, `d+2`,
/// `d+4`, wrapping). Other roots fall back to a major triad.
pub fn derive_chords(chord_roots: &[u8], scale: &[u8]) -> Vec<PitchClassSet> {
    chord_roots
        .iter()
        .map(|root| {
            let root_pc = root % 12;
            match scale.iter().position(|pc| *pc == root_pc) {
                Some(degree) => PitchClassSet::from_classes(
                    [0, 2, 4].iter().map(|offset| scale[(degree + offset) % scale.len()]),
                ),
                None => {
                    PitchClassSet::from_classes([root_pc, (root_pc + 4) % 12, (root_pc + 7) % 12])
                }
            }
        })
        .collect()
}

/// Everything the criteria need, derived once per melody.
pub struct MelodyAnalysis<'a> {
    pub melody: &'a [u8],
    pub events: Vec<Event>,
    pub bars: Vec<&'a [u8]>,
    pub chords: Vec<PitchClassSet>,
    pub steps_per_bar: usize,
    pub steps_per_beat: usize,
}

impl<'a> MelodyAnalysis<'a> {
    pub fn new(melody: &'a [u8], music: &MusicConfig) -> Self {
        let steps_per_bar = music.steps_per_bar().max(1);
        Self {
            melody,
            events: extract_events(melody),
            bars: split_bars(melody, steps_per_bar),
            chords: derive_chords(&music.chord_roots, &music.scale),
            steps_per_bar,
            steps_per_beat: music.steps_per_beat.max(1),
        }
    }

    /// Chord active at a melody position.
    pub fn chord_at(&self, position: usize) -> PitchClassSet {
        if self.chords.is_empty() {
            return PitchClassSet::new();
        }
        self.chords[(position / self.steps_per_bar) % self.chords.len()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const C_MAJOR: [u8; 7] = [0, 2, 4, 5, 7, 9, 11];

    #[test]
    fn test_sustain_is_not_an_onset() {
        let events = extract_events(&[60, 60, 0, 62, 64, 64, 0, 0]);
        let positions: Vec<usize> = events.iter().map(|e| e.position).collect();
        assert_eq!(positions, vec![0, 3, 4]);
    }

    #[test]
    fn test_default_progression_triads() {
        let chords = derive_chords(&[48, 43, 45, 41], &C_MAJOR);
        assert_eq!(chords[0].classes(), vec![0, 4, 7]);
        assert_eq!(chords[1].classes(), vec![2, 7, 11]);
        assert_eq!(chords[2].classes(), vec![0, 4, 9]);
        assert_eq!(chords[3].classes(), vec![0, 5, 9]);
    }

    #[test]
    fn test_chromatic_root_falls_back_to_major_triad() {
        // 49 = C#, not in C major.
        let chords = derive_chords(&[49], &C_MAJOR);
        assert_eq!(chords[0].classes(), vec![1, 5, 8]);
        assert_eq!(chords, derive_chords(&[49], &C_MAJOR));
    }

    #[test]
    fn test_chord_index_cycles_per_bar() {
        let music = MusicConfig::default();
        let melody = vec![60u8; 48];
        let analysis = MelodyAnalysis::new(&melody, &music);
        assert_eq!(analysis.chord_at(0), analysis.chords[0]);
        assert_eq!(analysis.chord_at(9), analysis.chords[1]);
        assert_eq!(analysis.chord_at(32), analysis.chords[0]);
        assert_eq!(analysis.bars.len(), 6);
    }

    #[test]
    fn test_onset_pattern_restarts_each_bar() {
        assert_eq!(onset_pattern(&[60, 60, 0, 62, 62, 64, 0, 0]), vec![1, 0, 0, 1, 0, 1, 0, 0]);
    }
}
