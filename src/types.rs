use serde::{Deserialize, Serialize};

/// A melody is a fixed-length grid of steps. `0` is a rest, any other value
/// is a MIDI pitch. A value equal to its predecessor sustains that note.
pub type Melody = Vec<u8>;

/// Rest marker in a melody grid.
pub const REST: u8 = 0;

/// A note onset derived from a melody.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Event {
    pub position: usize,
    pub pitch: u8,
}

impl Event {
    pub fn pitch_class(&self) -> u8 {
        self.pitch % 12
    }
}

/// A melody together with its fitness for the generation it was scored in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Individual {
    pub melody: Melody,
    pub fitness: f64,
}

impl Individual {
    pub fn new(melody: Melody, fitness: f64) -> Self {
        Self { melody, fitness }
    }
}

/// Set of pitch classes (0..12) stored as a bitmask.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct PitchClassSet(u16);

impl PitchClassSet {
    pub fn new() -> Self {
        Self(0)
    }

    pub fn from_classes<I: IntoIterator<Item = u8>>(classes: I) -> Self {
        let mut set = Self::new();
        for pc in classes {
            set.insert(pc);
        }
        set
    }

    pub fn insert(&mut self, pitch_class: u8) {
        self.0 |= 1 << (pitch_class % 12);
    }

    pub fn contains(&self, pitch_class: u8) -> bool {
        self.0 & (1 << (pitch_class % 12)) != 0
    }

    /// Pitch classes in ascending order.
    pub fn classes(&self) -> Vec<u8> {
        (0..12).filter(|pc| self.contains(*pc)).collect()
    }
}

/// Sustain-aware onset test for position `i`.
pub fn is_onset(melody: &[u8], i: usize) -> bool {
    melody[i] != REST && (i == 0 || melody[i] != melody[i - 1])
}
