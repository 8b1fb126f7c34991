pub mod midi;

pub use midi::{chord_notes, render_smf, write_midi};
