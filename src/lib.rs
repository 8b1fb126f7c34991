pub mod composer;
pub mod config;
pub mod engines;
pub mod error;
pub mod interactive;
pub mod ml;
pub mod render;
pub mod types;

pub use error::{MelodyError, Result};
