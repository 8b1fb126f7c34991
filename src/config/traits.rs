use crate::error::MelodyError;
use serde::{Deserialize, Serialize};

/// Trait for configuration sections
pub trait ConfigSection: Serialize + for<'de> Deserialize<'de> + Default + Clone {
    fn section_name() -> &'static str;
    fn validate(&self) -> Result<(), MelodyError>;
}

/// Shorthand for a section validation failure.
pub(crate) fn invalid<S: ConfigSection>(message: impl Into<String>) -> MelodyError {
    MelodyError::Configuration(format!("[{}] {}", S::section_name(), message.into()))
}
