use super::{
    composition::CompositionConfig, evolution::EvolutionConfig, fitness::FitnessConfig,
    music::MusicConfig, render::RenderConfig, traits::ConfigSection,
};
use crate::error::MelodyError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::{Arc, RwLock};

/// Prefix of environment variables layered over the config file,
/// e.g. `MELODY__EVOLUTION__GENERATIONS=50`.
pub const ENV_PREFIX: &str = "MELODY";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub music: MusicConfig,
    pub evolution: EvolutionConfig,
    pub fitness: FitnessConfig,
    pub render: RenderConfig,
    pub composition: CompositionConfig,
}

impl AppConfig {
    pub fn validate(&self) -> Result<(), MelodyError> {
        self.music.validate()?;
        self.evolution.validate()?;
        self.fitness.validate()?;
        self.render.validate()?;
        self.composition.validate()?;
        Ok(())
    }
}

pub struct ConfigManager {
    config: Arc<RwLock<AppConfig>>,
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigManager {
    pub fn new() -> Self {
        Self {
            config: Arc::new(RwLock::new(AppConfig::default())),
        }
    }

    /// Load defaults, then the optional file (TOML or JSON by extension),
    /// then `MELODY__*` environment variables.
    pub fn load_layered<P: AsRef<Path>>(&self, path: Option<P>) -> Result<(), MelodyError> {
        let mut builder = config::Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path.as_ref()).required(true));
        }
        let settings = builder
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: AppConfig = settings.try_deserialize()?;
        config.validate()?;

        *self.config.write().unwrap_or_else(|e| e.into_inner()) = config;
        Ok(())
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), MelodyError> {
        let config = self.get();
        let toml_str = toml::to_string_pretty(&config)
            .map_err(|e| MelodyError::Configuration(format!("Failed to serialize: {}", e)))?;

        std::fs::write(path, toml_str)
            .map_err(|e| MelodyError::Configuration(format!("Failed to write config: {}", e)))?;

        Ok(())
    }

    pub fn get(&self) -> AppConfig {
        self.config.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Apply `f` to a copy and commit it only if the result validates.
    pub fn update<F>(&self, f: F) -> Result<(), MelodyError>
    where
        F: FnOnce(&mut AppConfig),
    {
        let mut config = self.config.write().unwrap_or_else(|e| e.into_inner());
        let mut candidate = config.clone();
        f(&mut candidate);
        candidate.validate()?;
        *config = candidate;
        Ok(())
    }
}
