use super::manager::AppConfig;
use crate::error::MelodyError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Named parameter values layered over a base [`AppConfig`] for one run.
///
/// Keys are either qualified (`music.pitch_min`,
/// `evolution.operator_weights.reset`) or bare field names (`pitch_min`,
/// `PITCH_MIN`) that resolve to the single section owning that field.
/// Applying an override never touches the base configuration; it yields a
/// new, validated value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfigOverride {
    entries: BTreeMap<String, Value>,
}

impl ConfigOverride {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn set(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.entries.insert(key.into().to_ascii_lowercase(), value.into());
    }

    /// Produce `base` with every entry applied, then validate the result.
    pub fn apply(&self, base: &AppConfig) -> Result<AppConfig, MelodyError> {
        if self.entries.is_empty() {
            return Ok(base.clone());
        }

        let mut tree = serde_json::to_value(base)?;
        for (key, value) in &self.entries {
            let path = resolve_path(&tree, key)?;
            let slot = path
                .iter()
                .try_fold(&mut tree, |node, segment| node.get_mut(segment.as_str()))
                .ok_or_else(|| unknown_key(key))?;
            log::info!("Config override: {} = {}", path.join("."), value);
            *slot = value.clone();
        }

        let config: AppConfig = serde_json::from_value(tree).map_err(|e| {
            MelodyError::Configuration(format!("Override has an ill-typed value: {}", e))
        })?;
        config.validate()?;
        Ok(config)
    }
}

fn unknown_key(key: &str) -> MelodyError {
    MelodyError::Configuration(format!("Unknown configuration parameter '{}'", key))
}

/// Turn a key into a path of object fields inside the serialized config.
fn resolve_path(tree: &Value, key: &str) -> Result<Vec<String>, MelodyError> {
    if key.contains('.') {
        let path: Vec<String> = key.split('.').map(str::to_string).collect();
        let mut node = tree;
        for segment in &path {
            node = node.get(segment.as_str()).ok_or_else(|| unknown_key(key))?;
        }
        return Ok(path);
    }

    let sections = tree.as_object().ok_or_else(|| unknown_key(key))?;
    let owners: Vec<&String> = sections
        .iter()
        .filter(|(_, section)| section.get(key).is_some())
        .map(|(name, _)| name)
        .collect();

    match owners.as_slice() {
        [section] => Ok(vec![section.to_string(), key.to_string()]),
        [] => Err(unknown_key(key)),
        _ => Err(MelodyError::Configuration(format!(
            "Parameter '{}' is ambiguous; qualify it with a section name",
            key
        ))),
    }
}
