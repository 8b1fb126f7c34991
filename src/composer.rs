//! Four-section movement: theme, variation, contrast and coda.

use crate::config::{AppConfig, ConfigOverride};
use crate::engines::generation::{EvolutionEngine, ProgressCallback};
use crate::error::Result;
use crate::types::Melody;

/// The sections of a composed movement, in playing order.
#[derive(Debug, Clone, PartialEq)]
pub struct Movement {
    pub theme: Melody,
    pub variation: Melody,
    pub contrast: Melody,
    pub coda: Melody,
}

impl Movement {
    pub fn sections(&self) -> [(&'static str, &Melody); 4] {
        [
            ("A", &self.theme),
            ("A'", &self.variation),
            ("B", &self.contrast),
            ("A (coda)", &self.coda),
        ]
    }

    /// All four sections back to back.
    pub fn concatenated(&self) -> Melody {
        self.sections()
            .into_iter()
            .flat_map(|(_, melody)| melody.iter().copied())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.sections().iter().map(|(_, m)| m.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Engine configuration for one section: `base` with its own generation
/// budget and, optionally, its own mutation rate.
fn section_config(base: &AppConfig, generations: usize, mutation_rate: Option<f64>) -> AppConfig {
    let mut config = base.clone();
    config.evolution.generations = generations;
    if let Some(rate) = mutation_rate {
        config.evolution.mutation_rate = rate;
    }
    config
}

/// Evolve the movement section by section.
///
/// The variation is seeded from the theme, the contrast runs in a higher,
/// denser register, and the coda repeats the theme. All sections share the
/// base configuration's scorer choice and seed.
pub fn compose_movement<C: ProgressCallback>(
    config: &AppConfig,
    progress: &mut C,
) -> Result<Movement> {
    let plan = &config.composition;
    log::info!("Composing movement: A (theme) -> A' (variation) -> B (contrast) -> A (coda)");

    log::info!("[Section 1] Composing theme A");
    let mut standard = EvolutionEngine::new(section_config(config, plan.theme_generations, None))?;
    let theme = standard.train(None, None, progress)?.melody;

    log::info!("[Section 2] Composing variation A'");
    let mut short = EvolutionEngine::new(section_config(config, plan.variation_generations, None))?;
    let variation = short.train(Some(&theme), None, progress)?.melody;

    log::info!("[Section 3] Composing contrast B");
    let mut creative = EvolutionEngine::new(section_config(
        config,
        plan.contrast_generations,
        Some(plan.contrast_mutation_rate),
    ))?;
    let contrast_override = ConfigOverride::new()
        .set("pitch_min", plan.contrast_pitch_min)
        .set("pitch_max", plan.contrast_pitch_max)
        .set("rest_prob", plan.contrast_rest_prob);
    let contrast = creative.train(None, Some(&contrast_override), progress)?.melody;

    log::info!("[Section 4] Assembling coda");
    let coda = theme.clone();

    Ok(Movement {
        theme,
        variation,
        contrast,
        coda,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_concatenation_order() {
        let movement = Movement {
            theme: vec![60, 62],
            variation: vec![64],
            contrast: vec![72, 0, 74],
            coda: vec![60, 62],
        };
        assert_eq!(movement.concatenated(), vec![60, 62, 64, 72, 0, 74, 60, 62]);
        assert_eq!(movement.len(), 8);
        assert!(!movement.is_empty());
    }

    #[test]
    fn test_section_config_keeps_base() {
        let base = AppConfig::default();
        let section = section_config(&base, 7, Some(0.25));
        assert_eq!(section.evolution.generations, 7);
        assert_eq!(section.evolution.mutation_rate, 0.25);
        assert_eq!(section.music, base.music);
        assert_eq!(base.evolution.generations, AppConfig::default().evolution.generations);
    }
}
