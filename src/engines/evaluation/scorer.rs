use crate::config::AppConfig;
use crate::engines::evaluation::fitness::{degenerate_score, get_fitness, ALL_REST_SCORE};
use crate::error::{MelodyError, Result};
use crate::ml::models::{NgramModel, SequenceModel};
use crate::ml::tokenizer::melody_to_tokens;
use crate::types::{Melody, REST};
use rayon::prelude::*;
use std::path::Path;

/// Scores a batch of melodies, one scalar per melody in input order.
pub trait Scorer: Send + Sync {
    fn name(&self) -> &str;

    fn score_batch(&self, melodies: &[Melody], config: &AppConfig) -> Result<Vec<f64>>;
}

/// Weighted sum of the five heuristic criteria.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicScorer;

impl Scorer for HeuristicScorer {
    fn name(&self) -> &str {
        "heuristic"
    }

    fn score_batch(&self, melodies: &[Melody], config: &AppConfig) -> Result<Vec<f64>> {
        Ok(melodies
            .par_iter()
            .map(|m| get_fitness(m, &config.music, &config.fitness.weights))
            .collect())
    }
}

/// Negative mean next-token loss under a trained sequence model.
pub struct LearnedScorer {
    model: Box<dyn SequenceModel>,
}

impl LearnedScorer {
    pub fn new(model: Box<dyn SequenceModel>) -> Self {
        Self { model }
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let model = NgramModel::load(path)?;
        Ok(Self::new(Box::new(model)))
    }
}

impl Scorer for LearnedScorer {
    fn name(&self) -> &str {
        "learned"
    }

    fn score_batch(&self, melodies: &[Melody], config: &AppConfig) -> Result<Vec<f64>> {
        if !config.fitness.use_learned_model || melodies.is_empty() {
            return Ok(vec![0.0; melodies.len()]);
        }

        // Silent melodies keep their sentinel; everything else goes to the model.
        let live: Vec<usize> = (0..melodies.len())
            .filter(|i| !melodies[*i].iter().all(|n| *n == REST))
            .collect();
        let tokens: Vec<Vec<u16>> = live.iter().map(|i| melody_to_tokens(&melodies[*i])).collect();
        let losses = self.model.batch_loss(&tokens)?;
        if losses.len() != tokens.len() {
            return Err(MelodyError::Scoring(format!(
                "Model returned {} losses for {} melodies",
                losses.len(),
                tokens.len()
            )));
        }

        let mut scores: Vec<f64> = melodies
            .iter()
            .map(|m| degenerate_score(m).unwrap_or(ALL_REST_SCORE))
            .collect();
        for (idx, loss) in live.into_iter().zip(losses) {
            scores[idx] = -loss;
        }
        Ok(scores)
    }
}

/// Pick the scorer once, from the fitness section.
pub fn scorer_from_config(config: &AppConfig) -> Result<Box<dyn Scorer>> {
    if config.fitness.use_learned_model {
        log::info!("Loading learned fitness model from {}", config.fitness.model_path);
        let scorer = LearnedScorer::load(&config.fitness.model_path).map_err(|e| {
            MelodyError::Model(format!(
                "Cannot load model '{}': {}",
                config.fitness.model_path, e
            ))
        })?;
        Ok(Box::new(scorer))
    } else {
        Ok(Box::new(HeuristicScorer))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct ConstantLoss(f64);

    impl SequenceModel for ConstantLoss {
        fn batch_loss(&self, batch: &[Vec<u16>]) -> Result<Vec<f64>> {
            Ok(vec![self.0; batch.len()])
        }
    }

    fn learned_config() -> AppConfig {
        let mut config = AppConfig::default();
        config.fitness.use_learned_model = true;
        config
    }

    #[test]
    fn test_heuristic_preserves_order() {
        let config = AppConfig::default();
        let batch = vec![vec![0u8; 32], vec![60u8; 32], vec![0u8; 32]];
        let scores = HeuristicScorer.score_batch(&batch, &config).unwrap();
        assert_eq!(scores.len(), 3);
        assert_eq!(scores[0], ALL_REST_SCORE);
        assert_ne!(scores[1], ALL_REST_SCORE);
        assert_eq!(scores[2], ALL_REST_SCORE);
    }

    #[test]
    fn test_learned_scorer_disabled_or_empty_gives_zeros() {
        let scorer = LearnedScorer::new(Box::new(ConstantLoss(2.0)));
        let batch = vec![vec![60u8; 8], vec![62u8; 8]];
        let disabled = scorer.score_batch(&batch, &AppConfig::default()).unwrap();
        assert_eq!(disabled, vec![0.0, 0.0]);
        assert!(scorer.score_batch(&[], &learned_config()).unwrap().is_empty());
    }

    #[test]
    fn test_learned_scorer_negates_loss_and_keeps_sentinel() {
        let scorer = LearnedScorer::new(Box::new(ConstantLoss(2.5)));
        let batch = vec![vec![60u8; 8], vec![0u8; 8]];
        let scores = scorer.score_batch(&batch, &learned_config()).unwrap();
        assert_eq!(scores, vec![-2.5, ALL_REST_SCORE]);
    }

    #[test]
    fn test_missing_model_file_is_a_model_error() {
        let mut config = learned_config();
        config.fitness.model_path = "/nonexistent/model.json".to_string();
        assert!(matches!(scorer_from_config(&config), Err(MelodyError::Model(_))));
    }
}
