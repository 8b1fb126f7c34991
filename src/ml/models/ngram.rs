use super::SequenceModel;
use crate::error::{MelodyError, Result};
use crate::ml::tokenizer::VOCAB_SIZE;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Next-token counts for one context token.
type TransitionTable = BTreeMap<u16, u32>;

/// Bigram token model with add-alpha smoothing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NgramModel {
    pub vocab_size: usize,
    pub alpha: f64,
    pub transitions: BTreeMap<u16, TransitionTable>,
}

impl NgramModel {
    pub fn new(alpha: f64) -> Self {
        Self {
            vocab_size: VOCAB_SIZE,
            alpha,
            transitions: BTreeMap::new(),
        }
    }

    /// Count every adjacent token pair in `corpus`.
    pub fn train(corpus: &[Vec<u16>], alpha: f64) -> Result<Self> {
        if alpha <= 0.0 {
            return Err(MelodyError::Model("Smoothing alpha must be positive".to_string()));
        }
        let mut model = Self::new(alpha);
        for sequence in corpus {
            model.check_tokens(sequence)?;
            for pair in sequence.windows(2) {
                *model
                    .transitions
                    .entry(pair[0])
                    .or_default()
                    .entry(pair[1])
                    .or_insert(0) += 1;
            }
        }
        log::info!(
            "Trained bigram model on {} sequences ({} contexts)",
            corpus.len(),
            model.transitions.len()
        );
        Ok(model)
    }

    pub fn probability(&self, prev: u16, next: u16) -> f64 {
        let smoothing = self.alpha * self.vocab_size as f64;
        match self.transitions.get(&prev) {
            Some(table) => {
                let total: u32 = table.values().sum();
                let count = table.get(&next).copied().unwrap_or(0);
                (count as f64 + self.alpha) / (total as f64 + smoothing)
            }
            None => 1.0 / self.vocab_size as f64,
        }
    }

    /// Mean negative log-likelihood of predicting each token from its
    /// predecessor. Sequences shorter than two tokens have zero loss.
    pub fn sequence_loss(&self, tokens: &[u16]) -> Result<f64> {
        self.check_tokens(tokens)?;
        if tokens.len() < 2 {
            return Ok(0.0);
        }
        let total: f64 = tokens
            .windows(2)
            .map(|pair| -self.probability(pair[0], pair[1]).ln())
            .sum();
        Ok(total / (tokens.len() - 1) as f64)
    }

    /// Mean loss over a corpus, for training reports.
    pub fn corpus_loss(&self, corpus: &[Vec<u16>]) -> Result<f64> {
        if corpus.is_empty() {
            return Ok(0.0);
        }
        let losses = self.batch_loss(corpus)?;
        Ok(losses.iter().sum::<f64>() / losses.len() as f64)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let model: Self = serde_json::from_str(&contents)?;
        if model.vocab_size == 0 || model.alpha <= 0.0 {
            return Err(MelodyError::Model("Model file has an invalid header".to_string()));
        }
        Ok(model)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let json = serde_json::to_string(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    fn check_tokens(&self, tokens: &[u16]) -> Result<()> {
        match tokens.iter().find(|t| **t as usize >= self.vocab_size) {
            Some(bad) => Err(MelodyError::Model(format!(
                "Token {} is outside the vocabulary of {}",
                bad, self.vocab_size
            ))),
            None => Ok(()),
        }
    }
}

impl SequenceModel for NgramModel {
    fn batch_loss(&self, batch: &[Vec<u16>]) -> Result<Vec<f64>> {
        batch.iter().map(|tokens| self.sequence_loss(tokens)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ml::tokenizer::SUSTAIN_TOKEN;

    fn corpus() -> Vec<Vec<u16>> {
        vec![
            vec![60, 62, 64, 65, 67, SUSTAIN_TOKEN, 0, 60],
            vec![60, 62, 64, 62, 60, SUSTAIN_TOKEN, 0, 0],
        ]
    }

    #[test]
    fn test_familiar_sequences_have_lower_loss() {
        let model = NgramModel::train(&corpus(), 0.1).unwrap();
        let familiar = model.sequence_loss(&[60, 62, 64, 65]).unwrap();
        let strange = model.sequence_loss(&[60, 71, 61, 83]).unwrap();
        assert!(familiar < strange);
    }

    #[test]
    fn test_probabilities_sum_to_one() {
        let model = NgramModel::train(&corpus(), 0.5).unwrap();
        let total: f64 = (0..VOCAB_SIZE as u16).map(|next| model.probability(60, next)).sum();
        assert!((total - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_out_of_vocabulary_token_is_rejected() {
        let model = NgramModel::new(1.0);
        assert!(model.sequence_loss(&[60, 500]).is_err());
        assert!(NgramModel::train(&[vec![999]], 1.0).is_err());
    }

    #[test]
    fn test_save_load_roundtrip() {
        let model = NgramModel::train(&corpus(), 0.2).unwrap();
        let path = std::env::temp_dir().join(format!("melodyga_ngram_{}.json", std::process::id()));
        model.save(&path).unwrap();
        let loaded = NgramModel::load(&path).unwrap();
        let _ = std::fs::remove_file(&path);
        assert_eq!(loaded.transitions, model.transitions);
        assert!((loaded.alpha - model.alpha).abs() < 1e-12);
    }
}
