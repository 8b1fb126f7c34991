pub mod ngram;

pub use ngram::NgramModel;

use crate::error::Result;

/// An autoregressive token model.
pub trait SequenceModel: Send + Sync {
    /// Mean next-token negative log-likelihood of each sequence.
    fn batch_loss(&self, batch: &[Vec<u16>]) -> Result<Vec<f64>>;
}
