pub mod models;
pub mod preprocess;
pub mod tokenizer;

pub use models::{NgramModel, SequenceModel};
