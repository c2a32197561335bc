use thiserror::Error;

pub type Result<T> = std::result::Result<T, VectorIndexError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum VectorIndexError {
    #[error("Invalid vector dimension: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Batch {batch}: {identifiers} identifiers but {rows} embedding rows")]
    CountMismatch {
        batch: usize,
        identifiers: usize,
        rows: usize,
    },

    #[error("Corpus is empty: no embeddings were loaded")]
    EmptyCorpus,

    #[error("Corpus embeddings have zero dimensions")]
    ZeroDimension,

    #[error("Invalid top_k {0}: must be at least 1")]
    InvalidTopK(usize),

    #[error("Embedding provider error: {0}")]
    EmbeddingProvider(String),
}
