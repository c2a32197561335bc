use crate::error::{Result, VectorIndexError};
use crate::types::CorpusBatch;
use ndarray::{s, Array2};

/// The loaded corpus: identifiers and an `[N, D]` embedding matrix, in insertion order.
///
/// Built once by [`VectorStore::load`] and read-only afterwards.
#[derive(Debug, Clone)]
pub struct VectorStore {
    identifiers: Vec<String>,
    embeddings: Array2<f32>,
}

impl VectorStore {
    /// Concatenate `batches` in order into a single corpus.
    ///
    /// Every batch must pair identifiers with embedding rows one to one and share the
    /// column count of the first batch. Nothing is kept if any batch is rejected.
    pub fn load(batches: Vec<CorpusBatch>) -> Result<Self> {
        let Some(first) = batches.first() else {
            return Err(VectorIndexError::EmptyCorpus);
        };
        let dimension = first.embeddings.ncols();

        let mut total = 0usize;
        for (batch_idx, batch) in batches.iter().enumerate() {
            let rows = batch.embeddings.nrows();
            if batch.identifiers.len() != rows {
                return Err(VectorIndexError::CountMismatch {
                    batch: batch_idx,
                    identifiers: batch.identifiers.len(),
                    rows,
                });
            }
            if batch.embeddings.ncols() != dimension {
                return Err(VectorIndexError::DimensionMismatch {
                    expected: dimension,
                    actual: batch.embeddings.ncols(),
                });
            }
            total += rows;
        }

        if total == 0 {
            return Err(VectorIndexError::EmptyCorpus);
        }
        if dimension == 0 {
            return Err(VectorIndexError::ZeroDimension);
        }

        let mut identifiers = Vec::with_capacity(total);
        let mut embeddings = Array2::<f32>::zeros((total, dimension));
        let mut offset = 0usize;
        for batch in batches {
            let rows = batch.embeddings.nrows();
            embeddings
                .slice_mut(s![offset..offset + rows, ..])
                .assign(&batch.embeddings);
            identifiers.extend(batch.identifiers);
            offset += rows;
        }

        log::debug!("Loaded corpus of {total} embeddings (dimension {dimension})");

        Ok(Self {
            identifiers,
            embeddings,
        })
    }

    /// Number of (identifier, embedding) pairs.
    #[must_use]
    pub fn size(&self) -> usize {
        self.identifiers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.identifiers.is_empty()
    }

    /// Length shared by every embedding.
    #[must_use]
    pub fn dimension(&self) -> usize {
        self.embeddings.ncols()
    }

    #[must_use]
    pub fn identifiers(&self) -> &[String] {
        &self.identifiers
    }

    #[must_use]
    pub const fn embeddings(&self) -> &Array2<f32> {
        &self.embeddings
    }
}
