use crate::error::{Result, VectorIndexError};
use crate::select::top_k_positions;
use crate::store::VectorStore;
use crate::types::{QueryResult, ScoredMatch};
use ndarray::parallel::prelude::*;
use ndarray::{Array1, Array2, ArrayViewMut1, Axis};

/// Exact cosine-similarity index over a [`VectorStore`] snapshot.
///
/// Rows are L2-normalized once at build time, so a query is a single matrix-vector
/// product followed by top-k selection. The index never changes after `build`; a new
/// corpus needs a new index.
#[derive(Debug, Clone)]
pub struct SimilarityIndex {
    dimension: usize,
    identifiers: Vec<String>,
    normalized: Array2<f32>,
}

impl SimilarityIndex {
    /// Normalize every stored embedding. Zero rows stay zero and score 0 against any query.
    #[must_use]
    pub fn build(store: &VectorStore) -> Self {
        let mut normalized = store.embeddings().clone();
        normalized
            .axis_iter_mut(Axis(0))
            .into_par_iter()
            .for_each(|mut row| normalize_in_place(&mut row));

        log::info!(
            "Similarity index built with {} vectors (dimension {})",
            normalized.nrows(),
            store.dimension()
        );

        Self {
            dimension: store.dimension(),
            identifiers: store.identifiers().to_vec(),
            normalized,
        }
    }

    /// Top `top_k` corpus entries by cosine similarity to `vector`, best first.
    ///
    /// Asking for more entries than the corpus holds returns the whole corpus.
    pub fn query(&self, vector: &[f32], top_k: usize) -> Result<QueryResult> {
        if vector.len() != self.dimension {
            return Err(VectorIndexError::DimensionMismatch {
                expected: self.dimension,
                actual: vector.len(),
            });
        }
        if top_k == 0 {
            return Err(VectorIndexError::InvalidTopK(top_k));
        }

        let mut query = Array1::from(vector.to_vec());
        normalize_in_place(&mut query.view_mut());

        let scores = self.normalized.dot(&query).to_vec();

        let matches = top_k_positions(&scores, top_k)
            .into_iter()
            .map(|position| ScoredMatch {
                identifier: self.identifiers[position].clone(),
                score: scores[position],
                position,
            })
            .collect::<Vec<_>>();

        log::debug!("Query returned {} of {} entries", matches.len(), self.len());
        Ok(QueryResult::new(matches))
    }

    #[must_use]
    pub const fn dimension(&self) -> usize {
        self.dimension
    }

    /// Number of indexed vectors.
    #[must_use]
    pub fn len(&self) -> usize {
        self.identifiers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.identifiers.is_empty()
    }
}

/// Scale `row` to unit L2 norm. A row whose norm is exactly zero is left untouched.
pub(crate) fn normalize_in_place(row: &mut ArrayViewMut1<'_, f32>) {
    let norm = row.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        row.mapv_inplace(|x| x / norm);
    }
}
