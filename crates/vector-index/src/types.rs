use ndarray::Array2;
use serde::Serialize;

/// One source batch: identifiers paired positionally with the rows of `embeddings`.
#[derive(Debug, Clone)]
pub struct CorpusBatch {
    pub identifiers: Vec<String>,
    pub embeddings: Array2<f32>,
}

impl CorpusBatch {
    #[must_use]
    pub const fn new(identifiers: Vec<String>, embeddings: Array2<f32>) -> Self {
        Self {
            identifiers,
            embeddings,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredMatch {
    pub identifier: String,
    pub score: f32,
    /// Position of the matched embedding in the corpus.
    pub position: usize,
}

/// Ranked matches, best first.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct QueryResult {
    matches: Vec<ScoredMatch>,
}

impl QueryResult {
    pub(crate) const fn new(matches: Vec<ScoredMatch>) -> Self {
        Self { matches }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.matches.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }

    #[must_use]
    pub fn matches(&self) -> &[ScoredMatch] {
        &self.matches
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ScoredMatch> {
        self.matches.iter()
    }
}

impl IntoIterator for QueryResult {
    type Item = ScoredMatch;
    type IntoIter = std::vec::IntoIter<ScoredMatch>;

    fn into_iter(self) -> Self::IntoIter {
        self.matches.into_iter()
    }
}

impl<'a> IntoIterator for &'a QueryResult {
    type Item = &'a ScoredMatch;
    type IntoIter = std::slice::Iter<'a, ScoredMatch>;

    fn into_iter(self) -> Self::IntoIter {
        self.matches.iter()
    }
}
