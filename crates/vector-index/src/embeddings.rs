use crate::error::{Result, VectorIndexError};
use crate::index::{normalize_in_place, SimilarityIndex};
use crate::types::QueryResult;
use async_trait::async_trait;
use ndarray::ArrayViewMut1;

/// Turns texts into embeddings living in the same space as the indexed corpus.
///
/// Implementations return exactly one vector per input text, in input order. Any failure
/// (transport, decoding, shape) is reported as [`VectorIndexError::EmbeddingProvider`].
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Short label for logs.
    fn name(&self) -> &str;

    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;
}

/// Embed a single query text.
pub async fn embed_query<P>(provider: &P, text: &str) -> Result<Vec<f32>>
where
    P: EmbeddingProvider + ?Sized,
{
    let mut embeddings = provider.embed(&[text.to_string()]).await?;
    if embeddings.len() != 1 {
        return Err(VectorIndexError::EmbeddingProvider(format!(
            "{} returned {} embeddings for a single query",
            provider.name(),
            embeddings.len()
        )));
    }
    embeddings
        .pop()
        .ok_or_else(|| VectorIndexError::EmbeddingProvider("Empty embedding result".to_string()))
}

/// Embed `text` with `provider` and query `index` with the result.
///
/// A provider vector of the wrong length or with NaN/infinite components is a provider
/// fault, not a caller error, so it surfaces as [`VectorIndexError::EmbeddingProvider`].
pub async fn search_text<P>(
    index: &SimilarityIndex,
    provider: &P,
    text: &str,
    top_k: usize,
) -> Result<QueryResult>
where
    P: EmbeddingProvider + ?Sized,
{
    if top_k == 0 {
        return Err(VectorIndexError::InvalidTopK(top_k));
    }

    log::debug!("Embedding query via {}: '{}'", provider.name(), text);
    let query = embed_query(provider, text).await?;
    if query.len() != index.dimension() {
        return Err(VectorIndexError::EmbeddingProvider(format!(
            "{} returned a {}-dimensional embedding, index expects {}",
            provider.name(),
            query.len(),
            index.dimension()
        )));
    }
    if query.iter().any(|value| !value.is_finite()) {
        return Err(VectorIndexError::EmbeddingProvider(format!(
            "{} returned an embedding with non-finite values",
            provider.name()
        )));
    }

    index.query(&query, top_k)
}

/// Deterministic offline provider: each text maps to a fixed pseudo-random unit vector.
#[derive(Debug, Clone)]
pub struct StubEmbedder {
    dimension: usize,
}

impl StubEmbedder {
    #[must_use]
    pub const fn new(dimension: usize) -> Self {
        Self { dimension }
    }

    #[must_use]
    pub const fn dimension(&self) -> usize {
        self.dimension
    }

    /// The vector this provider returns for `text`.
    #[must_use]
    pub fn embed_one(&self, text: &str) -> Vec<f32> {
        stub_embed(text, self.dimension)
    }
}

#[async_trait]
impl EmbeddingProvider for StubEmbedder {
    fn name(&self) -> &str {
        "stub"
    }

    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|text| self.embed_one(text)).collect())
    }
}

/// Seeds a xorshift64* stream from the FNV-1a hash of the text and the dimension, then
/// spreads its top 24 bits over [-1, 1).
fn stub_embed(text: &str, dimension: usize) -> Vec<f32> {
    let seed = text
        .bytes()
        .fold(FNV_OFFSET, |hash, byte| {
            (hash ^ u64::from(byte)).wrapping_mul(FNV_PRIME)
        })
        .rotate_left(17)
        ^ dimension as u64;
    let mut stream = XorShiftStar(seed | 1);

    let mut values: Vec<f32> = (0..dimension)
        .map(|_| (stream.next_u64() >> 40) as f32 / (1u64 << 23) as f32 - 1.0)
        .collect();
    normalize_in_place(&mut ArrayViewMut1::from(values.as_mut_slice()));
    values
}

const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

struct XorShiftStar(u64);

impl XorShiftStar {
    fn next_u64(&mut self) -> u64 {
        self.0 ^= self.0 >> 12;
        self.0 ^= self.0 << 25;
        self.0 ^= self.0 >> 27;
        self.0.wrapping_mul(0x2545_F491_4F6C_DD1D)
    }
}
