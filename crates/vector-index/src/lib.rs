//! # Product Vector Index
//!
//! Exact top-k cosine-similarity search over a fixed corpus of precomputed embeddings.
//!
//! ## Architecture
//!
//! ```text
//! CorpusBatch[]  (identifiers + [n_i, D] matrix)
//!     │
//!     ├──> VectorStore
//!     │      └─> one [N, D] matrix, insertion order kept
//!     │
//!     ├──> SimilarityIndex
//!     │      └─> L2-normalized rows, brute-force inner product
//!     │
//!     └──> EmbeddingProvider
//!            └─> query text -> vector -> QueryResult
//! ```
//!
//! ## Example
//!
//! ```
//! use ndarray::array;
//! use product_vector_index::{CorpusBatch, SimilarityIndex, VectorStore};
//!
//! let store = VectorStore::load(vec![CorpusBatch::new(
//!     vec!["apple".into(), "banana".into(), "combo".into()],
//!     array![[1.0, 0.0], [0.0, 1.0], [1.0, 1.0]],
//! )])?;
//! let index = SimilarityIndex::build(&store);
//!
//! let result = index.query(&[1.0, 0.0], 2)?;
//! assert_eq!(result.matches()[0].identifier, "apple");
//! assert_eq!(result.matches()[1].identifier, "combo");
//! # Ok::<(), product_vector_index::VectorIndexError>(())
//! ```

mod embeddings;
mod error;
mod index;
mod select;
mod store;
mod types;

pub use embeddings::{embed_query, search_text, EmbeddingProvider, StubEmbedder};
pub use error::{Result, VectorIndexError};
pub use index::SimilarityIndex;
pub use store::VectorStore;
pub use types::{CorpusBatch, QueryResult, ScoredMatch};
