//! Vector infrastructure components
//!
//! Provides text chunking, embedding generation with an on-disk cache, and
//! the exact vector index used for retrieval.

#[cfg(feature = "bert")]
pub mod bert_model;
pub mod chunker;
pub mod embedder;
pub mod embedding_cache;
pub mod flat_index;
pub mod hash_model;

#[cfg(feature = "bert")]
pub use bert_model::BertEmbeddingModel;
pub use chunker::{split_sentences, Chunker};
pub use embedder::{create_embedding_service, Embedder};
pub use embedding_cache::{CachedEmbeddings, EmbeddingCache, EmbeddingCacheError};
pub use flat_index::{squared_l2, FlatL2Index, SearchHit};
pub use hash_model::{HashEmbeddingModel, HASH_MODEL_ID};
