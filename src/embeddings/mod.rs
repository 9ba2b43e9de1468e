//! Embedding generation.
//!
//! `EmbeddingProvider` is the seam the RAG pipeline depends on. Two
//! implementations ship: an OpenAI-compatible HTTP client that degrades
//! to deterministic fallback vectors on failure, and a fully offline
//! hashed-bag-of-tokens provider.

pub mod fallback;
pub mod hash;
pub mod openai;
pub mod provider;

pub use hash::HashEmbeddingProvider;
pub use openai::OpenAiEmbeddingProvider;
pub use provider::EmbeddingProvider;
