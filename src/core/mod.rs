pub mod config;
pub mod errors;
pub mod logging;

pub use config::{EmbeddingSettings, RagSettings};
pub use errors::RagError;
