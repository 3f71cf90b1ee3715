//! Profile Storage Layer
//!
//! Wholesale JSON persistence for driver profiles: one document per
//! driver id, rewritten after every mutation. A corrupt document is
//! treated as absent so the session starts from a fresh default and
//! silently overwrites the corruption on the next save.

mod store;

pub use store::{JsonFileStore, MemoryStore, ProfileStore};

use thiserror::Error;

/// Storage errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}
