//! Storage layer
//!
//! Notes are persisted through a small key-value contract so the store can
//! run against memory (tests, headless sessions) or the filesystem.
//!
//! ## Backends
//!
//! - **MemoryBackend**: records live in a map owned by the process
//! - **FileBackend**: one JSON file per record, written atomically

pub mod backend;
pub mod error;
pub mod persistence;

pub use backend::{KvBackend, MemoryBackend};
pub use error::{StorageError, StorageResult};
pub use persistence::FileBackend;
