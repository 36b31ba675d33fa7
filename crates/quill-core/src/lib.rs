//! Quill Core Library
//!
//! This crate provides the data side of Quill, a small local-first
//! note-taking application: the note record, the note store that persists
//! it, and the broadcast channel used to tell other open sessions that a
//! note changed.
//!
//! # Architecture
//!
//! - **Key-value backend**: notes are stored as one JSON record per key.
//!   The store never depends on how the backend keeps its records.
//!
//! # Quick Start
//!
//! ```text
//! let store = NoteStore::in_memory();
//!
//! let note = store.create(NoteDraft::new("Groceries", "Milk, eggs")).await?;
//! let notes = store.list().await?;
//! ```
//!
//! # Modules
//!
//! - `store`: Async CRUD interface over notes (main entry point)
//! - `models`: Note record, drafts, updates and derived fields
//! - `storage`: Key-value backends (memory, filesystem) and storage errors
//! - `broadcast`: Cross-session change notifications
//! - `samples`: Seed notes for a fresh store
//! - `config`: Application configuration

pub mod broadcast;
pub mod config;
pub mod models;
pub mod samples;
pub mod storage;
pub mod store;

pub use broadcast::{BroadcastChannel, BroadcastEvent, BroadcastHub, ChangeKind, Subscription};
pub use config::{Config, RerenderPolicy};
pub use models::{Note, NoteDraft, NoteId, NoteStats, NoteUpdate};
pub use storage::{FileBackend, KvBackend, MemoryBackend, StorageError, StorageResult};
pub use store::NoteStore;
