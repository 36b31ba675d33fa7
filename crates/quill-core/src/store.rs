//! Note store
//!
//! The `NoteStore` owns every persisted note. Views only ever hold copies
//! returned from these calls.
//!
//! ## Usage
//!
//! ```ignore
//! let store = NoteStore::open(&config)?;
//!
//! let note = store.create(NoteDraft::new("Title", "Body")).await?;
//! let notes = store.list().await?; // most recently modified first
//! ```
//!
//! The operations are `async` so callers are written against a store that
//! may suspend; the bundled backends complete synchronously.

use std::cell::Cell;

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::models::{Note, NoteDraft, NoteId, NoteStats, NoteUpdate};
use crate::samples;
use crate::storage::{FileBackend, KvBackend, MemoryBackend, StorageError, StorageResult};

/// Async CRUD interface over notes
pub struct NoteStore {
    backend: Box<dyn KvBackend>,
    /// Last id handed out, keeps ids strictly increasing within one store
    last_id: Cell<i64>,
}

impl NoteStore {
    /// Create a store over any backend
    pub fn new(backend: impl KvBackend + 'static) -> Self {
        Self {
            backend: Box::new(backend),
            last_id: Cell::new(0),
        }
    }

    /// Create a store that keeps notes in memory
    pub fn in_memory() -> Self {
        Self::new(MemoryBackend::new())
    }

    /// Open the filesystem store in the configured data directory
    pub fn open(config: &Config) -> StorageResult<Self> {
        Ok(Self::new(FileBackend::from_config(config)?))
    }

    /// All notes, most recently modified first
    pub async fn list(&self) -> StorageResult<Vec<Note>> {
        let mut notes = Vec::new();
        for key in self.backend.keys()? {
            if let Some(note) = self.read(&key)? {
                notes.push(note);
            }
        }
        notes.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(notes)
    }

    /// A single note, `None` when the id is unknown
    pub async fn get(&self, id: NoteId) -> StorageResult<Option<Note>> {
        self.read(&id.key())
    }

    /// Create a note with a fresh time-based id
    pub async fn create(&self, draft: NoteDraft) -> StorageResult<Note> {
        let now = Utc::now();
        let id = self.next_id(now);
        let note = Note::from_draft(id, draft, now);
        self.write(&note)?;
        info!("Created note {}", note.id);
        Ok(note)
    }

    /// Update a note, `None` when the id is unknown
    pub async fn update(&self, id: NoteId, update: NoteUpdate) -> StorageResult<Option<Note>> {
        let Some(mut note) = self.read(&id.key())? else {
            debug!("Update of unknown note {}", id);
            return Ok(None);
        };

        note.apply(update, Utc::now());
        self.write(&note)?;
        info!("Updated note {}", note.id);
        Ok(Some(note))
    }

    /// Delete a note
    ///
    /// Returns `false` when the id is unknown or the backend failed; the
    /// failure is logged rather than returned.
    pub async fn delete(&self, id: NoteId) -> bool {
        match self.backend.remove(&id.key()) {
            Ok(true) => {
                info!("Deleted note {}", id);
                true
            }
            Ok(false) => {
                debug!("Delete of unknown note {}", id);
                false
            }
            Err(e) => {
                warn!("Failed to delete note {}: {}", id, e);
                false
            }
        }
    }

    /// Notes whose title or content contains `query` (case-insensitive)
    pub async fn search(&self, query: &str) -> StorageResult<Vec<Note>> {
        let notes = self.list().await?;
        Ok(notes.into_iter().filter(|n| n.matches(query)).collect())
    }

    /// Aggregate counts for the home screen
    pub async fn stats(&self, now: DateTime<Utc>) -> StorageResult<NoteStats> {
        let notes = self.list().await?;
        Ok(NoteStats::compute(&notes, now))
    }

    /// Seed the sample notes if the store is empty
    ///
    /// Returns the number of notes written.
    pub async fn initialize_sample_data(&self) -> StorageResult<usize> {
        if !self.backend.keys()?.is_empty() {
            return Ok(0);
        }

        let notes = samples::sample_notes(Utc::now());
        for note in &notes {
            self.write(note)?;
            self.last_id.set(self.last_id.get().max(note.id.0));
        }
        info!("Seeded {} sample notes", notes.len());
        Ok(notes.len())
    }

    fn next_id(&self, now: DateTime<Utc>) -> NoteId {
        let id = now.timestamp_millis().max(self.last_id.get() + 1);
        self.last_id.set(id);
        NoteId(id)
    }

    fn read(&self, key: &str) -> StorageResult<Option<Note>> {
        let Some(raw) = self.backend.get(key)? else {
            return Ok(None);
        };
        serde_json::from_str(&raw)
            .map(Some)
            .map_err(|e| StorageError::CorruptRecord {
                key: key.to_string(),
                details: e.to_string(),
            })
    }

    fn write(&self, note: &Note) -> StorageResult<()> {
        let key = note.id.key();
        let raw = serde_json::to_string(note).map_err(|source| StorageError::Serialize {
            key: key.clone(),
            source,
        })?;
        self.backend.set(&key, &raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DEFAULT_COLOR, DEFAULT_TITLE};
    use std::rc::Rc;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_create_then_get() {
        let store = NoteStore::in_memory();
        let content = format!("first line\nsecond line {}", "y".repeat(150));

        let created = store
            .create(NoteDraft::new("My title", content.clone()))
            .await
            .unwrap();
        let loaded = store.get(created.id).await.unwrap().unwrap();

        assert_eq!(loaded.title, "My title");
        assert_eq!(loaded.content, content);
        let expected: String = content.chars().take(100).collect::<String>().replace('\n', " ");
        assert_eq!(loaded.preview, expected);
        assert_eq!(loaded.color, DEFAULT_COLOR);
    }

    #[tokio::test]
    async fn test_create_empty_title_uses_default() {
        let store = NoteStore::in_memory();
        let note = store.create(NoteDraft::new("", "body")).await.unwrap();
        let loaded = store.get(note.id).await.unwrap().unwrap();
        assert_eq!(loaded.title, DEFAULT_TITLE);
    }

    #[tokio::test]
    async fn test_ids_strictly_increase() {
        let store = NoteStore::in_memory();
        let a = store.create(NoteDraft::new("a", "")).await.unwrap();
        let b = store.create(NoteDraft::new("b", "")).await.unwrap();
        let c = store.create(NoteDraft::new("c", "")).await.unwrap();
        assert!(a.id < b.id && b.id < c.id);
    }

    #[tokio::test]
    async fn test_list_orders_by_modified_desc() {
        let store = NoteStore::in_memory();
        let first = store.create(NoteDraft::new("first", "")).await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        let second = store.create(NoteDraft::new("second", "")).await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        store
            .update(first.id, NoteUpdate::default())
            .await
            .unwrap()
            .unwrap();

        let ids: Vec<NoteId> = store.list().await.unwrap().iter().map(|n| n.id).collect();
        assert_eq!(ids, vec![first.id, second.id]);
    }

    #[tokio::test]
    async fn test_update_changes_fields_and_preview() {
        let store = NoteStore::in_memory();
        let note = store.create(NoteDraft::new("t", "old")).await.unwrap();

        let updated = store
            .update(
                note.id,
                NoteUpdate {
                    title: Some("new title".into()),
                    content: Some("a\nb".into()),
                    color: None,
                },
            )
            .await
            .unwrap()
            .unwrap();

        assert_eq!(updated.title, "new title");
        assert_eq!(updated.preview, "a b");
        assert_eq!(updated.color, note.color);
        assert!(updated.updated_at >= note.updated_at);
        assert_eq!(store.get(note.id).await.unwrap().unwrap(), updated);
    }

    #[tokio::test]
    async fn test_update_unknown_returns_none() {
        let store = NoteStore::in_memory();
        let result = store.update(NoteId(404), NoteUpdate::default()).await.unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_delete() {
        let store = NoteStore::in_memory();
        let note = store.create(NoteDraft::new("t", "c")).await.unwrap();

        assert!(store.delete(note.id).await);
        assert!(store.get(note.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delete_nonexistent_is_failure_not_error() {
        let store = NoteStore::in_memory();
        assert!(!store.delete(NoteId(12345)).await);
    }

    #[tokio::test]
    async fn test_backend_failure_surfaces_as_error() {
        let backend = Rc::new(MemoryBackend::new());
        let store = NoteStore::new(backend.clone());
        backend.set_unavailable(true);

        assert!(store.create(NoteDraft::new("t", "c")).await.is_err());
        assert!(store.list().await.is_err());
        assert!(!store.delete(NoteId(1)).await);
    }

    #[tokio::test]
    async fn test_corrupt_record_is_reported() {
        let backend = Rc::new(MemoryBackend::new());
        backend.set("9", "not json").unwrap();
        let store = NoteStore::new(backend);

        let err = store.get(NoteId(9)).await.unwrap_err();
        assert!(matches!(err, StorageError::CorruptRecord { .. }));
    }

    #[tokio::test]
    async fn test_search_and_stats() {
        let store = NoteStore::in_memory();
        store.create(NoteDraft::new("Groceries", "milk")).await.unwrap();
        store
            .create(NoteDraft::new("Work", "quarterly MILK report").with_color("bg-blue-50"))
            .await
            .unwrap();
        store.create(NoteDraft::new("Ideas", "none")).await.unwrap();

        assert_eq!(store.search("milk").await.unwrap().len(), 2);
        assert_eq!(store.search("").await.unwrap().len(), 3);

        let stats = store.stats(Utc::now()).await.unwrap();
        assert_eq!(stats.total, 3);
        assert_eq!(stats.recent, 3);
        assert_eq!(stats.categories, 2);
    }

    #[tokio::test]
    async fn test_sample_data_only_seeds_empty_store() {
        let store = NoteStore::in_memory();
        let seeded = store.initialize_sample_data().await.unwrap();
        assert_eq!(seeded, 4);
        assert_eq!(store.initialize_sample_data().await.unwrap(), 0);

        let notes = store.list().await.unwrap();
        assert_eq!(notes.len(), 4);
        assert_eq!(notes[0].title, "Welcome to Notes");

        let created = store.create(NoteDraft::new("new", "")).await.unwrap();
        assert!(notes.iter().all(|n| n.id != created.id));
    }

    #[tokio::test]
    async fn test_file_store_persists_across_instances() {
        let temp_dir = TempDir::new().unwrap();
        let config = Config {
            data_dir: temp_dir.path().to_path_buf(),
            ..Config::default()
        };

        let id = {
            let store = NoteStore::open(&config).unwrap();
            store.create(NoteDraft::new("kept", "on disk")).await.unwrap().id
        };

        let store = NoteStore::open(&config).unwrap();
        let note = store.get(id).await.unwrap().unwrap();
        assert_eq!(note.title, "kept");
        assert!(config.notes_dir().join(format!("{}.json", id)).exists());
    }
}
