//! Key-value backend contract
//!
//! A backend maps string keys to serialized records. It is used from a
//! single thread, so implementations take `&self` and keep their own
//! interior mutability.

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;

use super::error::{StorageError, StorageResult};

/// Persistence contract consumed by [`crate::NoteStore`]
pub trait KvBackend {
    /// All keys currently stored
    fn keys(&self) -> StorageResult<Vec<String>>;

    /// Read a record, `None` when the key is unknown
    fn get(&self, key: &str) -> StorageResult<Option<String>>;

    /// Insert or replace a record
    fn set(&self, key: &str, value: &str) -> StorageResult<()>;

    /// Remove a record, returning whether it existed
    fn remove(&self, key: &str) -> StorageResult<bool>;
}

/// In-memory backend
///
/// Can be switched into an unavailable state where every call fails, which
/// is how callers exercise their storage-failure paths.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    records: RefCell<BTreeMap<String, String>>,
    unavailable: Cell<bool>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent call fail (or succeed again)
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.set(unavailable);
    }

    /// Number of stored records
    pub fn len(&self) -> usize {
        self.records.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.borrow().is_empty()
    }

    fn check(&self) -> StorageResult<()> {
        if self.unavailable.get() {
            return Err(StorageError::Unavailable(
                "memory backend is switched off".to_string(),
            ));
        }
        Ok(())
    }
}

impl KvBackend for MemoryBackend {
    fn keys(&self) -> StorageResult<Vec<String>> {
        self.check()?;
        Ok(self.records.borrow().keys().cloned().collect())
    }

    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        self.check()?;
        Ok(self.records.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        self.check()?;
        self.records
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> StorageResult<bool> {
        self.check()?;
        Ok(self.records.borrow_mut().remove(key).is_some())
    }
}

/// Shared backends work through a reference as well
impl<B: KvBackend + ?Sized> KvBackend for std::rc::Rc<B> {
    fn keys(&self) -> StorageResult<Vec<String>> {
        (**self).keys()
    }

    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> StorageResult<bool> {
        (**self).remove(key)
    }
}
