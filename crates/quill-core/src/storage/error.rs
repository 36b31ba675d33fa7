//! Storage errors

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors returned by backends and the note store
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Cannot create notes directory '{path}': {source}")]
    CreateDirectory {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Permission denied on '{path}'")]
    PermissionDenied {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Cannot read '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Cannot write '{path}': {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The temporary record could not replace the old one
    #[error("Cannot move '{from}' into place at '{to}': {source}")]
    Replace {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A stored record is not a valid note
    #[error("Record '{key}' is corrupted: {details}")]
    CorruptRecord { key: String, details: String },

    #[error("Cannot encode record '{key}': {source}")]
    Serialize {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    /// The backend refused the operation
    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    #[error(transparent)]
    Io(#[from] io::Error),
}

impl StorageError {
    /// Wrap a failed write, singling out permission problems
    pub fn write(source: io::Error, path: PathBuf) -> Self {
        if source.kind() == io::ErrorKind::PermissionDenied {
            StorageError::PermissionDenied { path, source }
        } else {
            StorageError::Write { path, source }
        }
    }

    /// A retry may succeed without anyone touching the data
    pub fn is_transient(&self) -> bool {
        matches!(self, StorageError::Unavailable(_))
    }
}

pub type StorageResult<T> = Result<T, StorageError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_classifies_permission_errors() {
        let denied = io::Error::new(io::ErrorKind::PermissionDenied, "access denied");
        let err = StorageError::write(denied, PathBuf::from("/notes/1.json"));
        assert!(matches!(err, StorageError::PermissionDenied { .. }));
        assert!(err.to_string().contains("/notes/1.json"));

        let other = io::Error::new(io::ErrorKind::Other, "boom");
        let err = StorageError::write(other, PathBuf::from("/notes/1.json"));
        assert!(matches!(err, StorageError::Write { .. }));
        assert!(!err.is_transient());
    }

    #[test]
    fn test_corrupt_record_names_the_key() {
        let err = StorageError::CorruptRecord {
            key: "42".to_string(),
            details: "expected value at line 1".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Record '42' is corrupted: expected value at line 1"
        );
    }

    #[test]
    fn test_unavailable_is_transient() {
        assert!(StorageError::Unavailable("offline".into()).is_transient());
    }
}
