use thiserror::Error;

use super::link::EntityKind;

// === ErrorKind ===

/// Coarse classification callers branch on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// User-correctable input problem. The message is safe to show.
    Validation,
    /// The entity no longer exists, most likely deleted by a racing call.
    NotFound,
    /// The record store rejected or failed an operation.
    StoreFailure,
}

// === LinkbookError ===

/// Errors returned by every linkbook engine operation.
#[derive(Debug, Error)]
pub enum LinkbookError {
    /// Input rejected before any store write.
    #[error("{0}")]
    Validation(String),
    /// Link with the given ID was not found.
    #[error("Link not found: {0}")]
    LinkNotFound(i64),
    /// Group with the given ID was not found.
    #[error("Group not found: {0}")]
    GroupNotFound(i64),
    /// A relocation was rejected because the drop target is not valid.
    #[error("Invalid relocation of {kind} {id}: {reason}")]
    InvalidRelocation {
        kind: &'static str,
        id: i64,
        reason: String,
    },
    /// Store operation failed.
    #[error("Linkbook store error ({collection}): {message}")]
    Store {
        collection: &'static str,
        message: String,
    },
}

impl LinkbookError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            LinkbookError::Validation(_) | LinkbookError::InvalidRelocation { .. } => {
                ErrorKind::Validation
            }
            LinkbookError::LinkNotFound(_) | LinkbookError::GroupNotFound(_) => ErrorKind::NotFound,
            LinkbookError::Store { .. } => ErrorKind::StoreFailure,
        }
    }

    pub fn not_found(kind: EntityKind, id: i64) -> Self {
        match kind {
            EntityKind::Link => LinkbookError::LinkNotFound(id),
            EntityKind::Group => LinkbookError::GroupNotFound(id),
        }
    }

    pub fn invalid_relocation(kind: EntityKind, id: i64, reason: impl Into<String>) -> Self {
        LinkbookError::InvalidRelocation {
            kind: kind.as_str(),
            id,
            reason: reason.into(),
        }
    }

    pub fn store(collection: &'static str, err: impl std::fmt::Display) -> Self {
        LinkbookError::Store {
            collection,
            message: err.to_string(),
        }
    }
}

impl From<rusqlite::Error> for LinkbookError {
    fn from(err: rusqlite::Error) -> Self {
        LinkbookError::store("database", err)
    }
}

/// Result alias used across the engine.
pub type LinkbookResult<T> = Result<T, LinkbookError>;

// === SettingsError ===

/// Errors related to settings management.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// An I/O error occurred while reading or writing settings.
    #[error("Settings I/O error: {0}")]
    IoError(String),
    /// Failed to serialize or deserialize settings.
    #[error("Settings serialization error: {0}")]
    SerializationError(String),
    /// The provided settings key is invalid.
    #[error("Invalid settings key: {0}")]
    InvalidKey(String),
    /// The provided settings value is invalid.
    #[error("Invalid settings value: {0}")]
    InvalidValue(String),
}
