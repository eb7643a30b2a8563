//! Classification of storage errors.
//!
//! The store enforces every integrity rule itself, so most rejections reach
//! us as a [`DbErr`]. These helpers turn them into [`AppError`] variants that
//! callers can match on.

use jokebot_common::AppError;
use sea_orm::{DbErr, SqlErr};

/// A constraint or schema rule reported by the storage engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageViolation {
    /// A unique constraint or unique index rejected the row.
    Unique(String),
    /// A foreign key points at a missing row.
    ForeignKey(String),
    /// A NOT NULL column was left empty.
    NotNull(String),
    /// A table or index being created already exists.
    DuplicateObject(String),
}

/// Classify a storage error, if it is a constraint or schema violation.
#[must_use]
pub fn classify(err: &DbErr) -> Option<StorageViolation> {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(msg)) => {
            return Some(StorageViolation::Unique(msg));
        }
        Some(SqlErr::ForeignKeyConstraintViolation(msg)) => {
            return Some(StorageViolation::ForeignKey(msg));
        }
        _ => {}
    }

    // Fall back to the engine's message for everything sea-orm does not map.
    let msg = err.to_string();
    let lower = msg.to_lowercase();
    if lower.contains("unique constraint failed") || lower.contains("duplicate key value") {
        Some(StorageViolation::Unique(msg))
    } else if lower.contains("foreign key constraint") {
        Some(StorageViolation::ForeignKey(msg))
    } else if lower.contains("not null constraint failed")
        || lower.contains("violates not-null constraint")
    {
        Some(StorageViolation::NotNull(msg))
    } else if lower.contains("already exists") {
        Some(StorageViolation::DuplicateObject(msg))
    } else {
        None
    }
}

/// Map a storage error to the generic application error.
#[must_use]
pub fn map_db_err(err: DbErr) -> AppError {
    match classify(&err) {
        Some(StorageViolation::Unique(msg)) => AppError::Conflict(msg),
        Some(StorageViolation::ForeignKey(msg)) => AppError::InvalidReference(msg),
        Some(StorageViolation::NotNull(msg)) => AppError::MissingValue(msg),
        Some(StorageViolation::DuplicateObject(msg)) => AppError::DuplicateObject(msg),
        None => AppError::Database(err.to_string()),
    }
}

/// Map a storage error, replacing unique and foreign key violations with
/// domain messages such as "joke already exists".
#[must_use]
pub fn map_db_err_as(err: DbErr, conflict: &str, reference: &str) -> AppError {
    match map_db_err(err) {
        AppError::Conflict(_) => AppError::Conflict(conflict.to_string()),
        AppError::InvalidReference(_) => AppError::InvalidReference(reference.to_string()),
        other => other,
    }
}
