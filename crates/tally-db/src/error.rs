//! # Database Error Types
//!
//! Error types for store operations.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  SQLite Error (sqlx::Error)                                            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  DbError (this module) ← classified by message                         │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ApiError (CLI) ← insufficient stock / schema mismatch / generic       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Operator sees a title and a description                               │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use tally_core::ValidationError;
use thiserror::Error;

/// Guidance attached to every schema mismatch.
pub const MIGRATION_HINT: &str = "apply the pending database migrations (run `tally` once with migrations enabled)";

/// Store operation errors.
#[derive(Debug, Error)]
pub enum DbError {
    /// Entity not found.
    ///
    /// ## When This Occurs
    /// - Product key doesn't exist or is soft-deleted
    /// - Hard delete of a product that isn't soft-deleted
    /// - Type id doesn't exist
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Unique constraint violation (duplicate product key or type name).
    #[error("Duplicate {field}: '{value}' already exists")]
    UniqueViolation { field: String, value: String },

    /// Row is still referenced (hard delete of a product with sales).
    #[error("Reference violation: {message}")]
    ReferenceViolation { message: String },

    /// The atomic sale found less stock than requested.
    #[error("Insufficient stock for {code} ({packaging}): available {available}, requested {requested}")]
    InsufficientStock {
        code: String,
        packaging: String,
        available: i64,
        requested: i64,
    },

    /// The database schema is older than the operation needs.
    ///
    /// ## When This Occurs
    /// - Soft delete on a database without migration 002
    /// - SQLite reports a missing column or table
    #[error("Database schema mismatch: {message}; {hint}", hint = MIGRATION_HINT)]
    SchemaMismatch { message: String },

    /// Input rejected before touching the database.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Database connection failed.
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Migration failed.
    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    /// Query execution failed.
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Transaction failed.
    #[error("Transaction failed: {0}")]
    TransactionFailed(String),

    /// Pool exhausted (all connections in use).
    #[error("Connection pool exhausted")]
    PoolExhausted,

    /// Internal database error.
    #[error("Internal database error: {0}")]
    Internal(String),
}

impl DbError {
    /// Creates a NotFound error for a given entity type and ID.
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        DbError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    /// Creates a UniqueViolation error.
    pub fn duplicate(field: impl Into<String>, value: impl Into<String>) -> Self {
        DbError::UniqueViolation {
            field: field.into(),
            value: value.into(),
        }
    }

    pub fn schema_mismatch(message: impl Into<String>) -> Self {
        DbError::SchemaMismatch {
            message: message.into(),
        }
    }

    /// Returns true for errors where the operator can fix the input and retry.
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            DbError::NotFound { .. }
                | DbError::UniqueViolation { .. }
                | DbError::ReferenceViolation { .. }
                | DbError::InsufficientStock { .. }
                | DbError::Validation(_)
        )
    }
}

/// Classifies a SQLite error message.
fn classify(msg: &str) -> DbError {
    if let Some(field) = msg.split("UNIQUE constraint failed: ").nth(1) {
        return DbError::UniqueViolation {
            field: field.to_string(),
            value: "unknown".to_string(),
        };
    }
    if msg.contains("FOREIGN KEY constraint failed") {
        return DbError::ReferenceViolation {
            message: msg.to_string(),
        };
    }
    if msg.contains("no such column")
        || msg.contains("no such table")
        || msg.contains("has no column named")
    {
        return DbError::schema_mismatch(msg);
    }
    DbError::QueryFailed(msg.to_string())
}

/// Convert sqlx errors to DbError.
///
/// ## Error Mapping
/// ```text
/// sqlx::Error::RowNotFound    → DbError::NotFound
/// sqlx::Error::Database       → classify(message)
/// sqlx::Error::PoolTimedOut   → DbError::PoolExhausted
/// Other                       → DbError::Internal
/// ```
impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => DbError::not_found("Record", "unknown"),
            sqlx::Error::Database(db_err) => classify(db_err.message()),
            sqlx::Error::PoolTimedOut => DbError::PoolExhausted,
            sqlx::Error::PoolClosed => DbError::ConnectionFailed("Pool is closed".to_string()),
            _ => DbError::Internal(err.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for DbError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        DbError::MigrationFailed(err.to_string())
    }
}

/// Result type for database operations.
pub type DbResult<T> = Result<T, DbError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_messages() {
        assert!(matches!(
            classify("UNIQUE constraint failed: product_types.name"),
            DbError::UniqueViolation { ref field, .. } if field == "product_types.name"
        ));
        assert!(matches!(
            classify("FOREIGN KEY constraint failed"),
            DbError::ReferenceViolation { .. }
        ));
        assert!(matches!(
            classify("no such column: deleted"),
            DbError::SchemaMismatch { .. }
        ));
        assert!(matches!(classify("disk I/O error"), DbError::QueryFailed(_)));
    }

    #[test]
    fn test_schema_mismatch_carries_hint() {
        let err = DbError::schema_mismatch("soft delete is not available");
        assert!(err.to_string().contains("apply the pending database migrations"));
        assert!(!err.is_user_error());
    }
}
