//! # API Error Type
//!
//! Unified error type for commands. This is the only place operator-facing
//! text is composed.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in Tally                                  │
//! │                                                                         │
//! │  tally sell --item PNT-001/4L=3                                         │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │  Command Function                                                │  │
//! │  │  Result<T, ApiError>                                             │  │
//! │  │         │                                                        │  │
//! │  │         ▼                                                        │  │
//! │  │  Validation? ──── ValidationError / CoreError ────┐              │  │
//! │  │         │                                         │              │  │
//! │  │         ▼                                         ▼              │  │
//! │  │  Store failure? ── DbError::InsufficientStock ── ApiError ──────►│  │
//! │  │         │          DbError::SchemaMismatch                       │  │
//! │  │         ▼          DbError::QueryFailed ...                      │  │
//! │  │  Success ───────────────────────────────────────────────────────►│  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! │                                                                         │
//! │  main.rs prints ApiError::user_message() and exits non-zero            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Taxonomy
//! The operator sees four kinds of failure, each with its own title:
//! invalid input, insufficient stock, an outdated database schema (with
//! migration guidance) and everything else (raw message).

use serde::Serialize;
use tally_core::{CoreError, ExportError, ValidationError};
use tally_db::DbError;

/// Error returned from commands.
///
/// ## Serialization
/// With `--json` a failure is printed as:
/// ```json
/// {
///   "code": "INSUFFICIENT_STOCK",
///   "message": "Insufficient stock for PNT-001 (4L): available 1, requested 3"
/// }
/// ```
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,
}

/// Error codes for command failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Product, sale or type not found
    NotFound,

    /// Input validation failed
    ValidationError,

    /// Database operation failed
    DatabaseError,

    /// Business rule refused the operation
    BusinessLogic,

    /// Internal error
    Internal,

    /// Cart operation failed
    CartError,

    /// Insufficient stock
    InsufficientStock,

    /// The database schema is older than the operation needs
    SchemaMismatch,
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
        }
    }

    /// Creates a not found error.
    pub fn not_found(resource: &str, id: &str) -> Self {
        ApiError::new(ErrorCode::NotFound, format!("{} not found: {}", resource, id))
    }

    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::ValidationError, message)
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Internal, message)
    }

    /// Creates a cart error.
    pub fn cart(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::CartError, message)
    }

    /// Title and description shown to the operator.
    ///
    /// ## Returns
    /// `(title, description)`, e.g.
    /// `("Insufficient stock", "Insufficient stock for PNT-001 (4L): ...")`
    pub fn user_message(&self) -> (&'static str, String) {
        let title = match self.code {
            ErrorCode::ValidationError => "Invalid input",
            ErrorCode::NotFound => "Not found",
            ErrorCode::InsufficientStock => "Insufficient stock",
            ErrorCode::SchemaMismatch => "Database update required",
            ErrorCode::CartError => "Cart",
            ErrorCode::BusinessLogic => "Not allowed",
            ErrorCode::DatabaseError | ErrorCode::Internal => "Operation failed",
        };
        (title, self.message.clone())
    }
}

/// Converts database errors to API errors.
impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => ApiError::not_found(&entity, &id),
            DbError::UniqueViolation { field, value } => ApiError::new(
                ErrorCode::ValidationError,
                format!("{} '{}' already exists", field, value),
            ),
            DbError::ReferenceViolation { message } => {
                ApiError::new(ErrorCode::BusinessLogic, message)
            }
            e @ DbError::InsufficientStock { .. } => {
                ApiError::new(ErrorCode::InsufficientStock, e.to_string())
            }
            e @ DbError::SchemaMismatch { .. } => {
                tracing::warn!("Schema mismatch: {}", e);
                ApiError::new(ErrorCode::SchemaMismatch, e.to_string())
            }
            DbError::Validation(e) => ApiError::validation(e.to_string()),
            e @ (DbError::ConnectionFailed(_)
            | DbError::MigrationFailed(_)
            | DbError::QueryFailed(_)
            | DbError::TransactionFailed(_)
            | DbError::PoolExhausted
            | DbError::Internal(_)) => {
                tracing::error!("Database operation failed: {}", e);
                ApiError::new(ErrorCode::DatabaseError, e.to_string())
            }
        }
    }
}

/// Converts core errors to API errors.
impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ProductNotFound(key) => ApiError::not_found("Product", &key),
            e @ CoreError::InsufficientStock { .. } => {
                ApiError::new(ErrorCode::InsufficientStock, e.to_string())
            }
            e @ (CoreError::EmptySale | CoreError::InvalidQuantity(_)) => {
                ApiError::validation(e.to_string())
            }
            e @ (CoreError::NoProductSelected | CoreError::NotInCart(_)) => {
                ApiError::cart(e.to_string())
            }
            CoreError::Validation(e) => ApiError::validation(e.to_string()),
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::validation(err.to_string())
    }
}

impl From<ExportError> for ApiError {
    fn from(err: ExportError) -> Self {
        ApiError::internal(err.to_string())
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insufficient_stock_is_distinct() {
        let err: ApiError = DbError::InsufficientStock {
            code: "PNT-001".to_string(),
            packaging: "4L".to_string(),
            available: 1,
            requested: 3,
        }
        .into();
        assert_eq!(err.code, ErrorCode::InsufficientStock);
        let (title, description) = err.user_message();
        assert_eq!(title, "Insufficient stock");
        assert!(description.contains("available 1, requested 3"));
    }

    #[test]
    fn test_schema_mismatch_carries_migration_hint() {
        let err: ApiError = DbError::schema_mismatch("no such column: deleted").into();
        assert_eq!(err.code, ErrorCode::SchemaMismatch);
        let (title, description) = err.user_message();
        assert_eq!(title, "Database update required");
        assert!(description.contains(tally_db::MIGRATION_HINT));
    }

    #[test]
    fn test_generic_failure_keeps_raw_message() {
        let err: ApiError = DbError::QueryFailed("disk I/O error".to_string()).into();
        assert_eq!(err.code, ErrorCode::DatabaseError);
        assert!(err.user_message().1.contains("disk I/O error"));
    }

    #[test]
    fn test_core_errors_map_to_codes() {
        assert_eq!(ApiError::from(CoreError::EmptySale).code, ErrorCode::ValidationError);
        assert_eq!(ApiError::from(CoreError::InvalidQuantity(0)).code, ErrorCode::ValidationError);
        assert_eq!(ApiError::from(CoreError::NoProductSelected).code, ErrorCode::CartError);
        assert_eq!(
            ApiError::from(ValidationError::required("name")).message,
            "name is required"
        );
    }

    #[test]
    fn test_json_shape() {
        let err = ApiError::not_found("Product", "PNT-001 (4L)");
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["code"], "NOT_FOUND");
        assert_eq!(json["message"], "Product not found: PNT-001 (4L)");
    }
}
