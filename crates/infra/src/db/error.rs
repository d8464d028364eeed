//! Persistence errors.
//!
//! SQLx errors are mapped to `StoreError` as follows:
//!
//! | SQLx Error | PostgreSQL Error Code | StoreError |
//! |------------|----------------------|------------|
//! | Database (unique violation) | `23505` | `Conflict` |
//! | Database (foreign key violation) | `23503` | `Conflict` |
//! | Database (check constraint violation) | `23514` | `Backend` |
//! | Database (other) | Any other | `Backend` |
//! | PoolClosed | N/A | `Backend` |
//! | ColumnDecode | N/A | `Decode` |
//! | ColumnNotFound | N/A | `MissingColumn` |
//! | Other | N/A | `Backend` |

use thiserror::Error;

use contaerp_core::DomainError;

#[derive(Debug, Error)]
pub enum StoreError {
    /// A unique or referential constraint rejected the write.
    #[error("conflict: {0}")]
    Conflict(String),

    #[error("column '{0}' missing from row")]
    MissingColumn(String),

    #[error("cannot decode column '{column}' as {expected}")]
    Decode { column: String, expected: String },

    /// The record failed its own validation before being written.
    #[error(transparent)]
    Invalid(#[from] DomainError),

    #[error("database error: {0}")]
    Backend(String),

    #[error("migration failed: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),
}

impl StoreError {
    pub fn decode(column: &str, expected: &str) -> Self {
        StoreError::Decode {
            column: column.to_string(),
            expected: expected.to_string(),
        }
    }
}

pub(crate) fn map_sqlx_error(operation: &str, err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Database(db_err) => {
            let msg = format!("database error in {}: {}", operation, db_err.message());
            match db_err.code().as_deref() {
                Some("23505") | Some("23503") => StoreError::Conflict(msg),
                _ => StoreError::Backend(msg),
            }
        }
        sqlx::Error::PoolClosed => StoreError::Backend(format!("connection pool closed in {}", operation)),
        sqlx::Error::ColumnDecode { index, source } => StoreError::Decode {
            column: index,
            expected: source.to_string(),
        },
        sqlx::Error::ColumnNotFound(column) => StoreError::MissingColumn(column),
        _ => StoreError::Backend(format!("sqlx error in {}: {}", operation, err)),
    }
}
