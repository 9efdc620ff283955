use thiserror::Error;

/// Failures at the storage boundary.
///
/// Domain-level outcomes (insufficient stock, unknown product) are not store
/// errors; they surface from the ledger. This enum covers the machinery
/// underneath: connection loss, serialization failures, constraint
/// violations the schema enforces as a backstop.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("constraint violated: {0}")]
    Constraint(String),
}
