//! Shared classification of pool and Diesel failures.
//!
//! Each repository turns a [`DieselFailure`] into its own port error; this
//! module only decides which category a driver error belongs to.

use diesel::result::{DatabaseErrorKind, Error as DieselError};
use tracing::debug;

use super::pool::PoolError;

/// Category of a failed Diesel operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum DieselFailure {
    /// The connection dropped or could not be used.
    Connection(String),
    /// A unique constraint rejected the write; carries the constraint name.
    UniqueViolation(Option<String>),
    /// A foreign key no longer points at an existing row.
    ForeignKeyViolation(String),
    /// Anything else.
    Query(String),
}

/// Message carried by a pool error.
pub(crate) fn pool_message(error: PoolError) -> String {
    match error {
        PoolError::Checkout { message } | PoolError::Build { message } => message,
    }
}

/// Classify a Diesel error.
pub(crate) fn classify(error: DieselError) -> DieselFailure {
    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(
                ?kind,
                message = info.message(),
                constraint = info.constraint_name(),
                "diesel operation failed"
            );
        }
        _ => debug!(
            error_type = %std::any::type_name_of_val(&error),
            "diesel operation failed"
        ),
    }

    match error {
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, info) => {
            DieselFailure::Connection(info.message().to_owned())
        }
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
            DieselFailure::UniqueViolation(info.constraint_name().map(str::to_owned))
        }
        DieselError::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, info) => {
            DieselFailure::ForeignKeyViolation(info.message().to_owned())
        }
        DieselError::DatabaseError(_, info) => DieselFailure::Query(info.message().to_owned()),
        DieselError::NotFound => DieselFailure::Query("record not found".to_owned()),
        DieselError::QueryBuilderError(_) => {
            DieselFailure::Query("database query error".to_owned())
        }
        other => DieselFailure::Query(other.to_string()),
    }
}

/// Escape `%`, `_` and `\` so a search term matches literally inside `ILIKE`.
pub(crate) fn like_pattern(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len() + 2);
    escaped.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}
