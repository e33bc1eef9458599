//! SeaORM -> AppError translation.
//!
//! Anything that touches the database converts `sea_orm::DbErr` into
//! `crate::error::AppError` here, via the `From` impl, so the SQLSTATE
//! lookup table lives in exactly one place.

use sea_orm::{DbErr, RuntimeErr};
use tracing::{error, warn};

use crate::error::{AppError, DbErrorKind};

// SQLSTATE codes the classifier recognizes.
const UNIQUE_VIOLATION: &str = "23505";
const FOREIGN_KEY_VIOLATION: &str = "23503";
const NOT_NULL_VIOLATION: &str = "23502";
const CHECK_VIOLATION: &str = "23514";
const UNDEFINED_TABLE: &str = "42P01";
const UNDEFINED_COLUMN: &str = "42703";
const UNDEFINED_FUNCTION: &str = "42883";
const CONNECTION_FAILURE: &str = "08006";
const CONNECTION_LIMIT_EXCEEDED: &str = "53300";
const INVALID_PASSWORD: &str = "28P01";
const ADMIN_SHUTDOWN: &str = "57P01";
const CRASH_SHUTDOWN: &str = "57P02";

/// Map a 5-character SQLSTATE code to its fault category.
pub fn kind_for_sqlstate(code: &str) -> DbErrorKind {
    match code {
        UNIQUE_VIOLATION => DbErrorKind::UniqueViolation,
        FOREIGN_KEY_VIOLATION => DbErrorKind::ForeignKeyViolation,
        NOT_NULL_VIOLATION => DbErrorKind::NotNullViolation,
        CHECK_VIOLATION => DbErrorKind::CheckViolation,
        UNDEFINED_TABLE | UNDEFINED_COLUMN | UNDEFINED_FUNCTION => DbErrorKind::UndefinedObject,
        CONNECTION_FAILURE | CONNECTION_LIMIT_EXCEEDED => DbErrorKind::Unavailable,
        INVALID_PASSWORD => DbErrorKind::InvalidCredentials,
        ADMIN_SHUTDOWN | CRASH_SHUTDOWN => DbErrorKind::ServerShutdown,
        _ => DbErrorKind::Unknown,
    }
}

/// Pull the SQLSTATE out of a `DbErr`, when the underlying driver error
/// carries one.
fn sqlstate(err: &DbErr) -> Option<String> {
    let runtime_err = match err {
        DbErr::Query(e) | DbErr::Exec(e) | DbErr::Conn(e) => e,
        _ => return None,
    };
    match runtime_err {
        RuntimeErr::SqlxError(sqlx::Error::Database(db_err)) => {
            db_err.code().map(|c| c.into_owned())
        }
        _ => None,
    }
}

impl From<DbErr> for AppError {
    fn from(err: DbErr) -> Self {
        // Standard-format origin codes go through the lookup table.
        if let Some(code) = sqlstate(&err).filter(|c| c.len() == 5) {
            let kind = kind_for_sqlstate(&code);
            if kind == DbErrorKind::Unknown {
                error!(sqlstate = %code, raw_error = %err, "Unhandled database error code");
            } else {
                warn!(sqlstate = %code, "Database error classified as {kind:?}");
            }
            return AppError::db(kind, Some(code), err.to_string());
        }

        match &err {
            DbErr::Conn(_) | DbErr::ConnectionAcquire(_) => {
                warn!(raw_error = %err, "Database unavailable");
                AppError::db(DbErrorKind::Unavailable, None, err.to_string())
            }
            DbErr::RecordNotFound(_) => AppError::not_found("Record not found"),
            _ => {
                error!(raw_error = %err, "Unhandled database error");
                AppError::db(DbErrorKind::Unknown, None, err.to_string())
            }
        }
    }
}
