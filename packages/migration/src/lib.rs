//! SQL-file migration runner with a durable execution ledger.
//!
//! Migrations are plain `*.sql` files in a configured directory, named
//! `<14-digit-UTC-timestamp>_<slug>.sql` so that lexicographic order is
//! apply order. Each file holds the forward statements, optionally followed
//! by a line-exact `-- ROLLBACK` marker and the statements that undo it.
//! Applied filenames are recorded in a `migrations` ledger table whose
//! unique constraint doubles as the cross-process double-apply guard.

mod error;
mod parse;
mod runner;

pub use error::MigrationError;
pub use parse::{split_sections, Sections, ROLLBACK_MARKER};
pub use runner::MigrationRunner;

use sea_orm::{ConnectionTrait, DatabaseConnection, DbErr, Statement};

/// Number of rows in the ledger table.
///
/// Used by the backend health endpoint; fails if the ledger table does not
/// exist, which callers report as "unknown" rather than an error.
pub async fn applied_count(db: &DatabaseConnection) -> Result<i64, DbErr> {
    let stmt = Statement::from_string(
        db.get_database_backend(),
        "SELECT COUNT(*) AS count FROM migrations",
    );
    match db.query_one(stmt).await? {
        Some(row) => row.try_get("", "count"),
        None => Ok(0),
    }
}

// Auto-initialize logging for unit tests
#[cfg(test)]
#[ctor::ctor]
fn init_test_logging() {
    backend_test_support::test_logging::init();
}
