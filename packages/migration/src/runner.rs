use std::io::ErrorKind;
use std::path::PathBuf;

use sea_orm::{
    ConnectionTrait, DatabaseConnection, DatabaseTransaction, Statement, TransactionTrait,
};
use time::macros::format_description;
use time::OffsetDateTime;
use tokio::fs;
use tracing::{info, warn};

use crate::error::MigrationError;
use crate::parse::{split_sections, ROLLBACK_MARKER};

pub(crate) const CREATE_LEDGER_SQL: &str = "CREATE TABLE IF NOT EXISTS migrations ( \
    id BIGSERIAL PRIMARY KEY, \
    filename VARCHAR(255) NOT NULL UNIQUE, \
    executed_at TIMESTAMPTZ NOT NULL DEFAULT CURRENT_TIMESTAMP \
)";
pub(crate) const SELECT_APPLIED_SQL: &str = "SELECT filename FROM migrations ORDER BY id";
pub(crate) const SELECT_LAST_APPLIED_SQL: &str =
    "SELECT filename FROM migrations ORDER BY id DESC LIMIT 1";
pub(crate) const INSERT_APPLIED_SQL: &str = "INSERT INTO migrations (filename) VALUES ($1)";
pub(crate) const DELETE_APPLIED_SQL: &str = "DELETE FROM migrations WHERE filename = $1";

const SQL_EXTENSION: &str = ".sql";

/// Keeps a database schema synchronized with an ordered set of SQL migration
/// files and maintains the ledger of what has executed.
///
/// The runner holds a pooled handle; transactional work pins one connection
/// for the duration of the transaction and releases it on both success and
/// failure. Concurrent runners are not coordinated beyond the ledger's
/// unique filename constraint: a lost apply race surfaces as a storage
/// error, never a double apply.
pub struct MigrationRunner {
    db: DatabaseConnection,
    migrations_dir: PathBuf,
}

impl MigrationRunner {
    pub fn new(db: DatabaseConnection, migrations_dir: impl Into<PathBuf>) -> Self {
        Self {
            db,
            migrations_dir: migrations_dir.into(),
        }
    }

    /// Idempotently create the ledger table.
    ///
    /// Every ledger-touching operation calls this first, so the public
    /// operations can be used in any order against a fresh database.
    pub async fn ensure_ledger(&self) -> Result<(), MigrationError> {
        self.db.execute_unprepared(CREATE_LEDGER_SQL).await?;
        Ok(())
    }

    /// Filenames recorded in the ledger, in the order they were applied.
    pub async fn list_applied(&self) -> Result<Vec<String>, MigrationError> {
        self.ensure_ledger().await?;
        let stmt = Statement::from_string(self.db.get_database_backend(), SELECT_APPLIED_SQL);
        let rows = self.db.query_all(stmt).await?;
        let mut applied = Vec::with_capacity(rows.len());
        for row in rows {
            applied.push(row.try_get::<String>("", "filename")?);
        }
        Ok(applied)
    }

    /// `*.sql` files in the migrations directory, sorted lexicographically
    /// (which is apply order given the timestamp filename convention).
    ///
    /// A missing directory is created and yields an empty list.
    pub async fn list_available(&self) -> Result<Vec<String>, MigrationError> {
        let mut entries = match fs::read_dir(&self.migrations_dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                warn!(
                    dir = %self.migrations_dir.display(),
                    "migrations directory not found; creating it"
                );
                fs::create_dir_all(&self.migrations_dir).await?;
                return Ok(Vec::new());
            }
            Err(e) => return Err(e.into()),
        };

        let mut files = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            if let Some(name) = entry.file_name().to_str() {
                if name.ends_with(SQL_EXTENSION) {
                    files.push(name.to_string());
                }
            }
        }
        files.sort();
        Ok(files)
    }

    /// Available migrations not yet in the ledger, in available order.
    pub async fn list_pending(&self) -> Result<Vec<String>, MigrationError> {
        let applied = self.list_applied().await?;
        let available = self.list_available().await?;
        Ok(available
            .into_iter()
            .filter(|f| !applied.contains(f))
            .collect())
    }

    /// Apply every pending migration in sorted order, fail-fast.
    ///
    /// Each file's up section and its ledger insert commit in one
    /// transaction; a failing statement rolls the whole file back and stops
    /// processing without touching later files.
    pub async fn apply_all(&self) -> Result<(), MigrationError> {
        let pending = self.list_pending().await?;
        if pending.is_empty() {
            info!("No pending migrations");
            return Ok(());
        }

        for filename in pending {
            info!(migration = %filename, "Running migration");
            let content = self.read_migration(&filename).await?;
            let sections = split_sections(&filename, &content)?;

            let txn = self.db.begin().await?;
            match Self::exec_apply(&txn, &filename, &sections.up).await {
                Ok(()) => txn.commit().await?,
                Err(e) => {
                    // Best-effort: the transaction also rolls back on drop.
                    let _ = txn.rollback().await;
                    return Err(e);
                }
            }
            info!(migration = %filename, "Migration completed");
        }
        Ok(())
    }

    /// Roll back the single most recently applied migration.
    ///
    /// Fails with [`MigrationError::NothingToRollback`] on an empty ledger
    /// and with [`MigrationError::MissingRollback`] when the file carries no
    /// usable rollback section; both happen before any statement executes.
    /// Returns the rolled-back filename.
    pub async fn rollback_last(&self) -> Result<String, MigrationError> {
        self.ensure_ledger().await?;

        let stmt =
            Statement::from_string(self.db.get_database_backend(), SELECT_LAST_APPLIED_SQL);
        let row = self
            .db
            .query_one(stmt)
            .await?
            .ok_or(MigrationError::NothingToRollback)?;
        let filename: String = row.try_get("", "filename")?;

        info!(migration = %filename, "Rolling back migration");
        let content = self.read_migration(&filename).await?;
        let sections = split_sections(&filename, &content)?;
        let rollback_sql = match sections.rollback {
            Some(sql) if !sql.is_empty() => sql,
            _ => {
                return Err(MigrationError::MissingRollback {
                    filename: filename.clone(),
                })
            }
        };

        let txn = self.db.begin().await?;
        match Self::exec_rollback(&txn, &filename, &rollback_sql).await {
            Ok(()) => txn.commit().await?,
            Err(e) => {
                let _ = txn.rollback().await;
                return Err(e);
            }
        }
        info!(migration = %filename, "Migration rolled back");
        Ok(filename)
    }

    /// Scaffold a new migration file and return its generated filename.
    ///
    /// The filename is a to-the-second UTC timestamp prefix plus the
    /// slugified name (whitespace becomes underscores). The ledger is not
    /// touched.
    pub async fn create_migration(&self, name: &str) -> Result<String, MigrationError> {
        let timestamp = OffsetDateTime::now_utc()
            .format(format_description!(
                "[year][month][day][hour][minute][second]"
            ))?;
        let slug = name.split_whitespace().collect::<Vec<_>>().join("_");
        let filename = format!("{timestamp}_{slug}{SQL_EXTENSION}");

        let created = OffsetDateTime::now_utc()
            .format(&time::format_description::well_known::Rfc3339)
            .unwrap_or_else(|_| "unknown".to_string());
        let template = format!(
            "-- Migration: {name}\n\
             -- Created: {created}\n\
             \n\
             CREATE TABLE example (\n\
             \x20 id BIGSERIAL PRIMARY KEY,\n\
             \x20 name VARCHAR(255) NOT NULL,\n\
             \x20 created_at TIMESTAMPTZ NOT NULL DEFAULT CURRENT_TIMESTAMP\n\
             );\n\
             \n\
             {ROLLBACK_MARKER}\n\
             DROP TABLE example;\n"
        );

        fs::create_dir_all(&self.migrations_dir).await?;
        fs::write(self.migrations_dir.join(&filename), template).await?;
        info!(migration = %filename, "Migration created");
        Ok(filename)
    }

    async fn read_migration(&self, filename: &str) -> Result<String, MigrationError> {
        Ok(fs::read_to_string(self.migrations_dir.join(filename)).await?)
    }

    async fn exec_apply(
        txn: &DatabaseTransaction,
        filename: &str,
        up_sql: &str,
    ) -> Result<(), MigrationError> {
        txn.execute_unprepared(up_sql).await?;
        txn.execute(Statement::from_sql_and_values(
            txn.get_database_backend(),
            INSERT_APPLIED_SQL,
            [filename.into()],
        ))
        .await?;
        Ok(())
    }

    async fn exec_rollback(
        txn: &DatabaseTransaction,
        filename: &str,
        rollback_sql: &str,
    ) -> Result<(), MigrationError> {
        txn.execute_unprepared(rollback_sql).await?;
        txn.execute(Statement::from_sql_and_values(
            txn.get_database_backend(),
            DELETE_APPLIED_SQL,
            [filename.into()],
        ))
        .await?;
        Ok(())
    }
}
