use thiserror::Error;

#[derive(Debug, Error)]
pub enum MigrationError {
    /// Rollback requested against an empty ledger.
    #[error("no migrations to roll back")]
    NothingToRollback,

    /// The targeted file has no `-- ROLLBACK` section.
    #[error("no rollback section found in {filename}")]
    MissingRollback { filename: String },

    /// The file contains more than one `-- ROLLBACK` marker line.
    #[error("multiple rollback markers found in {filename}")]
    AmbiguousRollback { filename: String },

    #[error("failed to format timestamp: {0}")]
    Timestamp(#[from] time::error::Format),

    #[error("migration file i/o failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("database error: {0}")]
    Db(#[from] sea_orm::DbErr),
}

impl MigrationError {
    /// True for errors caused by the migration inputs rather than the
    /// database or filesystem misbehaving.
    pub fn is_malformed(&self) -> bool {
        matches!(
            self,
            MigrationError::MissingRollback { .. } | MigrationError::AmbiguousRollback { .. }
        )
    }
}
