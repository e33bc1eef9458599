use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use crate::error::DbInfraError;

/// Runtime environment the process is running in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuntimeEnv {
    Development,
    Production,
    Test,
}

impl RuntimeEnv {
    pub fn as_str(&self) -> &'static str {
        match self {
            RuntimeEnv::Development => "development",
            RuntimeEnv::Production => "production",
            RuntimeEnv::Test => "test",
        }
    }
}

impl FromStr for RuntimeEnv {
    type Err = DbInfraError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "development" => Ok(RuntimeEnv::Development),
            "production" => Ok(RuntimeEnv::Production),
            "test" => Ok(RuntimeEnv::Test),
            other => Err(DbInfraError::config(format!(
                "APP_ENV must be one of: development, production, test (got '{other}')"
            ))),
        }
    }
}

impl std::fmt::Display for RuntimeEnv {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Connection string for the Postgres pool, from `DATABASE_URL`.
pub fn database_url() -> Result<String, DbInfraError> {
    let url = must_var("DATABASE_URL")?;
    if !url.starts_with("postgresql://") && !url.starts_with("postgres://") {
        return Err(DbInfraError::config(
            "DATABASE_URL must be a valid PostgreSQL connection string",
        ));
    }
    Ok(url)
}

/// Directory holding `*.sql` migration files, from `MIGRATIONS_DIR`
/// (defaults to `./migrations`).
pub fn migrations_dir() -> PathBuf {
    env::var("MIGRATIONS_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("./migrations"))
}

/// Get required environment variable or return error
pub fn must_var(name: &str) -> Result<String, DbInfraError> {
    match env::var(name) {
        Ok(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(DbInfraError::config(format!(
            "Required environment variable '{name}' is not set"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use std::env;
    use std::str::FromStr;

    use serial_test::serial;

    use super::{database_url, migrations_dir, RuntimeEnv};

    #[test]
    fn test_runtime_env_round_trip() {
        for name in ["development", "production", "test"] {
            let parsed = RuntimeEnv::from_str(name).unwrap();
            assert_eq!(parsed.as_str(), name);
        }
    }

    #[test]
    fn test_runtime_env_rejects_unknown() {
        let err = RuntimeEnv::from_str("staging").unwrap_err();
        assert!(err.to_string().contains("staging"));
    }

    #[test]
    #[serial]
    fn test_database_url_requires_postgres_scheme() {
        env::set_var("DATABASE_URL", "mysql://root@localhost/app");
        let result = database_url();
        env::remove_var("DATABASE_URL");
        assert!(result.is_err());
    }

    #[test]
    #[serial]
    fn test_database_url_accepts_both_schemes() {
        for url in [
            "postgresql://app:pw@localhost:5432/app",
            "postgres://app:pw@localhost:5432/app",
        ] {
            env::set_var("DATABASE_URL", url);
            assert_eq!(database_url().unwrap(), url);
        }
        env::remove_var("DATABASE_URL");
    }

    #[test]
    #[serial]
    fn test_database_url_missing() {
        env::remove_var("DATABASE_URL");
        let err = database_url().unwrap_err();
        assert!(err.to_string().contains("DATABASE_URL"));
    }

    #[test]
    #[serial]
    fn test_migrations_dir_default() {
        env::remove_var("MIGRATIONS_DIR");
        assert_eq!(migrations_dir(), std::path::PathBuf::from("./migrations"));

        env::set_var("MIGRATIONS_DIR", "/tmp/app-migrations");
        assert_eq!(
            migrations_dir(),
            std::path::PathBuf::from("/tmp/app-migrations")
        );
        env::remove_var("MIGRATIONS_DIR");
    }
}
