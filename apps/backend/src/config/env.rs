use std::env;
use std::path::PathBuf;

use db_infra::config::{database_url, migrations_dir, must_var, RuntimeEnv};

use crate::error::AppError;

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 3001;

/// Startup configuration, validated from the process environment.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub env: RuntimeEnv,
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub migrations_dir: PathBuf,
}

impl AppConfig {
    /// Validate all configuration inputs at once.
    ///
    /// Every violation is collected so the operator sees the complete list
    /// in a single diagnostic instead of fixing variables one at a time.
    pub fn from_env() -> Result<Self, AppError> {
        let mut errors: Vec<String> = Vec::new();

        let database_url = match database_url() {
            Ok(url) => Some(url),
            Err(e) => {
                errors.push(e.to_string());
                None
            }
        };

        let runtime_env = match must_var("APP_ENV").and_then(|v| v.parse::<RuntimeEnv>()) {
            Ok(env) => Some(env),
            Err(e) => {
                errors.push(e.to_string());
                None
            }
        };

        let port = match env::var("PORT") {
            Err(_) => Some(DEFAULT_PORT),
            Ok(raw) => match raw.parse::<u16>() {
                Ok(port) if port > 0 => Some(port),
                _ => {
                    errors.push(format!(
                        "PORT must be a valid port number (1-65535), got '{raw}'"
                    ));
                    None
                }
            },
        };

        let host = env::var("HOST").unwrap_or_else(|_| DEFAULT_HOST.to_string());

        if !errors.is_empty() {
            return Err(AppError::config(format!(
                "Environment validation failed: {}",
                errors.join("; ")
            )));
        }

        // All three are Some once errors is empty.
        Ok(Self {
            env: runtime_env.unwrap_or(RuntimeEnv::Development),
            host,
            port: port.unwrap_or(DEFAULT_PORT),
            database_url: database_url.unwrap_or_default(),
            migrations_dir: migrations_dir(),
        })
    }
}
