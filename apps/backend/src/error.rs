use actix_web::error::ResponseError;
use actix_web::http::StatusCode;
use actix_web::HttpResponse;
use serde::Serialize;
use thiserror::Error;
use tracing::{error, warn};

/// Fallback body message for errors whose real detail must stay server-side.
pub const GENERIC_ERROR_MESSAGE: &str =
    "An unexpected internal server error occurred, check logs on the server for more details";

#[derive(Serialize)]
struct ErrorBody {
    message: String,
}

/// Categories of database faults, keyed off the 5-character SQLSTATE code
/// where one is available.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DbErrorKind {
    UniqueViolation,
    ForeignKeyViolation,
    NotNullViolation,
    CheckViolation,
    /// Undefined table / column / function: a programming error, never
    /// something the client caused.
    UndefinedObject,
    /// Connection failure or connection limit exceeded.
    Unavailable,
    InvalidCredentials,
    /// Admin- or crash-initiated server shutdown.
    ServerShutdown,
    Unknown,
}

impl DbErrorKind {
    pub fn status(&self) -> StatusCode {
        match self {
            DbErrorKind::UniqueViolation => StatusCode::CONFLICT,
            DbErrorKind::ForeignKeyViolation
            | DbErrorKind::NotNullViolation
            | DbErrorKind::CheckViolation => StatusCode::BAD_REQUEST,
            DbErrorKind::Unavailable | DbErrorKind::ServerShutdown => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            DbErrorKind::UndefinedObject
            | DbErrorKind::InvalidCredentials
            | DbErrorKind::Unknown => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Whether the fault is safe to describe to the client.
    pub fn is_operational(&self) -> bool {
        match self {
            DbErrorKind::UniqueViolation
            | DbErrorKind::ForeignKeyViolation
            | DbErrorKind::NotNullViolation
            | DbErrorKind::CheckViolation
            | DbErrorKind::Unavailable
            | DbErrorKind::ServerShutdown => true,
            DbErrorKind::UndefinedObject
            | DbErrorKind::InvalidCredentials
            | DbErrorKind::Unknown => false,
        }
    }

    fn client_message(&self) -> &'static str {
        match self {
            DbErrorKind::UniqueViolation => "A record with this value already exists.",
            DbErrorKind::ForeignKeyViolation => {
                "This operation violates a foreign key constraint."
            }
            DbErrorKind::NotNullViolation => "Required field is missing.",
            DbErrorKind::CheckViolation => "The value violates a check constraint.",
            DbErrorKind::Unavailable => "Database connection error.",
            DbErrorKind::ServerShutdown => "Database server is currently unavailable.",
            DbErrorKind::UndefinedObject
            | DbErrorKind::InvalidCredentials
            | DbErrorKind::Unknown => GENERIC_ERROR_MESSAGE,
        }
    }
}

/// Central application error, tagged by category.
///
/// Handlers return `Result<_, AppError>`; the `ResponseError` impl is the
/// single place errors are rendered to clients, so raw internal detail never
/// crosses that boundary unless the variant is operational.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AppError {
    #[error("Validation error: {detail}")]
    Validation { detail: String },
    #[error("Not found: {detail}")]
    NotFound { detail: String },
    #[error("Database error: {detail}")]
    Db {
        kind: DbErrorKind,
        /// Originating SQLSTATE code, when the driver exposed one.
        code: Option<String>,
        detail: String,
    },
    #[error("Configuration error: {detail}")]
    Config { detail: String },
    #[error("Internal error: {detail}")]
    Internal { detail: String },
}

impl AppError {
    pub fn validation(detail: impl Into<String>) -> Self {
        Self::Validation {
            detail: detail.into(),
        }
    }

    pub fn not_found(detail: impl Into<String>) -> Self {
        Self::NotFound {
            detail: detail.into(),
        }
    }

    pub fn config(detail: impl Into<String>) -> Self {
        Self::Config {
            detail: detail.into(),
        }
    }

    pub fn internal(detail: impl Into<String>) -> Self {
        Self::Internal {
            detail: detail.into(),
        }
    }

    pub fn db(kind: DbErrorKind, code: Option<String>, detail: impl Into<String>) -> Self {
        Self::Db {
            kind,
            code,
            detail: detail.into(),
        }
    }

    /// Get the HTTP status code for this error
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation { .. } => StatusCode::BAD_REQUEST,
            AppError::NotFound { .. } => StatusCode::NOT_FOUND,
            AppError::Db { kind, .. } => kind.status(),
            AppError::Config { .. } | AppError::Internal { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// True when the error message is safe to show to the client verbatim.
    pub fn is_operational(&self) -> bool {
        match self {
            AppError::Validation { .. } | AppError::NotFound { .. } => true,
            AppError::Db { kind, .. } => kind.is_operational(),
            AppError::Config { .. } | AppError::Internal { .. } => false,
        }
    }

    /// Originating low-level error code, if any (a SQLSTATE for Db errors).
    pub fn origin_code(&self) -> Option<&str> {
        match self {
            AppError::Db { code, .. } => code.as_deref(),
            _ => None,
        }
    }

    /// What the client is allowed to see. Non-operational errors always
    /// render the generic fallback; the real detail only goes to the log.
    pub fn client_message(&self) -> String {
        if !self.is_operational() {
            return GENERIC_ERROR_MESSAGE.to_string();
        }
        match self {
            AppError::Db { kind, .. } => kind.client_message().to_string(),
            AppError::Validation { detail, .. } | AppError::NotFound { detail, .. } => {
                detail.clone()
            }
            // Non-operational variants were handled above.
            AppError::Config { .. } | AppError::Internal { .. } => {
                GENERIC_ERROR_MESSAGE.to_string()
            }
        }
    }
}

/// Classify any convertible fault into an [`AppError`].
///
/// The identity `Into` impl makes this a no-op for already-classified
/// errors, so `classify(classify(e)) == classify(e)`.
pub fn classify<E: Into<AppError>>(err: E) -> AppError {
    err.into()
}

impl From<std::io::Error> for AppError {
    fn from(e: std::io::Error) -> Self {
        AppError::internal(format!("i/o error: {e}"))
    }
}

impl From<String> for AppError {
    fn from(detail: String) -> Self {
        AppError::Internal { detail }
    }
}

impl From<&str> for AppError {
    fn from(detail: &str) -> Self {
        AppError::internal(detail)
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        self.status()
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status();
        if self.is_operational() {
            warn!(
                status = status.as_u16(),
                code = self.origin_code().unwrap_or(""),
                "request failed: {self}"
            );
        } else {
            error!(
                status = status.as_u16(),
                code = self.origin_code().unwrap_or(""),
                "request failed: {self}"
            );
        }

        HttpResponse::build(status).json(ErrorBody {
            message: self.client_message(),
        })
    }
}
