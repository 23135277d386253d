use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Datenbankfehler: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("IO-Fehler: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialisierungsfehler: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("PDF-Fehler: {0}")]
    Pdf(String),

    #[error("Validierungsfehler: {0}")]
    Validation(String),

    #[error("Nicht gefunden: {0}")]
    NotFound(String),

    #[error("Existiert bereits: {0}")]
    AlreadyExists(String),

    #[error("Baustelle ist archiviert: {0}")]
    ProjectArchived(String),

    #[error("{0}")]
    Other(String),
}

impl AppError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn already_exists(msg: impl Into<String>) -> Self {
        Self::AlreadyExists(msg.into())
    }

    pub fn other(msg: impl Into<String>) -> Self {
        Self::Other(msg.into())
    }

    /// Unique-Constraint-Verletzungen von SQLite in `AlreadyExists` übersetzen
    pub fn from_unique_violation(err: rusqlite::Error, what: impl Into<String>) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(e, _)
                if e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE =>
            {
                Self::already_exists(what)
            }
            _ => Self::Database(err),
        }
    }
}

pub type AppResult<T> = Result<T, AppError>;
