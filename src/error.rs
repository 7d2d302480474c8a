//! Error types.

use thiserror::Error;

/// The error type returned by leaflet's infrastructure operations.
///
/// Application-level outcomes (404, 500, a form with validation errors) are
/// expressed as HTTP [`Response`](crate::Response) values, not as `Error`s.
/// This type surfaces failures that stop the process from serving at all:
/// binding a port, opening the database, reading the configuration.
#[derive(Debug, Error)]
pub enum Error {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    #[error("storage: {0}")]
    Store(#[from] StoreError),

    #[error("config: {0}")]
    Config(String),
}

/// Failures raised by [`ArticleStore`](crate::store::ArticleStore).
#[derive(Debug, Error)]
pub enum StoreError {
    /// No article exists with the requested id.
    #[error("article not found")]
    NotFound,

    /// The statement failed inside SQLite.
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// No connection became available before the acquire timeout.
    #[error("timed out waiting for a database connection")]
    Timeout,
}

impl StoreError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound)
    }
}

impl From<bb8::RunError<rusqlite::Error>> for StoreError {
    fn from(e: bb8::RunError<rusqlite::Error>) -> Self {
        match e {
            bb8::RunError::User(e) => Self::Database(e),
            bb8::RunError::TimedOut => Self::Timeout,
        }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;
