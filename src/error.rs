//! Error types for flight queries.
//!
//! Only faults that abort an invocation with a failing exit status live here:
//! an unreachable database file or an underlying SQLite/serialization fault.
//! Validation problems (malformed dates, unknown commands, missing arguments)
//! are rendered into the JSON payload instead and the process still exits
//! successfully.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Database not found at {}", .0.display())]
    DatabaseNotFound(PathBuf),

    #[error("Home directory not found")]
    HomeDirNotFound,

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
}
