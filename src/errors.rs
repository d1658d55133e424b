//! Unified application error type.
//! All modules (db, core, cli) return AppError to keep the error
//! handling consistent and easy to manage.

use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    // ---------------------------
    // IO
    // ---------------------------
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    // ---------------------------
    // Database-related
    // ---------------------------
    #[error("Database error: {0}")]
    Db(#[from] rusqlite::Error),

    /// A persisted invariant was found violated (e.g. more than one
    /// active check-in for the same user and workspace). This is a bug
    /// or a lost race, never a normal failure mode; it is logged at the
    /// detection site and surfaced, not repaired by picking one row.
    #[error("Integrity error: {0}")]
    Integrity(String),

    // ---------------------------
    // Lookup / state errors
    // ---------------------------
    #[error("{0} not found")]
    NotFound(String),

    #[error("No active session to check out from")]
    NoActiveSession,

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    // ---------------------------
    // Config errors
    // ---------------------------
    #[error("Configuration error: {0}")]
    Config(String),

    // ---------------------------
    // Generic fallback
    // ---------------------------
    #[error("Internal error: {0}")]
    Other(String),
}

pub type AppResult<T> = Result<T, AppError>;
