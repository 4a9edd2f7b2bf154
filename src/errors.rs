//! Error taxonomy shared by the engine, repositories and handlers.

use std::error::Error;
use std::fmt;

/// Every failure an inbound event can produce. Validation and Conflict are
/// rejected before any state change; Persistence rolls back its transaction.
#[derive(Debug)]
pub enum EngineError {
    /// Malformed or out-of-range input (bad player count, wrong round, …).
    Validation(String),
    /// Legal request that lost to the current state (game full, duplicate
    /// move, matchup already resolved, unexpected status).
    Conflict(String),
    /// Unknown game, matchup or participant.
    NotFound(String),
    /// Storage collaborator failure, treated as transient.
    Persistence(sqlx::Error),
}

pub type EngineResult<T> = Result<T, EngineError>;

impl EngineError {
    pub fn validation(msg: impl Into<String>) -> Self {
        EngineError::Validation(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        EngineError::Conflict(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        EngineError::NotFound(msg.into())
    }

    /// Message safe to echo to the originating client. Storage internals are
    /// logged server-side and replaced with a generic retry hint.
    pub fn client_message(&self) -> String {
        match self {
            EngineError::Validation(m)
            | EngineError::Conflict(m)
            | EngineError::NotFound(m) => m.clone(),
            EngineError::Persistence(_) => "Temporary storage failure. Please retry.".into(),
        }
    }
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineError::Validation(m) => write!(f, "validation: {m}"),
            EngineError::Conflict(m) => write!(f, "conflict: {m}"),
            EngineError::NotFound(m) => write!(f, "not found: {m}"),
            EngineError::Persistence(e) => write!(f, "persistence: {e}"),
        }
    }
}

impl Error for EngineError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            EngineError::Persistence(e) => Some(e),
            _ => None,
        }
    }
}

impl From<sqlx::Error> for EngineError {
    fn from(e: sqlx::Error) -> Self {
        match e {
            sqlx::Error::RowNotFound => EngineError::NotFound("record not found".into()),
            other => EngineError::Persistence(other),
        }
    }
}
