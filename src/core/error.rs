use rusqlite::ffi;
use std::io;
use thiserror::Error;

/// Which structural rule a rejected write ran into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntegrityCause {
    DuplicateKey,
    MissingReference,
    DomainConstraint,
    MissingValue,
}

impl IntegrityCause {
    /// Operator-facing hint naming the most likely fix.
    pub fn guidance(&self) -> &'static str {
        match self {
            IntegrityCause::DuplicateKey => {
                "check that the key (e.g. flight number + scheduled departure) does not already exist"
            }
            IntegrityCause::MissingReference => {
                "check that every referenced pilot, destination and terminal exists"
            }
            IntegrityCause::DomainConstraint => {
                "check status values and that non-scheduled flights have both crew roles filled"
            }
            IntegrityCause::MissingValue => "check that every required attribute was supplied",
        }
    }
}

impl std::fmt::Display for IntegrityCause {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            IntegrityCause::DuplicateKey => "duplicate key",
            IntegrityCause::MissingReference => "missing reference",
            IntegrityCause::DomainConstraint => "domain constraint",
            IntegrityCause::MissingValue => "missing value",
        };
        write!(f, "{}", s)
    }
}

#[derive(Error, Debug)]
pub enum RosterError {
    #[error("SQLite error: {0}")]
    RusqliteError(#[from] rusqlite::Error),
    #[error("I/O error: {0}")]
    IoError(#[from] io::Error),
    #[error("Integrity violation ({cause}): {detail}; {}", .cause.guidance())]
    IntegrityViolation {
        cause: IntegrityCause,
        detail: String,
    },
    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Config error: {0}")]
    ConfigError(String),
}

impl RosterError {
    /// Wrap a rusqlite error raised by a write, promoting constraint failures
    /// to `IntegrityViolation`.
    pub fn from_write(err: rusqlite::Error) -> Self {
        match integrity_cause(&err) {
            Some(cause) => RosterError::IntegrityViolation {
                cause,
                detail: err.to_string(),
            },
            None => RosterError::RusqliteError(err),
        }
    }

    pub fn is_integrity_violation(&self) -> bool {
        matches!(self, RosterError::IntegrityViolation { .. })
    }

    pub fn integrity_cause(&self) -> Option<IntegrityCause> {
        match self {
            RosterError::IntegrityViolation { cause, .. } => Some(*cause),
            _ => None,
        }
    }
}

fn integrity_cause(err: &rusqlite::Error) -> Option<IntegrityCause> {
    let rusqlite::Error::SqliteFailure(code, _) = err else {
        return None;
    };
    if code.code != rusqlite::ErrorCode::ConstraintViolation {
        return None;
    }
    let cause = match code.extended_code {
        ffi::SQLITE_CONSTRAINT_PRIMARYKEY | ffi::SQLITE_CONSTRAINT_UNIQUE => {
            IntegrityCause::DuplicateKey
        }
        ffi::SQLITE_CONSTRAINT_FOREIGNKEY => IntegrityCause::MissingReference,
        ffi::SQLITE_CONSTRAINT_NOTNULL => IntegrityCause::MissingValue,
        _ => IntegrityCause::DomainConstraint,
    };
    Some(cause)
}
