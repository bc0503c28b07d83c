//! Error taxonomy for the compensation engine and its loaders

use thiserror::Error;

/// Errors surfaced by rule evaluation, aggregation and table loading
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("unknown role: {0}")]
    UnknownRole(String),

    #[error("missing required input `{key}`")]
    MissingInput { key: String },

    #[error("no input named `{key}`")]
    UnknownInput { key: String },

    #[error("input `{key}` expects a {expected} value, got {found}")]
    KindMismatch {
        key: String,
        expected: &'static str,
        found: String,
    },

    #[error("input `{key}` value {value} is outside its domain ({domain})")]
    OutOfDomain {
        key: String,
        value: String,
        domain: String,
    },

    #[error("input `{key}` does not accept `{value}` (allowed: {allowed})")]
    UnknownChoice {
        key: String,
        value: String,
        allowed: String,
    },

    #[error("malformed assignment `{0}`, expected key=value")]
    MalformedAssignment(String),

    #[error("role {0} has no quarterly consultant plan")]
    NotQuarterlyRole(String),

    #[error("invalid quarter: {0}")]
    InvalidQuarter(String),

    #[error("invalid bracket table: {0}")]
    InvalidBrackets(String),

    #[error("invalid goal table {table}: {reason}")]
    InvalidGoals { table: String, reason: String },

    #[error("missing required column `{0}`")]
    MissingColumn(String),

    #[error("no period labelled `{0}` in the selection")]
    UnknownPeriod(String),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, EngineError>;
