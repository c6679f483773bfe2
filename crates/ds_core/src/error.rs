//! Error taxonomy shared by the design space crates.

use ds_signature::SignatureError;
use thiserror::Error;

/// Failure reported by an oracle backend.
///
/// The diagnostic text is carried verbatim; callers do not interpret it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OracleError {
    /// The backend could not answer (malformed system, solver failure, ...).
    #[error("{0}")]
    Failure(String),

    /// The backend does not support this kind of query.
    #[error("unsupported query: {0}")]
    Unsupported(String),
}

/// Errors surfaced by design space operations.
///
/// An infeasible co-localization is not an error; it is reported through
/// the solver's outcome type.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DsError {
    #[error(transparent)]
    MalformedIdentifier(#[from] SignatureError),

    #[error("case \"{0}\" does not exist")]
    CaseNotFound(String),

    #[error("parameter bounds for '{name}' are inverted: min {min} is larger than max {max}")]
    InvertedBounds { name: String, min: f64, max: f64 },

    #[error("slice variable '{0}' is not an independent variable")]
    InvalidSliceVariable(String),

    #[error("unknown parameter '{0}'")]
    UnknownParameter(String),

    #[error("intersection order must be at least 1, got {0}")]
    InvalidIntersectionOrder(usize),

    #[error("a case intersection needs at least {needed} distinct cases, got {got}")]
    TooFewCases { needed: usize, got: usize },

    #[error("independent variable '{0}' is declared more than once")]
    DuplicateVariable(String),

    #[error("oracle failure: {0}")]
    OracleFailure(#[from] OracleError),
}

impl DsError {
    pub fn case_not_found(id: impl std::fmt::Display) -> Self {
        DsError::CaseNotFound(id.to_string())
    }
}
