//! Error types for the signature grammar.

use thiserror::Error;

/// Errors produced while reading case identifiers and signatures.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SignatureError {
    /// Text does not follow the identifier/signature grammar.
    #[error("malformed identifier \"{input}\": {reason}")]
    Malformed { input: String, reason: String },

    /// Signature has the wrong number of terms for the system.
    #[error("signature \"{input}\" has {found} terms, expected {expected}")]
    Length {
        input: String,
        expected: usize,
        found: usize,
    },
}

impl SignatureError {
    pub(crate) fn malformed(input: &str, reason: impl Into<String>) -> Self {
        SignatureError::Malformed {
            input: input.to_string(),
            reason: reason.into(),
        }
    }
}
