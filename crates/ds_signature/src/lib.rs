//! Case identifier and dominant-term signature grammar.
//!
//! This crate owns the text side of design space cases:
//!
//! - [`CaseId`]: stable case keys such as `12` or `12_2`
//! - [`Signature`] / [`SignaturePattern`]: per-equation dominant-term
//!   vectors, written `12(11)1`, with `*` wildcards in patterns
//! - [`compare_identifiers`]: the case ordering used for every sorted list
//! - [`expand_wildcards`]: enumeration of all signatures matching a pattern
//!
//! The numeric packing of a signature into a case number belongs to the
//! oracle and is not reimplemented here.

pub mod case_id;
pub mod error;
pub mod ordering;
pub mod parser;
pub mod signature;
pub mod wildcard;

pub use case_id::CaseId;
pub use error::SignatureError;
pub use ordering::{compare_identifiers, sort_identifiers};
pub use parser::{parse_case_id, parse_signature};
pub use signature::{ParsedSignature, Signature, SignaturePattern, SignatureTerm};
pub use wildcard::expand_wildcards;
