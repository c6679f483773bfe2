//! Dominant-term signatures.
//!
//! A signature selects one dominant power-law term per equation. Term indices
//! are 1-based; indices of two or more digits are written in parentheses so
//! that the text form stays unambiguous: `[12, 3]` is written `(12)3`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use smallvec::SmallVec;

use crate::error::SignatureError;

/// One position of a signature pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SignatureTerm {
    /// A concrete dominant-term index.
    Index(u32),
    /// `*`: every term index of that equation.
    Wildcard,
}

impl fmt::Display for SignatureTerm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SignatureTerm::Index(n) if *n < 10 => write!(f, "{}", n),
            SignatureTerm::Index(n) => write!(f, "({})", n),
            SignatureTerm::Wildcard => write!(f, "*"),
        }
    }
}

/// A concrete term-selection vector, one entry per equation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Signature(SmallVec<[u32; 8]>);

impl Signature {
    pub fn new(terms: impl IntoIterator<Item = u32>) -> Self {
        Signature(terms.into_iter().collect())
    }

    pub fn terms(&self) -> &[u32] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The same signature as a pattern without wildcards.
    pub fn to_pattern(&self) -> SignaturePattern {
        SignaturePattern::new(self.0.iter().map(|&t| SignatureTerm::Index(t)))
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &term in &self.0 {
            write!(f, "{}", SignatureTerm::Index(term))?;
        }
        Ok(())
    }
}

impl FromStr for Signature {
    type Err = SignatureError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parsed = crate::parser::parse_signature(s)?;
        if parsed.subcase.is_some() {
            return Err(SignatureError::malformed(s, "signature carries a subcase suffix"));
        }
        parsed
            .pattern
            .to_signature()
            .ok_or_else(|| SignatureError::malformed(s, "signature contains a wildcard"))
    }
}

impl Serialize for Signature {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Signature {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}

/// A signature that may contain wildcard positions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct SignaturePattern(Vec<SignatureTerm>);

impl SignaturePattern {
    pub fn new(terms: impl IntoIterator<Item = SignatureTerm>) -> Self {
        SignaturePattern(terms.into_iter().collect())
    }

    pub fn terms(&self) -> &[SignatureTerm] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Position of the leftmost wildcard, if any.
    pub fn first_wildcard(&self) -> Option<usize> {
        self.0.iter().position(|t| *t == SignatureTerm::Wildcard)
    }

    pub fn has_wildcards(&self) -> bool {
        self.first_wildcard().is_some()
    }

    /// Copy of this pattern with position `index` fixed to `term`.
    pub fn substitute(&self, index: usize, term: u32) -> Self {
        let mut terms = self.0.clone();
        terms[index] = SignatureTerm::Index(term);
        SignaturePattern(terms)
    }

    /// The concrete signature, or `None` while wildcards remain.
    pub fn to_signature(&self) -> Option<Signature> {
        self.0
            .iter()
            .map(|t| match t {
                SignatureTerm::Index(n) => Some(*n),
                SignatureTerm::Wildcard => None,
            })
            .collect::<Option<SmallVec<[u32; 8]>>>()
            .map(Signature)
    }
}

impl fmt::Display for SignaturePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for term in &self.0 {
            write!(f, "{}", term)?;
        }
        Ok(())
    }
}

/// Result of reading `D[_S]` signature text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedSignature {
    pub pattern: SignaturePattern,
    pub subcase: Option<u32>,
}

impl ParsedSignature {
    /// Check the pattern against the number of equations of a system.
    pub fn check_length(&self, equations: usize) -> Result<(), SignatureError> {
        if self.pattern.len() == equations {
            Ok(())
        } else {
            Err(SignatureError::Length {
                input: self.to_string(),
                expected: equations,
                found: self.pattern.len(),
            })
        }
    }
}

impl fmt::Display for ParsedSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.pattern)?;
        if let Some(sub) = self.subcase {
            write!(f, "_{}", sub)?;
        }
        Ok(())
    }
}
