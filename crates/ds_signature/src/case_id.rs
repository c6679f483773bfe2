//! Stable case identifiers.
//!
//! A case identifier is a case number in `1..=number_of_cases`, optionally
//! followed by one subcase index per level of cyclical resolution:
//! `12`, `12_2`. Identifiers are keys, never positions.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use smallvec::SmallVec;

use crate::error::SignatureError;

/// Identifier of a case or of a subcase of a cyclical case.
///
/// The derived ordering is the case ordering: the case number first, then
/// the subcase path element-wise, with a parent sorting immediately before
/// its own subcases.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CaseId {
    number: u64,
    subcases: SmallVec<[u32; 2]>,
}

impl CaseId {
    pub fn new(number: u64) -> Self {
        CaseId {
            number,
            subcases: SmallVec::new(),
        }
    }

    pub fn with_path(number: u64, subcases: impl IntoIterator<Item = u32>) -> Self {
        CaseId {
            number,
            subcases: subcases.into_iter().collect(),
        }
    }

    /// The case number of the top-level case.
    pub fn number(&self) -> u64 {
        self.number
    }

    pub fn subcase_path(&self) -> &[u32] {
        &self.subcases
    }

    pub fn is_subcase(&self) -> bool {
        !self.subcases.is_empty()
    }

    /// Index of this subcase within its parent (`2` for `7_2`).
    pub fn subcase_index(&self) -> Option<u32> {
        self.subcases.last().copied()
    }

    /// Identifier `self_index`.
    pub fn subcase(&self, index: u32) -> CaseId {
        let mut subcases = self.subcases.clone();
        subcases.push(index);
        CaseId {
            number: self.number,
            subcases,
        }
    }

    /// The cyclical case this subcase belongs to.
    pub fn parent(&self) -> Option<CaseId> {
        if self.subcases.is_empty() {
            return None;
        }
        let mut subcases = self.subcases.clone();
        subcases.pop();
        Some(CaseId {
            number: self.number,
            subcases,
        })
    }

    /// True when `other` lies below `self` in the subcase hierarchy.
    pub fn is_ancestor_of(&self, other: &CaseId) -> bool {
        self.number == other.number
            && self.subcases.len() < other.subcases.len()
            && other.subcases.starts_with(&self.subcases)
    }
}

impl From<u64> for CaseId {
    fn from(number: u64) -> Self {
        CaseId::new(number)
    }
}

impl fmt::Display for CaseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.number)?;
        for sub in &self.subcases {
            write!(f, "_{}", sub)?;
        }
        Ok(())
    }
}

impl FromStr for CaseId {
    type Err = SignatureError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        crate::parser::parse_case_id(s)
    }
}

impl Serialize for CaseId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for CaseId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_round_trips() {
        for text in ["1", "12", "12_2", "3_1_4"] {
            let id: CaseId = text.parse().unwrap();
            assert_eq!(id.to_string(), text);
        }
    }

    #[test]
    fn parent_and_subcase_are_inverse() {
        let id = CaseId::new(4);
        let sub = id.subcase(2);
        assert_eq!(sub.to_string(), "4_2");
        assert_eq!(sub.parent(), Some(id.clone()));
        assert_eq!(sub.subcase_index(), Some(2));
        assert!(id.is_ancestor_of(&sub));
        assert!(!sub.is_ancestor_of(&id));
        assert_eq!(id.parent(), None);
    }

    #[test]
    fn ordering_is_numeric_and_parent_first() {
        let mut ids: Vec<CaseId> = ["10", "9", "2_2", "2", "2_1", "1"]
            .iter()
            .map(|s| s.parse().unwrap())
            .collect();
        ids.sort();
        let text: Vec<String> = ids.iter().map(|i| i.to_string()).collect();
        assert_eq!(text, ["1", "2", "2_1", "2_2", "9", "10"]);
    }
}
