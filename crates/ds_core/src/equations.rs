//! Text container for a system of equations.
//!
//! Equations are kept as strings; parsing them is the oracle's business.
//! The only structure read here is the `x. = ...` convention marking the
//! left-hand side of a differential equation.

use std::collections::BTreeMap;
use std::fmt;
use std::ops::Index;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Equations {
    system: Vec<String>,
    #[serde(default)]
    auxiliary_variables: Vec<String>,
}

impl Equations {
    pub fn new<S: Into<String>>(
        system: impl IntoIterator<Item = S>,
        auxiliary_variables: impl IntoIterator<Item = S>,
    ) -> Self {
        Equations {
            system: system.into_iter().map(Into::into).collect(),
            auxiliary_variables: auxiliary_variables.into_iter().map(Into::into).collect(),
        }
    }

    pub fn system(&self) -> &[String] {
        &self.system
    }

    pub fn auxiliary_variables(&self) -> &[String] {
        &self.auxiliary_variables
    }

    /// Differentiated variables followed by the auxiliary variables.
    pub fn dependent_variables(&self) -> Vec<String> {
        let mut out: Vec<String> = self
            .system
            .iter()
            .filter_map(|eq| differentiated_variable(eq))
            .map(str::to_string)
            .collect();
        out.extend(self.auxiliary_variables.iter().cloned());
        out
    }

    /// Copy with every occurrence of each key replaced by its value.
    pub fn replace_symbols(&self, symbols: &BTreeMap<String, String>) -> Equations {
        let system = self
            .system
            .iter()
            .map(|eq| {
                symbols
                    .iter()
                    .fold(eq.clone(), |acc, (from, to)| acc.replace(from.as_str(), to))
            })
            .collect();
        Equations {
            system,
            auxiliary_variables: self.auxiliary_variables.clone(),
        }
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.system.get(index).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.system.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.system.len()
    }

    pub fn is_empty(&self) -> bool {
        self.system.is_empty()
    }
}

/// `x` for `x. = ...`; `None` for algebraic constraints.
fn differentiated_variable(equation: &str) -> Option<&str> {
    let lhs = equation.split('=').next()?.trim();
    let (name, _) = lhs.split_once('.')?;
    let name = name.trim();
    let first = name.chars().next()?;
    if first.is_ascii_alphabetic() || first == '_' {
        Some(name)
    } else {
        None
    }
}

impl Index<usize> for Equations {
    type Output = str;

    fn index(&self, index: usize) -> &str {
        &self.system[index]
    }
}

impl fmt::Display for Equations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, eq) in self.system.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{}", eq)?;
        }
        Ok(())
    }
}
