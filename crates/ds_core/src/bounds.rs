//! Parameter bounds.
//!
//! Callers describe a parameter region with [`ParameterBounds`]: each named
//! parameter is either pinned to a value or restricted to `[min, max]`.
//! Before anything is sent to an oracle the bounds are normalized into a
//! [`SliceBounds`] box that covers every independent variable, with
//! unspecified variables spanning the default open range.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::DsError;

/// Lower end of the default parameter range.
pub const DEFAULT_LOWER: f64 = 1e-20;
/// Upper end of the default parameter range.
pub const DEFAULT_UPPER: f64 = 1e20;

/// Bound on one parameter.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Bound {
    /// The parameter is fixed to this value.
    Pinned(f64),
    /// The parameter ranges over `[min, max]`.
    Range(f64, f64),
}

impl Bound {
    pub fn min(&self) -> f64 {
        match *self {
            Bound::Pinned(v) => v,
            Bound::Range(lo, _) => lo,
        }
    }

    pub fn max(&self) -> f64 {
        match *self {
            Bound::Pinned(v) => v,
            Bound::Range(_, hi) => hi,
        }
    }
}

impl From<f64> for Bound {
    fn from(value: f64) -> Self {
        Bound::Pinned(value)
    }
}

impl From<(f64, f64)> for Bound {
    fn from((lo, hi): (f64, f64)) -> Self {
        Bound::Range(lo, hi)
    }
}

impl From<[f64; 2]> for Bound {
    fn from([lo, hi]: [f64; 2]) -> Self {
        Bound::Range(lo, hi)
    }
}

/// User-supplied bounds keyed by parameter name.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParameterBounds(BTreeMap<String, Bound>);

impl ParameterBounds {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, name: impl Into<String>, bound: impl Into<Bound>) -> Self {
        self.insert(name, bound);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, bound: impl Into<Bound>) {
        self.0.insert(name.into(), bound.into());
    }

    pub fn get(&self, name: &str) -> Option<&Bound> {
        self.0.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Bound)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Check every bound for inversion without touching variable names.
    ///
    /// NaN ends count as inverted.
    pub fn check_order(&self) -> Result<(), DsError> {
        for (name, bound) in &self.0 {
            let (min, max) = (bound.min(), bound.max());
            if min > max || min.is_nan() || max.is_nan() {
                return Err(DsError::InvertedBounds {
                    name: name.clone(),
                    min,
                    max,
                });
            }
        }
        Ok(())
    }

    /// Normalize into a box over `variables`.
    ///
    /// Fails with `InvertedBounds` for any `min > max` and with
    /// `UnknownParameter` for names outside `variables`. Variables without a
    /// bound get `[lower, upper]`.
    pub fn normalize(
        &self,
        variables: &[String],
        lower: f64,
        upper: f64,
    ) -> Result<SliceBounds, DsError> {
        self.check_order()?;
        if let Some(unknown) = self.0.keys().find(|k| !variables.contains(k)) {
            return Err(DsError::UnknownParameter(unknown.clone()));
        }

        let mut slice = SliceBounds::open_box(variables, lower, upper);
        for (name, bound) in &self.0 {
            slice.ranges.insert(name.clone(), (bound.min(), bound.max()));
        }
        Ok(slice)
    }
}

impl<K: Into<String>, B: Into<Bound>> FromIterator<(K, B)> for ParameterBounds {
    fn from_iter<I: IntoIterator<Item = (K, B)>>(iter: I) -> Self {
        ParameterBounds(
            iter.into_iter()
                .map(|(k, b)| (k.into(), b.into()))
                .collect(),
        )
    }
}

/// Normalized `[min, max]` per independent variable, as sent to an oracle.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SliceBounds {
    ranges: BTreeMap<String, (f64, f64)>,
}

impl SliceBounds {
    /// Every variable spans `[lower, upper]`.
    pub fn open_box(variables: &[String], lower: f64, upper: f64) -> Self {
        SliceBounds {
            ranges: variables
                .iter()
                .map(|v| (v.clone(), (lower, upper)))
                .collect(),
        }
    }

    pub fn get(&self, name: &str) -> Option<(f64, f64)> {
        self.ranges.get(name).copied()
    }

    /// True when the variable is fixed to a single value.
    pub fn is_pinned(&self, name: &str) -> bool {
        matches!(self.ranges.get(name), Some((lo, hi)) if lo == hi)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &(f64, f64))> {
        self.ranges.iter()
    }

    pub fn len(&self) -> usize {
        self.ranges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }
}
