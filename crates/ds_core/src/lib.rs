//! Oracle capability, parameter bounds and error taxonomy.
//!
//! The design space engine never evaluates a case inequality itself. It asks
//! a [`DesignSpaceOracle`] and combines the answers. This crate defines that
//! contract, the bounds and error types that travel across it, and
//! [`TableOracle`], an in-memory backend driven by explicit parameter boxes.

pub mod bounds;
pub mod equations;
pub mod error;
pub mod oracle;
pub mod table_oracle;

pub use bounds::{Bound, ParameterBounds, SliceBounds, DEFAULT_LOWER, DEFAULT_UPPER};
pub use equations::Equations;
pub use error::{DsError, OracleError};
pub use oracle::{
    CaseStructure, DesignSpaceOracle, Objective, OracleSettings, ParameterPoint, PointQuery,
    Region, SystemInfo,
};
pub use table_oracle::{Interval, TableCase, TableModel, TableOracle, TableSubcase};
