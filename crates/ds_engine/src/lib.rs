//! Design space engine.
//!
//! A [`DesignSpace`] owns the case universe of one model and answers the
//! combinatorial questions asked of it:
//!
//! - case lookup by id or signature, with cyclical cases carrying their
//!   subcases ([`Case`])
//! - enumeration of the cases valid within parameter bounds
//!   ([`DesignSpace::valid_cases`])
//! - replacement of cyclical cases by subcases
//!   ([`DesignSpace::cycles_to_subcases`])
//! - intersections of valid cases, grown bottom-up
//!   ([`DesignSpace::valid_intersecting_cases`])
//! - co-localization of several cases at one parameter point
//!   ([`DesignSpace::co_localize_cases`])
//!
//! Every feasibility decision is delegated to a
//! [`ds_core::DesignSpaceOracle`].

mod cache;
pub mod case;
pub mod colocalize;
mod cycles;
pub mod design_space;
mod enumerate;
mod fanout;
pub mod intersections;
pub mod options;

pub use case::{Case, CaseData, CaseIntersection, CaseSelection};
pub use colocalize::{CaseColocalization, ColocalizationOutcome, ColocalizationRequest};
pub use design_space::{CaseLookup, DesignSpace};
pub use intersections::{IntersectionEntry, IntersectionOrders};
pub use options::{DesignSpaceOptions, EngineOptions};
