//! Scenario construction for cyclusgen.
//!
//! This crate turns filtered fleet records into a complete Cyclus input
//! document: lifecycle arithmetic, the reactor spec catalog, reactor and
//! region rendering, document assembly, and the demand-driven deployment
//! planner, tied together by the `generate` pipeline.

pub mod assembler;
pub mod catalog;
pub mod demand;
pub mod lifecycle;
pub mod pipeline;
pub mod reactor;
pub mod region;

pub use cyclusgen_fleet::{YearMonth, parse_required_date};
pub use cyclusgen_templates::{BUILTIN_FILES, TemplateSet};
