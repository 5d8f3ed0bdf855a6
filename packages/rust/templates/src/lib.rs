//! Document templates for cyclusgen.
//!
//! The pipeline treats templates as opaque text with `{{ name }}`
//! placeholders; this crate only guarantees substitution and variant selection.

mod engine;
mod set;

pub use engine::{Context, Template};
pub use set::{ReactorClass, BUILTIN_FILES, TemplateSet};
