//! Validation and compilation of schematic edits.
//!
//! [`validate`] checks a Commands document against the catalog and the
//! current snapshot and reports errors and warnings without failing.
//! [`compile`] validates and then rewrites the commands into an ordered
//! Actions document; it produces either the complete document or nothing.
//! [`enforce_grounding`] adds the checks used for machine-generated commands
//! restricted to an allow-list of parts.

pub mod compiler;
pub mod guardrails;
pub mod nets;
pub mod placement;
pub mod validate;

pub use compiler::{CompileError, CompileOptions, Compiled, Compiler, compile};
pub use guardrails::{enforce_grounding, validate_grounded};
pub use nets::normalize_net_name;
pub use validate::{Diagnostic, ValidationReport, format_validation, validate};
