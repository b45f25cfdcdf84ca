//! Types for the lint API.
//!
//! These are the values rules hand to a sink and the linter hands back to a
//! host: a rule violation, its severity and its source location.

mod common;

// Re-export all public types
pub use common::{rule_ids, Location, Severity, Violation};
