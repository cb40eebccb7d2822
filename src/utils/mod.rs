//! Shared utilities
//!
//! Validation helpers used across the pipeline stages.

pub mod validation;

pub use validation::{NumericValidator, PathValidator};
