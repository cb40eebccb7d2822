//! Validation utilities
//!
//! Centralized checks for paths and numeric inputs used by the pipeline.

pub mod numeric;
pub mod path;

pub use numeric::NumericValidator;
pub use path::PathValidator;
