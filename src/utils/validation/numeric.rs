//! Numeric validation utilities
//!
//! Range checks for configuration values and finiteness checks for
//! embedding vectors.

use crate::error::{DatasetError, Result};

/// Validator for numeric configuration values and feature vectors
pub struct NumericValidator;

impl NumericValidator {
    /// Validate that a value is positive
    pub fn validate_positive<T>(value: T, name: &str) -> Result<T>
    where
        T: PartialOrd + std::fmt::Display + Copy + Default,
    {
        if value <= T::default() {
            return Err(DatasetError::invalid_config(format!(
                "{} must be positive, got {}",
                name, value
            )));
        }
        Ok(value)
    }

    /// Validate that every component of a vector is finite
    ///
    /// Returns the index of the first offending component in the error.
    pub fn validate_finite_vector(values: &[f32], name: &str) -> Result<()> {
        if let Some((index, value)) = values.iter().enumerate().find(|(_, v)| !v.is_finite()) {
            return Err(DatasetError::invalid_feature(format!(
                "{} has non-finite value {} at index {}",
                name, value, index
            )));
        }
        Ok(())
    }

    /// Validate that a vector has the expected dimension
    pub fn validate_dimension(values: &[f32], expected: usize, name: &str) -> Result<()> {
        if values.len() != expected {
            return Err(DatasetError::invalid_feature(format!(
                "{} has dimension {}, expected {}",
                name,
                values.len(),
                expected
            )));
        }
        Ok(())
    }
}
