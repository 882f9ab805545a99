// src/error.rs
use std::fmt;

/// Custom error types for the fast-spde library
#[derive(Debug, Clone, PartialEq)]
pub enum SdeError {
    /// Malformed stepper configuration or capability/argument mismatch
    ConfigurationError { field: String, reason: String },

    /// A buffer disagrees with the (trajectories, components, *spatial) contract
    ShapeMismatch {
        buffer: String,
        expected: Vec<usize>,
        actual: Vec<usize>,
    },

    /// Option that is recognised but not implemented
    UnsupportedOption { option: String, context: String },

    /// Invalid parameter values
    InvalidParameters {
        parameter: String,
        value: f64,
        constraint: String,
    },

    /// RNG or random number generation error
    RandomGenerationError { reason: String },
}

impl fmt::Display for SdeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SdeError::ConfigurationError { field, reason } => {
                write!(f, "Invalid configuration for '{}': {}", field, reason)
            }
            SdeError::ShapeMismatch {
                buffer,
                expected,
                actual,
            } => {
                write!(
                    f,
                    "Shape mismatch for '{}': expected {:?}, got {:?}",
                    buffer, expected, actual
                )
            }
            SdeError::UnsupportedOption { option, context } => {
                write!(f, "Unsupported option '{}' in context: {}", option, context)
            }
            SdeError::InvalidParameters {
                parameter,
                value,
                constraint,
            } => {
                write!(
                    f,
                    "Invalid parameter '{}' = {}: {}",
                    parameter, value, constraint
                )
            }
            SdeError::RandomGenerationError { reason } => {
                write!(f, "Random number generation error: {}", reason)
            }
        }
    }
}

impl std::error::Error for SdeError {}

/// Result type alias for fast-spde operations
pub type SdeResult<T> = Result<T, SdeError>;

/// Validation utilities
pub mod validation {
    use super::{SdeError, SdeResult};

    /// Validate that a parameter is positive and finite
    pub fn validate_positive(name: &str, value: f64) -> SdeResult<()> {
        if !(value > 0.0) || !value.is_finite() {
            Err(SdeError::InvalidParameters {
                parameter: name.to_string(),
                value,
                constraint: "must be positive (> 0) and finite".to_string(),
            })
        } else {
            Ok(())
        }
    }

    /// Validate that a value is finite and not NaN
    pub fn validate_finite(name: &str, value: f64) -> SdeResult<()> {
        if !value.is_finite() {
            Err(SdeError::InvalidParameters {
                parameter: name.to_string(),
                value,
                constraint: "must be finite (not NaN or infinite)".to_string(),
            })
        } else {
            Ok(())
        }
    }

    /// Validate that a count is at least one
    pub fn validate_count(field: &str, count: usize) -> SdeResult<()> {
        if count == 0 {
            Err(SdeError::ConfigurationError {
                field: field.to_string(),
                reason: "must be greater than 0".to_string(),
            })
        } else {
            Ok(())
        }
    }

    /// Validate that a buffer has exactly the expected shape
    pub fn validate_shape(buffer: &str, expected: &[usize], actual: &[usize]) -> SdeResult<()> {
        if expected != actual {
            Err(SdeError::ShapeMismatch {
                buffer: buffer.to_string(),
                expected: expected.to_vec(),
                actual: actual.to_vec(),
            })
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::validation::*;
    use super::*;

    #[test]
    fn test_validate_positive() {
        assert!(validate_positive("box", 2.0).is_ok());
        assert!(validate_positive("box", 0.0).is_err());
        assert!(validate_positive("box", -0.1).is_err());
        assert!(validate_positive("box", f64::NAN).is_err());
        assert!(validate_positive("box", f64::INFINITY).is_err());
    }

    #[test]
    fn test_validate_finite() {
        assert!(validate_finite("dt", 0.0).is_ok());
        assert!(validate_finite("dt", -1.0).is_ok());
        assert!(validate_finite("dt", f64::NAN).is_err());
        assert!(validate_finite("dt", f64::NEG_INFINITY).is_err());
    }

    #[test]
    fn test_validate_shape() {
        assert!(validate_shape("input", &[1, 2, 8], &[1, 2, 8]).is_ok());
        match validate_shape("input", &[1, 2, 8], &[1, 3, 8]) {
            Err(SdeError::ShapeMismatch { buffer, expected, actual }) => {
                assert_eq!(buffer, "input");
                assert_eq!(expected, vec![1, 2, 8]);
                assert_eq!(actual, vec![1, 3, 8]);
            }
            other => panic!("expected shape mismatch, got {:?}", other),
        }
    }

    #[test]
    fn test_error_display() {
        let error = SdeError::ShapeMismatch {
            buffer: "dW".to_string(),
            expected: vec![2, 1, 16],
            actual: vec![2, 2, 16],
        };

        let display = format!("{}", error);
        assert!(display.contains("dW"));
        assert!(display.contains("[2, 1, 16]"));
        assert!(display.contains("[2, 2, 16]"));

        let error = SdeError::UnsupportedOption {
            option: "ksquared_cutoff".to_string(),
            context: "RK4IP".to_string(),
        };
        assert!(format!("{}", error).contains("ksquared_cutoff"));
    }
}
