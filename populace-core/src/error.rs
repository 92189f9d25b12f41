//! Error types for the populace generation engine.

use std::fmt;
use thiserror::Error;

/// Boxed error returned by user-supplied constructors, setters and
/// container functions.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Main error type for populace.
#[derive(Error, Debug)]
pub enum EngineError {
    /// A collection, map or array could not reach its requested size.
    #[error("Unable to populate {type_name} with requested number of {what}: {requested}")]
    Unsatisfiable {
        type_name: String,
        what: Populated,
        requested: usize,
    },

    /// A constructor, factory or container function failed.
    #[error("Failed creating {node}")]
    Construction {
        node: String,
        #[source]
        source: BoxError,
    },

    /// A value could not be written into its parent object.
    #[error("Failed assigning field '{field}': {message}")]
    Assignment { field: String, message: String },

    /// Invalid configuration.
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },
}

impl EngineError {
    /// Contract violations are raised regardless of `fail_on_error`.
    pub fn is_fatal(&self) -> bool {
        matches!(self, EngineError::InvalidConfig { .. })
    }
}

/// What a size-constrained populator was trying to produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Populated {
    Elements,
    Entries,
}

impl fmt::Display for Populated {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Populated::Elements => write!(f, "elements"),
            Populated::Entries => write!(f, "entries"),
        }
    }
}

/// Result type for populace operations.
pub type Result<T> = std::result::Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsatisfiable_message() {
        let error = EngineError::Unsatisfiable {
            type_name: "Set<bool>".to_string(),
            what: Populated::Elements,
            requested: 5,
        };
        assert_eq!(
            error.to_string(),
            "Unable to populate Set<bool> with requested number of elements: 5"
        );
        assert!(!error.is_fatal());
    }

    #[test]
    fn test_construction_keeps_cause() {
        use std::error::Error as _;

        let error = EngineError::Construction {
            node: "record Point".to_string(),
            source: "negative coordinate".into(),
        };
        assert_eq!(error.to_string(), "Failed creating record Point");
        assert_eq!(
            error.source().map(|cause| cause.to_string()),
            Some("negative coordinate".to_string())
        );
    }

    #[test]
    fn test_contract_violations_are_fatal() {
        assert!(EngineError::InvalidConfig {
            message: "bad".to_string()
        }
        .is_fatal());
        assert!(!EngineError::Assignment {
            field: "name".to_string(),
            message: "setter failed".to_string()
        }
        .is_fatal());
    }
}
