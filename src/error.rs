use std::{error::Error, fmt};

/// This crate's result type.
pub type Result<T> = std::result::Result<T, TrainError>;

/// Failures surfaced by training control operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrainError {
    /// A configuration value was rejected before a session could start.
    InvalidConfig {
        field: &'static str,
        reason: &'static str,
    },
    /// A session was started or resumed with zero observations.
    EmptySample,
}

impl fmt::Display for TrainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrainError::InvalidConfig { field, reason } => {
                write!(f, "invalid config: {field} {reason}")
            }
            TrainError::EmptySample => {
                write!(f, "sample must contain at least one observation")
            }
        }
    }
}

impl Error for TrainError {}
