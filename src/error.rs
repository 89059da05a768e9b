use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum StrideError {
    ValidationError(String),
    OrchestrationError(String),
    StateTransitionError(String),
    EventError(String),
    ConfigurationError(String),
}

impl fmt::Display for StrideError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StrideError::ValidationError(msg) => write!(f, "Validation error: {msg}"),
            StrideError::OrchestrationError(msg) => write!(f, "Orchestration error: {msg}"),
            StrideError::StateTransitionError(msg) => write!(f, "State transition error: {msg}"),
            StrideError::EventError(msg) => write!(f, "Event error: {msg}"),
            StrideError::ConfigurationError(msg) => write!(f, "Configuration error: {msg}"),
        }
    }
}

impl std::error::Error for StrideError {}

pub type Result<T> = std::result::Result<T, StrideError>;
