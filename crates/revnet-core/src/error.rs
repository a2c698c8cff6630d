//! Error types for the revnet pricing engine

use thiserror::Error;

/// Result type alias for pricing operations
pub type Result<T> = std::result::Result<T, PricingError>;

/// Errors raised by the pricing functions
///
/// An aggregate that mixes asset types is not an error; it is reported
/// through the `imprecise` flag on the aggregate itself.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PricingError {
    /// Curve parameters out of range or missing
    #[error("Invalid ruleset: {0}")]
    InvalidRuleset(String),

    /// Computation requested against an impossible state
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// A required upstream read did not resolve
    #[error("Data unavailable: {0}")]
    DataUnavailable(String),

    /// Caller-supplied argument rejected
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Result does not fit in 256 bits
    #[error("Arithmetic overflow: {0}")]
    Overflow(String),
}

impl PricingError {
    /// Stable numeric code for API responses
    pub fn code(&self) -> u32 {
        match self {
            Self::InvalidRuleset(_) => 2001,
            Self::InvalidState(_) => 2002,
            Self::DataUnavailable(_) => 2003,
            Self::InvalidInput(_) => 2004,
            Self::Overflow(_) => 2005,
        }
    }

    /// Check if the caller can recover by dropping the affected chain
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::DataUnavailable(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(PricingError::InvalidRuleset("cut".into()).code(), 2001);
        assert_eq!(PricingError::InvalidState("supply".into()).code(), 2002);
        assert_eq!(PricingError::DataUnavailable("chain 1".into()).code(), 2003);
    }

    #[test]
    fn test_error_display() {
        let err = PricingError::InvalidState("zero effective supply".into());
        let msg = format!("{}", err);
        assert!(msg.contains("Invalid state"));
        assert!(msg.contains("zero effective supply"));
    }

    #[test]
    fn test_recoverable_errors() {
        assert!(PricingError::DataUnavailable("base".into()).is_recoverable());
        assert!(!PricingError::InvalidRuleset("cut".into()).is_recoverable());
        assert!(!PricingError::Overflow("mul".into()).is_recoverable());
    }
}
