//! Error types for effect construction and parameter handling.

use crate::EffectKind;
use thiserror::Error;

/// Errors raised when describing or constructing an effect.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EffectError {
    /// The effect kind is not present in this registry.
    #[error("effect '{0}' is not registered")]
    Unregistered(EffectKind),

    /// No effect kind has this identifier.
    #[error("unknown effect type: {0}")]
    UnknownEffect(String),

    /// The effect has no parameter with this name.
    #[error("effect '{effect}' has no parameter '{param}'")]
    UnknownParameter {
        /// Effect the lookup was made against.
        effect: EffectKind,
        /// Requested parameter name.
        param: String,
    },

    /// A parameter value lies outside its accepted range.
    #[error("invalid parameter '{param}' for effect '{effect}': {value} not in [{min}, {max}]")]
    InvalidParameter {
        /// Effect owning the parameter.
        effect: EffectKind,
        /// Parameter name.
        param: &'static str,
        /// Rejected value.
        value: f32,
        /// Smallest accepted value.
        min: f32,
        /// Largest accepted value.
        max: f32,
    },

    /// A parameter value could not be parsed as a number.
    #[error("parameter '{param}' expects a number, got '{value}'")]
    ParseValue {
        /// Parameter name.
        param: String,
        /// Offending text.
        value: String,
    },
}

impl EffectError {
    /// POSIX-style negative error code for this error.
    ///
    /// Every effect error is a rejected argument.
    pub fn errno(&self) -> i32 {
        -libc::EINVAL
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unregistered_display() {
        let err = EffectError::Unregistered(EffectKind::Chorus);
        assert_eq!(err.to_string(), "effect 'chorus' is not registered");
        assert_eq!(err.errno(), -libc::EINVAL);
    }

    #[test]
    fn test_invalid_parameter_display() {
        let err = EffectError::InvalidParameter {
            effect: EffectKind::Reverb,
            param: "wet",
            value: 1.5,
            min: 0.0,
            max: 1.0,
        };
        assert_eq!(
            err.to_string(),
            "invalid parameter 'wet' for effect 'reverb': 1.5 not in [0, 1]"
        );
        assert_eq!(err.errno(), -libc::EINVAL);
    }
}
