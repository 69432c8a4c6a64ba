//! Error types for animation construction and playback control

use serde::{Deserialize, Serialize};

use crate::ids::ObjectId;

/// Contract violations detected while building or driving animations
#[derive(thiserror::Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum AnimationError {
    /// Repeat count of zero, or an infinite repeat that could never yield
    #[error("Invalid repeat count: {reason}")]
    InvalidRepeatCount { reason: String },

    /// Negative or non-finite duration
    #[error("Invalid duration: {duration}")]
    InvalidDuration { duration: f32 },

    /// Play requested while the animation is not idle
    #[error("Animation {tag:?} is already running")]
    AlreadyRunning { tag: Option<String> },

    /// Object mapped twice within one step
    #[error("Object {object:?} is already animated by this step")]
    DuplicateObject { object: ObjectId },

    /// Delta uses parameters the step variant cannot express
    #[error("Unsupported delta for {step_kind} step: {reason}")]
    UnsupportedDelta { step_kind: String, reason: String },

    /// Declarative definition names an object the resolver does not know
    #[error("Unknown animation target: {name}")]
    UnknownTarget { name: String },

    /// Declarative definition could not be parsed
    #[error("Serialization error: {reason}")]
    Serialization { reason: String },
}

impl AnimationError {
    /// Get error category for logging
    #[inline]
    pub fn category(&self) -> &'static str {
        match self {
            Self::InvalidRepeatCount { .. } | Self::AlreadyRunning { .. } => "playback",
            Self::InvalidDuration { .. }
            | Self::DuplicateObject { .. }
            | Self::UnsupportedDelta { .. } => "validation",
            Self::UnknownTarget { .. } => "binding",
            Self::Serialization { .. } => "serialization",
        }
    }
}

impl From<serde_json::Error> for AnimationError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            reason: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_categories() {
        let duplicate = AnimationError::DuplicateObject {
            object: ObjectId(3),
        };
        assert_eq!(duplicate.category(), "validation");

        let running = AnimationError::AlreadyRunning { tag: None };
        assert_eq!(running.category(), "playback");
    }

    #[test]
    fn test_error_display() {
        let err = AnimationError::InvalidDuration { duration: -1.0 };
        assert_eq!(err.to_string(), "Invalid duration: -1");
    }

    #[test]
    fn test_serialization() {
        let error = AnimationError::UnknownTarget {
            name: "card".to_string(),
        };
        let serialized = serde_json::to_string(&error).unwrap();
        let deserialized: AnimationError = serde_json::from_str(&serialized).unwrap();
        assert_eq!(error, deserialized);
    }

    #[test]
    fn test_from_json_error() {
        let err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let converted: AnimationError = err.into();
        assert_eq!(converted.category(), "serialization");
    }
}
