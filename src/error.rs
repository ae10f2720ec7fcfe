//! Error handling for Rhythmtree
//!
//! Every error carries a stable code and, where it makes sense, recovery
//! suggestions for the caller. Output failures never reach the caller of the
//! scheduler: they are logged and the engine keeps running silently.

use thiserror::Error;

/// Result type alias for Rhythmtree operations
pub type Result<T> = std::result::Result<T, RhythmError>;

/// Main error type for Rhythmtree operations
#[derive(Error, Debug)]
pub enum RhythmError {
    // Output Errors
    #[error("Audio output unavailable: {reason}")]
    OutputUnavailable { reason: String },

    #[error("Audio stream error: {reason}")]
    StreamError { reason: String },

    #[error("Unsupported sample format: {format}")]
    UnsupportedSampleFormat { format: String },

    // Input Errors
    #[error("Unknown layer: {name}")]
    UnknownLayer { name: String },

    #[error("Invalid configuration for '{field}': {reason}")]
    InvalidConfig { field: String, reason: String },

    // I/O Errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // Serialization Errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl RhythmError {
    /// Get the error code for this error type
    pub fn error_code(&self) -> &'static str {
        match self {
            RhythmError::OutputUnavailable { .. } => "OUTPUT_UNAVAILABLE",
            RhythmError::StreamError { .. } => "STREAM_ERROR",
            RhythmError::UnsupportedSampleFormat { .. } => "UNSUPPORTED_SAMPLE_FORMAT",
            RhythmError::UnknownLayer { .. } => "UNKNOWN_LAYER",
            RhythmError::InvalidConfig { .. } => "INVALID_CONFIG",
            RhythmError::Io(_) => "IO_ERROR",
            RhythmError::Serialization(_) => "SERIALIZATION_ERROR",
        }
    }

    /// Check if the engine can keep going after this error
    ///
    /// Output errors are recoverable because the scheduler falls back to a
    /// silent output.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            RhythmError::OutputUnavailable { .. }
                | RhythmError::StreamError { .. }
                | RhythmError::UnsupportedSampleFormat { .. }
                | RhythmError::UnknownLayer { .. }
        )
    }

    /// Get recovery suggestions for this error
    pub fn recovery_suggestions(&self) -> Vec<&'static str> {
        match self {
            RhythmError::OutputUnavailable { .. } => vec![
                "Check that an output device is connected and not in exclusive use",
                "Rebuild with `--features realtime` to enable device output",
                "Playback continues silently; the playhead still advances",
            ],
            RhythmError::StreamError { .. } => vec![
                "The output device may have been unplugged",
                "Restart the program to reopen the output",
            ],
            RhythmError::UnsupportedSampleFormat { .. } => {
                vec!["Select an output device that accepts f32, i16 or u16 samples"]
            }
            RhythmError::UnknownLayer { .. } => vec![
                "Valid layers: whole, half, quarter, 8th, 16th, 32nd",
            ],
            RhythmError::InvalidConfig { .. } => vec![
                "Remove the field to fall back to its default",
                "Tempo and intervals must be positive; volume must be within 0-1",
            ],
            _ => vec![],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        let err = RhythmError::UnknownLayer {
            name: "64th".to_string(),
        };
        assert_eq!(err.error_code(), "UNKNOWN_LAYER");
        assert_eq!(err.to_string(), "Unknown layer: 64th");
    }

    #[test]
    fn test_output_errors_are_recoverable() {
        let err = RhythmError::OutputUnavailable {
            reason: "no device".to_string(),
        };
        assert!(err.is_recoverable());
        assert!(!err.recovery_suggestions().is_empty());
    }

    #[test]
    fn test_config_errors_are_not_recoverable() {
        let err = RhythmError::InvalidConfig {
            field: "tempo".to_string(),
            reason: "must be positive".to_string(),
        };
        assert!(!err.is_recoverable());
        assert_eq!(
            err.to_string(),
            "Invalid configuration for 'tempo': must be positive"
        );
    }
}
