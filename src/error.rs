//! Error types for subwire.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SubwireError {
    // Request validation errors
    #[error("Malformed request: {message}")]
    MalformedRequest { message: String },

    #[error("Invalid UUID or asset not found.")]
    UnknownAsset,

    #[error("Unsupported request type.")]
    UnsupportedRequestType,

    // Audio source errors
    #[error("Audio source unavailable: {message}")]
    SourceUnavailable { message: String },

    // Transcription errors
    #[error("Transcription stream failed: {message}")]
    Transcription { message: String },

    // Connection/transport errors
    #[error("Connection error: {message}")]
    Connection { message: String },

    #[error("Connection closed")]
    ConnectionClosed,

    // Configuration errors
    #[error("Configuration file not found at {path}")]
    ConfigFileNotFound { path: String },

    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    #[error("Invalid configuration value for {key}: {message}")]
    ConfigInvalidValue { key: String, message: String },

    // Serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // General I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // Generic error for cases not covered above
    #[error("{0}")]
    Other(String),
}

// Type alias for convenience
pub type Result<T> = std::result::Result<T, SubwireError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_malformed_request_display() {
        let error = SubwireError::MalformedRequest {
            message: "missing field `uuid`".to_string(),
        };
        assert_eq!(error.to_string(), "Malformed request: missing field `uuid`");
    }

    #[test]
    fn test_unknown_asset_display_matches_wire_message() {
        // This exact string is sent to clients verbatim.
        let error = SubwireError::UnknownAsset;
        assert_eq!(error.to_string(), "Invalid UUID or asset not found.");
    }

    #[test]
    fn test_unsupported_request_type_display_matches_wire_message() {
        let error = SubwireError::UnsupportedRequestType;
        assert_eq!(error.to_string(), "Unsupported request type.");
    }

    #[test]
    fn test_source_unavailable_display() {
        let error = SubwireError::SourceUnavailable {
            message: "ffmpeg not found".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Audio source unavailable: ffmpeg not found"
        );
    }

    #[test]
    fn test_transcription_display() {
        let error = SubwireError::Transcription {
            message: "stream closed unexpectedly".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Transcription stream failed: stream closed unexpectedly"
        );
    }

    #[test]
    fn test_connection_display() {
        let error = SubwireError::Connection {
            message: "broken pipe".to_string(),
        };
        assert_eq!(error.to_string(), "Connection error: broken pipe");
    }

    #[test]
    fn test_config_file_not_found_display() {
        let error = SubwireError::ConfigFileNotFound {
            path: "/etc/subwire.toml".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Configuration file not found at /etc/subwire.toml"
        );
    }

    #[test]
    fn test_config_invalid_value_display() {
        let error = SubwireError::ConfigInvalidValue {
            key: "audio.chunk_size".to_string(),
            message: "must be positive".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Invalid configuration value for audio.chunk_size: must be positive"
        );
    }

    #[test]
    fn test_other_display() {
        let error = SubwireError::Other("unexpected error".to_string());
        assert_eq!(error.to_string(), "unexpected error");
    }

    #[test]
    fn test_from_io_error() {
        let io_error = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let error: SubwireError = io_error.into();
        assert!(error.to_string().contains("file not found"));
    }

    #[test]
    fn test_from_toml_error() {
        let toml_str = "invalid = toml = syntax";
        let toml_error = toml::from_str::<toml::Value>(toml_str).unwrap_err();
        let error: SubwireError = toml_error.into();
        assert!(error.to_string().contains("Configuration error"));
    }

    #[test]
    fn test_error_source_chain_io() {
        let io_error = io::Error::new(io::ErrorKind::PermissionDenied, "access denied");
        let error: SubwireError = io_error.into();

        let error_trait: &dyn std::error::Error = &error;
        assert!(error_trait.source().is_some());
    }

    #[test]
    fn test_error_is_send_and_sync() {
        fn assert_send<T: Send>() {}
        fn assert_sync<T: Sync>() {}

        assert_send::<SubwireError>();
        assert_sync::<SubwireError>();
    }

    #[test]
    fn test_result_type_alias() {
        fn returns_result() -> Result<i32> {
            Ok(42)
        }
        assert_eq!(returns_result().unwrap(), 42);

        fn returns_error() -> Result<i32> {
            Err(SubwireError::Other("test error".to_string()))
        }
        assert!(returns_error().is_err());
    }
}
