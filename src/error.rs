//! Error types for Huntr
//!
//! Centralized error handling using thiserror.

use thiserror::Error;

/// All error types that can occur in Huntr
#[derive(Debug, Error)]
pub enum HuntError {
    /// Every network-backed signal source failed for a candidate
    #[error("No signal source reachable for {0}")]
    AllSourcesDown(String),

    /// A probe transport failed (timeout, connect error, bad status)
    #[error("Probe error: {0}")]
    Probe(String),

    /// A domain name could not be split into label and TLD
    #[error("Invalid domain name: {0}")]
    InvalidDomain(String),

    /// Storage/persistence error
    #[error("Storage error: {0}")]
    Storage(String),

    /// HTTP client error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for Huntr operations
pub type Result<T> = std::result::Result<T, HuntError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_sources_down_error() {
        let err = HuntError::AllSourcesDown("abc.io".to_string());
        assert_eq!(err.to_string(), "No signal source reachable for abc.io");
    }

    #[test]
    fn test_probe_error() {
        let err = HuntError::Probe("status 503".to_string());
        assert_eq!(err.to_string(), "Probe error: status 503");
    }

    #[test]
    fn test_invalid_domain_error() {
        let err = HuntError::InvalidDomain("nodot".to_string());
        assert_eq!(err.to_string(), "Invalid domain name: nodot");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: HuntError = io_err.into();
        assert!(matches!(err, HuntError::Io(_)));
        assert!(err.to_string().contains("file not found"));
    }

    #[test]
    fn test_json_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("invalid").unwrap_err();
        let err: HuntError = json_err.into();
        assert!(matches!(err, HuntError::Json(_)));
    }

    #[test]
    fn test_result_type_alias() {
        fn returns_ok() -> Result<i32> {
            Ok(42)
        }

        fn returns_err() -> Result<i32> {
            Err(HuntError::Storage("disk full".to_string()))
        }

        assert!(returns_ok().is_ok());
        assert!(returns_err().is_err());
    }
}
