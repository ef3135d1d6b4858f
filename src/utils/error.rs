// src/utils/error.rs
use std::io;
use thiserror::Error;

/// Main error type for the mining application
///
/// This enum represents all possible error conditions that can occur
/// during mining operations, including hashing, network, protocol, and
/// configuration errors.
#[derive(Error, Debug)]
pub enum MinerError {
    /// Errors returned by the Argon2 keyed-hash capability
    ///
    /// Under fixed, validated cost parameters a hash failure is presumed
    /// to indicate corrupted state and is treated as fatal by the workers.
    #[error("Hash error: {0}")]
    HashError(#[from] argon2::Error),

    /// Published work carries a hash version outside the supported table
    ///
    /// Mining against an unknown version would silently produce garbage,
    /// so this propagates up to a global shutdown.
    #[error("Unsupported hash version: {0}")]
    UnsupportedVersion(i32),

    /// Seed material that does not decode to the expected length
    #[error("Invalid seed input: {0}")]
    SeedError(String),

    /// Errors in protocol handling or invalid protocol messages
    #[error("Protocol violation: {0}")]
    ProtocolError(String),

    /// Standard I/O operation errors
    #[error("I/O error: {0}")]
    IoError(#[from] io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// URL parsing errors
    #[error("URL parse error: {0}")]
    UrlError(#[from] url::ParseError),

    /// HTTP request/response errors
    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    /// Configuration file or parameter errors
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Invalid user input or parameter errors
    #[error("Invalid input: {0}")]
    InputError(String),
}

/// Converts hex decoding errors into MinerError
///
/// Used when invalid hex data is encountered during work-hash decoding
/// or target parsing. Wraps the original error in an `InputError` variant.
impl From<hex::FromHexError> for MinerError {
    fn from(e: hex::FromHexError) -> Self {
        MinerError::InputError(format!("Hex conversion failed: {}", e))
    }
}

impl MinerError {
    /// Whether this error must stop the whole process
    ///
    /// Fatal errors have no safe partial-degradation mode: continuing
    /// would mine garbage. Everything else is absorbed at the component
    /// boundary and surfaced as a log line.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            MinerError::HashError(_) | MinerError::UnsupportedVersion(_)
        )
    }

    /// Whether this error means the coordinator could not be reached
    ///
    /// Everything else coming out of a poll is a response that arrived
    /// but could not be used, which warrants a different log line than
    /// "not responding".
    pub fn is_transport(&self) -> bool {
        matches!(self, MinerError::HttpError(_) | MinerError::IoError(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transport_and_payload_errors_are_distinguished() {
        let transport = MinerError::IoError(io::Error::from(io::ErrorKind::ConnectionRefused));
        assert!(transport.is_transport());

        let payload = MinerError::ProtocolError("unrecognized version marker: 0x5".into());
        assert!(!payload.is_transport());
        assert!(!MinerError::InputError("invalid hex quantity: 0xzz".into()).is_transport());
    }
}
