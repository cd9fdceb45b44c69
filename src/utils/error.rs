// src/utils/error.rs
use thiserror::Error;

// Define specific error types for different parts of the application
#[derive(Error, Debug)]
pub enum PortalError {
    #[error("Network request failed: {0}")]
    Network(#[from] reqwest::Error), // Automatically convert reqwest errors

    #[error("Not authorized or session redirect")]
    Unauthorized, // Upstream 301/302, or the login page came back instead of the schedule

    #[error("Upstream error {0}")]
    Upstream(reqwest::StatusCode), // Any other non-2xx from the portal

    #[error("Robot detection triggered by the portal")]
    RobotDetected,

    #[error("Invalid session credential: {0}")]
    InvalidCredential(String),

    #[error("Schedule page too large: {0} bytes")]
    TooLarge(usize),
}

/// The one fatal extraction failure: the input is not a schedule page.
/// Everything finer grained is defaulted or dropped inside the engine.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractError {
    #[error("Not a schedule page: {0}")]
    NotSchedulePage(String),
}

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error), // Automatically convert IO errors

    #[error("Portal interaction failed: {0}")]
    Portal(#[from] PortalError),

    #[error("Extraction failed: {0}")]
    Extraction(#[from] ExtractError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}
