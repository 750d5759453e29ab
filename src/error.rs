//! Error types for NimbusKV
//!
//! Provides a unified error type for all operations.

use thiserror::Error;

/// Result type alias using NimbusError
pub type Result<T> = std::result::Result<T, NimbusError>;

/// Unified error type for NimbusKV operations
#[derive(Debug, Error)]
pub enum NimbusError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Protocol Errors
    // -------------------------------------------------------------------------
    #[error("Protocol error: {0}")]
    Protocol(String),

    // -------------------------------------------------------------------------
    // Persistence Errors
    // -------------------------------------------------------------------------
    #[error("Log replay failed: {0}")]
    Replay(String),

    #[error("Snapshot error: {0}")]
    Snapshot(String),

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}
