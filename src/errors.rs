// Copyright (c) 2025 - Cowboy AI, Inc.
//! Error types for connector operations

use thiserror::Error;

/// Errors that can occur while connecting, subscribing or publishing
#[derive(Debug, Error)]
pub enum ConnectorError {
    /// NATS connection error
    #[error("NATS connection error: {0}")]
    NatsConnection(String),

    /// NATS publish error
    #[error("NATS publish error: {0}")]
    NatsPublish(String),

    /// NATS subscribe error
    #[error("NATS subscribe error: {0}")]
    NatsSubscribe(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Non-NATS transport failure (in-memory transport, closed channels)
    #[error("Transport error: {0}")]
    Transport(String),
}

/// Result type for connector operations
pub type ConnectorResult<T> = Result<T, ConnectorError>;
