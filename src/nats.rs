//! NATS transport for the connector

use async_nats::{Client, ConnectOptions};
use async_trait::async_trait;
use bytes::Bytes;
use futures::StreamExt;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::errors::{ConnectorError, ConnectorResult};
use crate::transport::{InboundMessage, MessageStream, Transport};

/// Configuration for NATS connection
#[derive(Debug, Clone)]
pub struct NatsConfig {
    /// NATS server URLs
    pub servers: Vec<String>,
    /// Client name
    pub name: String,
    /// Connection timeout
    pub connect_timeout: Duration,
    /// Request timeout
    pub request_timeout: Duration,
    /// Initial connection attempts before giving up
    pub connect_attempts: u32,
    /// Delay between attempts, multiplied by the attempt number
    pub retry_backoff: Duration,
}

impl Default for NatsConfig {
    fn default() -> Self {
        Self {
            servers: vec!["nats://localhost:4222".to_string()],
            name: "cim-client".to_string(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(5),
            connect_attempts: 5,
            retry_backoff: Duration::from_secs(1),
        }
    }
}

/// NATS client wrapper implementing [`Transport`]
#[derive(Clone)]
pub struct NatsClient {
    client: Client,
}

impl NatsClient {
    /// Connect with the given configuration, retrying the initial connection
    pub async fn new(config: NatsConfig) -> ConnectorResult<Self> {
        let attempts = config.connect_attempts.max(1);
        let mut attempt = 1;

        loop {
            match Self::connect_once(&config).await {
                Ok(client) => {
                    info!(servers = ?config.servers, name = %config.name, "Connected to NATS");
                    return Ok(Self { client });
                }
                Err(e) if attempt < attempts => {
                    warn!(
                        attempt = attempt,
                        max_attempts = attempts,
                        error = %e,
                        "NATS connection failed, retrying"
                    );
                    tokio::time::sleep(config.retry_backoff * attempt).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn connect_once(config: &NatsConfig) -> ConnectorResult<Client> {
        let connect_options = ConnectOptions::new()
            .name(&config.name)
            .connection_timeout(config.connect_timeout)
            .request_timeout(Some(config.request_timeout));

        async_nats::connect_with_options(config.servers.join(","), connect_options)
            .await
            .map_err(|e| ConnectorError::NatsConnection(e.to_string()))
    }

    /// Wrap an already connected client
    pub fn from_client(client: Client) -> Self {
        Self { client }
    }

    /// Get the underlying NATS client for advanced operations
    pub fn inner(&self) -> &Client {
        &self.client
    }
}

#[async_trait]
impl Transport for NatsClient {
    async fn publish(&self, subject: String, payload: Bytes) -> ConnectorResult<()> {
        let size = payload.len();
        self.client
            .publish(subject.clone(), payload)
            .await
            .map_err(|e| ConnectorError::NatsPublish(e.to_string()))?;

        debug!(subject = %subject, payload_size = size, "Published message");
        Ok(())
    }

    async fn subscribe(&self, subject: &str) -> ConnectorResult<MessageStream> {
        let subscriber = self
            .client
            .subscribe(subject.to_string())
            .await
            .map_err(|e| ConnectorError::NatsSubscribe(e.to_string()))?;

        debug!(subject = %subject, "Subscribed to subject");
        Ok(subscriber.map(InboundMessage::from).boxed())
    }
}
