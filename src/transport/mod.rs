// Copyright (c) 2025 - Cowboy AI, Inc.
//! Publish/subscribe transport abstraction
//!
//! The dispatcher only needs two operations from the broker: publish a
//! payload to a subject and receive a stream of messages for a subject.
//! [`crate::nats::NatsClient`] provides them over NATS,
//! [`memory::InMemoryTransport`] provides them in-process.
//!
//! Implementations are shared across every concurrently running dispatch
//! and must accept concurrent `publish` calls without outside locking.

pub mod memory;

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::BoxStream;

use crate::errors::ConnectorResult;

pub use memory::{InMemoryTransport, PublishedMessage};

/// A message delivered by the transport. Read-only once received.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
    /// Dot-delimited subject; the first token is the resource tag
    pub subject: String,
    /// Opaque payload, conventionally JSON and possibly encrypted
    pub payload: Bytes,
    /// Reply address for request/reply sends
    pub reply_to: Option<String>,
}

impl InboundMessage {
    /// Create a fire-and-forget message
    pub fn new(subject: impl Into<String>, payload: impl Into<Bytes>) -> Self {
        Self {
            subject: subject.into(),
            payload: payload.into(),
            reply_to: None,
        }
    }

    /// Attach a reply address
    pub fn with_reply(mut self, reply_to: impl Into<String>) -> Self {
        self.reply_to = Some(reply_to.into());
        self
    }
}

impl From<async_nats::Message> for InboundMessage {
    fn from(message: async_nats::Message) -> Self {
        Self {
            subject: message.subject.to_string(),
            payload: message.payload,
            reply_to: message.reply.map(|reply| reply.to_string()),
        }
    }
}

/// Stream of messages for one subscription
pub type MessageStream = BoxStream<'static, InboundMessage>;

/// Broker operations used by the dispatcher and subscription manager
#[async_trait]
pub trait Transport: Send + Sync {
    /// Publish a raw payload to a subject
    async fn publish(&self, subject: String, payload: Bytes) -> ConnectorResult<()>;

    /// Subscribe to a subject (wildcards are transport-specific)
    async fn subscribe(&self, subject: &str) -> ConnectorResult<MessageStream>;
}
