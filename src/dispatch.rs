// Copyright (c) 2025 - Cowboy AI, Inc.
//! Dispatch handler
//!
//! Drives one inbound message through the connector:
//!
//! ```text
//! InboundMessage
//!     ↓
//! EventFactory::build ──(no route)──> observer.unrecognized, stop
//!     ↓
//! Event::handle → Response
//!     ↓
//! reply redirection (expects_response + reply address)
//!     ↓
//! Transport::publish ──(error)──> observer.publish_failed, stop
//! ```
//!
//! Nothing in here returns an error to the caller: one bad message must not
//! stop the subscription loop that delivered it.

use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, debug_span, Instrument};
use uuid::Uuid;

use crate::config::CryptoKey;
use crate::errors::{ConnectorError, ConnectorResult};
use crate::factory::EventFactory;
use crate::observer::{DispatchObserver, TracingObserver};
use crate::router::RoutingTable;
use crate::transport::{InboundMessage, Transport};

/// Payload field asking for the answer on the reply address
pub const EXPECTS_RESPONSE_FIELD: &str = "expects_response";

/// Read `expects_response` from a payload.
///
/// Anything other than a JSON object whose field is the boolean `true`
/// counts as `false`.
pub fn expects_response(payload: &[u8]) -> bool {
    serde_json::from_slice::<Value>(payload)
        .ok()
        .and_then(|value| value.get(EXPECTS_RESPONSE_FIELD).and_then(Value::as_bool))
        .unwrap_or(false)
}

/// What happened to one message
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// No event for the subject; nothing was published
    Unrecognized,
    /// The response went out on `subject`
    Published { subject: String, redirected: bool },
    /// The transport refused the response
    PublishFailed { subject: String },
}

/// Dispatches inbound messages to events and publishes their responses
pub struct Dispatcher {
    factory: EventFactory,
    transport: Arc<dyn Transport>,
    observer: Arc<dyn DispatchObserver>,
    reply_redirection: bool,
}

impl fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("factory", &self.factory)
            .field("reply_redirection", &self.reply_redirection)
            .finish_non_exhaustive()
    }
}

impl Dispatcher {
    pub fn builder() -> DispatcherBuilder {
        DispatcherBuilder::new()
    }

    pub fn factory(&self) -> &EventFactory {
        &self.factory
    }

    pub fn transport(&self) -> &Arc<dyn Transport> {
        &self.transport
    }

    pub fn observer(&self) -> &Arc<dyn DispatchObserver> {
        &self.observer
    }

    pub fn reply_redirection(&self) -> bool {
        self.reply_redirection
    }

    /// Dispatch one message to completion
    pub async fn dispatch(&self, message: InboundMessage) -> DispatchOutcome {
        let span = debug_span!(
            "dispatch",
            dispatch_id = %Uuid::now_v7(),
            subject = %message.subject
        );

        self.dispatch_inner(message).instrument(span).await
    }

    async fn dispatch_inner(&self, message: InboundMessage) -> DispatchOutcome {
        let Some(mut event) = self.factory.build(&message.subject, &message.payload) else {
            self.observer.unrecognized(&message.subject);
            return DispatchOutcome::Unrecognized;
        };

        debug!(variant = %event.variant(), "Handling event");
        let response = event.handle().await;

        let (subject, redirected) = match self.reply_address(&message) {
            Some(reply) => (reply.to_string(), true),
            None => (response.subject, false),
        };

        match self.transport.publish(subject.clone(), response.payload).await {
            Ok(()) => {
                self.observer.published(&subject, redirected);
                DispatchOutcome::Published { subject, redirected }
            }
            Err(e) => {
                self.observer.publish_failed(&subject, &e);
                DispatchOutcome::PublishFailed { subject }
            }
        }
    }

    fn reply_address<'m>(&self, message: &'m InboundMessage) -> Option<&'m str> {
        if !self.reply_redirection {
            return None;
        }

        message
            .reply_to
            .as_deref()
            .filter(|reply| !reply.is_empty())
            .filter(|_| expects_response(&message.payload))
    }
}

/// Builder for [`Dispatcher`]
pub struct DispatcherBuilder {
    routes: Option<Arc<RoutingTable>>,
    transport: Option<Arc<dyn Transport>>,
    observer: Option<Arc<dyn DispatchObserver>>,
    crypto_key: Option<CryptoKey>,
    reply_redirection: bool,
}

impl DispatcherBuilder {
    pub fn new() -> Self {
        Self {
            routes: None,
            transport: None,
            observer: None,
            crypto_key: None,
            reply_redirection: true,
        }
    }

    /// Set the routing table
    pub fn routes(mut self, routes: impl Into<Arc<RoutingTable>>) -> Self {
        self.routes = Some(routes.into());
        self
    }

    /// Set the transport responses are published on
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Set the observer; defaults to [`TracingObserver`]
    pub fn observer(mut self, observer: Arc<dyn DispatchObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Set the key handed to event constructors
    pub fn crypto_key(mut self, key: Option<CryptoKey>) -> Self {
        self.crypto_key = key;
        self
    }

    /// Enable or disable reply redirection (enabled by default)
    pub fn reply_redirection(mut self, enabled: bool) -> Self {
        self.reply_redirection = enabled;
        self
    }

    pub fn build(self) -> ConnectorResult<Dispatcher> {
        let routes = self
            .routes
            .ok_or_else(|| ConnectorError::Configuration("routing table not set".to_string()))?;

        let transport = self
            .transport
            .ok_or_else(|| ConnectorError::Configuration("transport not set".to_string()))?;

        Ok(Dispatcher {
            factory: EventFactory::new(routes, self.crypto_key),
            transport,
            observer: self.observer.unwrap_or_else(|| Arc::new(TracingObserver)),
            reply_redirection: self.reply_redirection,
        })
    }
}

impl Default for DispatcherBuilder {
    fn default() -> Self {
        Self::new()
    }
}
