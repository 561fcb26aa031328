// Copyright (c) 2025 - Cowboy AI, Inc.
//! Events: the per-message unit of work
//!
//! An [`Event`] is built from one inbound message by the [`EventConstructor`]
//! registered for the message's resource tag. Once built it owns everything
//! it needs; the dispatcher never looks at the raw message again and only
//! ever calls [`Event::handle`].

use async_trait::async_trait;
use bytes::Bytes;
use std::sync::Arc;

use crate::config::CryptoKey;

/// Subject and payload an event wants published
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub subject: String,
    pub payload: Bytes,
}

impl Response {
    pub fn new(subject: impl Into<String>, payload: impl Into<Bytes>) -> Self {
        Self {
            subject: subject.into(),
            payload: payload.into(),
        }
    }
}

/// Inputs handed to an event constructor
#[derive(Debug, Clone, Copy)]
pub struct EventRequest<'a> {
    /// Full inbound subject
    pub subject: &'a str,
    /// Raw payload, not yet decoded or decrypted
    pub payload: &'a Bytes,
    /// Process-wide decryption key, when the deployment has one
    pub key: Option<&'a CryptoKey>,
}

/// A resource-specific unit of work
#[async_trait]
pub trait Event: Send {
    /// Perform the resource action and produce the response to publish.
    ///
    /// Failures are reported through the response (usually on an error
    /// subject), never by panicking.
    async fn handle(&mut self) -> Response;
}

/// Builds an [`Event`] for a routed message.
///
/// Returning `None` means the handler declines the message; the dispatcher
/// treats that like an unknown subject.
pub trait EventConstructor: Send + Sync {
    fn construct(&self, request: EventRequest<'_>) -> Option<Box<dyn Event>>;
}

impl<F> EventConstructor for F
where
    F: Fn(EventRequest<'_>) -> Option<Box<dyn Event>> + Send + Sync,
{
    fn construct(&self, request: EventRequest<'_>) -> Option<Box<dyn Event>> {
        self(request)
    }
}

/// Wrap a closure as a shareable constructor
pub fn constructor<F>(f: F) -> Arc<dyn EventConstructor>
where
    F: Fn(EventRequest<'_>) -> Option<Box<dyn Event>> + Send + Sync + 'static,
{
    Arc::new(f)
}
