// Copyright (c) 2025 - Cowboy AI, Inc.
//! Event factory
//!
//! Turns `(subject, payload)` into a ready-to-handle [`Event`] using the
//! routing table and the process-wide decryption key. The payload is not
//! validated here; decode and decrypt failures surface when the event is
//! handled.

use bytes::Bytes;
use std::fmt;
use std::sync::Arc;

use crate::config::CryptoKey;
use crate::event::{Event, EventRequest, Response};
use crate::router::RoutingTable;

/// An event together with the variant that built it
pub struct RoutedEvent {
    variant: String,
    event: Box<dyn Event>,
}

impl RoutedEvent {
    /// Variant name of the route that matched
    pub fn variant(&self) -> &str {
        &self.variant
    }

    /// Run the event
    pub async fn handle(&mut self) -> Response {
        self.event.handle().await
    }

    pub fn into_inner(self) -> Box<dyn Event> {
        self.event
    }
}

impl fmt::Debug for RoutedEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RoutedEvent")
            .field("variant", &self.variant)
            .finish_non_exhaustive()
    }
}

/// Builds events from raw messages
#[derive(Debug, Clone)]
pub struct EventFactory {
    routes: Arc<RoutingTable>,
    key: Option<CryptoKey>,
}

impl EventFactory {
    pub fn new(routes: Arc<RoutingTable>, key: Option<CryptoKey>) -> Self {
        Self { routes, key }
    }

    pub fn routes(&self) -> &RoutingTable {
        &self.routes
    }

    /// Whether constructors receive a decryption key
    pub fn has_key(&self) -> bool {
        self.key.is_some()
    }

    /// Build the event for a message.
    ///
    /// `None` when no route matches the subject or the matched constructor
    /// declines the message.
    pub fn build(&self, subject: &str, payload: &Bytes) -> Option<RoutedEvent> {
        let route = self.routes.route(subject)?;
        let request = EventRequest {
            subject,
            payload,
            key: self.key.as_ref(),
        };

        route
            .constructor()
            .construct(request)
            .map(|event| RoutedEvent {
                variant: route.variant().to_string(),
                event,
            })
    }
}
