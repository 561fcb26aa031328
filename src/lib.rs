// Copyright (c) 2025 - Cowboy AI, Inc.
//! Resource connector for the Composable Information Machine
//!
//! Listens on NATS subjects named `{resource}.{action}`, builds the event
//! registered for the resource, runs it and publishes the result, either on
//! the subject the event computed or on the inbound reply address when the
//! caller asked for a response.
//!
//! ```text
//! SubscriptionManager ──> Dispatcher ──> EventFactory ──> RoutingTable
//!                              │               └──> Event::handle
//!                              └──> Transport::publish
//! ```

pub mod config;
pub mod dispatch;
pub mod errors;
pub mod event;
pub mod factory;
pub mod lifecycle;
pub mod nats;
pub mod observer;
pub mod resources;
pub mod router;
pub mod subjects;
pub mod subscription;
pub mod transport;

// Re-export commonly used types
pub use config::{ConnectorConfig, CryptoKey};
pub use dispatch::{expects_response, DispatchOutcome, Dispatcher, DispatcherBuilder};
pub use errors::{ConnectorError, ConnectorResult};
pub use event::{constructor, Event, EventConstructor, EventRequest, Response};
pub use factory::{EventFactory, RoutedEvent};
pub use lifecycle::{lifecycle, HandlerError, Lifecycle, PendingProvider, ResourceHandler};
pub use nats::{NatsClient, NatsConfig};
pub use observer::{DispatchMetrics, DispatchObserver, MetricsSnapshot, TracingObserver};
pub use resources::ResourceKind;
pub use router::{Route, RoutingTable, RoutingTableBuilder};
pub use subscription::{ListenerState, SubscriptionManager};
pub use transport::{InMemoryTransport, InboundMessage, MessageStream, PublishedMessage, Transport};
