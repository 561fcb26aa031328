// Copyright (c) 2025 - Cowboy AI, Inc.
//! Test fixtures for cim-resource-connector
//!
//! Events here are deterministic: each answers on `<subject>.done` with a
//! payload naming the variant that built it, so tests can tell which
//! constructor ran.

#![allow(dead_code)]

use async_trait::async_trait;
use bytes::Bytes;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use cim_resource_connector::{
    constructor, DispatchMetrics, Dispatcher, Event, EventConstructor, InMemoryTransport,
    ResourceKind, Response, RoutingTable,
};

/// How long tests wait for asynchronous dispatches
pub const SETTLE_TIMEOUT: Duration = Duration::from_secs(2);

/// Event answering `<subject>.done` with `{"variant": ..., "keyed": ...}`
pub struct EchoEvent {
    subject: String,
    variant: &'static str,
    keyed: bool,
}

#[async_trait]
impl Event for EchoEvent {
    async fn handle(&mut self) -> Response {
        let body = serde_json::json!({ "variant": self.variant, "keyed": self.keyed });
        Response::new(format!("{}.done", self.subject), body.to_string())
    }
}

/// Constructor for [`EchoEvent`] that counts how often it ran
pub fn echo(variant: &'static str, calls: Arc<AtomicUsize>) -> Arc<dyn EventConstructor> {
    constructor(move |request| {
        calls.fetch_add(1, Ordering::SeqCst);
        Some(Box::new(EchoEvent {
            subject: request.subject.to_string(),
            variant,
            keyed: request.key.is_some(),
        }))
    })
}

/// Routing table with an [`EchoEvent`] for every resource kind
pub fn echo_routes(calls: Arc<AtomicUsize>) -> RoutingTable {
    RoutingTable::builder()
        .resources(ResourceKind::ALL, |kind| echo(kind.as_str(), Arc::clone(&calls)))
        .build()
        .expect("echo routing table")
}

/// Dispatcher over an in-memory transport with counting metrics
pub struct Harness {
    pub transport: Arc<InMemoryTransport>,
    pub metrics: Arc<DispatchMetrics>,
    pub constructions: Arc<AtomicUsize>,
    pub dispatcher: Arc<Dispatcher>,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_redirection(true)
    }

    pub fn with_redirection(reply_redirection: bool) -> Self {
        let transport = Arc::new(InMemoryTransport::new());
        let metrics = Arc::new(DispatchMetrics::new());
        let constructions = Arc::new(AtomicUsize::new(0));

        let dispatcher = Dispatcher::builder()
            .routes(echo_routes(Arc::clone(&constructions)))
            .transport(transport.clone())
            .observer(metrics.clone())
            .reply_redirection(reply_redirection)
            .build()
            .expect("dispatcher");

        Self {
            transport,
            metrics,
            constructions,
            dispatcher: Arc::new(dispatcher),
        }
    }

    pub fn constructions(&self) -> usize {
        self.constructions.load(Ordering::SeqCst)
    }
}

/// Decode a published payload as JSON
pub fn json(payload: &Bytes) -> serde_json::Value {
    serde_json::from_slice(payload).expect("published payload is JSON")
}
