// Copyright (c) 2025 - Cowboy AI, Inc.
//! In-process transport
//!
//! Routes published and delivered messages by exact subject match only; NATS
//! wildcards (`*`, `>`) are treated as literal subjects. Every successful
//! publish is recorded so callers can inspect what the dispatcher sent.

use async_trait::async_trait;
use bytes::Bytes;
use futures::StreamExt;
use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_stream::wrappers::UnboundedReceiverStream;
use tracing::debug;

use super::{InboundMessage, MessageStream, Transport};
use crate::errors::{ConnectorError, ConnectorResult};

/// A message recorded by [`InMemoryTransport::publish`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishedMessage {
    pub subject: String,
    pub payload: Bytes,
}

#[derive(Default)]
struct State {
    subscribers: HashMap<String, Vec<mpsc::UnboundedSender<InboundMessage>>>,
    published: Vec<PublishedMessage>,
    fail_publish: bool,
    failing_subscriptions: HashSet<String>,
}

/// Transport that never leaves the process
#[derive(Default)]
pub struct InMemoryTransport {
    state: Mutex<State>,
}

impl InMemoryTransport {
    /// Create an empty transport
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Make every following publish fail (or succeed again)
    pub fn fail_publishes(&self, fail: bool) {
        self.state().fail_publish = fail;
    }

    /// Make subscriptions to `subject` fail
    pub fn fail_subscription(&self, subject: impl Into<String>) {
        self.state().failing_subscriptions.insert(subject.into());
    }

    /// Deliver a message to every live subscriber of its subject.
    ///
    /// Returns the number of subscribers reached.
    pub fn deliver(&self, message: InboundMessage) -> usize {
        let mut state = self.state();
        let Some(senders) = state.subscribers.get_mut(&message.subject) else {
            return 0;
        };

        senders.retain(|sender| !sender.is_closed());
        let mut delivered = 0;
        for sender in senders.iter() {
            if sender.send(message.clone()).is_ok() {
                delivered += 1;
            }
        }
        delivered
    }

    /// Subjects with at least one live subscriber, sorted
    pub fn subscriptions(&self) -> Vec<String> {
        let state = self.state();
        let mut subjects: Vec<String> = state
            .subscribers
            .iter()
            .filter(|(_, senders)| senders.iter().any(|s| !s.is_closed()))
            .map(|(subject, _)| subject.clone())
            .collect();
        subjects.sort();
        subjects
    }

    /// Everything published so far, in publish order
    pub fn published(&self) -> Vec<PublishedMessage> {
        self.state().published.clone()
    }

    /// Wait until at least `count` messages were published or `timeout` elapses.
    ///
    /// Returns whatever was published by then.
    pub async fn wait_for_published(&self, count: usize, timeout: Duration) -> Vec<PublishedMessage> {
        let poll = async {
            while self.state().published.len() < count {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        };
        let _ = tokio::time::timeout(timeout, poll).await;
        self.published()
    }
}

#[async_trait]
impl Transport for InMemoryTransport {
    async fn publish(&self, subject: String, payload: Bytes) -> ConnectorResult<()> {
        let mut state = self.state();
        if state.fail_publish {
            return Err(ConnectorError::Transport(format!(
                "publish to {} rejected",
                subject
            )));
        }

        debug!(subject = %subject, payload_size = payload.len(), "Recorded in-memory publish");
        state.published.push(PublishedMessage { subject, payload });
        Ok(())
    }

    async fn subscribe(&self, subject: &str) -> ConnectorResult<MessageStream> {
        let mut state = self.state();
        if state.failing_subscriptions.contains(subject) {
            return Err(ConnectorError::Transport(format!(
                "subscription to {} rejected",
                subject
            )));
        }

        let (sender, receiver) = mpsc::unbounded_channel();
        state
            .subscribers
            .entry(subject.to_string())
            .or_default()
            .push(sender);

        Ok(UnboundedReceiverStream::new(receiver).boxed())
    }
}
