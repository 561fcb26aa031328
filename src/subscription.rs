// Copyright (c) 2025 - Cowboy AI, Inc.
//! Subscription manager
//!
//! Registers the [`Dispatcher`] on every configured subject and keeps the
//! process listening. Each delivered message is dispatched on its own tokio
//! task, so messages on the same subject may overlap and complete in any
//! order.
//!
//! The manager has two states: [`ListenerState::Configuring`] until
//! registration finishes and [`ListenerState::Listening`] afterwards. There
//! is no way back; the listener runs until the process is terminated.

use futures::StreamExt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{error, warn};

use crate::dispatch::Dispatcher;
use crate::errors::{ConnectorError, ConnectorResult};
use crate::transport::MessageStream;

/// Lifecycle of a [`SubscriptionManager`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListenerState {
    /// Subscriptions not (yet) registered
    Configuring,
    /// Subscriptions registered; terminal
    Listening,
}

/// Wires subjects to the dispatcher
pub struct SubscriptionManager {
    dispatcher: Arc<Dispatcher>,
    subjects: Vec<String>,
    listening: AtomicBool,
}

impl SubscriptionManager {
    pub fn new(dispatcher: Arc<Dispatcher>, subjects: Vec<String>) -> Self {
        Self {
            dispatcher,
            subjects,
            listening: AtomicBool::new(false),
        }
    }

    pub fn subjects(&self) -> &[String] {
        &self.subjects
    }

    pub fn state(&self) -> ListenerState {
        if self.listening.load(Ordering::Acquire) {
            ListenerState::Listening
        } else {
            ListenerState::Configuring
        }
    }

    /// Register the dispatcher on every subject.
    ///
    /// Fails only when no subjects are configured. A subject whose
    /// subscription fails is reported to the observer and skipped; the
    /// others are still registered. Returns one handle per live
    /// subscription loop.
    pub async fn start(&self) -> ConnectorResult<Vec<JoinHandle<()>>> {
        if self.subjects.is_empty() {
            error!("No connectors configured, please specify connectors on env var CONNECTORS");
            return Err(ConnectorError::Configuration(
                "no connectors configured".to_string(),
            ));
        }

        let transport = Arc::clone(self.dispatcher.transport());
        let observer = Arc::clone(self.dispatcher.observer());
        let mut handles = Vec::with_capacity(self.subjects.len());

        for subject in &self.subjects {
            match transport.subscribe(subject).await {
                Ok(stream) => {
                    observer.subscribed(subject);
                    handles.push(self.spawn_listener(subject.clone(), stream));
                }
                Err(e) => observer.subscribe_failed(subject, &e),
            }
        }

        self.listening.store(true, Ordering::Release);
        Ok(handles)
    }

    fn spawn_listener(&self, subject: String, mut stream: MessageStream) -> JoinHandle<()> {
        let dispatcher = Arc::clone(&self.dispatcher);

        tokio::spawn(async move {
            while let Some(message) = stream.next().await {
                let dispatcher = Arc::clone(&dispatcher);
                tokio::spawn(async move {
                    dispatcher.dispatch(message).await;
                });
            }

            warn!(subject = %subject, "Subscription ended");
        })
    }

    /// Start and then listen until the process is terminated
    pub async fn run(&self) -> ConnectorResult<()> {
        let _handles = self.start().await?;
        std::future::pending::<()>().await;
        Ok(())
    }
}

