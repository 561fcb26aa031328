// Copyright (c) 2025 - Cowboy AI, Inc.
//! Resource lifecycle handling
//!
//! Resource handlers share one shape: decode the payload, run the action
//! named by the subject's second token, and answer on `<subject>.done` or
//! `<subject>.error` with the (possibly annotated) resource body.
//! [`ResourceHandler`] captures the resource-specific parts and
//! [`Lifecycle`] turns any handler into an [`Event`].
//!
//! ```text
//! instance.create  ──process──> create() ──ok──>  instance.create.done
//!                                  └──────err──>  instance.create.error
//! ```

use async_trait::async_trait;
use bytes::Bytes;
use serde_json::{Map, Value};
use std::sync::Arc;
use thiserror::Error;
use tracing::warn;

use crate::event::{constructor, Event, EventConstructor, EventRequest, Response};
use crate::resources::ResourceKind;
use crate::subjects::{completion_subject, Action, Outcome};

/// Body field carrying the failure reason on error responses
pub const ERROR_MESSAGE_FIELD: &str = "error_message";

/// Errors raised while handling a resource action
#[derive(Debug, Error)]
pub enum HandlerError {
    /// Payload could not be decoded or decrypted
    #[error("Decode error: {0}")]
    Decode(String),

    /// Subject names no known action
    #[error("Unknown action in subject '{0}'")]
    UnknownAction(String),

    /// The handler does not implement the action
    #[error("{resource} does not support '{action}'")]
    Unsupported { resource: String, action: Action },

    /// The provider call failed
    #[error("Provider error: {0}")]
    Provider(String),
}

impl From<serde_json::Error> for HandlerError {
    fn from(err: serde_json::Error) -> Self {
        HandlerError::Decode(err.to_string())
    }
}

/// Resource-specific half of a lifecycle event
#[async_trait]
pub trait ResourceHandler: Send {
    /// Inbound subject
    fn subject(&self) -> &str;

    /// Resource name used in error messages
    fn resource(&self) -> &str;

    /// Decode (and decrypt) the payload
    fn process(&mut self) -> Result<(), HandlerError>;

    /// Run `action`; defaults to the per-action methods below
    async fn perform(&mut self, action: Action) -> Result<(), HandlerError> {
        match action {
            Action::Create => self.create().await,
            Action::Update => self.update().await,
            Action::Delete => self.delete().await,
            Action::Get => self.get().await,
            Action::Find => self.find().await,
        }
    }

    async fn create(&mut self) -> Result<(), HandlerError> {
        Err(self.unsupported(Action::Create))
    }

    async fn update(&mut self) -> Result<(), HandlerError> {
        Err(self.unsupported(Action::Update))
    }

    async fn delete(&mut self) -> Result<(), HandlerError> {
        Err(self.unsupported(Action::Delete))
    }

    async fn get(&mut self) -> Result<(), HandlerError> {
        Err(self.unsupported(Action::Get))
    }

    async fn find(&mut self) -> Result<(), HandlerError> {
        Err(self.unsupported(Action::Find))
    }

    /// Record a failure so that [`ResourceHandler::body`] reports it
    fn set_error(&mut self, error: &HandlerError);

    /// Response payload
    fn body(&self) -> Bytes;

    fn unsupported(&self, action: Action) -> HandlerError {
        HandlerError::Unsupported {
            resource: self.resource().to_string(),
            action,
        }
    }
}

/// Adapts a [`ResourceHandler`] to the [`Event`] contract
pub struct Lifecycle<H> {
    handler: H,
}

impl<H: ResourceHandler> Lifecycle<H> {
    pub fn new(handler: H) -> Self {
        Self { handler }
    }

    pub fn handler(&self) -> &H {
        &self.handler
    }

    async fn run(&mut self) -> Result<(), HandlerError> {
        self.handler.process()?;

        let action = Action::from_subject(self.handler.subject())
            .ok_or_else(|| HandlerError::UnknownAction(self.handler.subject().to_string()))?;

        self.handler.perform(action).await
    }
}

#[async_trait]
impl<H: ResourceHandler> Event for Lifecycle<H> {
    async fn handle(&mut self) -> Response {
        let outcome = match self.run().await {
            Ok(()) => Outcome::Done,
            Err(e) => {
                warn!(subject = %self.handler.subject(), error = %e, "Resource action failed");
                self.handler.set_error(&e);
                Outcome::Error
            }
        };

        Response::new(
            completion_subject(self.handler.subject(), outcome),
            self.handler.body(),
        )
    }
}

/// Constructor building a [`Lifecycle`] event from a handler factory
pub fn lifecycle<H, F>(build: F) -> Arc<dyn EventConstructor>
where
    H: ResourceHandler + 'static,
    F: Fn(EventRequest<'_>) -> Option<H> + Send + Sync + 'static,
{
    constructor(move |request| {
        build(request).map(|handler| Box::new(Lifecycle::new(handler)) as Box<dyn Event>)
    })
}

/// Handler for resource kinds with no provider linked into the binary.
///
/// Decodes the JSON body and answers every action on the error subject,
/// echoing the body with an `error_message`.
pub struct PendingProvider {
    kind: ResourceKind,
    subject: String,
    raw: Bytes,
    body: Map<String, Value>,
}

impl PendingProvider {
    pub fn new(kind: ResourceKind, request: EventRequest<'_>) -> Self {
        Self {
            kind,
            subject: request.subject.to_string(),
            raw: request.payload.clone(),
            body: Map::new(),
        }
    }

    /// Constructor registering [`PendingProvider`] for `kind`
    pub fn constructor(kind: ResourceKind) -> Arc<dyn EventConstructor> {
        lifecycle(move |request| Some(PendingProvider::new(kind, request)))
    }
}

#[async_trait]
impl ResourceHandler for PendingProvider {
    fn subject(&self) -> &str {
        &self.subject
    }

    fn resource(&self) -> &str {
        self.kind.as_str()
    }

    fn process(&mut self) -> Result<(), HandlerError> {
        match serde_json::from_slice::<Value>(&self.raw)? {
            Value::Object(body) => {
                self.body = body;
                Ok(())
            }
            _ => Err(HandlerError::Decode("payload is not a JSON object".to_string())),
        }
    }

    async fn perform(&mut self, action: Action) -> Result<(), HandlerError> {
        Err(HandlerError::Provider(format!(
            "no provider linked for {} ({})",
            self.kind.display_name(),
            action
        )))
    }

    fn set_error(&mut self, error: &HandlerError) {
        self.body
            .insert(ERROR_MESSAGE_FIELD.to_string(), Value::String(error.to_string()));
    }

    fn body(&self) -> Bytes {
        serde_json::to_vec(&self.body)
            .map(Bytes::from)
            .unwrap_or_default()
    }
}
