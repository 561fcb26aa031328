// Copyright (c) 2025 - Cowboy AI, Inc.
//! Subscription manager tests
//!
//! User Story: As an operator, I list subjects in `CONNECTORS` and the
//! connector listens on each of them, dispatching every delivered message
//! independently.
//!
//! ```mermaid
//! stateDiagram-v2
//!     [*] --> Configuring
//!     Configuring --> Listening: subscriptions registered
//!     Configuring --> [*]: no subjects configured
//! ```

mod support;

use pretty_assertions::assert_eq;
use std::time::Duration;

use cim_resource_connector::{
    ConnectorError, InboundMessage, ListenerState, SubscriptionManager,
};
use support::{Harness, SETTLE_TIMEOUT};

fn subjects(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

#[tokio::test]
async fn test_empty_subject_list_is_a_configuration_error() {
    // Given no configured subjects
    let harness = Harness::new();
    let manager = SubscriptionManager::new(harness.dispatcher.clone(), Vec::new());

    // When the manager starts
    let result = manager.start().await;

    // Then nothing is subscribed and the manager never listens
    assert!(matches!(result, Err(ConnectorError::Configuration(_))));
    assert_eq!(manager.state(), ListenerState::Configuring);
    assert!(harness.transport.subscriptions().is_empty());
    assert_eq!(harness.metrics.snapshot().subscriptions, 0);
}

#[tokio::test]
async fn test_run_returns_on_empty_subject_list() {
    let harness = Harness::new();
    let manager = SubscriptionManager::new(harness.dispatcher.clone(), Vec::new());

    let result = tokio::time::timeout(Duration::from_secs(1), manager.run()).await;

    assert!(matches!(result, Ok(Err(ConnectorError::Configuration(_)))));
}

#[tokio::test]
async fn test_run_keeps_listening() {
    // Given one configured subject
    let harness = Harness::new();
    let manager = SubscriptionManager::new(
        harness.dispatcher.clone(),
        subjects(&["network.create"]),
    );

    // When run is polled
    let mut run = tokio_test::task::spawn(manager.run());
    tokio_test::assert_pending!(run.poll());

    // Then the subscription is registered and run never completes
    assert_eq!(harness.transport.subscriptions(), subjects(&["network.create"]));
    assert_eq!(manager.state(), ListenerState::Listening);
    tokio_test::assert_pending!(run.poll());
}

#[tokio::test]
async fn test_every_subject_is_registered() {
    let harness = Harness::new();
    let manager = SubscriptionManager::new(
        harness.dispatcher.clone(),
        subjects(&["network.create", "instance.create", "vpc.delete"]),
    );

    let handles = manager.start().await.unwrap();

    assert_eq!(handles.len(), 3);
    assert_eq!(manager.state(), ListenerState::Listening);
    assert_eq!(
        harness.transport.subscriptions(),
        subjects(&["instance.create", "network.create", "vpc.delete"])
    );
    assert_eq!(harness.metrics.snapshot().subscriptions, 3);
}

#[tokio::test]
async fn test_failed_subscription_does_not_abort_others() {
    // Given one subject the broker refuses
    let harness = Harness::new();
    harness.transport.fail_subscription("firewall.create");
    let manager = SubscriptionManager::new(
        harness.dispatcher.clone(),
        subjects(&["network.create", "firewall.create", "s3.create"]),
    );

    // When the manager starts
    let handles = manager.start().await.unwrap();

    // Then the remaining subjects still listen
    assert_eq!(handles.len(), 2);
    assert_eq!(manager.state(), ListenerState::Listening);
    let snapshot = harness.metrics.snapshot();
    assert_eq!(snapshot.subscriptions, 2);
    assert_eq!(snapshot.subscribe_failures, 1);

    harness
        .transport
        .deliver(InboundMessage::new("s3.create", "{}"));
    let published = harness.transport.wait_for_published(1, SETTLE_TIMEOUT).await;
    assert_eq!(published[0].subject, "s3.create.done");
}

#[tokio::test]
async fn test_delivered_messages_are_dispatched() {
    let harness = Harness::new();
    let manager = SubscriptionManager::new(
        harness.dispatcher.clone(),
        subjects(&["instance.create", "vpc.delete"]),
    );
    manager.start().await.unwrap();

    harness
        .transport
        .deliver(InboundMessage::new("instance.create", r#"{"expects_response": false}"#));
    harness.transport.deliver(
        InboundMessage::new("vpc.delete", r#"{"expects_response": true}"#).with_reply("reply.abc123"),
    );

    let mut published: Vec<String> = harness
        .transport
        .wait_for_published(2, SETTLE_TIMEOUT)
        .await
        .into_iter()
        .map(|m| m.subject)
        .collect();
    published.sort();

    assert_eq!(published, subjects(&["instance.create.done", "reply.abc123"]));
}

#[tokio::test]
async fn test_listener_survives_bad_messages() {
    // Given a listener whose transport fails the first publish
    let harness = Harness::new();
    let manager =
        SubscriptionManager::new(harness.dispatcher.clone(), subjects(&["nat.create", "nat.bogus"]));
    let handles = manager.start().await.unwrap();

    harness.transport.fail_publishes(true);
    harness
        .transport
        .deliver(InboundMessage::new("nat.create", "{}"));
    wait_until(|| harness.metrics.snapshot().publish_failures == 1).await;

    // When publishing recovers
    harness.transport.fail_publishes(false);
    harness
        .transport
        .deliver(InboundMessage::new("nat.create", "{}"));

    // Then the same subscription keeps dispatching
    let published = harness.transport.wait_for_published(1, SETTLE_TIMEOUT).await;
    assert_eq!(published.len(), 1);
    assert!(handles.iter().all(|h| !h.is_finished()));
}

#[tokio::test]
async fn test_concurrent_messages_on_one_subject() {
    let harness = Harness::new();
    let manager = SubscriptionManager::new(harness.dispatcher.clone(), subjects(&["instances.get"]));
    manager.start().await.unwrap();

    for _ in 0..50 {
        harness
            .transport
            .deliver(InboundMessage::new("instances.get", "{}"));
    }

    let published = harness.transport.wait_for_published(50, SETTLE_TIMEOUT).await;
    assert_eq!(published.len(), 50);
    assert!(published.iter().all(|m| m.subject == "instances.get.done"));
    assert_eq!(harness.constructions(), 50);
}

#[tokio::test]
async fn test_unrecognized_subject_via_subscription() {
    let harness = Harness::new();
    let manager =
        SubscriptionManager::new(harness.dispatcher.clone(), subjects(&["unknown_type.create"]));
    manager.start().await.unwrap();

    harness
        .transport
        .deliver(InboundMessage::new("unknown_type.create", "{}"));
    wait_until(|| harness.metrics.snapshot().unrecognized == 1).await;

    assert!(harness.transport.published().is_empty());
}

async fn wait_until<F: Fn() -> bool>(condition: F) {
    let poll = async {
        while !condition() {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    };
    tokio::time::timeout(SETTLE_TIMEOUT, poll)
        .await
        .expect("condition not met in time");
}

