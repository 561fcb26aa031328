// Copyright (c) 2025 - Cowboy AI, Inc.
//! Dispatch observers
//!
//! Per-message failures never escape the dispatcher; they are reported to a
//! [`DispatchObserver`] instead. [`TracingObserver`] writes the operator log
//! lines, [`DispatchMetrics`] counts outcomes and forwards to another
//! observer.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use crate::errors::ConnectorError;

/// Receives dispatch and subscription outcomes
pub trait DispatchObserver: Send + Sync {
    /// No route (or a declining constructor) for the subject
    fn unrecognized(&self, _subject: &str) {}

    /// A response was published; `redirected` when it went to the reply address
    fn published(&self, _subject: &str, _redirected: bool) {}

    /// Publishing a response failed
    fn publish_failed(&self, _subject: &str, _error: &ConnectorError) {}

    /// A subscription was registered
    fn subscribed(&self, _subject: &str) {}

    /// A subscription could not be registered
    fn subscribe_failed(&self, _subject: &str, _error: &ConnectorError) {}
}

/// Logs every outcome through `tracing`
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl DispatchObserver for TracingObserver {
    fn unrecognized(&self, subject: &str) {
        warn!(subject = %subject, "Unrecognized event subject '{}'", subject);
    }

    fn published(&self, subject: &str, redirected: bool) {
        debug!(subject = %subject, redirected = redirected, "Published response");
    }

    fn publish_failed(&self, subject: &str, error: &ConnectorError) {
        error!(subject = %subject, error = %error, "Couldn't publish to nats");
    }

    fn subscribed(&self, subject: &str) {
        info!(subject = %subject, "listening for {}", subject);
    }

    fn subscribe_failed(&self, subject: &str, error: &ConnectorError) {
        error!(subject = %subject, error = %error, "Couldn't subscribe to nats");
    }
}

impl DispatchObserver for Vec<Arc<dyn DispatchObserver>> {
    fn unrecognized(&self, subject: &str) {
        self.iter().for_each(|o| o.unrecognized(subject));
    }

    fn published(&self, subject: &str, redirected: bool) {
        self.iter().for_each(|o| o.published(subject, redirected));
    }

    fn publish_failed(&self, subject: &str, error: &ConnectorError) {
        self.iter().for_each(|o| o.publish_failed(subject, error));
    }

    fn subscribed(&self, subject: &str) {
        self.iter().for_each(|o| o.subscribed(subject));
    }

    fn subscribe_failed(&self, subject: &str, error: &ConnectorError) {
        self.iter().for_each(|o| o.subscribe_failed(subject, error));
    }
}

/// Point-in-time copy of [`DispatchMetrics`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub unrecognized: u64,
    pub published: u64,
    pub redirected: u64,
    pub publish_failures: u64,
    pub subscriptions: u64,
    pub subscribe_failures: u64,
}

impl fmt::Display for MetricsSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "published={} redirected={} unrecognized={} publish_failures={} subscriptions={} subscribe_failures={}",
            self.published,
            self.redirected,
            self.unrecognized,
            self.publish_failures,
            self.subscriptions,
            self.subscribe_failures
        )
    }
}

/// Counts outcomes, then forwards them
pub struct DispatchMetrics {
    unrecognized: AtomicU64,
    published: AtomicU64,
    redirected: AtomicU64,
    publish_failures: AtomicU64,
    subscriptions: AtomicU64,
    subscribe_failures: AtomicU64,
    inner: Arc<dyn DispatchObserver>,
}

impl DispatchMetrics {
    /// Count and log through [`TracingObserver`]
    pub fn new() -> Self {
        Self::wrapping(Arc::new(TracingObserver))
    }

    /// Count and forward to `inner`
    pub fn wrapping(inner: Arc<dyn DispatchObserver>) -> Self {
        Self {
            unrecognized: AtomicU64::new(0),
            published: AtomicU64::new(0),
            redirected: AtomicU64::new(0),
            publish_failures: AtomicU64::new(0),
            subscriptions: AtomicU64::new(0),
            subscribe_failures: AtomicU64::new(0),
            inner,
        }
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            unrecognized: self.unrecognized.load(Ordering::Relaxed),
            published: self.published.load(Ordering::Relaxed),
            redirected: self.redirected.load(Ordering::Relaxed),
            publish_failures: self.publish_failures.load(Ordering::Relaxed),
            subscriptions: self.subscriptions.load(Ordering::Relaxed),
            subscribe_failures: self.subscribe_failures.load(Ordering::Relaxed),
        }
    }
}

impl Default for DispatchMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl DispatchObserver for DispatchMetrics {
    fn unrecognized(&self, subject: &str) {
        self.unrecognized.fetch_add(1, Ordering::Relaxed);
        self.inner.unrecognized(subject);
    }

    fn published(&self, subject: &str, redirected: bool) {
        self.published.fetch_add(1, Ordering::Relaxed);
        if redirected {
            self.redirected.fetch_add(1, Ordering::Relaxed);
        }
        self.inner.published(subject, redirected);
    }

    fn publish_failed(&self, subject: &str, error: &ConnectorError) {
        self.publish_failures.fetch_add(1, Ordering::Relaxed);
        self.inner.publish_failed(subject, error);
    }

    fn subscribed(&self, subject: &str) {
        self.subscriptions.fetch_add(1, Ordering::Relaxed);
        self.inner.subscribed(subject);
    }

    fn subscribe_failed(&self, subject: &str, error: &ConnectorError) {
        self.subscribe_failures.fetch_add(1, Ordering::Relaxed);
        self.inner.subscribe_failed(subject, error);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io;
    use std::sync::Mutex;

    /// Collects formatted log output
    #[derive(Clone, Default)]
    struct LogBuffer(Arc<Mutex<Vec<u8>>>);

    impl LogBuffer {
        fn contents(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    impl io::Write for LogBuffer {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_tracing_observer_log_lines() {
        let buffer = LogBuffer::default();
        let writer = buffer.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .without_time()
            .finish();

        tracing::subscriber::with_default(subscriber, || {
            let observer = TracingObserver;
            observer.unrecognized("unknown_type.create");
            observer.publish_failed(
                "instance.create.done",
                &ConnectorError::NatsPublish("connection closed".into()),
            );
            observer.subscribed("network.*");
            observer.subscribe_failed("vpc.*", &ConnectorError::NatsSubscribe("denied".into()));
        });

        let logs = buffer.contents();
        assert!(logs.contains("WARN"), "{}", logs);
        assert!(logs.contains("Unrecognized event subject 'unknown_type.create'"), "{}", logs);
        assert!(logs.contains("Couldn't publish to nats"), "{}", logs);
        assert!(logs.contains("connection closed"), "{}", logs);
        assert!(logs.contains("listening for network.*"), "{}", logs);
        assert!(logs.contains("Couldn't subscribe to nats"), "{}", logs);
    }

    #[test]
    fn test_snapshot_display() {
        let snapshot = MetricsSnapshot {
            published: 4,
            redirected: 1,
            unrecognized: 2,
            subscriptions: 3,
            ..MetricsSnapshot::default()
        };

        assert_eq!(
            snapshot.to_string(),
            "published=4 redirected=1 unrecognized=2 publish_failures=0 subscriptions=3 subscribe_failures=0"
        );
    }

    #[test]
    fn test_metrics_count_and_forward() {
        let downstream = Arc::new(DispatchMetrics::new());
        let metrics = DispatchMetrics::wrapping(downstream.clone());

        metrics.unrecognized("mainframe.create");
        metrics.published("instance.create.done", false);
        metrics.published("reply.abc", true);
        metrics.publish_failed("vpc.create.done", &ConnectorError::NatsPublish("closed".into()));

        let expected = MetricsSnapshot {
            unrecognized: 1,
            published: 2,
            redirected: 1,
            publish_failures: 1,
            ..MetricsSnapshot::default()
        };
        assert_eq!(metrics.snapshot(), expected);
        assert_eq!(downstream.snapshot(), expected);
    }

    #[test]
    fn test_fan_out() {
        let a = Arc::new(DispatchMetrics::new());
        let b = Arc::new(DispatchMetrics::new());
        let observers: Vec<Arc<dyn DispatchObserver>> = vec![a.clone(), b.clone()];

        observers.subscribed("network.*");
        observers.subscribe_failed("vpc.*", &ConnectorError::NatsSubscribe("denied".into()));

        assert_eq!(a.snapshot().subscriptions, 1);
        assert_eq!(b.snapshot().subscribe_failures, 1);
    }
}
