//! Probe event sinks.
//!
//! Probe nodes (and task-failure reporting) record [`ProbeEvent`]s on the
//! sink a scope was built with. Sinks decide what to do with them: log them,
//! keep them for test snapshots, or forward them to an async consumer.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::value::Value;

/// One recorded observation from a running scope.
#[derive(Debug, Clone, PartialEq)]
pub struct ProbeEvent {
    /// Scope that produced the event.
    pub scope: Uuid,
    /// Probe label, or the entry that failed for error events.
    pub label: String,
    pub payload: ProbePayload,
    pub when: DateTime<Utc>,
}

/// What a probe observed: a pulled value, or the failure that ended a task.
#[derive(Debug, Clone, PartialEq)]
pub enum ProbePayload {
    Value(Value),
    Error(String),
}

impl fmt::Display for ProbePayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProbePayload::Value(value) => write!(f, "{value}"),
            ProbePayload::Error(message) => write!(f, "error: {message}"),
        }
    }
}

impl ProbeEvent {
    pub fn observed(scope: Uuid, label: impl Into<String>, value: Value) -> Self {
        Self {
            scope,
            label: label.into(),
            payload: ProbePayload::Value(value),
            when: Utc::now(),
        }
    }

    pub fn failed(scope: Uuid, label: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            scope,
            label: label.into(),
            payload: ProbePayload::Error(message.into()),
            when: Utc::now(),
        }
    }

    /// The observed value, when this is not an error event.
    pub fn value(&self) -> Option<&Value> {
        match &self.payload {
            ProbePayload::Value(value) => Some(value),
            ProbePayload::Error(_) => None,
        }
    }

    /// The failure message, when this is an error event.
    pub fn error(&self) -> Option<&str> {
        match &self.payload {
            ProbePayload::Value(_) => None,
            ProbePayload::Error(message) => Some(message),
        }
    }
}

/// Output target for probe events.
pub trait ProbeSink: Send + Sync {
    fn record(&self, event: ProbeEvent);
}

/// Default sink: structured log lines through tracing.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl ProbeSink for TracingSink {
    fn record(&self, event: ProbeEvent) {
        match &event.payload {
            ProbePayload::Value(value) => tracing::info!(
                scope = %event.scope,
                label = %event.label,
                value = %value,
                "probe"
            ),
            ProbePayload::Error(message) => tracing::error!(
                scope = %event.scope,
                label = %event.label,
                error = %message,
                "probe failure"
            ),
        }
    }
}

/// In-memory sink for tests and snapshots.
#[derive(Clone, Default)]
pub struct MemorySink {
    entries: Arc<Mutex<Vec<ProbeEvent>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything recorded so far.
    pub fn snapshot(&self) -> Vec<ProbeEvent> {
        self.entries.lock().clone()
    }

    pub fn clear(&self) {
        self.entries.lock().clear();
    }
}

impl ProbeSink for MemorySink {
    fn record(&self, event: ProbeEvent) {
        self.entries.lock().push(event);
    }
}

/// Channel sink for streaming probe events to async consumers.
///
/// Events are forwarded without blocking; a dropped receiver downgrades the
/// sink to a no-op with a debug log line.
pub struct ChannelSink {
    tx: mpsc::UnboundedSender<ProbeEvent>,
}

impl ChannelSink {
    pub fn new(tx: mpsc::UnboundedSender<ProbeEvent>) -> Self {
        Self { tx }
    }
}

impl ProbeSink for ChannelSink {
    fn record(&self, event: ProbeEvent) {
        if self.tx.send(event).is_err() {
            tracing::debug!("probe channel receiver dropped; event discarded");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_sink_snapshots_in_order() {
        let sink = MemorySink::new();
        let scope = Uuid::new_v4();
        sink.record(ProbeEvent::observed(scope, "a", Value::Int(1)));
        sink.record(ProbeEvent::observed(scope, "b", Value::Int(2)));
        let events = sink.snapshot();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].label, "a");
        assert_eq!(events[1].value(), Some(&Value::Int(2)));
    }

    #[test]
    fn error_events_carry_the_message_not_a_value() {
        let event = ProbeEvent::failed(Uuid::new_v4(), "entry #1", "boom");
        assert_eq!(event.error(), Some("boom"));
        assert_eq!(event.value(), None);
        assert_eq!(event.payload.to_string(), "error: boom");
    }

    #[tokio::test]
    async fn channel_sink_forwards_events() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let sink = ChannelSink::new(tx);
        sink.record(ProbeEvent::observed(Uuid::new_v4(), "x", Value::Bool(true)));
        let event = rx.recv().await.unwrap();
        assert_eq!(event.label, "x");
    }
}
