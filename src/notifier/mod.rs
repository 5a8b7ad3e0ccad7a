//! ScanEventChannel - Stateful Scan Notifications
//!
//! ## Responsibilities
//!
//! - Declare a stateful event channel at startup
//! - Emit one event per classified detection, carrying the outcome value
//! - Keep the last-sent value readable until overwritten
//! - Undeclare the channel at shutdown
//!
//! On-device consumers subscribe through a broadcast receiver; the channel
//! is stateful in the sense that the last value persists for late readers.

use crate::upload_client::OutcomeCode;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::Arc;
use tokio::sync::broadcast;

/// One emitted scan notification
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanEvent {
    /// Outcome value (`SuccessValue` field on the channel)
    pub value: i32,
    /// When the event was emitted
    pub emitted_at: DateTime<Utc>,
}

/// Sink for classified detections
pub trait NotificationEmitter {
    /// Raise one event carrying the classification
    fn emit(&self, outcome: OutcomeCode);
}

struct ChannelInner {
    tx: broadcast::Sender<ScanEvent>,
    last_value: AtomicI32,
}

/// Stateful event channel for scan outcomes
#[derive(Clone)]
pub struct ScanEventChannel {
    inner: Arc<ChannelInner>,
}

impl ScanEventChannel {
    /// Declare the channel
    pub fn declare() -> Self {
        let (tx, _) = broadcast::channel(64);
        tracing::info!("Scan event channel declared");
        Self {
            inner: Arc::new(ChannelInner {
                tx,
                last_value: AtomicI32::new(0),
            }),
        }
    }

    /// Subscribe to emitted events
    pub fn subscribe(&self) -> broadcast::Receiver<ScanEvent> {
        self.inner.tx.subscribe()
    }

    /// Last emitted value (0 before any emission)
    pub fn last_value(&self) -> i32 {
        self.inner.last_value.load(Ordering::SeqCst)
    }

    /// Undeclare the channel
    ///
    /// Part of the shutdown resource-release contract; subscribers see the
    /// stream close when the last sender drops.
    pub fn undeclare(&self) {
        tracing::info!(last_value = self.last_value(), "Scan event channel undeclared");
    }
}

impl NotificationEmitter for ScanEventChannel {
    fn emit(&self, outcome: OutcomeCode) {
        let value = outcome.event_value();
        self.inner.last_value.store(value, Ordering::SeqCst);

        let event = ScanEvent {
            value,
            emitted_at: Utc::now(),
        };
        // send only fails with zero subscribers; the state update above
        // already happened, which is all a stateful channel guarantees
        let receivers = self.inner.tx.send(event).unwrap_or(0);
        tracing::info!(value = value, receivers = receivers, "Scan event emitted");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn emit_updates_last_value_and_broadcasts() {
        let channel = ScanEventChannel::declare();
        let mut rx = channel.subscribe();

        channel.emit(OutcomeCode::Success);
        let event = rx.recv().await.unwrap();
        assert_eq!(event.value, 1);
        assert_eq!(channel.last_value(), 1);
    }

    #[tokio::test]
    async fn last_value_persists_until_overwritten() {
        let channel = ScanEventChannel::declare();
        channel.emit(OutcomeCode::Expired);
        assert_eq!(channel.last_value(), 5);
        channel.emit(OutcomeCode::NotFound);
        assert_eq!(channel.last_value(), 2);
        // Still readable with no subscribers at emit time
        assert_eq!(channel.last_value(), 2);
    }

    #[test]
    fn emit_without_subscribers_does_not_fail() {
        let channel = ScanEventChannel::declare();
        channel.emit(OutcomeCode::Unknown);
        assert_eq!(channel.last_value(), 6);
    }
}
