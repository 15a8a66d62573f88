//! Mock provider implementations for testing.
//!
//! In-memory doubles for the provider traits, used by unit and integration
//! tests to observe dispatched effects and to inject failures. The fully
//! functional in-memory providers live in [`crate::stores`]; these types
//! exist for recording and fault injection.

use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU32, Ordering};

use crate::effects::Notification;
use crate::error::BookingError;
use crate::providers::{Notifier, ProviderFuture, TicketRenderer};
use crate::types::{Event, Registration};

/// Notifier that records every notification it is asked to deliver.
#[derive(Debug, Clone, Default)]
pub struct RecordingNotifier {
    sent: Arc<Mutex<Vec<Notification>>>,
}

impl RecordingNotifier {
    /// Creates an empty recording notifier.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every notification delivered so far, in order.
    #[must_use]
    pub fn sent(&self) -> Vec<Notification> {
        self.sent
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }
}

impl Notifier for RecordingNotifier {
    fn send(&self, notification: Notification) -> ProviderFuture<()> {
        let sent = Arc::clone(&self.sent);
        Box::pin(async move {
            sent.lock()
                .map_err(|_| BookingError::Persistence("notifier lock poisoned".to_string()))?
                .push(notification);
            Ok(())
        })
    }
}

/// Notifier that fails a fixed number of deliveries before succeeding.
///
/// Exercises the dispatcher's retry path. Counts are cumulative across
/// notifications, so `failing_times(2)` with three attempts fails twice
/// and then delivers.
#[derive(Debug, Default)]
pub struct FlakyNotifier {
    fail_first: u32,
    attempts: AtomicU32,
    delivered: AtomicU32,
}

impl FlakyNotifier {
    /// Creates a notifier whose first `count` sends fail.
    #[must_use]
    pub fn failing_times(count: u32) -> Self {
        Self {
            fail_first: count,
            attempts: AtomicU32::new(0),
            delivered: AtomicU32::new(0),
        }
    }

    /// Total send attempts observed.
    #[must_use]
    pub fn attempts(&self) -> u32 {
        self.attempts.load(Ordering::SeqCst)
    }

    /// Notifications that actually went through.
    #[must_use]
    pub fn delivered(&self) -> u32 {
        self.delivered.load(Ordering::SeqCst)
    }
}

impl Notifier for FlakyNotifier {
    fn send(&self, _notification: Notification) -> ProviderFuture<()> {
        let attempt = self.attempts.fetch_add(1, Ordering::SeqCst);
        let result = if attempt < self.fail_first {
            Err(BookingError::Persistence(format!(
                "simulated delivery failure on attempt {}",
                attempt + 1
            )))
        } else {
            self.delivered.fetch_add(1, Ordering::SeqCst);
            Ok(())
        };
        Box::pin(async move { result })
    }
}

/// Renderer that always fails, for issuance failure-path tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct FailingRenderer;

impl FailingRenderer {
    /// Creates the failing renderer.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl TicketRenderer for FailingRenderer {
    fn render(&self, _registration: Registration, _event: Event) -> ProviderFuture<Vec<u8>> {
        Box::pin(async move {
            Err(BookingError::Persistence(
                "simulated render failure".to_string(),
            ))
        })
    }
}
