//! Timeout enforcement.
//!
//! # Responsibilities
//! - Schedule a cancellation trigger from a duration or an external signal
//! - Retract the trigger once the request completes naturally
//!
//! # Design Decisions
//! - Uses Tokio's timer; each armed timeout is one spawned task
//! - A shared `settled` flag decides the race between firing and disarming:
//!   whichever side flips it first wins, so `on_fire` runs at most once and
//!   never after `disarm` has returned `true`
//! - Zero durations and `TimeoutSpec::None` produce a no-op handle

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;

/// How a request may be cancelled before it completes.
#[derive(Debug, Clone, Default)]
pub enum TimeoutSpec {
    /// No timeout.
    #[default]
    None,
    /// Cancel after the given duration. A zero duration disables the timeout.
    After(Duration),
    /// Cancel when the paired [`Canceller`] fires.
    Signal(CancellationSignal),
}

impl TimeoutSpec {
    pub fn from_millis(ms: u64) -> Self {
        TimeoutSpec::After(Duration::from_millis(ms))
    }
}

/// Create a connected canceller/signal pair.
pub fn cancellation_pair() -> (Canceller, CancellationSignal) {
    let (tx, rx) = watch::channel(false);
    (Canceller { tx }, CancellationSignal { rx })
}

/// Triggering side of a cancellation signal.
#[derive(Debug)]
pub struct Canceller {
    tx: watch::Sender<bool>,
}

impl Canceller {
    /// Resolve the signal. Idempotent.
    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }
}

/// A value that resolves at some point in the future, cancelling whatever it is attached to.
///
/// A signal whose [`Canceller`] is dropped without cancelling never resolves.
#[derive(Debug, Clone)]
pub struct CancellationSignal {
    rx: watch::Receiver<bool>,
}

impl CancellationSignal {
    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow()
    }

    /// Wait for resolution. Returns `false` if the canceller went away first.
    pub async fn cancelled(mut self) -> bool {
        self.rx.wait_for(|cancelled| *cancelled).await.is_ok()
    }
}

/// Handle to an armed timeout. At most one per request.
///
/// Dropping the handle disarms it.
#[derive(Debug, Default)]
pub struct PendingTimeout {
    armed: Option<Armed>,
}

#[derive(Debug)]
struct Armed {
    settled: Arc<AtomicBool>,
    task: JoinHandle<()>,
}

impl PendingTimeout {
    /// A handle with nothing scheduled.
    pub fn noop() -> Self {
        Self::default()
    }

    /// Whether a trigger is currently scheduled.
    pub fn is_armed(&self) -> bool {
        self.armed
            .as_ref()
            .map(|armed| !armed.settled.load(Ordering::Acquire))
            .unwrap_or(false)
    }

    /// Retract the trigger.
    ///
    /// Returns `true` if this call prevented `on_fire` from running. Safe to call
    /// repeatedly and on a no-op handle.
    pub fn disarm(&mut self) -> bool {
        match self.armed.take() {
            Some(armed) => {
                let prevented = !armed.settled.swap(true, Ordering::AcqRel);
                armed.task.abort();
                prevented
            }
            None => false,
        }
    }
}

impl Drop for PendingTimeout {
    fn drop(&mut self) {
        self.disarm();
    }
}

/// Arms cancellation triggers from a [`TimeoutSpec`].
pub struct TimeoutController;

impl TimeoutController {
    /// Schedule `on_fire` according to `spec`.
    ///
    /// Must be called from within a Tokio runtime when `spec` schedules anything.
    pub fn arm<F>(spec: TimeoutSpec, on_fire: F) -> PendingTimeout
    where
        F: FnOnce() + Send + 'static,
    {
        let settled = Arc::new(AtomicBool::new(false));
        let fire_flag = Arc::clone(&settled);
        let fire = move || {
            if !fire_flag.swap(true, Ordering::AcqRel) {
                on_fire();
            }
        };

        let task = match spec {
            TimeoutSpec::After(duration) if !duration.is_zero() => tokio::spawn(async move {
                tokio::time::sleep(duration).await;
                tracing::debug!(timeout_ms = duration.as_millis() as u64, "Timeout elapsed");
                fire();
            }),
            TimeoutSpec::Signal(signal) => tokio::spawn(async move {
                if signal.cancelled().await {
                    tracing::debug!("Cancellation signal resolved");
                    fire();
                }
            }),
            _ => return PendingTimeout::noop(),
        };

        PendingTimeout {
            armed: Some(Armed { settled, task }),
        }
    }
}
