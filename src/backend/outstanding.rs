//! Outstanding request tracking.
//!
//! # Responsibilities
//! - Count requests between dispatch and completion
//! - Let external schedulers wait until no request is in flight
//!
//! # Design Decisions
//! - RAII guard: the decrement happens exactly once, even if the request future is dropped
//! - The count lives in a watch channel so idle waiters wake without polling

use std::fmt;
use std::sync::Arc;

use tokio::sync::watch;
use uuid::Uuid;

use crate::observability::metrics;

/// Unique identifier for a dispatched request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RequestId(Uuid);

impl RequestId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "req-{}", self.0)
    }
}

/// Shared counter of requests in flight.
#[derive(Debug, Clone)]
pub struct OutstandingRequests {
    count: Arc<watch::Sender<u64>>,
}

impl OutstandingRequests {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(0);
        Self {
            count: Arc::new(tx),
        }
    }

    /// Record a dispatched request. The returned guard completes it on drop.
    pub fn track(&self) -> RequestGuard {
        let mut current = 0;
        self.count.send_modify(|count| {
            *count += 1;
            current = *count;
        });
        metrics::record_outstanding(current);

        RequestGuard {
            count: Arc::clone(&self.count),
            id: RequestId::new(),
        }
    }

    /// Number of requests currently in flight.
    pub fn count(&self) -> u64 {
        *self.count.borrow()
    }

    pub fn is_idle(&self) -> bool {
        self.count() == 0
    }

    /// Wait until no request is in flight.
    pub async fn wait_for_idle(&self) {
        let mut rx = self.count.subscribe();
        // The sender lives as long as `self`, so this cannot fail.
        let _ = rx.wait_for(|count| *count == 0).await;
    }
}

impl Default for OutstandingRequests {
    fn default() -> Self {
        Self::new()
    }
}

/// Guard that tracks one request's lifetime.
/// Decrements the outstanding count when dropped.
#[derive(Debug)]
pub struct RequestGuard {
    count: Arc<watch::Sender<u64>>,
    id: RequestId,
}

impl RequestGuard {
    pub fn id(&self) -> RequestId {
        self.id
    }
}

impl Drop for RequestGuard {
    fn drop(&mut self) {
        let mut current = 0;
        self.count.send_modify(|count| {
            *count = count.saturating_sub(1);
            current = *count;
        });
        metrics::record_outstanding(current);
        tracing::trace!(request_id = %self.id, outstanding = current, "Request completed");
    }
}
