//! Countdown barrier joining the units of a deployment batch.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use tokio::sync::Notify;

/// Completes once `count` parties have arrived.
///
/// Parties arrive through an [`ArrivalGuard`], which counts down when it is
/// dropped. A unit that fails, panics or is never scheduled still drops its
/// guard, so the waiter cannot hang on a lost unit.
pub struct JoinBarrier {
    remaining: AtomicUsize,
    notify: Notify,
}

impl JoinBarrier {
    pub fn new(count: usize) -> Self {
        Self {
            remaining: AtomicUsize::new(count),
            notify: Notify::new(),
        }
    }

    pub fn remaining(&self) -> usize {
        self.remaining.load(Ordering::Acquire)
    }

    /// Count one party down. Extra arrivals are ignored.
    pub fn arrive(&self) {
        let previous = self
            .remaining
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| n.checked_sub(1));
        if previous == Ok(1) {
            self.notify.notify_waiters();
        }
    }

    /// Wait until every party arrived.
    pub async fn wait(&self) {
        loop {
            let notified = self.notify.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();
            if self.remaining() == 0 {
                return;
            }
            notified.await;
        }
    }

    /// Wait at most `limit`. Returns `false` on timeout.
    pub async fn wait_timeout(&self, limit: Duration) -> bool {
        tokio::time::timeout(limit, self.wait()).await.is_ok()
    }
}

/// Arrives at its barrier when dropped.
pub struct ArrivalGuard {
    barrier: Arc<JoinBarrier>,
}

impl ArrivalGuard {
    pub fn new(barrier: Arc<JoinBarrier>) -> Self {
        Self { barrier }
    }
}

impl Drop for ArrivalGuard {
    fn drop(&mut self) {
        self.barrier.arrive();
    }
}
