//! Correlated request/reply bridge
//!
//! The protocol client answers world queries asynchronously: the engine
//! issues a request, and a correlated reply event arrives later on the
//! event ingress. `ReplyBridge` turns that exchange into a bounded await.
//!
//! Usage order matters: register the correlation id FIRST, then issue the
//! request, then wait. Registering first means a reply that races the
//! request cannot be missed. The registration is a guard; dropping it
//! (after a reply, a timeout, or an error between register and wait)
//! removes the pending entry, so a late reply finds nothing to complete
//! and is ignored.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use tokio::sync::oneshot;

use crate::domain::value_objects::CorrelationId;

/// The bounded wait expired before a matching reply arrived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("timed out waiting for a correlated reply")]
pub struct WaitTimeout;

/// Pending-reply table for one asynchronous event source.
///
/// Concurrent registrations use independent correlation ids and never
/// interfere with each other.
pub struct ReplyBridge<R> {
    pending: Mutex<HashMap<CorrelationId, oneshot::Sender<R>>>,
}

impl<R> Default for ReplyBridge<R> {
    fn default() -> Self {
        Self {
            pending: Mutex::new(HashMap::new()),
        }
    }
}

impl<R> ReplyBridge<R> {
    pub fn new() -> Self {
        Self::default()
    }

    fn pending(&self) -> MutexGuard<'_, HashMap<CorrelationId, oneshot::Sender<R>>> {
        // A poisoned table only means a panic elsewhere while holding the
        // guard; the map itself is still usable.
        self.pending.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Register interest in `correlation` before issuing the request that
    /// will produce the reply.
    pub fn register(&self, correlation: CorrelationId) -> PendingReply<'_, R> {
        let (sender, receiver) = oneshot::channel();
        self.pending().insert(correlation, sender);
        PendingReply {
            bridge: self,
            correlation,
            receiver,
        }
    }

    /// Fulfil the waiter registered under `correlation`, if any.
    ///
    /// Replies whose id matches nothing pending (stale after a timeout, or
    /// unrelated traffic) are ignored; returns whether a waiter was fed.
    pub fn complete(&self, correlation: CorrelationId, reply: R) -> bool {
        let sender = self.pending().remove(&correlation);
        match sender {
            Some(sender) => sender.send(reply).is_ok(),
            None => false,
        }
    }
}

/// A registered wait for one correlated reply.
///
/// Deregistration happens exactly once, on drop, whichever way the wait
/// ends.
pub struct PendingReply<'a, R> {
    bridge: &'a ReplyBridge<R>,
    correlation: CorrelationId,
    receiver: oneshot::Receiver<R>,
}

impl<R> PendingReply<'_, R> {
    /// Block the task until the reply arrives or `deadline` elapses.
    pub async fn wait(mut self, deadline: Duration) -> Result<R, WaitTimeout> {
        match tokio::time::timeout(deadline, &mut self.receiver).await {
            Ok(Ok(reply)) => Ok(reply),
            // Sender dropped without a reply; indistinguishable from never
            // answered, so it surfaces the same way.
            Ok(Err(_)) => Err(WaitTimeout),
            Err(_) => Err(WaitTimeout),
        }
    }
}

impl<R> Drop for PendingReply<'_, R> {
    fn drop(&mut self) {
        self.bridge.pending().remove(&self.correlation);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_reply_reaches_waiter() {
        let bridge = Arc::new(ReplyBridge::new());
        let correlation = CorrelationId::new();

        let pending = bridge.register(correlation);
        let completer = bridge.clone();
        tokio::spawn(async move {
            assert!(completer.complete(correlation, 42u64));
        });

        let reply = pending.wait(Duration::from_secs(1)).await.unwrap();
        assert_eq!(reply, 42);
    }

    #[tokio::test]
    async fn test_timeout_then_late_reply_is_ignored() {
        let bridge: ReplyBridge<u64> = ReplyBridge::new();
        let correlation = CorrelationId::new();

        let pending = bridge.register(correlation);
        let result = pending.wait(Duration::from_millis(10)).await;
        assert_eq!(result, Err(WaitTimeout));

        // The registration was dropped with the timeout; the late reply
        // must find nobody to complete.
        assert!(!bridge.complete(correlation, 7));
    }

    #[tokio::test]
    async fn test_unrelated_correlation_is_not_completed() {
        let bridge: ReplyBridge<u64> = ReplyBridge::new();
        let pending = bridge.register(CorrelationId::new());

        assert!(!bridge.complete(CorrelationId::new(), 9));

        // The original waiter is still live.
        drop(pending);
    }

    #[tokio::test]
    async fn test_concurrent_waits_do_not_interfere() {
        let bridge = Arc::new(ReplyBridge::new());
        let first_id = CorrelationId::new();
        let second_id = CorrelationId::new();

        let first = bridge.register(first_id);
        let second = bridge.register(second_id);

        let completer = bridge.clone();
        tokio::spawn(async move {
            completer.complete(second_id, 2u64);
            completer.complete(first_id, 1u64);
        });

        let (first, second) = tokio::join!(
            first.wait(Duration::from_secs(1)),
            second.wait(Duration::from_secs(1)),
        );
        assert_eq!(first.unwrap(), 1);
        assert_eq!(second.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_drop_deregisters_without_wait() {
        let bridge: ReplyBridge<u64> = ReplyBridge::new();
        let correlation = CorrelationId::new();

        let pending = bridge.register(correlation);
        drop(pending);

        assert!(!bridge.complete(correlation, 5));
    }
}
