use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

use crate::EmbedError;

/// Caps concurrent outbound requests to the embedding engine.
///
/// The HTTP client below reuses sockets on its own; this gate bounds how
/// many requests may be in flight at once so a traffic burst cannot open
/// an unbounded number of connections. Permits are RAII guards and are
/// released on every exit path, including cancellation of the request
/// future.
#[derive(Debug, Clone)]
pub struct ConnectionGate {
    permits: Arc<Semaphore>,
    acquire_timeout: Duration,
}

impl ConnectionGate {
    pub fn new(max_in_flight: usize, acquire_timeout: Duration) -> Self {
        Self {
            permits: Arc::new(Semaphore::new(max_in_flight)),
            acquire_timeout,
        }
    }

    /// Acquire an in-flight slot, waiting at most the configured timeout.
    pub async fn acquire(&self) -> Result<GatePermit, EmbedError> {
        match tokio::time::timeout(self.acquire_timeout, self.permits.clone().acquire_owned()).await
        {
            Ok(Ok(permit)) => Ok(GatePermit { _permit: permit }),
            Ok(Err(_)) => Err(EmbedError::PoolExhausted("connection gate closed".into())),
            Err(_) => Err(EmbedError::PoolExhausted(format!(
                "no connection slot within {}ms",
                self.acquire_timeout.as_millis()
            ))),
        }
    }

    /// Currently free slots.
    pub fn available(&self) -> usize {
        self.permits.available_permits()
    }
}

/// RAII handle for one in-flight request slot.
#[derive(Debug)]
pub struct GatePermit {
    _permit: OwnedSemaphorePermit,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn acquire_takes_and_returns_slots() {
        let gate = ConnectionGate::new(2, Duration::from_millis(50));
        assert_eq!(gate.available(), 2);

        let a = gate.acquire().await.expect("first slot");
        let b = gate.acquire().await.expect("second slot");
        assert_eq!(gate.available(), 0);

        drop(a);
        assert_eq!(gate.available(), 1);
        drop(b);
        assert_eq!(gate.available(), 2);
    }

    #[tokio::test]
    async fn exhausted_gate_times_out_with_pool_error() {
        let gate = ConnectionGate::new(1, Duration::from_millis(20));
        let _held = gate.acquire().await.expect("slot");

        let err = gate.acquire().await.expect_err("gate is full");
        assert!(matches!(err, EmbedError::PoolExhausted(_)));
        assert!(err.to_string().contains("20ms"));
    }

    #[tokio::test]
    async fn released_slot_unblocks_waiter() {
        let gate = ConnectionGate::new(1, Duration::from_millis(500));
        let held = gate.acquire().await.expect("slot");

        let waiter = {
            let gate = gate.clone();
            tokio::spawn(async move { gate.acquire().await })
        };
        tokio::time::sleep(Duration::from_millis(10)).await;
        drop(held);

        let permit = waiter.await.expect("join").expect("slot after release");
        drop(permit);
        assert_eq!(gate.available(), 1);
    }
}
