//! Per-sender mutual exclusion
//!
//! Messages from one sender are processed strictly one after another while
//! different senders proceed independently.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::debug;

/// Number of registry entries above which idle locks are pruned
const PRUNE_THRESHOLD: usize = 1024;

/// Registry of one async mutex per sender id
#[derive(Clone, Default)]
pub struct SenderLocks {
    locks: Arc<Mutex<HashMap<String, Arc<Mutex<()>>>>>,
}

/// Held for the duration of one message; releases the sender on drop
pub struct SenderGuard {
    _guard: OwnedMutexGuard<()>,
}

impl SenderLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait until no other message from `sender_id` is in flight
    pub async fn acquire(&self, sender_id: &str) -> SenderGuard {
        let lock = {
            let mut locks = self.locks.lock().await;
            if locks.len() >= PRUNE_THRESHOLD {
                prune_idle(&mut locks);
            }
            locks
                .entry(sender_id.to_string())
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .clone()
        };

        SenderGuard {
            _guard: lock.lock_owned().await,
        }
    }

    /// Number of senders currently tracked
    pub async fn len(&self) -> usize {
        self.locks.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Drop entries nobody holds or waits on
    pub async fn prune(&self) {
        let mut locks = self.locks.lock().await;
        prune_idle(&mut locks);
    }
}

fn prune_idle(locks: &mut HashMap<String, Arc<Mutex<()>>>) {
    let before = locks.len();
    // A count of one means only the registry references the lock
    locks.retain(|_, lock| Arc::strong_count(lock) > 1);
    debug!(pruned = before - locks.len(), remaining = locks.len(), "Pruned idle sender locks");
}
