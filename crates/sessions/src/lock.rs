//! Per-user concurrency control.
//!
//! Two messages from the same user must not interleave the session's
//! load → mutate → flush cycle, or the second write clobbers the
//! first.  Each user id maps to a `Semaphore(1)`; holding the permit
//! serializes that user's turns while different users proceed in
//! parallel.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

/// Map of per-user session locks.
pub struct UserLockMap {
    locks: Mutex<HashMap<i64, Arc<Semaphore>>>,
}

impl Default for UserLockMap {
    fn default() -> Self {
        Self::new()
    }
}

impl UserLockMap {
    pub fn new() -> Self {
        Self {
            locks: Mutex::new(HashMap::new()),
        }
    }

    /// Acquire the lock for `user_id`, waiting until any in-flight turn
    /// for the same user finishes.  The permit releases on drop.
    pub async fn acquire(&self, user_id: i64) -> OwnedSemaphorePermit {
        let sem = {
            let mut locks = self.locks.lock();
            locks
                .entry(user_id)
                .or_insert_with(|| Arc::new(Semaphore::new(1)))
                .clone()
        };

        // The semaphore is never closed, so acquisition cannot fail.
        sem.acquire_owned()
            .await
            .expect("session semaphore closed")
    }

    /// Number of tracked users (for monitoring).
    pub fn user_count(&self) -> usize {
        self.locks.lock().len()
    }

    /// Drop lock entries for users with no turn in flight.
    pub fn prune_idle(&self) {
        let mut locks = self.locks.lock();
        locks.retain(|_, sem| sem.available_permits() == 0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn sequential_turns_for_one_user() {
        let map = UserLockMap::new();

        let p1 = map.acquire(1).await;
        drop(p1);

        let p2 = map.acquire(1).await;
        drop(p2);
    }

    #[tokio::test]
    async fn different_users_are_independent() {
        let map = Arc::new(UserLockMap::new());

        let p1 = map.acquire(1).await;
        let p2 = map.acquire(2).await;

        assert_eq!(map.user_count(), 2);

        drop(p1);
        drop(p2);
    }

    #[tokio::test]
    async fn same_user_waits_for_release() {
        let map = Arc::new(UserLockMap::new());
        let map2 = map.clone();

        let p1 = map.acquire(1).await;

        let handle = tokio::spawn(async move {
            let _p2 = map2.acquire(1).await;
            42
        });

        // Give the waiter a moment to queue.
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;

        drop(p1);

        assert_eq!(handle.await.unwrap(), 42);
    }

    #[tokio::test]
    async fn prune_keeps_held_locks() {
        let map = UserLockMap::new();
        let p = map.acquire(1).await;
        let _ = map.acquire(2).await; // released immediately

        map.prune_idle();
        assert_eq!(map.user_count(), 1);
        drop(p);
    }
}
