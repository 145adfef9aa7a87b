//! Ordering primitives for responses that may complete out of order.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

/// Tickets for a view that is replaced wholesale by each response.
/// A response is applied only if no later-issued ticket was applied before it,
/// so the view always shows the latest-initiated request that succeeded.
#[derive(Debug, Default, Clone, Copy)]
pub struct Tickets {
    issued: u64,
    applied: u64,
}

impl Tickets {
    pub fn issue(&mut self) -> u64 {
        self.issued += 1;
        self.issued
    }

    pub fn accept(&mut self, ticket: u64) -> bool {
        if ticket > self.applied {
            self.applied = ticket;
            true
        } else {
            false
        }
    }

    /// Makes every ticket issued so far stale.
    pub fn invalidate(&mut self) {
        self.applied = self.issued;
    }
}

/// One FIFO async lock per key, created on demand and dropped when unused.
#[derive(Debug, Default)]
pub struct KeyedLocks {
    slots: Mutex<HashMap<i64, Arc<AsyncMutex<()>>>>,
}

pub struct KeyGuard<'a> {
    owner: &'a KeyedLocks,
    key: i64,
    guard: Option<OwnedMutexGuard<()>>,
}

impl KeyedLocks {
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&self, key: i64) -> Arc<AsyncMutex<()>> {
        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        slots.entry(key).or_default().clone()
    }

    /// Waits behind every earlier holder of `key`.
    pub async fn lock(&self, key: i64) -> KeyGuard<'_> {
        let guard = self.slot(key).lock_owned().await;
        KeyGuard {
            owner: self,
            key,
            guard: Some(guard),
        }
    }

    pub fn try_lock(&self, key: i64) -> Option<KeyGuard<'_>> {
        let guard = self.slot(key).try_lock_owned().ok();
        match guard {
            Some(guard) => Some(KeyGuard {
                owner: self,
                key,
                guard: Some(guard),
            }),
            None => {
                self.release_if_idle(key);
                None
            }
        }
    }

    pub fn is_locked(&self, key: i64) -> bool {
        let slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        slots
            .get(&key)
            .map(|slot| slot.try_lock().is_err())
            .unwrap_or(false)
    }

    fn release_if_idle(&self, key: i64) {
        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        if slots
            .get(&key)
            .is_some_and(|slot| Arc::strong_count(slot) == 1)
        {
            slots.remove(&key);
        }
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner).len()
    }
}

impl Drop for KeyGuard<'_> {
    fn drop(&mut self) {
        // сначала отпускаем замок, потом чистим слот
        drop(self.guard.take());
        self.owner.release_if_idle(self.key);
    }
}
