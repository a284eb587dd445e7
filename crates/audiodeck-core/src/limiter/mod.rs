//! Per-origin concurrency limiter.
//!
//! Each [`OriginKey`] gets a lazily created FIFO queue and an active count.
//! Work for one origin starts in arrival order, at most `limit` at a time;
//! origins never block each other. Slots are held by [`SlotGuard`], so a
//! job that fails, panics or is dropped frees its slot like one that
//! succeeds.

mod guard;

use std::collections::{HashMap, VecDeque};
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::oneshot;

use crate::origin::OriginKey;

pub use guard::SlotGuard;

#[derive(Debug, Default)]
struct OriginQueue {
    active: usize,
    /// Waiters in arrival order; a freed slot is handed to the front one.
    pending: VecDeque<oneshot::Sender<SlotGuard>>,
}

#[derive(Debug)]
pub(crate) struct Inner {
    limit: usize,
    queues: Mutex<HashMap<OriginKey, OriginQueue>>,
}

impl Inner {
    fn lock(&self) -> MutexGuard<'_, HashMap<OriginKey, OriginQueue>> {
        self.queues.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Hand the slot to the oldest live waiter, or free it.
    fn release(this: &Arc<Inner>, key: &OriginKey) {
        let mut queues = this.lock();
        let Some(queue) = queues.get_mut(key) else {
            return;
        };
        while let Some(tx) = queue.pending.pop_front() {
            let handoff = SlotGuard {
                inner: Arc::clone(this),
                key: key.clone(),
                armed: true,
            };
            match tx.send(handoff) {
                Ok(()) => return,
                // Waiter gave up; try the next one.
                Err(mut unclaimed) => unclaimed.armed = false,
            }
        }
        queue.active = queue.active.saturating_sub(1);
        if queue.active == 0 {
            queues.remove(key);
        }
    }
}

/// Shared limiter handle. Cloning shares the same queues.
#[derive(Debug, Clone)]
pub struct OriginLimiter {
    inner: Arc<Inner>,
}

impl OriginLimiter {
    /// Limit of concurrent jobs per origin (clamped to at least 1).
    pub fn new(limit: usize) -> Self {
        Self {
            inner: Arc::new(Inner {
                limit: limit.max(1),
                queues: Mutex::new(HashMap::new()),
            }),
        }
    }

    pub fn limit(&self) -> usize {
        self.inner.limit
    }

    /// Wait for a slot on `key`'s queue.
    pub async fn acquire(&self, key: &OriginKey) -> SlotGuard {
        loop {
            let rx = {
                let mut queues = self.inner.lock();
                let queue = queues.entry(key.clone()).or_default();
                if queue.active < self.inner.limit && queue.pending.is_empty() {
                    queue.active += 1;
                    return SlotGuard {
                        inner: Arc::clone(&self.inner),
                        key: key.clone(),
                        armed: true,
                    };
                }
                let (tx, rx) = oneshot::channel();
                queue.pending.push_back(tx);
                tracing::debug!(origin = %key, pending = queue.pending.len(), "queued behind origin limit");
                rx
            };
            // `release` always sends before dropping a sender, so an error
            // only means the entry was discarded; queue again.
            if let Ok(guard) = rx.await {
                return guard;
            }
        }
    }

    /// Run `job` once a slot on `key` is free; the slot is released when the
    /// job completes or the returned future is dropped.
    pub async fn enqueue<F, T>(&self, key: &OriginKey, job: F) -> T
    where
        F: Future<Output = T>,
    {
        let _slot = self.acquire(key).await;
        job.await
    }

    /// Jobs currently holding a slot for `key`.
    pub fn active(&self, key: &OriginKey) -> usize {
        self.inner.lock().get(key).map(|q| q.active).unwrap_or(0)
    }

    /// Live waiters queued for `key`.
    pub fn pending(&self, key: &OriginKey) -> usize {
        self.inner
            .lock()
            .get(key)
            .map(|q| q.pending.iter().filter(|tx| !tx.is_closed()).count())
            .unwrap_or(0)
    }
}
