use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use futures::stream::{self, Stream};
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::time::MissedTickBehavior;

use super::ProgressMessage;
use crate::job::{JobId, JobRegistry};

/// Buffered payloads per job; slower subscribers skip ahead.
const CHANNEL_CAPACITY: usize = 16;

struct HubInner {
    registry: JobRegistry,
    interval: Duration,
    channels: Mutex<HashMap<JobId, broadcast::Sender<ProgressMessage>>>,
}

impl HubInner {
    fn lock(&self) -> MutexGuard<'_, HashMap<JobId, broadcast::Sender<ProgressMessage>>> {
        self.channels.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// One event source per job, fanned out to any number of subscribers.
///
/// A ticker per job reads the registry every interval and broadcasts the
/// snapshot; after the first terminal payload the source is dropped.
/// Sending and subscribing happen under the same lock, so a subscriber
/// either receives the terminal payload or finds it in the registry.
#[derive(Clone)]
pub struct ProgressHub {
    inner: Arc<HubInner>,
}

impl ProgressHub {
    pub fn new(registry: JobRegistry, interval: Duration) -> Self {
        Self {
            inner: Arc::new(HubInner {
                registry,
                interval,
                channels: Mutex::new(HashMap::new()),
            }),
        }
    }

    /// Create the event source for a registered job and start its ticker.
    pub fn open(&self, id: JobId) {
        let (tx, _) = broadcast::channel(CHANNEL_CAPACITY);
        self.inner.lock().insert(id, tx);
        tokio::spawn(tick(Arc::clone(&self.inner), id));
    }

    /// Publish the job's current (terminal) state now and drop its event
    /// source. No-op if the ticker already did.
    pub fn close(&self, id: &JobId) {
        let mut channels = self.inner.lock();
        if let Some(tx) = channels.remove(id) {
            if let Some(job) = self.inner.registry.get(id) {
                let _ = tx.send(ProgressMessage::from_job(&job));
            }
        }
    }

    /// Jobs with a live event source.
    pub fn open_sources(&self) -> usize {
        self.inner.lock().len()
    }

    /// Current state first, then live updates until terminal. Unknown ids get
    /// an acknowledgement and nothing else.
    pub fn subscribe(&self, id: &JobId) -> Subscription {
        let channels = self.inner.lock();
        let initial = match self.inner.registry.get(id) {
            Some(job) => ProgressMessage::from_job(&job),
            None => ProgressMessage::connected(id.to_string()),
        };
        let rx = if initial.ends_stream() {
            None
        } else {
            channels.get(id).map(broadcast::Sender::subscribe)
        };
        Subscription {
            initial: Some(initial),
            rx,
        }
    }
}

async fn tick(inner: Arc<HubInner>, id: JobId) {
    let mut ticker = tokio::time::interval(inner.interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    loop {
        ticker.tick().await;
        let mut channels = inner.lock();
        let Some(job) = inner.registry.get(&id) else {
            channels.remove(&id);
            tracing::debug!(job_id = %id, "job gone; closing progress source");
            return;
        };
        let Some(tx) = channels.get(&id) else {
            // Closed by the job itself.
            return;
        };
        let message = ProgressMessage::from_job(&job);
        let last = message.ends_stream();
        // No receivers is fine.
        let _ = tx.send(message);
        if last {
            channels.remove(&id);
            tracing::debug!(job_id = %id, status = %job.status, "terminal progress sent");
            return;
        }
    }
}

/// One subscriber's view of a job's progress.
#[derive(Debug)]
pub struct Subscription {
    initial: Option<ProgressMessage>,
    rx: Option<broadcast::Receiver<ProgressMessage>>,
}

impl Subscription {
    /// Subscription that yields only the acknowledgement for `download_id`.
    pub fn ack_only(download_id: impl Into<String>) -> Self {
        Self {
            initial: Some(ProgressMessage::connected(download_id)),
            rx: None,
        }
    }

    /// Next payload, or `None` once the stream has ended.
    pub async fn next(&mut self) -> Option<ProgressMessage> {
        if let Some(initial) = self.initial.take() {
            return Some(initial);
        }
        let rx = self.rx.as_mut()?;
        let received = loop {
            match rx.recv().await {
                Ok(message) => break Some(message),
                Err(RecvError::Lagged(skipped)) => {
                    tracing::debug!(skipped, "progress subscriber lagged");
                }
                Err(RecvError::Closed) => break None,
            }
        };
        if !matches!(&received, Some(m) if !m.ends_stream()) {
            self.rx = None;
        }
        received
    }

    pub fn into_stream(self) -> impl Stream<Item = ProgressMessage> + Send + 'static {
        stream::unfold(self, |mut sub| async move {
            let message = sub.next().await?;
            Some((message, sub))
        })
    }
}
