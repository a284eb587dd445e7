use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use super::sampler::Sample;
use super::{Job, JobId, JobStatus};

/// Shared map of live jobs. Readers get snapshots; writes go through the
/// [`JobHandle`] returned by [`JobRegistry::register`].
#[derive(Debug, Clone, Default)]
pub struct JobRegistry {
    jobs: Arc<RwLock<HashMap<JobId, Job>>>,
}

impl JobRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a new job and hand back the only writer for it.
    pub fn register(&self, job: Job) -> JobHandle {
        let id = job.id;
        self.jobs
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id, job);
        JobHandle {
            id,
            registry: self.clone(),
        }
    }

    pub fn get(&self, id: &JobId) -> Option<Job> {
        self.jobs
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(id)
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.jobs.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn update<F>(&self, id: &JobId, f: F)
    where
        F: FnOnce(&mut Job),
    {
        let mut jobs = self.jobs.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(job) = jobs.get_mut(id) {
            f(job);
        }
    }

    fn remove(&self, id: &JobId) {
        self.jobs
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(id);
    }
}

/// Write access to one registered job. Not `Clone`: one pipeline task owns it.
#[derive(Debug)]
pub struct JobHandle {
    id: JobId,
    registry: JobRegistry,
}

impl JobHandle {
    pub fn id(&self) -> JobId {
        self.id
    }

    pub fn snapshot(&self) -> Option<Job> {
        self.registry.get(&self.id)
    }

    /// `queued` → `downloading`, seeding `totalBytes` with the size estimate.
    pub fn mark_downloading(&self, expected_bytes: u64) {
        self.registry.update(&self.id, |job| {
            if job.status == JobStatus::Queued {
                job.status = JobStatus::Downloading;
                job.total_bytes = expected_bytes;
            }
        });
    }

    /// Apply a sampler reading. Progress never decreases and stays below 100.
    pub fn record_progress(&self, sample: Sample) {
        self.registry.update(&self.id, |job| {
            if job.status != JobStatus::Downloading {
                return;
            }
            job.progress = job.progress.max(sample.progress.min(99));
            job.downloaded_bytes = sample.downloaded_bytes;
            job.total_bytes = sample.total_bytes;
        });
    }

    /// Validated output of `size` bytes: the job is done.
    pub fn complete(&self, size: u64) {
        self.registry.update(&self.id, |job| {
            if job.status.is_terminal() {
                return;
            }
            job.status = JobStatus::Complete;
            job.progress = 100;
            job.downloaded_bytes = size;
            job.total_bytes = size;
        });
    }

    pub fn fail(&self, message: impl Into<String>) {
        let message = message.into();
        self.registry.update(&self.id, |job| {
            if job.status.is_terminal() {
                return;
            }
            job.status = JobStatus::Error;
            job.error = Some(message);
        });
    }

    /// Drop the job from the registry.
    pub fn evict(self) {
        self.registry.remove(&self.id);
    }
}
