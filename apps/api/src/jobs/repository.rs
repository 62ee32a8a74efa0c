use std::collections::HashMap;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::RwLock;

use crate::jobs::job::{EvaluationJob, JobId};

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("Job {0} already exists")]
    AlreadyExists(JobId),

    #[error("Job {0} not found")]
    NotFound(JobId),

    #[error("Job store unavailable: {0}")]
    Unavailable(String),
}

/// Persistence contract for jobs. The full entity is the unit of
/// persistence; every write is a last-writer-wins overwrite.
#[async_trait]
pub trait JobRepository: Send + Sync {
    /// Persists a new job. Fails if the id is already taken.
    async fn save(&self, job: &EvaluationJob) -> Result<(), RepositoryError>;

    async fn find_by_id(&self, id: JobId) -> Result<Option<EvaluationJob>, RepositoryError>;

    /// Overwrites an existing job. Fails if no job with that id exists.
    async fn update(&self, job: &EvaluationJob) -> Result<(), RepositoryError>;
}

/// Process-local job store. Contents are lost on restart.
#[derive(Default)]
pub struct InMemoryJobRepository {
    jobs: RwLock<HashMap<JobId, EvaluationJob>>,
}

impl InMemoryJobRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl JobRepository for InMemoryJobRepository {
    async fn save(&self, job: &EvaluationJob) -> Result<(), RepositoryError> {
        let mut jobs = self.jobs.write().await;
        if jobs.contains_key(&job.id()) {
            return Err(RepositoryError::AlreadyExists(job.id()));
        }
        jobs.insert(job.id(), job.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: JobId) -> Result<Option<EvaluationJob>, RepositoryError> {
        Ok(self.jobs.read().await.get(&id).cloned())
    }

    async fn update(&self, job: &EvaluationJob) -> Result<(), RepositoryError> {
        let mut jobs = self.jobs.write().await;
        match jobs.get_mut(&job.id()) {
            Some(stored) => {
                *stored = job.clone();
                Ok(())
            }
            None => Err(RepositoryError::NotFound(job.id())),
        }
    }
}
