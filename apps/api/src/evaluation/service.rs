use tracing::info;

use crate::errors::AppError;
use crate::evaluation::request::EvaluationRequest;
use crate::jobs::job::{EvaluationJob, JobId};
use crate::jobs::queue::JobQueue;
use crate::jobs::repository::JobRepository;

/// Validates the submission, persists a new job and enqueues it.
/// Input errors surface before any job exists.
pub async fn submit_evaluation(
    jobs: &dyn JobRepository,
    queue: &JobQueue,
    request: EvaluationRequest,
) -> Result<EvaluationJob, AppError> {
    let job = EvaluationJob::new(request);
    jobs.save(&job).await?;
    queue.enqueue(&job);

    info!(job_id = %job.id(), "Evaluation submitted");
    Ok(job)
}

pub async fn get_evaluation(
    jobs: &dyn JobRepository,
    id: JobId,
) -> Result<Option<EvaluationJob>, AppError> {
    Ok(jobs.find_by_id(id).await?)
}
