//! Evaluation Processor — drives one job through the evaluator.
//!
//! Flow: mark processing + count attempt → persist → evaluate →
//!       mark completed or error → persist.
//!
//! `process` never fails at the call level: evaluator failures become an
//! `Error` state on the job, and persistence failures are logged. The
//! current status is not checked first, so reprocessing a completed job
//! re-runs the evaluation and overwrites its result.

use std::sync::Arc;

use tracing::{error, info, warn};

use crate::evaluator::Evaluator;
use crate::jobs::job::EvaluationJob;
use crate::jobs::repository::JobRepository;

#[derive(Clone)]
pub struct EvaluationProcessor {
    jobs: Arc<dyn JobRepository>,
    evaluator: Arc<dyn Evaluator>,
}

impl EvaluationProcessor {
    pub fn new(jobs: Arc<dyn JobRepository>, evaluator: Arc<dyn Evaluator>) -> Self {
        Self { jobs, evaluator }
    }

    pub async fn process(&self, mut job: EvaluationJob) -> EvaluationJob {
        job.mark_processing();
        job.increment_attempts();
        // Intent-to-process is durable before the remote call.
        self.persist(&job).await;

        match self.evaluator.evaluate(job.request()).await {
            Ok(result) => {
                info!(
                    job_id = %job.id(),
                    attempts = job.attempts(),
                    decision = %result.decision(),
                    "Evaluation completed"
                );
                job.mark_completed(result);
            }
            Err(e) => {
                warn!(job_id = %job.id(), attempts = job.attempts(), "Evaluation failed: {e}");
                job.mark_error(e.to_string());
            }
        }

        self.persist(&job).await;
        job
    }

    async fn persist(&self, job: &EvaluationJob) {
        if let Err(e) = self.jobs.update(job).await {
            error!(job_id = %job.id(), status = %job.status(), "Failed to persist job: {e}");
        }
    }
}
