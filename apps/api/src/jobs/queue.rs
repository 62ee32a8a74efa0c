//! In-process single-worker job queue.
//!
//! `enqueue` appends the job id and spawns a drain step; it never blocks and
//! never calls the processor itself. A drain step claims the busy flag and
//! pops the head id under one lock, so at most one job is processed at any
//! instant and jobs start in FIFO order. After each processed job, or a
//! skipped one, the next drain step is spawned if ids remain.
//!
//! Not durable: pending ids are lost on restart.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{debug, error, warn};

use crate::jobs::job::{EvaluationJob, JobId};
use crate::jobs::processor::EvaluationProcessor;
use crate::jobs::repository::JobRepository;

#[derive(Default)]
struct QueueState {
    pending: VecDeque<JobId>,
    busy: bool,
}

struct Inner {
    jobs: Arc<dyn JobRepository>,
    processor: EvaluationProcessor,
    state: Mutex<QueueState>,
}

#[derive(Clone)]
pub struct JobQueue {
    inner: Arc<Inner>,
}

impl JobQueue {
    pub fn new(jobs: Arc<dyn JobRepository>, processor: EvaluationProcessor) -> Self {
        Self {
            inner: Arc::new(Inner {
                jobs,
                processor,
                state: Mutex::new(QueueState::default()),
            }),
        }
    }

    /// Fire-and-forget. Must be called from within a Tokio runtime.
    pub fn enqueue(&self, job: &EvaluationJob) {
        let queued = {
            let mut state = self.inner.lock_state();
            state.pending.push_back(job.id());
            state.pending.len()
        };
        debug!(job_id = %job.id(), queued, "Enqueued job");
        Inner::schedule(&self.inner);
    }

    /// Number of ids waiting to start (the in-flight job is not counted).
    pub fn pending(&self) -> usize {
        self.inner.lock_state().pending.len()
    }

    pub fn is_busy(&self) -> bool {
        self.inner.lock_state().busy
    }
}

impl Inner {
    fn lock_state(&self) -> MutexGuard<'_, QueueState> {
        // State stays consistent even if a holder panicked: every critical
        // section is a single push, pop, or flag write.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn schedule(inner: &Arc<Self>) {
        let inner = Arc::clone(inner);
        tokio::spawn(async move { inner.drain_step().await });
    }

    /// Pops the head id and claims the worker, or does nothing if the
    /// worker is already claimed or nothing is pending.
    fn claim_next(&self) -> Option<JobId> {
        let mut state = self.lock_state();
        if state.busy {
            return None;
        }
        let id = state.pending.pop_front()?;
        state.busy = true;
        Some(id)
    }

    /// Releases the worker; returns whether more ids are waiting.
    fn release(&self) -> bool {
        let mut state = self.lock_state();
        state.busy = false;
        !state.pending.is_empty()
    }

    async fn drain_step(self: Arc<Self>) {
        let Some(job_id) = self.claim_next() else {
            return;
        };

        match self.jobs.find_by_id(job_id).await {
            Ok(Some(job)) => {
                debug!(job_id = %job_id, "Dequeued job");
                let processor = self.processor.clone();
                // Run on its own task so a panic inside processing is contained
                // and the worker is still released.
                if let Err(e) = tokio::spawn(async move { processor.process(job).await }).await {
                    error!(job_id = %job_id, "Job processing aborted: {e}");
                }
            }
            Ok(None) => {
                warn!(job_id = %job_id, "Job not found when processing, skipping");
            }
            Err(e) => {
                error!(job_id = %job_id, "Queue failed to load job: {e}");
            }
        }

        if self.release() {
            Self::schedule(&self);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use async_trait::async_trait;
    use tokio::time::{sleep, Instant};

    use crate::evaluation::request::EvaluationRequest;
    use crate::evaluation::result::{Decision, EvaluationResult};
    use crate::evaluator::{Evaluator, EvaluatorError};
    use crate::jobs::job::JobStatus;
    use crate::jobs::repository::{InMemoryJobRepository, RepositoryError};

    /// Records the processing window of each call; the first call is slow.
    #[derive(Default)]
    struct SlowEvaluator {
        windows: Mutex<Vec<(String, Instant, Instant)>>,
    }

    #[async_trait]
    impl Evaluator for SlowEvaluator {
        async fn evaluate(
            &self,
            request: &EvaluationRequest,
        ) -> Result<EvaluationResult, EvaluatorError> {
            let start = Instant::now();
            let first_call = self.windows.lock().unwrap().is_empty();
            let delay = if first_call { 500 } else { 10 };
            sleep(Duration::from_millis(delay)).await;
            self.windows
                .lock()
                .unwrap()
                .push((request.cv_text().to_string(), start, Instant::now()));
            Ok(EvaluationResult::new(
                50,
                50,
                vec![],
                vec![],
                String::new(),
                Decision::Maybe,
            ))
        }
    }

    struct PanickingEvaluator;

    #[async_trait]
    impl Evaluator for PanickingEvaluator {
        async fn evaluate(
            &self,
            request: &EvaluationRequest,
        ) -> Result<EvaluationResult, EvaluatorError> {
            if request.cv_text() == "panic" {
                panic!("evaluator bug");
            }
            Ok(EvaluationResult::new(90, 90, vec![], vec![], String::new(), Decision::Hire))
        }
    }

    /// Fails lookups for one poisoned id; delegates everything else.
    struct FlakyRepository {
        inner: InMemoryJobRepository,
        broken: Mutex<Option<JobId>>,
    }

    #[async_trait]
    impl JobRepository for FlakyRepository {
        async fn save(&self, job: &EvaluationJob) -> Result<(), RepositoryError> {
            self.inner.save(job).await
        }

        async fn find_by_id(&self, id: JobId) -> Result<Option<EvaluationJob>, RepositoryError> {
            let broken = *self.broken.lock().unwrap() == Some(id);
            if broken {
                return Err(RepositoryError::Unavailable("connection reset".to_string()));
            }
            self.inner.find_by_id(id).await
        }

        async fn update(&self, job: &EvaluationJob) -> Result<(), RepositoryError> {
            self.inner.update(job).await
        }
    }

    async fn submit(repo: &dyn JobRepository, queue: &JobQueue, cv: &str) -> EvaluationJob {
        let job = EvaluationJob::new(EvaluationRequest::new(cv, "report").unwrap());
        repo.save(&job).await.unwrap();
        queue.enqueue(&job);
        job
    }

    async fn wait_until_settled(repo: &dyn JobRepository, ids: &[JobId]) {
        for _ in 0..1_000 {
            let mut settled = true;
            for id in ids {
                let job = repo.find_by_id(*id).await.unwrap().unwrap();
                settled &= job.status() != JobStatus::Processing;
            }
            if settled {
                return;
            }
            sleep(Duration::from_millis(10)).await;
        }
        panic!("jobs did not settle");
    }

    #[tokio::test(start_paused = true)]
    async fn test_jobs_are_serialized_in_fifo_order() {
        let repo = Arc::new(InMemoryJobRepository::new());
        let evaluator = Arc::new(SlowEvaluator::default());
        let processor = EvaluationProcessor::new(repo.clone(), evaluator.clone());
        let queue = JobQueue::new(repo.clone(), processor);

        let first = submit(&*repo, &queue, "first").await;
        let second = submit(&*repo, &queue, "second").await;
        let third = submit(&*repo, &queue, "third").await;

        wait_until_settled(&*repo, &[first.id(), second.id(), third.id()]).await;

        let windows = evaluator.windows.lock().unwrap().clone();
        let order: Vec<_> = windows.iter().map(|(cv, _, _)| cv.as_str()).collect();
        assert_eq!(order, ["first", "second", "third"]);
        for pair in windows.windows(2) {
            let prev_end = pair[0].2;
            let next_start = pair[1].1;
            assert!(next_start >= prev_end, "processing windows overlap");
        }
        assert_eq!(queue.pending(), 0);
        assert!(!queue.is_busy());
    }

    #[tokio::test(start_paused = true)]
    async fn test_enqueue_returns_before_processing() {
        let repo = Arc::new(InMemoryJobRepository::new());
        let processor = EvaluationProcessor::new(repo.clone(), Arc::new(SlowEvaluator::default()));
        let queue = JobQueue::new(repo.clone(), processor);

        let job = submit(&*repo, &queue, "cv").await;
        let stored = repo.find_by_id(job.id()).await.unwrap().unwrap();
        assert_eq!(stored.attempts(), 0);
        assert_eq!(stored.status(), JobStatus::Processing);

        wait_until_settled(&*repo, &[job.id()]).await;
        let stored = repo.find_by_id(job.id()).await.unwrap().unwrap();
        assert_eq!(stored.status(), JobStatus::Completed);
        assert_eq!(stored.attempts(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_missing_job_is_skipped() {
        let repo = Arc::new(InMemoryJobRepository::new());
        let processor = EvaluationProcessor::new(repo.clone(), Arc::new(SlowEvaluator::default()));
        let queue = JobQueue::new(repo.clone(), processor);

        let ghost = EvaluationJob::new(EvaluationRequest::new("ghost", "report").unwrap());
        queue.enqueue(&ghost);
        let real = submit(&*repo, &queue, "real").await;

        wait_until_settled(&*repo, &[real.id()]).await;
        assert!(repo.find_by_id(ghost.id()).await.unwrap().is_none());
        assert_eq!(
            repo.find_by_id(real.id()).await.unwrap().unwrap().status(),
            JobStatus::Completed
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_lookup_failure_does_not_stop_the_queue() {
        let repo = Arc::new(FlakyRepository {
            inner: InMemoryJobRepository::new(),
            broken: Mutex::new(None),
        });
        let processor = EvaluationProcessor::new(repo.clone(), Arc::new(SlowEvaluator::default()));
        let queue = JobQueue::new(repo.clone(), processor);

        let job = EvaluationJob::new(EvaluationRequest::new("broken", "report").unwrap());
        repo.save(&job).await.unwrap();
        *repo.broken.lock().unwrap() = Some(job.id());
        queue.enqueue(&job);
        let healthy = submit(&*repo, &queue, "healthy").await;

        wait_until_settled(&repo.inner, &[healthy.id()]).await;
        assert_eq!(
            repo.inner.find_by_id(healthy.id()).await.unwrap().unwrap().status(),
            JobStatus::Completed
        );
        // The broken job was dropped from the queue, never processed.
        assert_eq!(repo.inner.find_by_id(job.id()).await.unwrap().unwrap().attempts(), 0);
        assert!(!queue.is_busy());
    }

    #[tokio::test(start_paused = true)]
    async fn test_processing_panic_releases_worker() {
        let repo = Arc::new(InMemoryJobRepository::new());
        let processor = EvaluationProcessor::new(repo.clone(), Arc::new(PanickingEvaluator));
        let queue = JobQueue::new(repo.clone(), processor);

        let _doomed = submit(&*repo, &queue, "panic").await;
        let after = submit(&*repo, &queue, "fine").await;

        wait_until_settled(&*repo, &[after.id()]).await;
        assert_eq!(
            repo.find_by_id(after.id()).await.unwrap().unwrap().status(),
            JobStatus::Completed
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_reenqueued_completed_job_is_reprocessed() {
        let repo = Arc::new(InMemoryJobRepository::new());
        let processor = EvaluationProcessor::new(repo.clone(), Arc::new(SlowEvaluator::default()));
        let queue = JobQueue::new(repo.clone(), processor);

        let job = submit(&*repo, &queue, "again").await;
        wait_until_settled(&*repo, &[job.id()]).await;

        queue.enqueue(&job);
        for _ in 0..100 {
            let stored = repo.find_by_id(job.id()).await.unwrap().unwrap();
            if stored.attempts() == 2 && !queue.is_busy() {
                break;
            }
            sleep(Duration::from_millis(10)).await;
        }
        let stored = repo.find_by_id(job.id()).await.unwrap().unwrap();
        assert_eq!(stored.attempts(), 2);
        assert_eq!(stored.status(), JobStatus::Completed);
    }
}
