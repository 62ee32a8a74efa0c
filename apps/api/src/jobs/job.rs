use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::evaluation::request::EvaluationRequest;
use crate::evaluation::result::EvaluationResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(Uuid);

impl JobId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for JobId {
    fn default() -> Self {
        Self::new()
    }
}

impl FromStr for JobId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Processing,
    Completed,
    Error,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Processing => "processing",
            JobStatus::Completed => "completed",
            JobStatus::Error => "error",
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One asynchronous evaluation: the submitted request and its eventual outcome.
///
/// State transitions are crate-private; only the processor drives them.
/// Invariants:
/// - `Completed` always carries a result and no error.
/// - `Error` always carries an error message. A prior result is kept.
/// - `attempts` never decreases and `updated_at` never moves backwards.
#[derive(Debug, Clone)]
pub struct EvaluationJob {
    id: JobId,
    request: EvaluationRequest,
    status: JobStatus,
    result: Option<EvaluationResult>,
    error: Option<String>,
    attempts: u32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// External projection of a job.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JobView {
    pub id: JobId,
    pub status: JobStatus,
    pub result: Option<EvaluationResult>,
    pub error: Option<String>,
    pub attempts: u32,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "updatedAt")]
    pub updated_at: DateTime<Utc>,
}

impl EvaluationJob {
    pub fn new(request: EvaluationRequest) -> Self {
        let now = Utc::now();
        Self {
            id: JobId::new(),
            request,
            status: JobStatus::Processing,
            result: None,
            error: None,
            attempts: 0,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn id(&self) -> JobId {
        self.id
    }

    pub fn request(&self) -> &EvaluationRequest {
        &self.request
    }

    pub fn status(&self) -> JobStatus {
        self.status
    }

    pub fn result(&self) -> Option<&EvaluationResult> {
        self.result.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    #[allow(dead_code)]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    #[allow(dead_code)]
    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn to_view(&self) -> JobView {
        JobView {
            id: self.id,
            status: self.status,
            result: self.result.clone(),
            error: self.error.clone(),
            attempts: self.attempts,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }

    pub(crate) fn mark_processing(&mut self) {
        self.status = JobStatus::Processing;
        self.touch();
    }

    pub(crate) fn increment_attempts(&mut self) {
        self.attempts = self.attempts.saturating_add(1);
        self.touch();
    }

    pub(crate) fn mark_completed(&mut self, result: EvaluationResult) {
        self.status = JobStatus::Completed;
        self.result = Some(result);
        self.error = None;
        self.touch();
    }

    pub(crate) fn mark_error(&mut self, message: impl Into<String>) {
        self.status = JobStatus::Error;
        self.error = Some(message.into());
        self.touch();
    }

    fn touch(&mut self) {
        // Wall clock can step backwards; updated_at must not.
        self.updated_at = self.updated_at.max(Utc::now());
    }
}
