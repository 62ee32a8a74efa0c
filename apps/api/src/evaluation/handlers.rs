//! Axum route handlers for the Evaluation API.

use axum::{
    async_trait,
    extract::{multipart::Field, FromRequest, Multipart, Path, Request, State},
    http::{header::CONTENT_TYPE, StatusCode},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::evaluation::request::{EvaluationRequest, ValidationError};
use crate::evaluation::result::EvaluationResult;
use crate::evaluation::service::{get_evaluation, submit_evaluation};
use crate::jobs::job::{JobId, JobStatus};
use crate::state::AppState;

/// Per-file upload cap.
pub const MAX_UPLOAD_BYTES: usize = 2 * 1024 * 1024;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct SubmitBody {
    pub cv_text: Option<String>,
    pub report_text: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SubmitResponse {
    pub job_id: JobId,
    pub status: JobStatus,
}

#[derive(Debug, Serialize)]
pub struct ResultResponse {
    pub job_id: JobId,
    pub status: JobStatus,
    pub result: Option<EvaluationResult>,
    pub error: Option<String>,
}

/// A validated submission, read from either a multipart form or a JSON body.
pub struct Submission(pub EvaluationRequest);

#[async_trait]
impl<S> FromRequest<S> for Submission
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_multipart = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|ct| ct.starts_with("multipart/form-data"));

        if is_multipart {
            let multipart = Multipart::from_request(req, state)
                .await
                .map_err(|e| AppError::Validation(e.body_text()))?;
            return read_multipart(multipart).await.map(Submission);
        }

        let Json(body) = Json::<SubmitBody>::from_request(req, state)
            .await
            .map_err(|e| AppError::Validation(e.body_text()))?;
        let (cv_text, report_text) = body
            .cv_text
            .zip(body.report_text)
            .ok_or_else(missing_fields)?;
        Ok(Submission(EvaluationRequest::new(&cv_text, &report_text)?))
    }
}

/// File parts win over inline text parts of the same submission.
async fn read_multipart(mut multipart: Multipart) -> Result<EvaluationRequest, AppError> {
    let mut cv_file = None;
    let mut report_file = None;
    let mut cv_text = None;
    let mut report_text = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(e.body_text()))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "cv_file" => cv_file = Some(read_file(field, "cv_file").await?),
            "report_file" => report_file = Some(read_file(field, "report_file").await?),
            "cv_text" => cv_text = Some(read_file(field, "cv_text").await?),
            "report_text" => report_text = Some(read_file(field, "report_text").await?),
            _ => {}
        }
    }

    let cv = cv_file.or(cv_text).ok_or_else(missing_fields)?;
    let report = report_file.or(report_text).ok_or_else(missing_fields)?;
    Ok(EvaluationRequest::from_bytes(&cv, &report)?)
}

async fn read_file(field: Field<'_>, name: &str) -> Result<Vec<u8>, AppError> {
    let is_file = field.file_name().is_some();
    let bytes = field
        .bytes()
        .await
        .map_err(|e| AppError::Validation(e.body_text()))?;

    if is_file && bytes.is_empty() {
        return Err(AppError::Validation(format!("{name} must not be empty")));
    }
    if bytes.len() > MAX_UPLOAD_BYTES {
        return Err(AppError::Validation(format!(
            "{name} exceeds the {} MiB upload limit",
            MAX_UPLOAD_BYTES / (1024 * 1024)
        )));
    }
    Ok(bytes.to_vec())
}

fn missing_fields() -> ValidationError {
    ValidationError("cv_text and report_text are required".to_string())
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /evaluate
///
/// Accepts the submission and returns a job id immediately; the evaluation
/// runs on the background queue.
pub async fn handle_submit(
    State(state): State<AppState>,
    Submission(request): Submission,
) -> Result<(StatusCode, Json<SubmitResponse>), AppError> {
    let job = submit_evaluation(state.jobs.as_ref(), &state.queue, request).await?;
    Ok((
        StatusCode::ACCEPTED,
        Json(SubmitResponse {
            job_id: job.id(),
            status: job.status(),
        }),
    ))
}

/// GET /result/:id
pub async fn handle_get_result(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ResultResponse>, AppError> {
    let not_found = || AppError::NotFound("Job not found".to_string());
    let id: JobId = id.parse().map_err(|_| not_found())?;
    let job = get_evaluation(state.jobs.as_ref(), id)
        .await?
        .ok_or_else(not_found)?;

    let view = job.to_view();
    Ok(Json(ResultResponse {
        job_id: view.id,
        status: view.status,
        result: view.result,
        error: view.error,
    }))
}
