//! Evaluator — the capability that turns a submission into a verdict.
//!
//! The processor and queue only see `Arc<dyn Evaluator>`; the LLM-backed
//! implementation lives in `llm`. An evaluator either returns a fully
//! validated result or fails. It never returns partial data.

use async_trait::async_trait;
use thiserror::Error;

use crate::evaluation::request::EvaluationRequest;
use crate::evaluation::result::EvaluationResult;
use crate::llm_client::LlmError;

pub mod llm;
pub mod prompts;
pub mod recovery;
pub mod schema;

pub use llm::LlmEvaluator;

#[derive(Debug, Error)]
pub enum EvaluatorError {
    /// Required credentials are missing. Raised before any network attempt.
    #[error("{0}")]
    Configuration(String),

    #[error("LLM API error ({status}): {detail}")]
    RemoteCall { status: u16, detail: String },

    #[error("No response received from LLM API")]
    NoResponse,

    #[error("Failed to call LLM API: {0}")]
    Transport(String),

    #[error("{0}")]
    MalformedResponse(String),

    #[error("LLM response was not valid JSON")]
    UnparsableResponse,

    #[error("{0}")]
    Schema(String),
}

impl From<LlmError> for EvaluatorError {
    fn from(e: LlmError) -> Self {
        match e {
            LlmError::MissingApiKey => EvaluatorError::Configuration(e.to_string()),
            LlmError::Api { status, detail } => EvaluatorError::RemoteCall { status, detail },
            LlmError::NoResponse(_) => EvaluatorError::NoResponse,
            LlmError::Http(inner) => EvaluatorError::Transport(inner.to_string()),
            LlmError::MalformedResponse(msg) => EvaluatorError::MalformedResponse(msg),
        }
    }
}

/// Scores a submission. Implement this to swap backends without touching
/// the processor, queue, or handlers.
#[async_trait]
pub trait Evaluator: Send + Sync {
    async fn evaluate(&self, request: &EvaluationRequest)
        -> Result<EvaluationResult, EvaluatorError>;
}
