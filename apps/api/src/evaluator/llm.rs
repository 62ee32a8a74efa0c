use async_trait::async_trait;
use tracing::{info, warn};

use crate::evaluation::request::EvaluationRequest;
use crate::evaluation::result::EvaluationResult;
use crate::evaluator::prompts::{build_evaluation_prompt, evaluation_system};
use crate::evaluator::recovery::recover_json;
use crate::evaluator::schema::validate_verdict;
use crate::evaluator::{Evaluator, EvaluatorError};
use crate::llm_client::LlmClient;

/// Scores submissions through the chat-completion backend.
///
/// Flow: build prompt → remote call → extract text → recover JSON → validate.
/// Fails at the first untrustworthy step instead of passing partial data on.
pub struct LlmEvaluator {
    llm: LlmClient,
}

impl LlmEvaluator {
    pub fn new(llm: LlmClient) -> Self {
        Self { llm }
    }

    /// Turns raw generated text into a validated result.
    pub fn interpret(raw: &str) -> Result<EvaluationResult, EvaluatorError> {
        let parsed = recover_json(raw)?;
        validate_verdict(&parsed)
    }
}

#[async_trait]
impl Evaluator for LlmEvaluator {
    async fn evaluate(
        &self,
        request: &EvaluationRequest,
    ) -> Result<EvaluationResult, EvaluatorError> {
        let prompt = build_evaluation_prompt(request);
        let response = self.llm.call(&prompt, &evaluation_system()).await?;
        let raw = response.text()?;

        let result = Self::interpret(&raw).map_err(|e| {
            warn!(model = self.llm.model(), "Rejected LLM verdict: {e}");
            e
        })?;

        info!(
            model = self.llm.model(),
            technical_score = result.technical_score(),
            softskill_score = result.softskill_score(),
            decision = %result.decision(),
            "LLM verdict accepted"
        );
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LlmSettings;
    use crate::evaluation::result::Decision;

    const CLEAN_REPLY: &str = r#"{
        "technical_score": 80,
        "softskill_score": "87.6",
        "strengths": ["Designed an idempotent job API"],
        "weaknesses": ["No retry strategy"],
        "summary": "Capable backend engineer.",
        "decision": "Hire"
    }"#;

    #[test]
    fn test_interpret_clean_reply() {
        let r = LlmEvaluator::interpret(CLEAN_REPLY).unwrap();
        assert_eq!(r.technical_score(), 80);
        assert_eq!(r.softskill_score(), 88);
        assert_eq!(r.decision(), Decision::Hire);
    }

    #[test]
    fn test_interpret_prose_wrapped_reply_matches_clean() {
        let wrapped = format!("Sure! {CLEAN_REPLY} Hope this helps.");
        assert_eq!(
            LlmEvaluator::interpret(&wrapped).unwrap(),
            LlmEvaluator::interpret(CLEAN_REPLY).unwrap()
        );
    }

    #[test]
    fn test_interpret_unparsable_reply() {
        assert!(matches!(
            LlmEvaluator::interpret("The candidate looks great overall."),
            Err(EvaluatorError::UnparsableResponse)
        ));
    }

    #[test]
    fn test_interpret_schema_violation() {
        let reply = CLEAN_REPLY.replace(r#""Hire""#, r#""Strong Hire""#);
        assert!(matches!(
            LlmEvaluator::interpret(&reply),
            Err(EvaluatorError::Schema(_))
        ));
    }

    #[tokio::test]
    async fn test_evaluate_without_credentials_is_configuration_error() {
        let llm = LlmClient::new(LlmSettings {
            api_key: None,
            api_url: "http://127.0.0.1:9/v1/chat/completions".to_string(),
            model: "gpt-4o-mini".to_string(),
            timeout_ms: 500,
            site_url: "http://localhost".to_string(),
            app_name: "test".to_string(),
        })
        .unwrap();
        let evaluator = LlmEvaluator::new(llm);
        let request = EvaluationRequest::new("cv", "report").unwrap();

        let err = evaluator.evaluate(&request).await.unwrap_err();
        assert!(matches!(err, EvaluatorError::Configuration(_)));
    }
}
