// Evaluator LLM prompt templates.

use crate::evaluation::request::EvaluationRequest;
use crate::llm_client::prompts::JSON_ONLY_SYSTEM;

pub const EVALUATION_ROLE: &str = "You are an impartial backend engineering recruiter.";

/// Fixed instruction block. Deterministic: only the two submission bodies vary.
pub const EVALUATION_INSTRUCTIONS: &str = r#"You are a technical evaluator for backend software engineers. Evaluate the candidate based on the provided CV and study case report. Respond ONLY with valid JSON following this schema:
{
  "technical_score": 0-100,
  "softskill_score": 0-100,
  "strengths": [string],
  "weaknesses": [string],
  "summary": string,
  "decision": "Hire" | "Maybe" | "Reject"
}
Be objective, concise, and reference missing information as applicable."#;

pub fn evaluation_system() -> String {
    format!("{EVALUATION_ROLE} {JSON_ONLY_SYSTEM}")
}

/// Submission text is appended verbatim, never substituted into the
/// template, so braces or placeholders inside a CV cannot alter the prompt.
pub fn build_evaluation_prompt(request: &EvaluationRequest) -> String {
    format!(
        "{EVALUATION_INSTRUCTIONS}\n\n# Candidate CV\n{}\n\n# Case Study Submission\n{}",
        request.cv_text(),
        request.report_text()
    )
}
