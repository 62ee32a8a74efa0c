use thiserror::Error;

/// Rejected caller input. Never retried.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct ValidationError(pub String);

/// A candidate submission: CV text plus the project/case-study report.
///
/// Both bodies are stored trimmed and are guaranteed non-empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvaluationRequest {
    cv_text: String,
    report_text: String,
}

impl EvaluationRequest {
    pub fn new(cv_text: &str, report_text: &str) -> Result<Self, ValidationError> {
        let cv_text = cv_text.trim();
        let report_text = report_text.trim();

        if cv_text.is_empty() || report_text.is_empty() {
            return Err(ValidationError(
                "cv_text and report_text must be non-empty".to_string(),
            ));
        }

        Ok(Self {
            cv_text: cv_text.to_string(),
            report_text: report_text.to_string(),
        })
    }

    /// Builds a request from raw uploaded bytes. Anything that is not UTF-8
    /// text (or carries NUL bytes) is rejected as binary.
    pub fn from_bytes(cv: &[u8], report: &[u8]) -> Result<Self, ValidationError> {
        let cv_text = decode_text(cv, "cv_text")?;
        let report_text = decode_text(report, "report_text")?;
        Self::new(cv_text, report_text)
    }

    pub fn cv_text(&self) -> &str {
        &self.cv_text
    }

    pub fn report_text(&self) -> &str {
        &self.report_text
    }
}

fn decode_text<'a>(bytes: &'a [u8], field: &str) -> Result<&'a str, ValidationError> {
    let text = std::str::from_utf8(bytes)
        .map_err(|_| ValidationError(format!("{field} must be text, not binary data")))?;
    if text.contains('\0') {
        return Err(ValidationError(format!(
            "{field} must be text, not binary data"
        )));
    }
    Ok(text)
}
