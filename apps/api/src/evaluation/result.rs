use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Hiring recommendation. Matching is case-sensitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Decision {
    Hire,
    Maybe,
    Reject,
}

impl Decision {
    pub const ALL: [Decision; 3] = [Decision::Hire, Decision::Maybe, Decision::Reject];

    pub fn as_str(&self) -> &'static str {
        match self {
            Decision::Hire => "Hire",
            Decision::Maybe => "Maybe",
            Decision::Reject => "Reject",
        }
    }
}

impl FromStr for Decision {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Decision::ALL
            .into_iter()
            .find(|d| d.as_str() == s)
            .ok_or_else(|| format!("Invalid decision: {s}"))
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Normalized verdict for one submission. Serializes as the external
/// result view (`technical_score`, `softskill_score`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluationResult {
    technical_score: u8,
    softskill_score: u8,
    strengths: Vec<String>,
    weaknesses: Vec<String>,
    summary: String,
    decision: Decision,
}

impl EvaluationResult {
    pub fn new(
        technical_score: u8,
        softskill_score: u8,
        strengths: Vec<String>,
        weaknesses: Vec<String>,
        summary: String,
        decision: Decision,
    ) -> Self {
        Self {
            technical_score,
            softskill_score,
            strengths,
            weaknesses,
            summary,
            decision,
        }
    }

    pub fn technical_score(&self) -> u8 {
        self.technical_score
    }

    pub fn softskill_score(&self) -> u8 {
        self.softskill_score
    }

    #[allow(dead_code)]
    pub fn strengths(&self) -> &[String] {
        &self.strengths
    }

    #[allow(dead_code)]
    pub fn weaknesses(&self) -> &[String] {
        &self.weaknesses
    }

    #[allow(dead_code)]
    pub fn summary(&self) -> &str {
        &self.summary
    }

    pub fn decision(&self) -> Decision {
        self.decision
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> EvaluationResult {
        EvaluationResult::new(
            82,
            74,
            vec!["Clean async Rust".to_string()],
            vec!["No load testing".to_string()],
            "Solid backend candidate.".to_string(),
            Decision::Hire,
        )
    }

    #[test]
    fn test_decision_from_str_is_case_sensitive() {
        assert_eq!("Maybe".parse::<Decision>().unwrap(), Decision::Maybe);
        assert!("maybe".parse::<Decision>().is_err());
        assert!("Strong Hire".parse::<Decision>().is_err());
    }

    #[test]
    fn test_result_view_uses_snake_case_keys() {
        let view = serde_json::to_value(sample()).unwrap();
        assert_eq!(view["technical_score"], 82);
        assert_eq!(view["softskill_score"], 74);
        assert_eq!(view["strengths"][0], "Clean async Rust");
        assert_eq!(view["weaknesses"][0], "No load testing");
        assert_eq!(view["summary"], "Solid backend candidate.");
        assert_eq!(view["decision"], "Hire");
    }

    #[test]
    fn test_identical_input_yields_identical_projection() {
        let a = sample();
        let b = sample();
        assert_eq!(a, b);
        assert_eq!(
            serde_json::to_value(&a).unwrap(),
            serde_json::to_value(&b).unwrap()
        );
    }
}
