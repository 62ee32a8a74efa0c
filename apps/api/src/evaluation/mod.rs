// Candidate evaluation: submission value objects, verdicts, use cases and
// the HTTP surface. Scoring itself lives behind the `Evaluator` trait.

pub mod handlers;
pub mod request;
pub mod result;
pub mod service;
