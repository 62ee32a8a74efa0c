// Asynchronous job pipeline: entity + state machine, persistence contract,
// processor, and the single-worker queue that feeds it.

pub mod job;
pub mod processor;
pub mod queue;
pub mod repository;
