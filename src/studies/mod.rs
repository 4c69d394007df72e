//! Credit-study scoring: domain types, the pure engine, and the perform
//! orchestration that persists a score back onto its study.

pub mod domain;
pub mod repository;
pub mod router;
pub(crate) mod scoring;
pub mod service;

#[cfg(test)]
mod tests;

pub use domain::{
    FinancialInputs, ScoreFlag, ScoreRecord, ScoreResult, ScoredStudy, StudyRecord,
};
pub use repository::StudyStore;
pub use router::study_router;
pub use scoring::compute;
pub use service::{ScoringServiceError, StudyScoringService};
