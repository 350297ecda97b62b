//! Project evaluations and the final evaluation lock workflow.
//!
//! A project is "locked" once its final evaluation exists. The lock is derived from the
//! presence of that record rather than stored as a flag, so the record store's uniqueness
//! guarantee is the only thing keeping the state consistent.

pub mod domain;
pub mod policy;
pub mod repository;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use domain::{
    EvaluatedType, Evaluation, EvaluationId, EvaluationPayload, EvaluatorId, EvaluatorType,
    FinalSummary, NewEvaluation, ScoreCard, TalentEvaluationSubmission,
};
pub use policy::{EvaluationPolicy, ScoreWeights, ValidationError};
pub use repository::{EvaluationAggregate, EvaluationRepository};
pub use router::{evaluation_router, ErrorResponse, FinalEvaluationRequest};
pub use service::{
    Clock, ErrorKind, EvaluationServiceError, FinalEvaluationService, FixedClock, SystemClock,
};
