use serde::{Deserialize, Serialize};

use super::domain::{EvaluatedType, Evaluation, EvaluationId, NewEvaluation};
use crate::workflows::catalog::ProjectId;
use crate::workflows::store::RepositoryError;

/// Per-project averages returned by the aggregate query.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EvaluationAggregate {
    pub technical_skills: f64,
    pub communication: f64,
    pub teamwork: f64,
    pub punctuality: f64,
    pub count: u64,
}

/// Storage abstraction for evaluations.
///
/// `insert` must return [`RepositoryError::Conflict`] for any row of a project that already
/// holds its `EvaluatedType::Project` row, atomically with the write. This covers both a
/// second final evaluation and a talent evaluation arriving after the lock; the service
/// relies on that signal rather than on its own existence checks.
pub trait EvaluationRepository: Send + Sync {
    fn exists_for(
        &self,
        project_id: &ProjectId,
        evaluated_type: EvaluatedType,
    ) -> Result<bool, RepositoryError>;

    fn find_one(
        &self,
        project_id: &ProjectId,
        evaluated_type: EvaluatedType,
    ) -> Result<Option<Evaluation>, RepositoryError>;

    fn insert(&self, evaluation: NewEvaluation) -> Result<Evaluation, RepositoryError>;

    fn delete(&self, id: EvaluationId) -> Result<(), RepositoryError>;

    /// `None` when the project has no evaluation rows at all.
    fn aggregate(
        &self,
        project_id: &ProjectId,
    ) -> Result<Option<EvaluationAggregate>, RepositoryError>;

    fn list_for_project(&self, project_id: &ProjectId) -> Result<Vec<Evaluation>, RepositoryError>;
}
