use std::sync::Arc;

use chrono::{Local, NaiveDate};
use tracing::{debug, info, warn};

use super::domain::{
    EvaluatedType, Evaluation, EvaluationPayload, EvaluatorId, EvaluatorType, FinalSummary,
    NewEvaluation, ScoreCard, TalentEvaluationSubmission,
};
use super::policy::{round_two, EvaluationPolicy, ValidationError};
use super::repository::EvaluationRepository;
use crate::workflows::catalog::{Project, ProjectCatalog, ProjectId};
use crate::workflows::store::RepositoryError;

/// Source of "today" for evaluation dates.
pub trait Clock: Send + Sync {
    fn today(&self) -> NaiveDate;
}

/// Local wall-clock date.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// Clock pinned to one date, for demos and tests.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}

/// Coarse error category used by transport layers to pick a response status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Conflict,
    NotFound,
    InvalidState,
    Validation,
    Unavailable,
}

/// Error raised by the evaluation service.
#[derive(Debug, thiserror::Error)]
pub enum EvaluationServiceError {
    #[error("final evaluation already exists for project {project_id}")]
    FinalEvaluationExists { project_id: ProjectId },
    #[error("project {project_id} already registered")]
    ProjectExists { project_id: ProjectId },
    #[error("project {project_id} not found")]
    ProjectNotFound { project_id: ProjectId },
    #[error("no final evaluation found for project {project_id}")]
    FinalEvaluationNotFound { project_id: ProjectId },
    #[error("no evaluations recorded for project {project_id}")]
    NoEvaluations { project_id: ProjectId },
    #[error("no final evaluation to lock for project {project_id}")]
    NothingToLock { project_id: ProjectId },
    #[error("project {project_id} is locked by its final evaluation")]
    ProjectLocked { project_id: ProjectId },
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl EvaluationServiceError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::FinalEvaluationExists { .. } | Self::ProjectExists { .. } => ErrorKind::Conflict,
            Self::ProjectNotFound { .. }
            | Self::FinalEvaluationNotFound { .. }
            | Self::NoEvaluations { .. } => ErrorKind::NotFound,
            Self::NothingToLock { .. } | Self::ProjectLocked { .. } => ErrorKind::InvalidState,
            Self::Validation(_) => ErrorKind::Validation,
            Self::Repository(RepositoryError::Conflict) => ErrorKind::Conflict,
            Self::Repository(RepositoryError::NotFound) => ErrorKind::NotFound,
            Self::Repository(RepositoryError::Unavailable(_)) => ErrorKind::Unavailable,
        }
    }
}

/// Service owning the final evaluation lock workflow for projects.
///
/// A project is locked exactly when its final (`EvaluatedType::Project`) evaluation exists;
/// no separate flag is stored.
pub struct FinalEvaluationService<P, E> {
    projects: Arc<P>,
    evaluations: Arc<E>,
    policy: EvaluationPolicy,
    clock: Arc<dyn Clock>,
}

impl<P, E> FinalEvaluationService<P, E>
where
    P: ProjectCatalog + 'static,
    E: EvaluationRepository + 'static,
{
    pub fn new(projects: Arc<P>, evaluations: Arc<E>, policy: EvaluationPolicy) -> Self {
        Self::with_clock(projects, evaluations, policy, Arc::new(SystemClock))
    }

    pub fn with_clock(
        projects: Arc<P>,
        evaluations: Arc<E>,
        policy: EvaluationPolicy,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            projects,
            evaluations,
            policy,
            clock,
        }
    }

    pub fn policy(&self) -> &EvaluationPolicy {
        &self.policy
    }

    pub fn register_project(&self, project: Project) -> Result<Project, EvaluationServiceError> {
        if project.id.as_str().trim().is_empty() {
            return Err(ValidationError::BlankIdentifier {
                field: "project_id",
            }
            .into());
        }

        let project_id = project.id.clone();
        match self.projects.insert(project) {
            Ok(stored) => {
                info!(project_id = %stored.id, "project registered");
                Ok(stored)
            }
            Err(RepositoryError::Conflict) => {
                Err(EvaluationServiceError::ProjectExists { project_id })
            }
            Err(other) => Err(other.into()),
        }
    }

    /// Create the single final evaluation for a project, locking it.
    pub fn create_final_evaluation(
        &self,
        project_id: &ProjectId,
        evaluator_id: &EvaluatorId,
        payload: EvaluationPayload,
    ) -> Result<Evaluation, EvaluationServiceError> {
        self.policy.validate(&payload)?;
        if evaluator_id.0.trim().is_empty() {
            return Err(ValidationError::BlankIdentifier {
                field: "evaluator_id",
            }
            .into());
        }

        self.require_project(project_id)?;

        if self
            .evaluations
            .exists_for(project_id, EvaluatedType::Project)?
        {
            warn!(%project_id, "final evaluation already exists");
            return Err(EvaluationServiceError::FinalEvaluationExists {
                project_id: project_id.clone(),
            });
        }

        let record = NewEvaluation {
            project_id: project_id.clone(),
            evaluated_id: project_id.0.clone(),
            evaluated_type: EvaluatedType::Project,
            evaluator_id: evaluator_id.clone(),
            evaluator_type: EvaluatorType::LabAdmin,
            scores: payload.scores,
            rating: payload.rating,
            feedback: payload.feedback,
            evaluation_date: self.clock.today(),
        };

        // The store's unique index is authoritative; a concurrent creator that passed the
        // check above lands here.
        match self.evaluations.insert(record) {
            Ok(stored) => {
                info!(%project_id, evaluation_id = %stored.id, "final evaluation created; project locked");
                Ok(stored)
            }
            Err(RepositoryError::Conflict) => {
                warn!(%project_id, "final evaluation insert lost a concurrent race");
                Err(EvaluationServiceError::FinalEvaluationExists {
                    project_id: project_id.clone(),
                })
            }
            Err(other) => Err(other.into()),
        }
    }

    /// Assert that the project is locked. Never changes state.
    pub fn lock_project_evaluation(
        &self,
        project_id: &ProjectId,
    ) -> Result<(), EvaluationServiceError> {
        if !self.is_project_locked(project_id)? {
            return Err(EvaluationServiceError::NothingToLock {
                project_id: project_id.clone(),
            });
        }
        debug!(%project_id, "project evaluation lock confirmed");
        Ok(())
    }

    pub fn is_project_locked(&self, project_id: &ProjectId) -> Result<bool, EvaluationServiceError> {
        Ok(self
            .evaluations
            .exists_for(project_id, EvaluatedType::Project)?)
    }

    /// Composite score of the final evaluation, `None` while the project is unlocked.
    pub fn get_final_score(
        &self,
        project_id: &ProjectId,
    ) -> Result<Option<f64>, EvaluationServiceError> {
        let score = self
            .evaluations
            .find_one(project_id, EvaluatedType::Project)?
            .map(|evaluation| self.policy.composite(&evaluation.scores));
        Ok(score)
    }

    pub fn get_final_summary(
        &self,
        project_id: &ProjectId,
    ) -> Result<FinalSummary, EvaluationServiceError> {
        let aggregate = self.evaluations.aggregate(project_id)?.ok_or_else(|| {
            EvaluationServiceError::NoEvaluations {
                project_id: project_id.clone(),
            }
        })?;

        let averages = ScoreCard {
            technical_skills: aggregate.technical_skills,
            communication: aggregate.communication,
            teamwork: aggregate.teamwork,
            punctuality: aggregate.punctuality,
        };
        let final_score = self.policy.composite(&averages);

        Ok(FinalSummary {
            project_id: project_id.clone(),
            technical_skills: round_two(averages.technical_skills),
            communication: round_two(averages.communication),
            teamwork: round_two(averages.teamwork),
            punctuality: round_two(averages.punctuality),
            final_score,
            total_evaluations: aggregate.count,
            locked: self.is_project_locked(project_id)?,
        })
    }

    /// Administrative removal of the final evaluation, unlocking the project.
    pub fn delete_final_evaluation(
        &self,
        project_id: &ProjectId,
    ) -> Result<(), EvaluationServiceError> {
        let existing = self
            .evaluations
            .find_one(project_id, EvaluatedType::Project)?
            .ok_or_else(|| EvaluationServiceError::FinalEvaluationNotFound {
                project_id: project_id.clone(),
            })?;

        match self.evaluations.delete(existing.id) {
            Ok(()) => {
                info!(%project_id, evaluation_id = %existing.id, "final evaluation deleted; project unlocked");
                Ok(())
            }
            Err(RepositoryError::NotFound) => Err(EvaluationServiceError::FinalEvaluationNotFound {
                project_id: project_id.clone(),
            }),
            Err(other) => Err(other.into()),
        }
    }

    pub fn final_evaluation(
        &self,
        project_id: &ProjectId,
    ) -> Result<Evaluation, EvaluationServiceError> {
        self.evaluations
            .find_one(project_id, EvaluatedType::Project)?
            .ok_or_else(|| EvaluationServiceError::FinalEvaluationNotFound {
                project_id: project_id.clone(),
            })
    }

    /// Record a mentor or peer evaluation of a talent while the project is still open.
    pub fn record_evaluation(
        &self,
        project_id: &ProjectId,
        submission: TalentEvaluationSubmission,
    ) -> Result<Evaluation, EvaluationServiceError> {
        if submission.evaluator_type == EvaluatorType::LabAdmin {
            return Err(ValidationError::Unsupported(
                "lab administrators submit the final project evaluation instead",
            )
            .into());
        }
        if submission.talent_id.trim().is_empty() {
            return Err(ValidationError::BlankIdentifier { field: "talent_id" }.into());
        }
        if submission.evaluator_id.0.trim().is_empty() {
            return Err(ValidationError::BlankIdentifier {
                field: "evaluator_id",
            }
            .into());
        }
        self.policy.validate(&submission.payload)?;

        self.require_project(project_id)?;
        if self.is_project_locked(project_id)? {
            return Err(EvaluationServiceError::ProjectLocked {
                project_id: project_id.clone(),
            });
        }

        let record = NewEvaluation {
            project_id: project_id.clone(),
            evaluated_id: submission.talent_id,
            evaluated_type: EvaluatedType::Talent,
            evaluator_id: submission.evaluator_id,
            evaluator_type: submission.evaluator_type,
            scores: submission.payload.scores,
            rating: submission.payload.rating,
            feedback: submission.payload.feedback,
            evaluation_date: self.clock.today(),
        };

        // A final evaluation created after the check above surfaces as a store conflict.
        let stored = match self.evaluations.insert(record) {
            Ok(stored) => stored,
            Err(RepositoryError::Conflict) => {
                warn!(%project_id, "talent evaluation arrived after the project was locked");
                return Err(EvaluationServiceError::ProjectLocked {
                    project_id: project_id.clone(),
                });
            }
            Err(other) => return Err(other.into()),
        };
        debug!(
            %project_id,
            evaluation_id = %stored.id,
            evaluator_type = stored.evaluator_type.label(),
            "talent evaluation recorded"
        );
        Ok(stored)
    }

    pub fn project_evaluations(
        &self,
        project_id: &ProjectId,
    ) -> Result<Vec<Evaluation>, EvaluationServiceError> {
        self.require_project(project_id)?;
        Ok(self.evaluations.list_for_project(project_id)?)
    }

    fn require_project(&self, project_id: &ProjectId) -> Result<Project, EvaluationServiceError> {
        self.projects
            .fetch(project_id)?
            .ok_or_else(|| EvaluationServiceError::ProjectNotFound {
                project_id: project_id.clone(),
            })
    }
}
