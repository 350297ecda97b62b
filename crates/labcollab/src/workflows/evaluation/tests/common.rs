use std::sync::{Arc, Mutex};

use axum::response::Response;
use chrono::NaiveDate;
use serde_json::Value;

use crate::workflows::catalog::{LabId, Project, ProjectCatalog, ProjectId};
use crate::workflows::evaluation::{
    evaluation_router, EvaluatedType, Evaluation, EvaluationAggregate, EvaluationId,
    EvaluationPayload, EvaluationPolicy, EvaluationRepository, EvaluatorId, EvaluatorType,
    FinalEvaluationService, FixedClock, NewEvaluation, ScoreCard, TalentEvaluationSubmission,
};
use crate::workflows::store::{InMemoryRecordStore, RepositoryError};

pub(super) type MemoryService = FinalEvaluationService<InMemoryRecordStore, InMemoryRecordStore>;

pub(super) fn evaluation_day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 6, 30).expect("valid date")
}

pub(super) fn project(id: &str) -> Project {
    Project {
        id: ProjectId::new(id),
        name: format!("Project {id}"),
        lab_id: Some(LabId("LAB-1".to_string())),
    }
}

pub(super) fn payload() -> EvaluationPayload {
    EvaluationPayload {
        scores: ScoreCard {
            technical_skills: 8.0,
            communication: 9.0,
            teamwork: 7.0,
            punctuality: 10.0,
        },
        rating: 8.5,
        feedback: "Good work".to_string(),
    }
}

pub(super) fn admin() -> EvaluatorId {
    EvaluatorId("admin1".to_string())
}

pub(super) fn mentor_submission(talent: &str, score: f64) -> TalentEvaluationSubmission {
    TalentEvaluationSubmission {
        talent_id: talent.to_string(),
        evaluator_id: EvaluatorId("mentor-1".to_string()),
        evaluator_type: EvaluatorType::Mentor,
        payload: EvaluationPayload {
            scores: ScoreCard {
                technical_skills: score,
                communication: score,
                teamwork: score,
                punctuality: score,
            },
            rating: score,
            feedback: "steady contributor".to_string(),
        },
    }
}

/// Service over a fresh store with project `P1` already cataloged.
pub(super) fn build_service() -> (MemoryService, Arc<InMemoryRecordStore>) {
    let store = Arc::new(InMemoryRecordStore::default());
    ProjectCatalog::insert(store.as_ref(), project("P1")).expect("seed project");
    let service = FinalEvaluationService::with_clock(
        store.clone(),
        store.clone(),
        EvaluationPolicy::default(),
        Arc::new(FixedClock(evaluation_day())),
    );
    (service, store)
}

pub(super) fn router_with_service(service: MemoryService) -> axum::Router {
    evaluation_router(Arc::new(service))
}

pub(super) struct UnavailableStore;

impl ProjectCatalog for UnavailableStore {
    fn insert(&self, _project: Project) -> Result<Project, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn fetch(&self, _id: &ProjectId) -> Result<Option<Project>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn list(&self) -> Result<Vec<Project>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

impl EvaluationRepository for UnavailableStore {
    fn exists_for(
        &self,
        _project_id: &ProjectId,
        _evaluated_type: EvaluatedType,
    ) -> Result<bool, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn find_one(
        &self,
        _project_id: &ProjectId,
        _evaluated_type: EvaluatedType,
    ) -> Result<Option<Evaluation>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn insert(&self, _evaluation: NewEvaluation) -> Result<Evaluation, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn delete(&self, _id: EvaluationId) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn aggregate(
        &self,
        _project_id: &ProjectId,
    ) -> Result<Option<EvaluationAggregate>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn list_for_project(&self, _project_id: &ProjectId) -> Result<Vec<Evaluation>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

/// Catalog that knows every project but whose existence check always misses, so
/// concurrent creators both reach the insert.
#[derive(Default)]
pub(super) struct RacingStore {
    pub(super) inner: InMemoryRecordStore,
}

impl EvaluationRepository for RacingStore {
    fn exists_for(
        &self,
        _project_id: &ProjectId,
        _evaluated_type: EvaluatedType,
    ) -> Result<bool, RepositoryError> {
        Ok(false)
    }

    fn find_one(
        &self,
        project_id: &ProjectId,
        evaluated_type: EvaluatedType,
    ) -> Result<Option<Evaluation>, RepositoryError> {
        self.inner.find_one(project_id, evaluated_type)
    }

    fn insert(&self, evaluation: NewEvaluation) -> Result<Evaluation, RepositoryError> {
        EvaluationRepository::insert(&self.inner, evaluation)
    }

    fn delete(&self, id: EvaluationId) -> Result<(), RepositoryError> {
        self.inner.delete(id)
    }

    fn aggregate(
        &self,
        project_id: &ProjectId,
    ) -> Result<Option<EvaluationAggregate>, RepositoryError> {
        self.inner.aggregate(project_id)
    }

    fn list_for_project(&self, project_id: &ProjectId) -> Result<Vec<Evaluation>, RepositoryError> {
        self.inner.list_for_project(project_id)
    }
}

/// Store whose existence check answers from the state it read, then lets a pending final
/// evaluation land before the caller's next write.
#[derive(Default)]
pub(super) struct InterleavingStore {
    pub(super) inner: InMemoryRecordStore,
    pub(super) pending_final: Mutex<Option<NewEvaluation>>,
}

impl InterleavingStore {
    pub(super) fn with_pending_final(inner: InMemoryRecordStore, project: &str) -> Self {
        Self {
            inner,
            pending_final: Mutex::new(Some(final_record(project))),
        }
    }
}

pub(super) fn final_record(project: &str) -> NewEvaluation {
    NewEvaluation {
        project_id: ProjectId::new(project),
        evaluated_id: project.to_string(),
        evaluated_type: EvaluatedType::Project,
        evaluator_id: admin(),
        evaluator_type: EvaluatorType::LabAdmin,
        scores: payload().scores,
        rating: payload().rating,
        feedback: payload().feedback,
        evaluation_date: evaluation_day(),
    }
}

impl EvaluationRepository for InterleavingStore {
    fn exists_for(
        &self,
        project_id: &ProjectId,
        evaluated_type: EvaluatedType,
    ) -> Result<bool, RepositoryError> {
        let observed = self.inner.exists_for(project_id, evaluated_type)?;
        let pending = self
            .pending_final
            .lock()
            .expect("pending mutex poisoned")
            .take();
        if let Some(record) = pending {
            EvaluationRepository::insert(&self.inner, record)?;
        }
        Ok(observed)
    }

    fn find_one(
        &self,
        project_id: &ProjectId,
        evaluated_type: EvaluatedType,
    ) -> Result<Option<Evaluation>, RepositoryError> {
        self.inner.find_one(project_id, evaluated_type)
    }

    fn insert(&self, evaluation: NewEvaluation) -> Result<Evaluation, RepositoryError> {
        EvaluationRepository::insert(&self.inner, evaluation)
    }

    fn delete(&self, id: EvaluationId) -> Result<(), RepositoryError> {
        self.inner.delete(id)
    }

    fn aggregate(
        &self,
        project_id: &ProjectId,
    ) -> Result<Option<EvaluationAggregate>, RepositoryError> {
        self.inner.aggregate(project_id)
    }

    fn list_for_project(&self, project_id: &ProjectId) -> Result<Vec<Evaluation>, RepositoryError> {
        self.inner.list_for_project(project_id)
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 16 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
