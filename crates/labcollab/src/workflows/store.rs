//! Record store shared by the project catalog and the evaluation workflow.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard};

use super::catalog::{Project, ProjectCatalog, ProjectId};
use super::evaluation::{
    EvaluatedType, Evaluation, EvaluationAggregate, EvaluationId, EvaluationRepository,
    NewEvaluation,
};

/// Error enumeration for record store failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, Default)]
struct StoreState {
    projects: HashMap<ProjectId, Project>,
    evaluations: BTreeMap<EvaluationId, Evaluation>,
    // unique index on (evaluated_id, PROJECT)
    final_index: HashMap<ProjectId, EvaluationId>,
    last_id: u64,
}

/// In-process record store. All reads and writes go through one mutex, so uniqueness
/// checks and inserts are a single critical section.
#[derive(Debug, Default, Clone)]
pub struct InMemoryRecordStore {
    state: Arc<Mutex<StoreState>>,
}

impl InMemoryRecordStore {
    fn lock(&self) -> Result<MutexGuard<'_, StoreState>, RepositoryError> {
        self.state
            .lock()
            .map_err(|_| RepositoryError::Unavailable("record store lock poisoned".to_string()))
    }

    /// Number of final (project-level) evaluations currently stored for the project.
    #[cfg(test)]
    pub(crate) fn final_count(&self, project_id: &ProjectId) -> Result<usize, RepositoryError> {
        let state = self.lock()?;
        Ok(state
            .evaluations
            .values()
            .filter(|evaluation| evaluation.is_final() && &evaluation.project_id == project_id)
            .count())
    }
}

impl ProjectCatalog for InMemoryRecordStore {
    fn insert(&self, project: Project) -> Result<Project, RepositoryError> {
        let mut state = self.lock()?;
        if state.projects.contains_key(&project.id) {
            return Err(RepositoryError::Conflict);
        }
        state.projects.insert(project.id.clone(), project.clone());
        Ok(project)
    }

    fn fetch(&self, id: &ProjectId) -> Result<Option<Project>, RepositoryError> {
        let state = self.lock()?;
        Ok(state.projects.get(id).cloned())
    }

    fn list(&self) -> Result<Vec<Project>, RepositoryError> {
        let state = self.lock()?;
        let mut projects: Vec<Project> = state.projects.values().cloned().collect();
        projects.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(projects)
    }
}

impl EvaluationRepository for InMemoryRecordStore {
    fn exists_for(
        &self,
        project_id: &ProjectId,
        evaluated_type: EvaluatedType,
    ) -> Result<bool, RepositoryError> {
        let state = self.lock()?;
        if evaluated_type == EvaluatedType::Project {
            return Ok(state.final_index.contains_key(project_id));
        }
        Ok(state.evaluations.values().any(|evaluation| {
            &evaluation.project_id == project_id && evaluation.evaluated_type == evaluated_type
        }))
    }

    fn find_one(
        &self,
        project_id: &ProjectId,
        evaluated_type: EvaluatedType,
    ) -> Result<Option<Evaluation>, RepositoryError> {
        let state = self.lock()?;
        if evaluated_type == EvaluatedType::Project {
            return Ok(state
                .final_index
                .get(project_id)
                .and_then(|id| state.evaluations.get(id))
                .cloned());
        }
        Ok(state
            .evaluations
            .values()
            .find(|evaluation| {
                &evaluation.project_id == project_id && evaluation.evaluated_type == evaluated_type
            })
            .cloned())
    }

    fn insert(&self, evaluation: NewEvaluation) -> Result<Evaluation, RepositoryError> {
        let mut state = self.lock()?;
        // a present final row both blocks a second final and freezes the project
        if state.final_index.contains_key(&evaluation.project_id) {
            return Err(RepositoryError::Conflict);
        }

        state.last_id += 1;
        let id = EvaluationId(state.last_id);
        let stored = evaluation.into_evaluation(id);

        if stored.is_final() {
            state.final_index.insert(stored.project_id.clone(), id);
        }
        state.evaluations.insert(id, stored.clone());
        Ok(stored)
    }

    fn delete(&self, id: EvaluationId) -> Result<(), RepositoryError> {
        let mut state = self.lock()?;
        let removed = state
            .evaluations
            .remove(&id)
            .ok_or(RepositoryError::NotFound)?;

        if removed.is_final() {
            state.final_index.remove(&removed.project_id);
        }
        Ok(())
    }

    fn aggregate(
        &self,
        project_id: &ProjectId,
    ) -> Result<Option<EvaluationAggregate>, RepositoryError> {
        let state = self.lock()?;
        let mut totals = [0.0_f64; 4];
        let mut count = 0_u64;

        for evaluation in state
            .evaluations
            .values()
            .filter(|evaluation| &evaluation.project_id == project_id)
        {
            for (total, (_, value)) in totals.iter_mut().zip(evaluation.scores.dimensions()) {
                *total += value;
            }
            count += 1;
        }

        if count == 0 {
            return Ok(None);
        }

        let divisor = count as f64;
        Ok(Some(EvaluationAggregate {
            technical_skills: totals[0] / divisor,
            communication: totals[1] / divisor,
            teamwork: totals[2] / divisor,
            punctuality: totals[3] / divisor,
            count,
        }))
    }

    fn list_for_project(&self, project_id: &ProjectId) -> Result<Vec<Evaluation>, RepositoryError> {
        let state = self.lock()?;
        Ok(state
            .evaluations
            .values()
            .filter(|evaluation| &evaluation.project_id == project_id)
            .cloned()
            .collect())
    }
}
