//! Project catalog: the projects that evaluations may reference.

mod import;

use std::fmt;

use serde::{Deserialize, Serialize};

use super::store::RepositoryError;

pub use import::{import_projects, parse_projects, CatalogImportError, ImportSummary};

/// Identifier wrapper for lab projects.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ProjectId(pub String);

impl ProjectId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.0)
    }
}

/// Identifier of the lab (outsourced development center) running a project.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LabId(pub String);

/// Catalog entry for a project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: ProjectId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lab_id: Option<LabId>,
}

/// Storage abstraction for projects so evaluation services can verify references.
pub trait ProjectCatalog: Send + Sync {
    fn insert(&self, project: Project) -> Result<Project, RepositoryError>;
    fn fetch(&self, id: &ProjectId) -> Result<Option<Project>, RepositoryError>;
    fn list(&self) -> Result<Vec<Project>, RepositoryError>;
}
