use std::io::Read;

use serde::{Deserialize, Deserializer};
use tracing::{debug, info};

use super::{LabId, Project, ProjectCatalog, ProjectId};
use crate::workflows::store::RepositoryError;

/// Counts reported after seeding the catalog from a CSV export.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub imported: usize,
    pub duplicates: usize,
}

#[derive(Debug, thiserror::Error)]
pub enum CatalogImportError {
    #[error("unable to read project csv: {0}")]
    Csv(#[from] csv::Error),
    #[error("row {row}: project id must not be empty")]
    MissingProjectId { row: usize },
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

#[derive(Debug, Deserialize)]
struct ProjectRow {
    #[serde(rename = "Project ID")]
    project_id: String,
    #[serde(rename = "Name", default)]
    name: String,
    #[serde(rename = "Lab ID", default, deserialize_with = "empty_string_as_none")]
    lab_id: Option<String>,
}

/// Parses a `Project ID,Name,Lab ID` export into catalog entries.
pub fn parse_projects<R: Read>(reader: R) -> Result<Vec<Project>, CatalogImportError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut projects = Vec::new();

    for (index, record) in csv_reader.deserialize::<ProjectRow>().enumerate() {
        let row = record?;
        // header occupies line 1
        let line = index + 2;
        if row.project_id.is_empty() {
            return Err(CatalogImportError::MissingProjectId { row: line });
        }

        let name = if row.name.is_empty() {
            row.project_id.clone()
        } else {
            row.name
        };

        projects.push(Project {
            id: ProjectId(row.project_id),
            name,
            lab_id: row.lab_id.map(LabId),
        });
    }

    Ok(projects)
}

/// Loads every project from the reader into the catalog, skipping ids already present.
pub fn import_projects<R, C>(reader: R, catalog: &C) -> Result<ImportSummary, CatalogImportError>
where
    R: Read,
    C: ProjectCatalog + ?Sized,
{
    let mut summary = ImportSummary::default();

    for project in parse_projects(reader)? {
        let id = project.id.clone();
        match catalog.insert(project) {
            Ok(_) => summary.imported += 1,
            Err(RepositoryError::Conflict) => {
                debug!(project_id = %id, "project already cataloged; skipping");
                summary.duplicates += 1;
            }
            Err(other) => return Err(other.into()),
        }
    }

    info!(
        imported = summary.imported,
        duplicates = summary.duplicates,
        "project catalog import finished"
    );
    Ok(summary)
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}
