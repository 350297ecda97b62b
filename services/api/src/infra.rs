use chrono::NaiveDate;
use labcollab::error::AppError;
use labcollab::workflows::catalog::{import_projects, ImportSummary};
use labcollab::workflows::store::InMemoryRecordStore;
use metrics_exporter_prometheus::PrometheusHandle;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Loads a catalog CSV export from disk into the record store.
pub(crate) fn seed_projects(
    store: &InMemoryRecordStore,
    path: &Path,
) -> Result<ImportSummary, AppError> {
    let file = File::open(path)?;
    Ok(import_projects(BufReader::new(file), store)?)
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}
