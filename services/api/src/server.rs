use crate::cli::ServeArgs;
use crate::infra::{seed_projects, AppState};
use crate::routes::with_service_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use labcollab::config::AppConfig;
use labcollab::error::AppError;
use labcollab::telemetry;
use labcollab::workflows::evaluation::FinalEvaluationService;
use labcollab::workflows::store::InMemoryRecordStore;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }
    if let Some(path) = args.projects_csv.take() {
        config.catalog.projects_csv = Some(path);
    }

    telemetry::init(&config.telemetry, config.environment)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let store = Arc::new(InMemoryRecordStore::default());
    if let Some(path) = config.catalog.projects_csv.as_deref() {
        let summary = seed_projects(&store, path)?;
        info!(
            path = %path.display(),
            imported = summary.imported,
            duplicates = summary.duplicates,
            "project catalog seeded"
        );
    }

    let evaluation_service = Arc::new(FinalEvaluationService::new(
        store.clone(),
        store,
        config.evaluation.clone(),
    ));

    let app = with_service_routes(evaluation_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "lab collaboration service ready");

    axum::serve(listener, app).await?;
    Ok(())
}
