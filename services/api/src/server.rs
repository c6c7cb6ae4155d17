use crate::cli::ServeArgs;
use crate::infra::{load_roster, AppState, InMemoryCandidateRepository};
use crate::routes::with_acquisition_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{info, warn};
use var_insight::config::AppConfig;
use var_insight::error::AppError;
use var_insight::telemetry;
use var_insight::workflows::acquisition::{AcquisitionService, HttpNarrator};

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let roster = load_roster(config.data.roster_path.as_deref())?;
    let repository = Arc::new(InMemoryCandidateRepository::with_candidates(roster));
    match &config.data.roster_path {
        Some(path) => info!(
            path = %path.display(),
            candidates = repository.len(),
            "loaded VAR roster"
        ),
        None => warn!(
            candidates = repository.len(),
            "VAR_ROSTER_PATH not set; serving the bundled sample roster"
        ),
    }

    let mut service = AcquisitionService::new(repository);
    if let Some(narrator) = HttpNarrator::from_config(&config.narrative)? {
        info!(model = %config.narrative.model, "narrative generator enabled");
        service = service.with_narrator(Arc::new(narrator), config.narrative.timeout());
    }

    let app = with_acquisition_routes(Arc::new(service))
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "VAR insight service ready");

    axum::serve(listener, app).await?;
    Ok(())
}
