use crate::cli::ServeArgs;
use crate::infra::{AppState, InMemoryCandidates, InMemoryParameterSets};
use crate::routes::with_ats_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use internmatch::ats::AtsService;
use internmatch::config::AppConfig;
use internmatch::error::AppError;
use internmatch::telemetry;
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

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let parameters = Arc::new(InMemoryParameterSets::default());
    let candidates = Arc::new(InMemoryCandidates::default());
    let ats_service = Arc::new(AtsService::new(parameters, candidates, config.scoring));

    let app = with_ats_routes(ats_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        enforce_parameter_ownership = config.scoring.enforce_parameter_ownership,
        write_attempts = config.scoring.write_attempts,
        "internmatch ats service ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
