use crate::cli::ServeArgs;
use crate::infra::{AppState, InMemoryEstimateRepository};
use crate::routes::with_estimate_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use costline::config::AppConfig;
use costline::error::AppError;
use costline::estimation::{EstimationService, PricingRegistry};
use costline::telemetry;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{error, info};

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

    let registry = PricingRegistry::standard().map_err(|err| {
        error!(error = %err, "pricing registry failed validation");
        AppError::from(costline::estimation::EstimateServiceError::from(err))
    })?;
    let repository = Arc::new(InMemoryEstimateRepository::default());
    let estimate_service = Arc::new(EstimationService::new(
        Arc::new(registry),
        config.estimator.engine_settings(),
        repository,
    ));

    let app = with_estimate_routes(estimate_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        stress_band_pct = config.estimator.stress_band.pct(),
        "cost estimation service ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
