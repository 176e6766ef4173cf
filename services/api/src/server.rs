use crate::cli::ServeArgs;
use crate::infra::{AppState, InMemoryApplicationLedger};
use crate::routes::with_acceptance_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use support_intake::config::AppConfig;
use support_intake::error::AppError;
use support_intake::telemetry;
use support_intake::workflows::intake::{AcceptanceService, ValidationPolicy};
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

    let ledger = Arc::new(InMemoryApplicationLedger::default());
    let acceptance = Arc::new(AcceptanceService::new(ledger, ValidationPolicy::default()));

    let app = with_acceptance_routes(acceptance)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "application acceptance endpoint ready");

    axum::serve(listener, app).await?;
    Ok(())
}
