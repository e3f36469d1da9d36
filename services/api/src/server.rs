use crate::cli::ServeArgs;
use crate::infra::{AppState, InMemoryLeadSink};
use crate::routes::with_site_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use brokerage_site::auth::StaticTokenProvider;
use brokerage_site::config::AppConfig;
use brokerage_site::contact::FormRegistry;
use brokerage_site::error::AppError;
use brokerage_site::telemetry;
use std::sync::atomic::{AtomicBool, Ordering};
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

    telemetry::init(&config.telemetry, config.environment)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let leads = Arc::new(InMemoryLeadSink::default());
    let registry = Arc::new(FormRegistry::new(leads.clone(), config.contact));
    let _sweeper = registry.spawn_sweeper();
    let sessions = Arc::new(
        StaticTokenProvider::from_config(&config.auth).with_readiness(readiness_flag.clone()),
    );

    let app = with_site_routes(registry, sessions, leads)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        admin_tokens = config.auth.admin_tokens.len(),
        form_ttl_ms = config.contact.form_ttl.as_millis() as u64,
        "brokerage site service ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
