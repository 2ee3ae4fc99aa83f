use crate::cli::ServeArgs;
use crate::infra::{seed_bundles, AppState, InMemoryInspectionStore, TracingNotifier};
use crate::routes::with_inspection_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use chrono::Local;
use inspection_ai::config::AppConfig;
use inspection_ai::error::AppError;
use inspection_ai::telemetry;
use inspection_ai::workflows::inspection::{
    CriticalityConfig, EventBus, InspectionFilter, InspectionService, SyncCoordinator,
    ValidationCriteria,
};
use inspection_ai::workflows::relay::{RelayConfig, WorkflowRelay};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::{info, warn};

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

    let store = Arc::new(InMemoryInspectionStore::with_bundles(seed_bundles(
        Local::now().date_naive(),
    )));
    let bus = EventBus::new();
    let service = Arc::new(InspectionService::new(
        store.clone(),
        bus.clone(),
        CriticalityConfig::default(),
        ValidationCriteria::from(config.validation),
    ));

    let sync = Arc::new(SyncCoordinator::new(
        store.clone(),
        bus,
        Arc::new(TracingNotifier),
        InspectionFilter::default(),
        config.sync.into(),
    ));
    sync.start().await;
    info!(inspections = store.len(), "inspection sync started");

    let relay = if config.relay.shared_secret.is_some() {
        let relay = WorkflowRelay::new(RelayConfig::from(&config.relay))?;
        let workflows: Vec<&str> = relay.workflows().collect();
        info!(?workflows, "workflow relay enabled");
        Some(Arc::new(relay))
    } else {
        warn!("RELAY_SHARED_SECRET not set; workflow relay disabled");
        None
    };

    let app = with_inspection_routes(service, sync.clone(), relay)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "inspection review service ready");

    let served = axum::serve(listener, app).await;
    sync.shutdown();
    served?;
    Ok(())
}
