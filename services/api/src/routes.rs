use crate::infra::{deserialize_optional_date, AppState, InMemoryInspectionStore, InspectionSync};
use axum::extract::Query;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Extension, Json, Router};
use chrono::{Local, NaiveDate};
use inspection_ai::workflows::inspection::{inspection_router, InspectionService, SyncSnapshot};
use inspection_ai::workflows::relay::{relay_router, WorkflowRelay};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

#[derive(Debug, Default, Deserialize)]
pub(crate) struct DashboardQuery {
    #[serde(default, deserialize_with = "deserialize_optional_date")]
    pub(crate) today: Option<NaiveDate>,
}

pub(crate) fn with_inspection_routes(
    service: Arc<InspectionService<InMemoryInspectionStore>>,
    sync: Arc<InspectionSync>,
    relay: Option<Arc<WorkflowRelay>>,
) -> Router {
    let mut router = inspection_router(service)
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
        .route(
            "/api/v1/dashboard",
            get(dashboard_endpoint).layer(Extension(sync)),
        );

    if let Some(relay) = relay {
        router = router.merge(relay_router(relay));
    }
    router
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

pub(crate) async fn dashboard_endpoint(
    Extension(sync): Extension<Arc<InspectionSync>>,
    Query(query): Query<DashboardQuery>,
) -> Json<SyncSnapshot> {
    let today = query.today.unwrap_or_else(|| Local::now().date_naive());
    Json(sync.snapshot(today))
}
