use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde_json::json;

use super::{RelayError, RelayRequest, WorkflowRelay};

pub fn relay_router(relay: Arc<WorkflowRelay>) -> Router {
    Router::new()
        .route("/api/v1/relay", post(relay_handler))
        .with_state(relay)
}

async fn relay_handler(
    State(relay): State<Arc<WorkflowRelay>>,
    Json(request): Json<RelayRequest>,
) -> Response {
    match relay.relay(request).await {
        Ok(upstream) => {
            let status = StatusCode::from_u16(upstream.status).unwrap_or(StatusCode::BAD_GATEWAY);
            let content_type = upstream
                .content_type
                .unwrap_or_else(|| "application/octet-stream".to_string());
            (status, [(header::CONTENT_TYPE, content_type)], upstream.body).into_response()
        }
        Err(err) => {
            let status = match err {
                RelayError::UnknownWorkflow(_) => StatusCode::NOT_FOUND,
                RelayError::MissingSecret | RelayError::InvalidSecret => {
                    StatusCode::SERVICE_UNAVAILABLE
                }
                RelayError::Json(_) => StatusCode::BAD_REQUEST,
                RelayError::Http(_) => StatusCode::BAD_GATEWAY,
            };
            (status, Json(json!({ "error": err.to_string() }))).into_response()
        }
    }
}
