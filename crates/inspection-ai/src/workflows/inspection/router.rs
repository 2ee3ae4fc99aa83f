use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::{Local, Utc};
use serde::Deserialize;
use serde_json::json;

use super::criticality::{CriticalityAnalysis, InspectionCriticality};
use super::domain::{Deficiency, Inspection, InspectionId};
use super::repository::{InspectionStore, StoreError};
use super::service::{InspectionService, InspectionServiceError};
use super::validation::{CriteriaUpdate, ValidationCriteria, ValidationResult};

/// Payload for validating an inspection that is not (yet) in the store.
#[derive(Debug, Deserialize)]
pub struct ValidationRequest {
    pub inspection: Inspection,
    #[serde(default)]
    pub deficiencies: Vec<Deficiency>,
    #[serde(default)]
    pub total_photos: usize,
}

/// Router builder exposing scoring, validation, and completion endpoints.
pub fn inspection_router<S>(service: Arc<InspectionService<S>>) -> Router
where
    S: InspectionStore + 'static,
{
    Router::new()
        .route(
            "/api/v1/deficiencies/analyze",
            post(analyze_deficiency_handler::<S>),
        )
        .route("/api/v1/deficiencies/enhance", post(enhance_handler::<S>))
        .route(
            "/api/v1/inspections/analyze",
            post(analyze_inspection_handler::<S>),
        )
        .route(
            "/api/v1/inspections/validate",
            post(validate_payload_handler::<S>),
        )
        .route(
            "/api/v1/inspections/:inspection_id/validation",
            get(validation_handler::<S>),
        )
        .route(
            "/api/v1/inspections/:inspection_id/deficiencies",
            axum::routing::put(autosave_handler::<S>),
        )
        .route(
            "/api/v1/inspections/:inspection_id/complete",
            post(complete_handler::<S>),
        )
        .route(
            "/api/v1/validation/criteria",
            get(criteria_handler::<S>).patch(update_criteria_handler::<S>),
        )
        .with_state(service)
}

pub(crate) async fn analyze_deficiency_handler<S>(
    State(service): State<Arc<InspectionService<S>>>,
    Json(deficiency): Json<Deficiency>,
) -> Json<CriticalityAnalysis>
where
    S: InspectionStore + 'static,
{
    Json(service.analyze_deficiency(&deficiency))
}

pub(crate) async fn enhance_handler<S>(
    State(service): State<Arc<InspectionService<S>>>,
    Json(deficiencies): Json<Vec<Deficiency>>,
) -> Json<Vec<Deficiency>>
where
    S: InspectionStore + 'static,
{
    Json(service.enhance_deficiencies(&deficiencies, Utc::now()))
}

pub(crate) async fn analyze_inspection_handler<S>(
    State(service): State<Arc<InspectionService<S>>>,
    Json(deficiencies): Json<Vec<Deficiency>>,
) -> Json<InspectionCriticality>
where
    S: InspectionStore + 'static,
{
    Json(service.analyze_inspection(&deficiencies))
}

pub(crate) async fn validate_payload_handler<S>(
    State(service): State<Arc<InspectionService<S>>>,
    Json(request): Json<ValidationRequest>,
) -> Json<ValidationResult>
where
    S: InspectionStore + 'static,
{
    Json(service.validate_payload(
        &request.inspection,
        &request.deficiencies,
        request.total_photos,
    ))
}

pub(crate) async fn validation_handler<S>(
    State(service): State<Arc<InspectionService<S>>>,
    Path(inspection_id): Path<String>,
) -> Json<ValidationResult>
where
    S: InspectionStore + 'static,
{
    Json(service.validate(&InspectionId(inspection_id)).await)
}

pub(crate) async fn autosave_handler<S>(
    State(service): State<Arc<InspectionService<S>>>,
    Path(inspection_id): Path<String>,
    Json(deficiencies): Json<Vec<Deficiency>>,
) -> Response
where
    S: InspectionStore + 'static,
{
    let id = InspectionId(inspection_id);
    match service
        .autosave_deficiencies(&id, &deficiencies, Utc::now())
        .await
    {
        Ok(enhanced) => (StatusCode::OK, Json(enhanced)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn complete_handler<S>(
    State(service): State<Arc<InspectionService<S>>>,
    Path(inspection_id): Path<String>,
) -> Response
where
    S: InspectionStore + 'static,
{
    let id = InspectionId(inspection_id);
    let today = Local::now().date_naive();
    match service.complete_inspection(&id, today, Utc::now()).await {
        Ok(outcome) => (StatusCode::OK, Json(outcome)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn criteria_handler<S>(
    State(service): State<Arc<InspectionService<S>>>,
) -> Json<ValidationCriteria>
where
    S: InspectionStore + 'static,
{
    Json(service.criteria())
}

pub(crate) async fn update_criteria_handler<S>(
    State(service): State<Arc<InspectionService<S>>>,
    Json(update): Json<CriteriaUpdate>,
) -> Json<ValidationCriteria>
where
    S: InspectionStore + 'static,
{
    Json(service.update_criteria(update))
}

fn error_response(err: InspectionServiceError) -> Response {
    match err {
        InspectionServiceError::Incomplete(validation) => {
            (StatusCode::UNPROCESSABLE_ENTITY, Json(validation)).into_response()
        }
        InspectionServiceError::Store(StoreError::NotFound) => {
            let payload = json!({ "error": "inspection not found" });
            (StatusCode::NOT_FOUND, Json(payload)).into_response()
        }
        InspectionServiceError::Store(StoreError::Rejected(reason)) => {
            let payload = json!({ "error": reason });
            (StatusCode::CONFLICT, Json(payload)).into_response()
        }
        other => {
            let payload = json!({ "error": other.to_string() });
            (StatusCode::INTERNAL_SERVER_ERROR, Json(payload)).into_response()
        }
    }
}
