use std::sync::{Arc, RwLock};

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use tracing::info;

use super::criticality::{
    CriticalityAnalysis, CriticalityConfig, CriticalityScorer, InspectionCriticality,
};
use super::domain::{Deficiency, Inspection, InspectionId, InspectionStatus};
use super::events::{EventBus, InspectionEvent};
use super::repository::{InspectionStore, StoreError};
use super::validation::{
    CriteriaUpdate, InspectionValidator, ValidationCriteria, ValidationResult,
};

/// Service composing the store, criticality scorer, validator, and event bus.
pub struct InspectionService<S> {
    store: Arc<S>,
    scorer: RwLock<CriticalityScorer>,
    validator: RwLock<InspectionValidator>,
    bus: EventBus,
}

/// Result of a successful completion.
#[derive(Debug, Clone, Serialize)]
pub struct CompletionOutcome {
    pub inspection: Inspection,
    pub deficiencies: Vec<Deficiency>,
    pub criticality: InspectionCriticality,
    pub validation: ValidationResult,
}

impl<S> InspectionService<S>
where
    S: InspectionStore + 'static,
{
    pub fn new(
        store: Arc<S>,
        bus: EventBus,
        scoring: CriticalityConfig,
        criteria: ValidationCriteria,
    ) -> Self {
        Self {
            store,
            scorer: RwLock::new(CriticalityScorer::new(scoring)),
            validator: RwLock::new(InspectionValidator::new(criteria)),
            bus,
        }
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    fn scorer(&self) -> CriticalityScorer {
        self.scorer.read().expect("scorer lock poisoned").clone()
    }

    fn validator(&self) -> InspectionValidator {
        self.validator.read().expect("validator lock poisoned").clone()
    }

    pub fn criteria(&self) -> ValidationCriteria {
        self.validator().criteria().clone()
    }

    pub fn update_criteria(&self, update: CriteriaUpdate) -> ValidationCriteria {
        let mut validator = self.validator.write().expect("validator lock poisoned");
        validator.update_criteria(update);
        info!(criteria = ?validator.criteria(), "validation criteria updated");
        validator.criteria().clone()
    }

    pub fn update_scoring(&self, config: CriticalityConfig) {
        self.scorer
            .write()
            .expect("scorer lock poisoned")
            .update_config(config);
    }

    pub fn analyze_deficiency(&self, deficiency: &Deficiency) -> CriticalityAnalysis {
        self.scorer().analyze_deficiency(deficiency)
    }

    pub fn analyze_inspection(&self, deficiencies: &[Deficiency]) -> InspectionCriticality {
        self.scorer().analyze_inspection(deficiencies)
    }

    pub fn enhance_deficiencies(
        &self,
        deficiencies: &[Deficiency],
        detected_at: DateTime<Utc>,
    ) -> Vec<Deficiency> {
        self.scorer().enhance_deficiencies(deficiencies, detected_at)
    }

    pub fn validate_payload(
        &self,
        inspection: &Inspection,
        deficiencies: &[Deficiency],
        total_photos: usize,
    ) -> ValidationResult {
        self.validator()
            .validate_inspection_sync(inspection, deficiencies, total_photos)
    }

    pub async fn validate(&self, id: &InspectionId) -> ValidationResult {
        let validator = self.validator();
        validator.validate_inspection(self.store.as_ref(), id).await
    }

    /// Score any unscored deficiencies and persist the list.
    pub async fn autosave_deficiencies(
        &self,
        id: &InspectionId,
        deficiencies: &[Deficiency],
        detected_at: DateTime<Utc>,
    ) -> Result<Vec<Deficiency>, InspectionServiceError> {
        let enhanced = self.enhance_deficiencies(deficiencies, detected_at);
        self.store.save_deficiencies(id, &enhanced).await?;

        if let Some(bundle) = self.store.fetch_bundle(id).await? {
            self.bus.publish(InspectionEvent::Updated(bundle.inspection));
        }

        Ok(enhanced)
    }

    /// Validate the inspection as completed and, if it passes, persist the
    /// scored deficiencies and flip the status.
    ///
    /// Deficiencies are written before the status. If the status write fails
    /// the scored rows stay saved and the inspection keeps its prior status,
    /// so a retry re-scores the same rows and completes it.
    pub async fn complete_inspection(
        &self,
        id: &InspectionId,
        today: NaiveDate,
        detected_at: DateTime<Utc>,
    ) -> Result<CompletionOutcome, InspectionServiceError> {
        let bundle = self
            .store
            .fetch_bundle(id)
            .await?
            .ok_or(StoreError::NotFound)?;

        let deficiencies = self.enhance_deficiencies(&bundle.deficiencies, detected_at);

        let mut candidate = bundle.inspection.clone();
        candidate.status = InspectionStatus::Completed;
        if candidate.completed_date.is_none() {
            candidate.completed_date = Some(today);
        }

        let validation = self.validate_payload(&candidate, &deficiencies, bundle.total_photos);
        if !validation.is_valid {
            info!(
                inspection_id = %id,
                errors = validation.errors.len(),
                "inspection not ready for completion"
            );
            return Err(InspectionServiceError::Incomplete(validation));
        }

        self.store.save_deficiencies(id, &deficiencies).await?;
        let inspection = self
            .store
            .update_status(id, InspectionStatus::Completed, candidate.completed_date)
            .await?;

        let criticality = self.analyze_inspection(&deficiencies);
        self.bus.publish(InspectionEvent::StatusChanged {
            id: id.clone(),
            status: InspectionStatus::Completed,
        });

        info!(
            inspection_id = %id,
            max_score = criticality.max_score,
            emergencies = criticality.emergency_count,
            "inspection completed"
        );

        Ok(CompletionOutcome {
            inspection,
            deficiencies,
            criticality,
            validation,
        })
    }
}

/// Error raised by the inspection service.
#[derive(Debug, thiserror::Error)]
pub enum InspectionServiceError {
    #[error("inspection is not ready for completion: {}", .0.summary)]
    Incomplete(ValidationResult),
    #[error(transparent)]
    Store(#[from] StoreError),
}
