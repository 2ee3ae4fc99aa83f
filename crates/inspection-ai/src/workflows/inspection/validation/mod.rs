mod criteria;
mod rules;

pub use criteria::{CriteriaUpdate, ValidationCriteria};

use serde::{Deserialize, Serialize};
use tracing::warn;

use super::domain::{Deficiency, Inspection, InspectionId};
use super::repository::InspectionStore;

const UNKNOWN_PROPERTY: &str = "Unknown property";
const UNKNOWN_INSPECTOR: &str = "Unknown inspector";

/// Completeness checker for inspections awaiting submission.
#[derive(Debug, Clone, Default)]
pub struct InspectionValidator {
    criteria: ValidationCriteria,
}

impl InspectionValidator {
    pub fn new(criteria: ValidationCriteria) -> Self {
        Self { criteria }
    }

    pub fn criteria(&self) -> &ValidationCriteria {
        &self.criteria
    }

    pub fn update_criteria(&mut self, update: CriteriaUpdate) {
        self.criteria.apply(update);
    }

    pub fn validate_inspection_sync(
        &self,
        inspection: &Inspection,
        deficiencies: &[Deficiency],
        total_photos: usize,
    ) -> ValidationResult {
        let findings =
            rules::check_inspection(inspection, deficiencies, total_photos, &self.criteria);
        let is_valid = findings.errors.is_empty();

        let property = inspection
            .property_name
            .as_deref()
            .filter(|name| !name.trim().is_empty())
            .unwrap_or(UNKNOWN_PROPERTY);
        let inspector = inspection
            .inspector_name
            .as_deref()
            .filter(|name| !name.trim().is_empty())
            .unwrap_or(UNKNOWN_INSPECTOR);

        let summary = if is_valid {
            format!(
                "[PASS] Inspection of {property} by {inspector} is ready for submission with {} deficiencies and {total_photos} photos",
                deficiencies.len()
            )
        } else {
            format!(
                "[FAIL] Inspection of {property} by {inspector} has {} blocking issue(s) ({} deficiencies, {total_photos} photos)",
                findings.errors.len(),
                deficiencies.len()
            )
        };

        ValidationResult {
            is_valid,
            errors: findings.errors,
            warnings: findings.warnings,
            summary,
        }
    }

    /// Fetch the inspection and related rows, then run the synchronous rules.
    pub async fn validate_inspection<S>(&self, store: &S, id: &InspectionId) -> ValidationResult
    where
        S: InspectionStore + ?Sized,
    {
        match store.fetch_bundle(id).await {
            Ok(Some(bundle)) => self.validate_inspection_sync(
                &bundle.inspection,
                &bundle.deficiencies,
                bundle.total_photos,
            ),
            Ok(None) => ValidationResult::failure(
                format!("Inspection {id} not found"),
                "[FAIL] Validation could not be completed",
            ),
            Err(err) => {
                warn!(inspection_id = %id, error = %err, "inspection validation fetch failed");
                ValidationResult::failure(
                    format!("Validation failed: {err}"),
                    "[FAIL] Validation could not be completed",
                )
            }
        }
    }
}

/// Outcome of a completeness check. Recomputed on demand, never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub is_valid: bool,
    pub errors: Vec<String>,
    #[serde(default)]
    pub warnings: Vec<String>,
    pub summary: String,
}

impl ValidationResult {
    fn failure(error: String, summary: &str) -> Self {
        Self {
            is_valid: false,
            errors: vec![error],
            warnings: Vec::new(),
            summary: summary.to_string(),
        }
    }
}
