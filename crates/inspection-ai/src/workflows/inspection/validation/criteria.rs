use serde::{Deserialize, Serialize};

use super::super::domain::{DeficiencyField, InspectionField};
use crate::config::ValidationTuning;

/// Completeness thresholds an inspection must meet before submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationCriteria {
    pub minimum_deficiencies: usize,
    pub minimum_photos: usize,
    /// Photo counts below `minimum_photos + photo_warning_margin` produce an advisory warning.
    pub photo_warning_margin: usize,
    pub required_inspection_fields: Vec<InspectionField>,
    pub required_deficiency_fields: Vec<DeficiencyField>,
}

impl Default for ValidationCriteria {
    fn default() -> Self {
        Self {
            minimum_deficiencies: 1,
            minimum_photos: 3,
            photo_warning_margin: 2,
            required_inspection_fields: vec![InspectionField::Notes, InspectionField::Status],
            required_deficiency_fields: vec![
                DeficiencyField::Type,
                DeficiencyField::Severity,
                DeficiencyField::Description,
            ],
        }
    }
}

impl From<ValidationTuning> for ValidationCriteria {
    fn from(tuning: ValidationTuning) -> Self {
        Self {
            minimum_deficiencies: tuning.minimum_deficiencies,
            minimum_photos: tuning.minimum_photos,
            ..Self::default()
        }
    }
}

/// Partial override applied through `update_criteria`; absent fields keep their value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CriteriaUpdate {
    #[serde(default)]
    pub minimum_deficiencies: Option<usize>,
    #[serde(default)]
    pub minimum_photos: Option<usize>,
    #[serde(default)]
    pub photo_warning_margin: Option<usize>,
    #[serde(default)]
    pub required_inspection_fields: Option<Vec<InspectionField>>,
    #[serde(default)]
    pub required_deficiency_fields: Option<Vec<DeficiencyField>>,
}

impl ValidationCriteria {
    pub fn apply(&mut self, update: CriteriaUpdate) {
        if let Some(value) = update.minimum_deficiencies {
            self.minimum_deficiencies = value;
        }
        if let Some(value) = update.minimum_photos {
            self.minimum_photos = value;
        }
        if let Some(value) = update.photo_warning_margin {
            self.photo_warning_margin = value;
        }
        if let Some(fields) = update.required_inspection_fields {
            self.required_inspection_fields = fields;
        }
        if let Some(fields) = update.required_deficiency_fields {
            self.required_deficiency_fields = fields;
        }
    }
}
