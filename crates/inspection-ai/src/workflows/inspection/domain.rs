use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Identifier wrapper for inspection records.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InspectionId(pub String);

impl std::fmt::Display for InspectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Inspector-assessed severity of a single deficiency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl Severity {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }

    /// Lenient parse used by importers; unknown labels yield `None`.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "low" | "minor" => Some(Self::Low),
            "medium" | "moderate" => Some(Self::Medium),
            "high" | "major" | "severe" => Some(Self::High),
            _ => None,
        }
    }
}

/// A single defect recorded during a property inspection.
///
/// The trailing fields are written by the criticality scorer. Once
/// `criticality_score` is present it is authoritative; call
/// [`Deficiency::clear_analysis`] before scoring the record again.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Deficiency {
    pub id: String,
    #[serde(rename = "type", alias = "category", default)]
    pub category: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub severity: Option<Severity>,
    #[serde(default)]
    pub estimated_cost: f64,
    #[serde(default)]
    pub photos: Vec<String>,
    #[serde(default)]
    pub is_immediate_repair: bool,
    #[serde(default)]
    pub needs_supervisor_alert: bool,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_score"
    )]
    pub criticality_score: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detection_timestamp: Option<DateTime<Utc>>,
}

/// Upper bound of the criticality scale.
pub const MAX_CRITICALITY_SCORE: u8 = 100;

fn deserialize_score<'de, D>(deserializer: D) -> Result<Option<u8>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    match Option::<u8>::deserialize(deserializer)? {
        Some(score) if score > MAX_CRITICALITY_SCORE => Err(serde::de::Error::custom(format!(
            "criticality_score {score} exceeds {MAX_CRITICALITY_SCORE}"
        ))),
        other => Ok(other),
    }
}

impl Deficiency {
    pub fn new(id: impl Into<String>, category: impl Into<String>, severity: Severity) -> Self {
        Self {
            id: id.into(),
            category: category.into(),
            location: String::new(),
            description: String::new(),
            severity: Some(severity),
            estimated_cost: 0.0,
            photos: Vec::new(),
            is_immediate_repair: false,
            needs_supervisor_alert: false,
            criticality_score: None,
            detection_timestamp: None,
        }
    }

    pub fn is_scored(&self) -> bool {
        self.criticality_score.is_some()
    }

    /// Drop the derived scoring fields so the next enhancement pass rescores the record.
    pub fn clear_analysis(&mut self) {
        self.is_immediate_repair = false;
        self.needs_supervisor_alert = false;
        self.criticality_score = None;
        self.detection_timestamp = None;
    }

    pub(crate) fn field_value(&self, field: DeficiencyField) -> Option<&str> {
        match field {
            DeficiencyField::Type => Some(self.category.as_str()),
            DeficiencyField::Location => Some(self.location.as_str()),
            DeficiencyField::Description => Some(self.description.as_str()),
            DeficiencyField::Severity => self.severity.map(Severity::label),
        }
    }
}

/// Deficiency attributes that validation criteria may require.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeficiencyField {
    Type,
    Location,
    Description,
    Severity,
}

impl DeficiencyField {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Type => "type",
            Self::Location => "location",
            Self::Description => "description",
            Self::Severity => "severity",
        }
    }
}

/// Lifecycle status of an inspection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InspectionStatus {
    Scheduled,
    InProgress,
    Completed,
    Cancelled,
}

impl InspectionStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Scheduled => "scheduled",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }
}

/// Client-side projection of an inspection row and its joined names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Inspection {
    pub id: InspectionId,
    pub status: InspectionStatus,
    #[serde(default)]
    pub scheduled_date: Option<NaiveDate>,
    #[serde(default)]
    pub completed_date: Option<NaiveDate>,
    #[serde(default)]
    pub property_id: Option<String>,
    #[serde(default)]
    pub property_name: Option<String>,
    #[serde(default)]
    pub inspector_id: Option<String>,
    #[serde(default)]
    pub inspector_name: Option<String>,
    #[serde(default)]
    pub roof_id: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Inspection {
    pub fn new(id: impl Into<String>, status: InspectionStatus) -> Self {
        Self {
            id: InspectionId(id.into()),
            status,
            scheduled_date: None,
            completed_date: None,
            property_id: None,
            property_name: None,
            inspector_id: None,
            inspector_name: None,
            roof_id: None,
            notes: None,
            updated_at: None,
        }
    }

    pub fn is_past_due(&self, today: NaiveDate) -> bool {
        self.status == InspectionStatus::Scheduled
            && self.scheduled_date.map(|date| date < today).unwrap_or(false)
    }

    pub(crate) fn field_value(&self, field: InspectionField) -> Option<String> {
        match field {
            InspectionField::Notes => self.notes.clone(),
            InspectionField::Status => Some(self.status.label().to_string()),
            InspectionField::ScheduledDate => self.scheduled_date.map(|date| date.to_string()),
            InspectionField::CompletedDate => self.completed_date.map(|date| date.to_string()),
            InspectionField::PropertyId => self.property_id.clone(),
            InspectionField::InspectorId => self.inspector_id.clone(),
            InspectionField::RoofId => self.roof_id.clone(),
        }
    }
}

/// Inspection attributes that validation criteria may require.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InspectionField {
    Notes,
    Status,
    ScheduledDate,
    CompletedDate,
    PropertyId,
    InspectorId,
    RoofId,
}

impl InspectionField {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Notes => "notes",
            Self::Status => "status",
            Self::ScheduledDate => "scheduled_date",
            Self::CompletedDate => "completed_date",
            Self::PropertyId => "property_id",
            Self::InspectorId => "inspector_id",
            Self::RoofId => "roof_id",
        }
    }
}

/// An inspection together with the related rows validation needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InspectionBundle {
    pub inspection: Inspection,
    pub deficiencies: Vec<Deficiency>,
    pub total_photos: usize,
}

/// Filter parameters for the synced inspection list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InspectionFilter {
    #[serde(default)]
    pub property_id: Option<String>,
    #[serde(default)]
    pub inspector_id: Option<String>,
    #[serde(default)]
    pub status: Option<InspectionStatus>,
}

impl InspectionFilter {
    pub fn matches(&self, inspection: &Inspection) -> bool {
        let property_ok = match &self.property_id {
            Some(id) => inspection.property_id.as_deref() == Some(id.as_str()),
            None => true,
        };
        let inspector_ok = match &self.inspector_id {
            Some(id) => inspection.inspector_id.as_deref() == Some(id.as_str()),
            None => true,
        };
        let status_ok = self
            .status
            .map(|status| inspection.status == status)
            .unwrap_or(true);

        property_ok && inspector_ok && status_ok
    }
}
