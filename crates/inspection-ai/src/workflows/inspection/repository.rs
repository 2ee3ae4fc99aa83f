use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::domain::{
    Deficiency, Inspection, InspectionBundle, InspectionFilter, InspectionId, InspectionStatus,
};

/// Remote records store holding inspections, their deficiencies, and photo counts.
#[async_trait]
pub trait InspectionStore: Send + Sync {
    async fn list_inspections(
        &self,
        filter: &InspectionFilter,
    ) -> Result<Vec<Inspection>, StoreError>;

    async fn fetch_bundle(&self, id: &InspectionId) -> Result<Option<InspectionBundle>, StoreError>;

    /// Move an inspection to `status`. A `completed_date` is recorded on the
    /// row as given; stores may stamp their own date when it is `None`.
    async fn update_status(
        &self,
        id: &InspectionId,
        status: InspectionStatus,
        completed_date: Option<NaiveDate>,
    ) -> Result<Inspection, StoreError>;

    /// Replace the deficiency rows recorded for an inspection.
    async fn save_deficiencies(
        &self,
        id: &InspectionId,
        deficiencies: &[Deficiency],
    ) -> Result<(), StoreError>;
}

/// Error enumeration for store failures.
#[derive(Debug, Clone, thiserror::Error)]
pub enum StoreError {
    #[error("record not found")]
    NotFound,
    #[error("store rejected the write: {0}")]
    Rejected(String),
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// User-facing notification severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeLevel {
    Info,
    Error,
}

/// Toast-style message surfaced to whoever is watching the sync coordinator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub title: String,
    pub message: String,
}

/// Outbound notification hook (toast UI, chat webhook, log sink).
pub trait SyncNotifier: Send + Sync {
    fn notify(&self, notice: Notice);
}
