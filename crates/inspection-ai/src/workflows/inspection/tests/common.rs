use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::response::Response;
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde_json::Value;

use crate::workflows::inspection::domain::{
    Deficiency, Inspection, InspectionBundle, InspectionFilter, InspectionId, InspectionStatus,
    Severity,
};
use crate::workflows::inspection::repository::{
    InspectionStore, Notice, StoreError, SyncNotifier,
};
use crate::workflows::inspection::{
    CriticalityConfig, EventBus, InspectionService, ValidationCriteria,
};

pub(super) fn detected_at() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 12, 14, 30, 0)
        .single()
        .expect("valid timestamp")
}

pub(super) fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 6, 12).expect("valid date")
}

pub(super) fn inspection(id: &str, status: InspectionStatus) -> Inspection {
    let mut inspection = Inspection::new(id, status);
    inspection.notes = Some("ok".to_string());
    inspection.property_id = Some("prop-7".to_string());
    inspection.property_name = Some("Harbor View Plaza".to_string());
    inspection.inspector_id = Some("inspector-3".to_string());
    inspection.inspector_name = Some("Dana Ortiz".to_string());
    inspection.scheduled_date = NaiveDate::from_ymd_opt(2025, 6, 10);
    inspection
}

pub(super) fn completed_inspection() -> Inspection {
    inspection("insp-100", InspectionStatus::Completed)
}

pub(super) fn deficiency(
    id: &str,
    category: &str,
    severity: Severity,
    description: &str,
) -> Deficiency {
    let mut deficiency = Deficiency::new(id, category, severity);
    deficiency.description = description.to_string();
    deficiency
}

pub(super) fn leak_deficiency() -> Deficiency {
    deficiency("def-1", "leak", Severity::High, "roof leak at north corner")
}

/// High severity with text that matches no keyword list.
pub(super) fn plain_high_deficiency() -> Deficiency {
    let mut deficiency = deficiency("def-2", "tile", Severity::High, "discoloured shingle");
    deficiency.location = "south slope".to_string();
    deficiency
}

pub(super) fn structural_deficiency() -> Deficiency {
    let mut deficiency = deficiency(
        "def-3",
        "roof deck",
        Severity::High,
        "structural damage visible beneath the parapet",
    );
    deficiency.photos = vec!["photo-31.jpg".to_string()];
    deficiency
}

pub(super) fn bundle(
    inspection: Inspection,
    deficiencies: Vec<Deficiency>,
    total_photos: usize,
) -> InspectionBundle {
    InspectionBundle {
        inspection,
        deficiencies,
        total_photos,
    }
}

/// In-memory store with switchable failure modes.
#[derive(Default)]
pub(super) struct MemoryStore {
    bundles: Mutex<BTreeMap<InspectionId, InspectionBundle>>,
    list_calls: AtomicUsize,
    fail_lists: AtomicBool,
    reject_updates: AtomicBool,
}

impl MemoryStore {
    pub(super) fn with_bundles(bundles: Vec<InspectionBundle>) -> Self {
        let store = Self::default();
        for bundle in bundles {
            store.insert(bundle);
        }
        store
    }

    pub(super) fn insert(&self, bundle: InspectionBundle) {
        self.bundles
            .lock()
            .expect("store mutex poisoned")
            .insert(bundle.inspection.id.clone(), bundle);
    }

    pub(super) fn bundle(&self, id: &str) -> Option<InspectionBundle> {
        self.bundles
            .lock()
            .expect("store mutex poisoned")
            .get(&InspectionId(id.to_string()))
            .cloned()
    }

    pub(super) fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub(super) fn fail_lists(&self, fail: bool) {
        self.fail_lists.store(fail, Ordering::SeqCst);
    }

    pub(super) fn reject_updates(&self, reject: bool) {
        self.reject_updates.store(reject, Ordering::SeqCst);
    }
}

#[async_trait]
impl InspectionStore for MemoryStore {
    async fn list_inspections(
        &self,
        filter: &InspectionFilter,
    ) -> Result<Vec<Inspection>, StoreError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_lists.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("connection reset".to_string()));
        }
        let guard = self.bundles.lock().expect("store mutex poisoned");
        Ok(guard
            .values()
            .map(|bundle| bundle.inspection.clone())
            .filter(|inspection| filter.matches(inspection))
            .collect())
    }

    async fn fetch_bundle(
        &self,
        id: &InspectionId,
    ) -> Result<Option<InspectionBundle>, StoreError> {
        Ok(self
            .bundles
            .lock()
            .expect("store mutex poisoned")
            .get(id)
            .cloned())
    }

    async fn update_status(
        &self,
        id: &InspectionId,
        status: InspectionStatus,
        completed_date: Option<NaiveDate>,
    ) -> Result<Inspection, StoreError> {
        if self.reject_updates.load(Ordering::SeqCst) {
            return Err(StoreError::Rejected("row is locked".to_string()));
        }
        let mut guard = self.bundles.lock().expect("store mutex poisoned");
        let bundle = guard.get_mut(id).ok_or(StoreError::NotFound)?;
        bundle.inspection.status = status;
        if completed_date.is_some() {
            bundle.inspection.completed_date = completed_date;
        }
        bundle.inspection.updated_at = Some(detected_at());
        Ok(bundle.inspection.clone())
    }

    async fn save_deficiencies(
        &self,
        id: &InspectionId,
        deficiencies: &[Deficiency],
    ) -> Result<(), StoreError> {
        let mut guard = self.bundles.lock().expect("store mutex poisoned");
        let bundle = guard.get_mut(id).ok_or(StoreError::NotFound)?;
        bundle.deficiencies = deficiencies.to_vec();
        Ok(())
    }
}

/// Store whose every call fails, as when the backend is offline.
pub(super) struct OfflineStore;

#[async_trait]
impl InspectionStore for OfflineStore {
    async fn list_inspections(
        &self,
        _filter: &InspectionFilter,
    ) -> Result<Vec<Inspection>, StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }

    async fn fetch_bundle(
        &self,
        _id: &InspectionId,
    ) -> Result<Option<InspectionBundle>, StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }

    async fn update_status(
        &self,
        _id: &InspectionId,
        _status: InspectionStatus,
        _completed_date: Option<NaiveDate>,
    ) -> Result<Inspection, StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }

    async fn save_deficiencies(
        &self,
        _id: &InspectionId,
        _deficiencies: &[Deficiency],
    ) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }
}

#[derive(Default)]
pub(super) struct RecordingNotifier {
    notices: Mutex<Vec<Notice>>,
}

impl RecordingNotifier {
    pub(super) fn notices(&self) -> Vec<Notice> {
        self.notices.lock().expect("notifier mutex poisoned").clone()
    }
}

impl SyncNotifier for RecordingNotifier {
    fn notify(&self, notice: Notice) {
        self.notices
            .lock()
            .expect("notifier mutex poisoned")
            .push(notice);
    }
}

pub(super) fn build_service<S>(store: Arc<S>) -> InspectionService<S>
where
    S: InspectionStore + 'static,
{
    InspectionService::new(
        store,
        EventBus::new(),
        CriticalityConfig::default(),
        ValidationCriteria::default(),
    )
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
