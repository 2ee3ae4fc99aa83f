use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use inspection_ai::workflows::inspection::{
    Deficiency, Inspection, InspectionBundle, InspectionFilter, InspectionId, InspectionStatus,
    InspectionStore, Notice, NoticeLevel, Severity, StoreError, SyncCoordinator, SyncNotifier,
};
use metrics_exporter_prometheus::PrometheusHandle;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};

pub(crate) type InspectionSync = SyncCoordinator<InMemoryInspectionStore>;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Process-local stand-in for the remote records store.
#[derive(Default, Clone)]
pub(crate) struct InMemoryInspectionStore {
    bundles: Arc<Mutex<HashMap<InspectionId, InspectionBundle>>>,
}

impl InMemoryInspectionStore {
    pub(crate) fn with_bundles(bundles: impl IntoIterator<Item = InspectionBundle>) -> Self {
        let store = Self::default();
        {
            let mut guard = store.bundles.lock().expect("store mutex poisoned");
            for bundle in bundles {
                guard.insert(bundle.inspection.id.clone(), bundle);
            }
        }
        store
    }

    pub(crate) fn len(&self) -> usize {
        self.bundles.lock().expect("store mutex poisoned").len()
    }
}

#[async_trait]
impl InspectionStore for InMemoryInspectionStore {
    async fn list_inspections(
        &self,
        filter: &InspectionFilter,
    ) -> Result<Vec<Inspection>, StoreError> {
        let guard = self.bundles.lock().expect("store mutex poisoned");
        let mut inspections: Vec<Inspection> = guard
            .values()
            .filter(|bundle| filter.matches(&bundle.inspection))
            .map(|bundle| bundle.inspection.clone())
            .collect();
        inspections.sort_by(|left, right| left.id.cmp(&right.id));
        Ok(inspections)
    }

    async fn fetch_bundle(
        &self,
        id: &InspectionId,
    ) -> Result<Option<InspectionBundle>, StoreError> {
        let guard = self.bundles.lock().expect("store mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    async fn update_status(
        &self,
        id: &InspectionId,
        status: InspectionStatus,
        completed_date: Option<NaiveDate>,
    ) -> Result<Inspection, StoreError> {
        let mut guard = self.bundles.lock().expect("store mutex poisoned");
        let bundle = guard.get_mut(id).ok_or(StoreError::NotFound)?;
        bundle.inspection.status = status;
        if completed_date.is_some() {
            bundle.inspection.completed_date = completed_date;
        } else if status == InspectionStatus::Completed
            && bundle.inspection.completed_date.is_none()
        {
            bundle.inspection.completed_date = Some(Utc::now().date_naive());
        }
        bundle.inspection.updated_at = Some(Utc::now());
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
        bundle.inspection.updated_at = Some(Utc::now());
        Ok(())
    }
}

/// Routes sync notices into the log stream.
#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct TracingNotifier;

impl SyncNotifier for TracingNotifier {
    fn notify(&self, notice: Notice) {
        match notice.level {
            NoticeLevel::Info => tracing::info!(title = %notice.title, "{}", notice.message),
            NoticeLevel::Error => tracing::error!(title = %notice.title, "{}", notice.message),
        }
    }
}

/// Sample portfolio used when the service runs without a remote store.
pub(crate) fn seed_bundles(today: NaiveDate) -> Vec<InspectionBundle> {
    let days = chrono::Duration::days;

    let mut overdue = Inspection::new("insp-1001", InspectionStatus::Scheduled);
    overdue.property_id = Some("prop-7".to_string());
    overdue.property_name = Some("Harbor View Plaza".to_string());
    overdue.scheduled_date = Some(today - days(3));

    let mut upcoming = Inspection::new("insp-1002", InspectionStatus::Scheduled);
    upcoming.property_id = Some("prop-12".to_string());
    upcoming.property_name = Some("Cedar Point Offices".to_string());
    upcoming.scheduled_date = Some(today + days(5));

    let mut underway = Inspection::new("insp-1003", InspectionStatus::InProgress);
    underway.property_id = Some("prop-7".to_string());
    underway.property_name = Some("Harbor View Plaza".to_string());
    underway.inspector_id = Some("inspector-3".to_string());
    underway.inspector_name = Some("Dana Ortiz".to_string());
    underway.roof_id = Some("roof-north".to_string());
    underway.scheduled_date = Some(today - days(1));
    underway.notes = Some("North membrane walked, parapet flashing lifted".to_string());

    let mut flashing = Deficiency::new("def-1", "flashing", Severity::High);
    flashing.location = "north parapet".to_string();
    flashing.description = "lifted flashing with active leak into stairwell".to_string();
    flashing.estimated_cost = 1_800.0;
    flashing.photos = vec!["def-1-a.jpg".to_string(), "def-1-b.jpg".to_string()];

    let mut drain = Deficiency::new("def-2", "drain", Severity::Medium);
    drain.location = "center bay".to_string();
    drain.description = "partially blocked drain with ponding".to_string();
    drain.estimated_cost = 350.0;

    vec![
        InspectionBundle {
            inspection: overdue,
            deficiencies: Vec::new(),
            total_photos: 0,
        },
        InspectionBundle {
            inspection: upcoming,
            deficiencies: Vec::new(),
            total_photos: 0,
        },
        InspectionBundle {
            inspection: underway,
            deficiencies: vec![flashing, drain],
            total_photos: 4,
        },
    ]
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}

pub(crate) fn deserialize_optional_date<'de, D>(
    deserializer: D,
) -> Result<Option<NaiveDate>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    opt.map(|value| parse_date(&value).map_err(serde::de::Error::custom))
        .transpose()
}
