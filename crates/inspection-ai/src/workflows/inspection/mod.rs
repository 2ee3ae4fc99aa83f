//! Roof inspection review: deficiency scoring, submission validation, and
//! the cached inspection list kept in step with the remote store.

pub mod criticality;
pub mod domain;
pub mod events;
pub mod import;
pub mod repository;
pub mod router;
pub mod service;
pub mod sync;
pub mod validation;

#[cfg(test)]
mod tests;

pub use criticality::{
    CriticalityAnalysis, CriticalityConfig, CriticalityScorer, InspectionCriticality,
    RiskFactors, UrgencyLevel,
};
pub use domain::{
    Deficiency, DeficiencyField, Inspection, InspectionBundle, InspectionField, InspectionFilter,
    InspectionId, InspectionStatus, Severity,
};
pub use events::{EventBus, InspectionEvent};
pub use import::{DeficiencyImportError, DeficiencyImporter};
pub use repository::{InspectionStore, Notice, NoticeLevel, StoreError, SyncNotifier};
pub use router::{inspection_router, ValidationRequest};
pub use service::{CompletionOutcome, InspectionService, InspectionServiceError};
pub use sync::{
    Debouncer, InspectionCounts, RefreshOutcome, SyncCoordinator, SyncSettings, SyncSnapshot,
    SyncStatus,
};
pub use validation::{CriteriaUpdate, InspectionValidator, ValidationCriteria, ValidationResult};
