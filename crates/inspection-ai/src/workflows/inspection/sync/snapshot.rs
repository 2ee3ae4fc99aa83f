use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::super::domain::{Inspection, InspectionStatus};

/// Shallow comparison on length and per-row `(id, status, updated_at)`.
pub(crate) fn has_changed(previous: &[Inspection], next: &[Inspection]) -> bool {
    if previous.len() != next.len() {
        return true;
    }

    previous.iter().zip(next).any(|(before, after)| {
        before.id != after.id
            || before.status != after.status
            || before.updated_at != after.updated_at
    })
}

/// Dashboard counters derived from the cached inspection list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InspectionCounts {
    pub scheduled: usize,
    pub in_progress: usize,
    pub completed: usize,
    pub past_due: usize,
}

impl InspectionCounts {
    pub fn tally(inspections: &[Inspection], today: NaiveDate) -> Self {
        inspections
            .iter()
            .fold(Self::default(), |mut counts, inspection| {
                match inspection.status {
                    InspectionStatus::Scheduled => counts.scheduled += 1,
                    InspectionStatus::InProgress => counts.in_progress += 1,
                    InspectionStatus::Completed => counts.completed += 1,
                    InspectionStatus::Cancelled => {}
                }
                if inspection.is_past_due(today) {
                    counts.past_due += 1;
                }
                counts
            })
    }
}
