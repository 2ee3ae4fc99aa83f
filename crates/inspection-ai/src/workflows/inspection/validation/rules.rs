use super::super::domain::{Deficiency, Inspection, InspectionStatus};
use super::criteria::ValidationCriteria;

/// Accumulates blocking errors and advisory warnings in rule order.
#[derive(Debug, Default)]
pub(crate) struct Findings {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

pub(crate) fn check_inspection(
    inspection: &Inspection,
    deficiencies: &[Deficiency],
    total_photos: usize,
    criteria: &ValidationCriteria,
) -> Findings {
    let mut findings = Findings::default();

    if inspection.status != InspectionStatus::Completed {
        findings.errors.push(format!(
            "Inspection status must be 'completed' (current status: '{}')",
            inspection.status.label()
        ));
    }

    for field in &criteria.required_inspection_fields {
        let present = inspection
            .field_value(*field)
            .map(|value| !value.trim().is_empty())
            .unwrap_or(false);
        if !present {
            findings.errors.push(format!(
                "Inspection is missing required field '{}'",
                field.label()
            ));
        }
    }

    if deficiencies.len() < criteria.minimum_deficiencies {
        findings.errors.push(format!(
            "At least {} deficiency record(s) required, found {}",
            criteria.minimum_deficiencies,
            deficiencies.len()
        ));
    } else {
        check_deficiencies(deficiencies, criteria, &mut findings);
    }

    check_photos(total_photos, criteria, &mut findings);

    findings
}

fn check_deficiencies(
    deficiencies: &[Deficiency],
    criteria: &ValidationCriteria,
    findings: &mut Findings,
) {
    for (index, deficiency) in deficiencies.iter().enumerate() {
        let position = index + 1;
        for field in &criteria.required_deficiency_fields {
            let present = deficiency
                .field_value(*field)
                .map(|value| !value.trim().is_empty())
                .unwrap_or(false);
            if !present {
                findings.errors.push(format!(
                    "Deficiency {position} is missing required field '{}'",
                    field.label()
                ));
            }
        }

        if deficiency.photos.is_empty() {
            findings
                .warnings
                .push(format!("Deficiency {position} has no attached photos"));
        }
    }
}

fn check_photos(total_photos: usize, criteria: &ValidationCriteria, findings: &mut Findings) {
    let minimum = criteria.minimum_photos;
    if total_photos < minimum {
        findings.errors.push(format!(
            "At least {minimum} photo(s) required, found {total_photos}"
        ));
    } else if total_photos < minimum.saturating_add(criteria.photo_warning_margin) {
        findings.warnings.push(format!(
            "Only {total_photos} photo(s) attached; consider adding more coverage"
        ));
    }
}
