use serde::{Deserialize, Serialize};

use super::config::CriticalityThresholds;
use super::RiskFactors;

/// Categorical urgency derived from the score and emergency keywords.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UrgencyLevel {
    Low,
    Medium,
    High,
    Critical,
    Emergency,
}

impl UrgencyLevel {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
            Self::Emergency => "emergency",
        }
    }
}

pub(crate) fn urgency_for(
    score: u8,
    emergency_keyword: bool,
    thresholds: &CriticalityThresholds,
) -> UrgencyLevel {
    if score >= thresholds.emergency || emergency_keyword {
        UrgencyLevel::Emergency
    } else if score >= thresholds.immediate_repair {
        UrgencyLevel::Critical
    } else if score >= thresholds.supervisor_alert {
        UrgencyLevel::High
    } else if score >= thresholds.medium {
        UrgencyLevel::Medium
    } else {
        UrgencyLevel::Low
    }
}

pub(crate) fn recommended_actions(
    score: u8,
    risk_factors: &RiskFactors,
    thresholds: &CriticalityThresholds,
) -> Vec<String> {
    let mut actions = Vec::new();

    if score >= thresholds.emergency {
        actions.push("Contact the property manager immediately".to_string());
        actions.push("Secure the area and restrict roof access".to_string());
        actions.push("Dispatch an emergency repair crew".to_string());
    } else if score >= thresholds.immediate_repair {
        actions.push("Schedule repair within 24 hours".to_string());
        actions.push("Notify the property manager".to_string());
    } else if score >= thresholds.supervisor_alert {
        actions.push("Alert a supervisor for review".to_string());
    }

    if risk_factors.structural {
        actions.push("Engage a structural engineer to assess load-bearing members".to_string());
    }
    if risk_factors.safety {
        actions.push("Post safety warnings and restrict access to the affected area".to_string());
    }
    if risk_factors.weather_exposure {
        actions.push("Apply temporary weatherproofing until the repair is complete".to_string());
    }
    if risk_factors.electrical {
        actions.push("Have a licensed electrician inspect affected wiring".to_string());
    }

    actions
}

pub(crate) fn rollup_recommendations(
    emergency: usize,
    immediate_repair: usize,
    supervisor_alert: usize,
) -> Vec<String> {
    let mut recommendations = Vec::new();

    if emergency > 0 {
        recommendations.push(format!(
            "Immediate response required for {emergency} emergency deficienc{}",
            if emergency == 1 { "y" } else { "ies" }
        ));
    }
    if immediate_repair > 0 {
        recommendations.push(format!(
            "Repair within 24 hours: {immediate_repair} deficienc{}",
            if immediate_repair == 1 { "y" } else { "ies" }
        ));
    }
    if supervisor_alert > 0 {
        recommendations.push(format!(
            "Supervisor review requested for {supervisor_alert} deficienc{}",
            if supervisor_alert == 1 { "y" } else { "ies" }
        ));
    }
    if recommendations.is_empty() {
        recommendations.push("No critical deficiencies detected".to_string());
    }

    recommendations
}
