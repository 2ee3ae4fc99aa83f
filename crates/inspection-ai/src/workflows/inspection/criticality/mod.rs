mod config;
mod policy;
mod rules;

pub use config::{
    BaseScores, CriticalityConfig, CriticalityThresholds, KeywordBonuses, KeywordSets,
    SeverityMultipliers,
};
pub use policy::UrgencyLevel;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::domain::{Deficiency, MAX_CRITICALITY_SCORE};
use policy::{recommended_actions, rollup_recommendations, urgency_for};

/// Keyword-weighted classifier that turns deficiency text into a risk score.
///
/// Scoring is a pure function of the deficiency and the owned configuration.
#[derive(Debug, Clone, Default)]
pub struct CriticalityScorer {
    config: CriticalityConfig,
}

impl CriticalityScorer {
    pub fn new(config: CriticalityConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CriticalityConfig {
        &self.config
    }

    pub fn update_config(&mut self, config: CriticalityConfig) {
        self.config = config;
    }

    pub fn analyze_deficiency(&self, deficiency: &Deficiency) -> CriticalityAnalysis {
        let signals = rules::score_deficiency(deficiency, &self.config);
        let thresholds = &self.config.thresholds;
        let score = signals.score;

        let urgency = urgency_for(score, signals.emergency_keyword, thresholds);
        let recommended_actions = recommended_actions(score, &signals.risk_factors, thresholds);
        let confidence = rules::confidence(signals.matched_keywords.len(), &deficiency.description);

        CriticalityAnalysis {
            score,
            is_emergency: score >= thresholds.emergency,
            is_immediate_repair: score >= thresholds.immediate_repair,
            needs_supervisor_alert: score >= thresholds.supervisor_alert,
            urgency,
            matched_keywords: signals.matched_keywords,
            risk_factors: signals.risk_factors,
            recommended_actions,
            confidence,
        }
    }

    /// Return a copy of `deficiency` carrying the derived scoring fields.
    ///
    /// Already-scored deficiencies keep their score; only the escalation
    /// flags are re-derived from it.
    pub fn enhance_deficiency(
        &self,
        deficiency: &Deficiency,
        detected_at: DateTime<Utc>,
    ) -> Deficiency {
        let mut enhanced = deficiency.clone();
        if let Some(stored) = enhanced.criticality_score {
            let score = stored.min(MAX_CRITICALITY_SCORE);
            let thresholds = &self.config.thresholds;
            enhanced.criticality_score = Some(score);
            enhanced.is_immediate_repair = score >= thresholds.immediate_repair;
            enhanced.needs_supervisor_alert = score >= thresholds.supervisor_alert;
            return enhanced;
        }

        let analysis = self.analyze_deficiency(deficiency);
        enhanced.is_immediate_repair = analysis.is_immediate_repair;
        enhanced.needs_supervisor_alert = analysis.needs_supervisor_alert;
        enhanced.criticality_score = Some(analysis.score);
        enhanced.detection_timestamp = Some(detected_at);
        enhanced
    }

    pub fn enhance_deficiencies(
        &self,
        deficiencies: &[Deficiency],
        detected_at: DateTime<Utc>,
    ) -> Vec<Deficiency> {
        deficiencies
            .iter()
            .map(|deficiency| self.enhance_deficiency(deficiency, detected_at))
            .collect()
    }

    pub fn analyze_inspection(&self, deficiencies: &[Deficiency]) -> InspectionCriticality {
        let thresholds = &self.config.thresholds;
        let analyses: Vec<CriticalityAnalysis> = deficiencies
            .iter()
            .map(|deficiency| self.analyze_deficiency(deficiency))
            .collect();

        let max_score = analyses
            .iter()
            .map(|analysis| analysis.score)
            .max()
            .unwrap_or(0);
        let emergency_count = analyses
            .iter()
            .filter(|analysis| analysis.score >= thresholds.emergency)
            .count();
        // Keyword-only emergencies escalate the response without crossing the score threshold.
        let emergency_urgency_count = analyses
            .iter()
            .filter(|analysis| analysis.urgency == UrgencyLevel::Emergency)
            .count();
        let immediate_repair_count = analyses
            .iter()
            .filter(|analysis| analysis.score >= thresholds.immediate_repair)
            .count();
        let supervisor_alert_count = analyses
            .iter()
            .filter(|analysis| analysis.score >= thresholds.supervisor_alert)
            .count();

        InspectionCriticality {
            deficiency_count: deficiencies.len(),
            max_score,
            emergency_count,
            immediate_repair_count,
            supervisor_alert_count,
            requires_immediate_response: emergency_urgency_count > 0,
            recommendations: rollup_recommendations(
                emergency_urgency_count,
                immediate_repair_count,
                supervisor_alert_count,
            ),
        }
    }
}

/// Independent risk detectors; several may be true at once.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskFactors {
    pub structural: bool,
    pub safety: bool,
    pub weather_exposure: bool,
    pub electrical: bool,
}

/// Derived scoring output for one deficiency. Not persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CriticalityAnalysis {
    pub score: u8,
    pub is_emergency: bool,
    pub is_immediate_repair: bool,
    pub needs_supervisor_alert: bool,
    pub urgency: UrgencyLevel,
    pub matched_keywords: Vec<String>,
    pub risk_factors: RiskFactors,
    pub recommended_actions: Vec<String>,
    /// Keyword/length heuristic, not a calibrated probability.
    pub confidence: u8,
}

/// Inspection-level rollup across every recorded deficiency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InspectionCriticality {
    pub deficiency_count: usize,
    pub max_score: u8,
    /// Deficiencies scoring at or above the emergency threshold.
    pub emergency_count: usize,
    pub immediate_repair_count: usize,
    pub supervisor_alert_count: usize,
    /// Any deficiency at emergency urgency, keyword-triggered ones included.
    pub requires_immediate_response: bool,
    pub recommendations: Vec<String>,
}
