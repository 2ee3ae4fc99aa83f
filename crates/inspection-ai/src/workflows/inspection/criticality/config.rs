use serde::{Deserialize, Serialize};

use super::super::domain::Severity;

/// Keyword dictionaries, weights, and thresholds driving the criticality scorer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CriticalityConfig {
    pub keywords: KeywordSets,
    pub bonuses: KeywordBonuses,
    /// Ordered `(category fragment, multiplier)` pairs; the first fragment found
    /// in the deficiency category wins.
    pub type_multipliers: Vec<(String, f32)>,
    pub severity_multipliers: SeverityMultipliers,
    pub base_scores: BaseScores,
    pub thresholds: CriticalityThresholds,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeywordSets {
    pub critical: Vec<String>,
    pub high_priority: Vec<String>,
    pub structural: Vec<String>,
    pub safety: Vec<String>,
    pub emergency: Vec<String>,
    pub weather_exposure: Vec<String>,
    pub electrical: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KeywordBonuses {
    pub critical: f32,
    pub high_priority: f32,
    pub structural: f32,
    pub safety: f32,
    pub emergency: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeverityMultipliers {
    pub low: f32,
    pub medium: f32,
    pub high: f32,
}

impl SeverityMultipliers {
    pub fn for_severity(&self, severity: Option<Severity>) -> f32 {
        match severity {
            Some(Severity::High) => self.high,
            Some(Severity::Medium) => self.medium,
            Some(Severity::Low) | None => self.low,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BaseScores {
    pub low: f32,
    pub medium: f32,
    pub high: f32,
}

impl BaseScores {
    pub fn for_severity(&self, severity: Option<Severity>) -> f32 {
        match severity {
            Some(Severity::High) => self.high,
            Some(Severity::Medium) => self.medium,
            Some(Severity::Low) | None => self.low,
        }
    }
}

/// Score cut-offs for escalation flags and urgency bands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CriticalityThresholds {
    pub emergency: u8,
    pub immediate_repair: u8,
    pub supervisor_alert: u8,
    pub medium: u8,
}

fn words(list: &[&str]) -> Vec<String> {
    list.iter().map(|word| word.to_string()).collect()
}

impl Default for KeywordSets {
    fn default() -> Self {
        Self {
            critical: words(&[
                "structural damage",
                "collapse",
                "sagging",
                "active leak",
                "exposed decking",
                "fire damage",
                "rotted",
                "compromised",
            ]),
            high_priority: words(&[
                "leak",
                "missing shingles",
                "damaged flashing",
                "ponding",
                "blistering",
                "cracked",
                "torn membrane",
                "mold",
            ]),
            structural: words(&[
                "structural",
                "truss",
                "rafter",
                "joist",
                "load bearing",
                "decking",
                "foundation",
                "beam",
            ]),
            safety: words(&[
                "hazard",
                "unsafe",
                "fall",
                "trip",
                "exposed",
                "injury",
                "asbestos",
                "guardrail",
            ]),
            emergency: words(&[
                "emergency",
                "imminent",
                "immediate danger",
                "fire",
                "gas leak",
                "live wire",
                "flooding",
            ]),
            weather_exposure: words(&["leak", "water", "rain", "snow", "wind", "storm"]),
            electrical: words(&["electrical", "wire", "voltage", "shock"]),
        }
    }
}

impl Default for KeywordBonuses {
    fn default() -> Self {
        Self {
            critical: 30.0,
            high_priority: 15.0,
            structural: 20.0,
            safety: 20.0,
            emergency: 25.0,
        }
    }
}

impl Default for SeverityMultipliers {
    fn default() -> Self {
        Self {
            low: 1.0,
            medium: 1.5,
            high: 2.0,
        }
    }
}

impl Default for BaseScores {
    fn default() -> Self {
        Self {
            low: 10.0,
            medium: 20.0,
            high: 40.0,
        }
    }
}

impl Default for CriticalityThresholds {
    fn default() -> Self {
        Self {
            emergency: 90,
            immediate_repair: 80,
            supervisor_alert: 60,
            medium: 30,
        }
    }
}

impl Default for CriticalityConfig {
    fn default() -> Self {
        Self {
            keywords: KeywordSets::default(),
            bonuses: KeywordBonuses::default(),
            type_multipliers: vec![
                ("structural".to_string(), 1.5),
                ("electrical".to_string(), 1.4),
                ("safety".to_string(), 1.3),
                ("membrane".to_string(), 1.2),
                ("flashing".to_string(), 1.1),
                ("gutter".to_string(), 0.8),
                ("cosmetic".to_string(), 0.6),
            ],
            severity_multipliers: SeverityMultipliers::default(),
            base_scores: BaseScores::default(),
            thresholds: CriticalityThresholds::default(),
        }
    }
}

impl CriticalityConfig {
    pub fn type_multiplier(&self, category: &str) -> f32 {
        let category = category.trim().to_lowercase();
        if category.is_empty() {
            return 1.0;
        }

        self.type_multipliers
            .iter()
            .find(|(fragment, _)| category.contains(fragment.as_str()))
            .map(|(_, multiplier)| *multiplier)
            .unwrap_or(1.0)
    }
}
