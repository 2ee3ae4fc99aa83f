use super::super::domain::Deficiency;
use super::config::CriticalityConfig;
use super::RiskFactors;

/// Intermediate results of a single scoring pass.
pub(crate) struct ScoreSignals {
    pub score: u8,
    pub matched_keywords: Vec<String>,
    pub emergency_keyword: bool,
    pub risk_factors: RiskFactors,
}

pub(crate) fn normalized_text(deficiency: &Deficiency) -> String {
    format!(
        "{} {} {}",
        deficiency.description, deficiency.location, deficiency.category
    )
    .trim()
    .to_lowercase()
}

fn matches<'a>(text: &str, keywords: &'a [String]) -> Vec<&'a String> {
    keywords
        .iter()
        .filter(|keyword| !keyword.is_empty() && text.contains(keyword.to_lowercase().as_str()))
        .collect()
}

pub(crate) fn score_deficiency(
    deficiency: &Deficiency,
    config: &CriticalityConfig,
) -> ScoreSignals {
    let text = normalized_text(deficiency);
    let keywords = &config.keywords;
    let bonuses = &config.bonuses;

    let mut score = config.base_scores.for_severity(deficiency.severity);
    let mut matched_keywords: Vec<String> = Vec::new();

    let passes = [
        (&keywords.critical, bonuses.critical),
        (&keywords.high_priority, bonuses.high_priority),
        (&keywords.structural, bonuses.structural),
        (&keywords.safety, bonuses.safety),
        (&keywords.emergency, bonuses.emergency),
    ];

    for (set, bonus) in passes {
        let hits = matches(&text, set);
        if hits.is_empty() {
            continue;
        }
        score += bonus;
        for hit in hits {
            if !matched_keywords.contains(hit) {
                matched_keywords.push(hit.clone());
            }
        }
    }

    score *= config.type_multiplier(&deficiency.category);
    score *= config
        .severity_multipliers
        .for_severity(deficiency.severity);

    let score = score.clamp(0.0, 100.0).round() as u8;

    let risk_factors = RiskFactors {
        structural: !matches(&text, &keywords.structural).is_empty(),
        safety: !matches(&text, &keywords.safety).is_empty(),
        weather_exposure: !matches(&text, &keywords.weather_exposure).is_empty(),
        electrical: !matches(&text, &keywords.electrical).is_empty(),
    };

    ScoreSignals {
        score,
        matched_keywords,
        emergency_keyword: !matches(&text, &keywords.emergency).is_empty(),
        risk_factors,
    }
}

/// Crude evidence proxy: keyword hits plus description length, capped at 100.
pub(crate) fn confidence(matched_keywords: usize, description: &str) -> u8 {
    let length_component = (description.chars().count() / 10).min(40);
    let total = matched_keywords
        .saturating_mul(20)
        .saturating_add(length_component);
    total.min(100) as u8
}
