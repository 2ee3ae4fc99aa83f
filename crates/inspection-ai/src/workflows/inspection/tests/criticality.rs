use super::common::*;
use crate::workflows::inspection::domain::{Deficiency, Severity};
use crate::workflows::inspection::{
    CriticalityConfig, CriticalityScorer, RiskFactors, UrgencyLevel,
};

fn scorer() -> CriticalityScorer {
    CriticalityScorer::new(CriticalityConfig::default())
}

#[test]
fn high_severity_without_keywords_scores_base_times_multiplier() {
    let analysis = scorer().analyze_deficiency(&plain_high_deficiency());

    assert_eq!(analysis.score, 80);
    assert!(analysis.is_immediate_repair);
    assert!(analysis.needs_supervisor_alert);
    assert!(!analysis.is_emergency);
    assert_eq!(analysis.urgency, UrgencyLevel::Critical);
    assert!(analysis.matched_keywords.is_empty());
    assert_eq!(analysis.risk_factors, RiskFactors::default());
    assert_eq!(
        analysis.recommended_actions,
        vec![
            "Schedule repair within 24 hours".to_string(),
            "Notify the property manager".to_string(),
        ]
    );
    assert_eq!(analysis.confidence, 1);
}

#[test]
fn structural_damage_with_high_severity_requires_immediate_repair() {
    let analysis = scorer().analyze_deficiency(&structural_deficiency());

    assert!(analysis.is_immediate_repair);
    assert!(analysis.is_emergency);
    assert_eq!(analysis.score, 100);
    assert_eq!(analysis.urgency, UrgencyLevel::Emergency);
    assert!(analysis
        .matched_keywords
        .contains(&"structural damage".to_string()));
    assert!(analysis.risk_factors.structural);
    assert_eq!(
        analysis.recommended_actions.first().map(String::as_str),
        Some("Contact the property manager immediately")
    );
    assert!(analysis
        .recommended_actions
        .iter()
        .any(|action| action.contains("structural engineer")));
}

#[test]
fn missing_severity_and_text_degrade_to_low_base_score() {
    let mut deficiency = Deficiency::new("def-9", "", Severity::Low);
    deficiency.severity = None;

    let analysis = scorer().analyze_deficiency(&deficiency);
    assert_eq!(analysis.score, 10);
    assert_eq!(analysis.urgency, UrgencyLevel::Low);
    assert!(analysis.recommended_actions.is_empty());
    assert_eq!(analysis.confidence, 0);
}

#[test]
fn category_multiplier_discounts_minor_types() {
    let gutter = deficiency("def-4", "gutter", Severity::Medium, "debris in gutter");

    let analysis = scorer().analyze_deficiency(&gutter);
    assert_eq!(analysis.score, 24);
    assert_eq!(analysis.urgency, UrgencyLevel::Low);
    assert!(!analysis.needs_supervisor_alert);
}

#[test]
fn emergency_keyword_escalates_urgency_without_emergency_score() {
    let tarp = deficiency("def-5", "general", Severity::Low, "emergency tarp needed");

    let analysis = scorer().analyze_deficiency(&tarp);
    assert_eq!(analysis.score, 35);
    assert!(!analysis.is_emergency);
    assert_eq!(analysis.urgency, UrgencyLevel::Emergency);
}

#[test]
fn risk_factors_are_detected_independently() {
    let wiring = deficiency(
        "def-6",
        "electrical",
        Severity::Medium,
        "exposed live wire near standing water",
    );

    let analysis = scorer().analyze_deficiency(&wiring);
    assert_eq!(
        analysis.risk_factors,
        RiskFactors {
            structural: false,
            safety: true,
            weather_exposure: true,
            electrical: true,
        }
    );
    assert_eq!(analysis.score, 100);
    assert!(analysis
        .recommended_actions
        .iter()
        .any(|action| action.contains("licensed electrician")));
    assert!(analysis
        .recommended_actions
        .iter()
        .any(|action| action.contains("temporary weatherproofing")));
}

#[test]
fn confidence_is_capped_at_one_hundred() {
    let mut verbose = structural_deficiency();
    verbose.description = format!(
        "structural damage with sagging rafter, exposed decking and an active leak. {}",
        "Water staining spreads across the ceiling below. ".repeat(10)
    );

    let analysis = scorer().analyze_deficiency(&verbose);
    assert_eq!(analysis.confidence, 100);
}

#[test]
fn enhancing_twice_keeps_the_first_score() {
    let scorer = scorer();
    let first = scorer.enhance_deficiency(&plain_high_deficiency(), detected_at());
    assert_eq!(first.criticality_score, Some(80));
    assert_eq!(first.detection_timestamp, Some(detected_at()));

    let mut edited = first.clone();
    edited.description = "structural damage".to_string();
    let later = detected_at() + chrono::Duration::hours(3);
    let second = scorer.enhance_deficiency(&edited, later);

    assert_eq!(second.criticality_score, Some(80));
    assert_eq!(second.detection_timestamp, Some(detected_at()));
}

#[test]
fn clearing_analysis_allows_rescoring() {
    let scorer = scorer();
    let mut scored = scorer.enhance_deficiency(&plain_high_deficiency(), detected_at());
    scored.description = "structural damage".to_string();
    scored.clear_analysis();

    let rescored = scorer.enhance_deficiency(&scored, detected_at());
    assert_eq!(rescored.criticality_score, Some(100));
    assert!(rescored.is_immediate_repair);
}

#[test]
fn batch_enhancement_leaves_inputs_untouched() {
    let originals = vec![plain_high_deficiency(), structural_deficiency()];

    let enhanced = scorer().enhance_deficiencies(&originals, detected_at());

    assert!(originals.iter().all(|deficiency| !deficiency.is_scored()));
    assert_eq!(enhanced.len(), 2);
    assert_eq!(enhanced[0].criticality_score, Some(80));
    assert!(enhanced[0].needs_supervisor_alert);
    assert_eq!(enhanced[1].criticality_score, Some(100));
}

#[test]
fn inspection_rollup_counts_threshold_crossings() {
    let gutter = deficiency("def-4", "gutter", Severity::Medium, "debris in gutter");
    let deficiencies = vec![plain_high_deficiency(), structural_deficiency(), gutter];

    let rollup = scorer().analyze_inspection(&deficiencies);

    assert_eq!(rollup.deficiency_count, 3);
    assert_eq!(rollup.max_score, 100);
    assert_eq!(rollup.emergency_count, 1);
    assert_eq!(rollup.immediate_repair_count, 2);
    assert_eq!(rollup.supervisor_alert_count, 2);
    assert!(rollup.requires_immediate_response);
    assert_eq!(
        rollup.recommendations,
        vec![
            "Immediate response required for 1 emergency deficiency".to_string(),
            "Repair within 24 hours: 2 deficiencies".to_string(),
            "Supervisor review requested for 2 deficiencies".to_string(),
        ]
    );
}

#[test]
fn empty_inspection_rollup_is_quiet() {
    let rollup = scorer().analyze_inspection(&[]);

    assert_eq!(rollup.max_score, 0);
    assert!(!rollup.requires_immediate_response);
    assert_eq!(
        rollup.recommendations,
        vec!["No critical deficiencies detected".to_string()]
    );
}

#[test]
fn updated_thresholds_apply_to_later_analyses() {
    let mut scorer = scorer();
    let mut config = scorer.config().clone();
    config.thresholds.immediate_repair = 85;
    config.thresholds.emergency = 95;
    scorer.update_config(config);

    let analysis = scorer.analyze_deficiency(&plain_high_deficiency());
    assert!(!analysis.is_immediate_repair);
    assert_eq!(analysis.urgency, UrgencyLevel::High);
}

#[test]
fn stored_scores_keep_their_value_but_flags_follow_it() {
    let scorer = scorer();

    let mut understated = structural_deficiency();
    understated.criticality_score = Some(0);
    understated.is_immediate_repair = true;
    understated.needs_supervisor_alert = true;
    let kept = scorer.enhance_deficiency(&understated, detected_at());
    assert_eq!(kept.criticality_score, Some(0));
    assert!(!kept.is_immediate_repair);
    assert!(!kept.needs_supervisor_alert);

    let mut flagless = plain_high_deficiency();
    flagless.criticality_score = Some(85);
    let kept = scorer.enhance_deficiency(&flagless, detected_at());
    assert!(kept.is_immediate_repair);
    assert!(kept.needs_supervisor_alert);
}

#[test]
fn out_of_range_stored_scores_are_rejected_on_input() {
    let payload = serde_json::json!({
        "id": "def-9",
        "type": "roof deck",
        "severity": "high",
        "description": "collapse risk",
        "criticality_score": 250
    });
    let err = serde_json::from_value::<Deficiency>(payload).unwrap_err();
    assert!(err.to_string().contains("criticality_score 250 exceeds 100"));

    let accepted = serde_json::from_value::<Deficiency>(serde_json::json!({
        "id": "def-10",
        "criticality_score": 100
    }))
    .expect("upper bound accepted");
    assert_eq!(accepted.criticality_score, Some(100));
}

#[test]
fn keyword_emergencies_require_response_without_counting_as_threshold_crossings() {
    let tarp = deficiency("def-5", "general", Severity::Low, "emergency tarp needed");

    let rollup = scorer().analyze_inspection(&[tarp]);

    assert_eq!(rollup.max_score, 35);
    assert_eq!(rollup.emergency_count, 0);
    assert!(rollup.requires_immediate_response);
    assert_eq!(
        rollup.recommendations,
        vec!["Immediate response required for 1 emergency deficiency".to_string()]
    );
}
