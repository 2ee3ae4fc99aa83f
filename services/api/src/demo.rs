use crate::infra::{seed_bundles, InMemoryInspectionStore, TracingNotifier};
use chrono::{Local, NaiveDate, Utc};
use clap::Args;
use inspection_ai::error::AppError;
use inspection_ai::workflows::inspection::{
    CriticalityConfig, CriticalityScorer, Deficiency, DeficiencyImporter, EventBus,
    InspectionFilter, InspectionId, InspectionService, InspectionServiceError, InspectionStore,
    Severity, SyncCoordinator, SyncSettings, ValidationCriteria,
};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Args, Debug)]
pub(crate) struct ScoreArgs {
    /// Deficiency CSV export (ID, Type, Location, Description, Severity, Estimated Cost, Photos)
    #[arg(long)]
    pub(crate) csv: PathBuf,
}

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Override the reporting date (YYYY-MM-DD, defaults to today).
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) today: Option<NaiveDate>,
}

pub(crate) fn run_score(args: ScoreArgs) -> Result<(), AppError> {
    let deficiencies = DeficiencyImporter::from_path(&args.csv)?;
    let scorer = CriticalityScorer::new(CriticalityConfig::default());

    println!(
        "Scored {} deficiencies from {}",
        deficiencies.len(),
        args.csv.display()
    );
    for line in score_lines(&scorer, &deficiencies) {
        println!("{line}");
    }
    Ok(())
}

fn score_lines(scorer: &CriticalityScorer, deficiencies: &[Deficiency]) -> Vec<String> {
    let mut lines = Vec::with_capacity(deficiencies.len() + 4);
    for deficiency in deficiencies {
        let analysis = scorer.analyze_deficiency(deficiency);
        lines.push(format!(
            "- {} [{}] {}: score {} | {} | confidence {}%",
            deficiency.id,
            deficiency.category,
            deficiency.severity.map(Severity::label).unwrap_or("unrated"),
            analysis.score,
            analysis.urgency.label(),
            analysis.confidence
        ));
        for action in &analysis.recommended_actions {
            lines.push(format!("    * {action}"));
        }
    }

    let rollup = scorer.analyze_inspection(deficiencies);
    lines.push(format!(
        "Rollup: max score {} | {} emergency | {} immediate repair | {} supervisor alert",
        rollup.max_score,
        rollup.emergency_count,
        rollup.immediate_repair_count,
        rollup.supervisor_alert_count
    ));
    for recommendation in rollup.recommendations {
        lines.push(format!("  {recommendation}"));
    }
    lines
}

pub(crate) async fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let today = args.today.unwrap_or_else(|| Local::now().date_naive());

    println!("Inspection review demo ({today})");
    let store = Arc::new(InMemoryInspectionStore::with_bundles(seed_bundles(today)));
    let bus = EventBus::new();
    let service = InspectionService::new(
        store.clone(),
        bus.clone(),
        CriticalityConfig::default(),
        ValidationCriteria::default(),
    );
    let sync = SyncCoordinator::new(
        store,
        bus,
        Arc::new(TracingNotifier),
        InspectionFilter::default(),
        SyncSettings::default(),
    );

    sync.refresh().await;
    let counts = sync.counts(today);
    println!(
        "- Dashboard: {} scheduled ({} past due) | {} in progress | {} completed",
        counts.scheduled, counts.past_due, counts.in_progress, counts.completed
    );

    let id = InspectionId("insp-1003".to_string());
    let mut ponding = Deficiency::new("def-3", "membrane", Severity::Low);
    ponding.location = "east corner".to_string();
    ponding.description = "minor surface crazing near the east corner".to_string();

    let draft = match service.store().fetch_bundle(&id).await {
        Ok(Some(bundle)) => {
            let mut rows = bundle.deficiencies;
            rows.push(ponding);
            rows
        }
        Ok(None) => {
            println!("  Inspection {} not found", id.0);
            return Ok(());
        }
        Err(err) => {
            println!("  Store unavailable: {}", err);
            return Ok(());
        }
    };

    let saved = match service.autosave_deficiencies(&id, &draft, Utc::now()).await {
        Ok(saved) => saved,
        Err(err) => {
            println!("  Autosave failed: {}", err);
            return Ok(());
        }
    };
    println!("- Autosaved {} deficiencies on {}", saved.len(), id.0);
    for deficiency in &saved {
        println!(
            "  - {} {}: score {} | immediate repair {} | supervisor alert {}",
            deficiency.id,
            deficiency.category,
            deficiency.criticality_score.unwrap_or(0),
            deficiency.is_immediate_repair,
            deficiency.needs_supervisor_alert
        );
    }

    let validation = service.validate(&id).await;
    println!("- Pre-submission check: {}", validation.summary);
    for warning in &validation.warnings {
        println!("  warning: {warning}");
    }

    match service.complete_inspection(&id, today, Utc::now()).await {
        Ok(outcome) => {
            println!(
                "- Completed {} | max score {} | {}",
                outcome.inspection.id.0,
                outcome.criticality.max_score,
                outcome.validation.summary
            );
            for recommendation in &outcome.criticality.recommendations {
                println!("  {recommendation}");
            }
        }
        Err(InspectionServiceError::Incomplete(result)) => {
            println!("- Completion blocked:");
            for error in &result.errors {
                println!("  error: {error}");
            }
        }
        Err(err) => println!("- Completion failed: {}", err),
    }

    sync.refresh().await;
    let counts = sync.counts(today);
    println!(
        "- Dashboard after completion: {} in progress | {} completed",
        counts.in_progress, counts.completed
    );

    Ok(())
}
