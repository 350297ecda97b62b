use crate::infra::seed_projects;
use chrono::{Local, NaiveDate};
use clap::Args;
use labcollab::error::AppError;
use labcollab::workflows::catalog::{Project, ProjectCatalog, ProjectId};
use labcollab::workflows::evaluation::{
    EvaluationPayload, EvaluationPolicy, EvaluationServiceError, EvaluatorId, EvaluatorType,
    FinalEvaluationService, FinalSummary, FixedClock, ScoreCard, TalentEvaluationSubmission,
};
use labcollab::workflows::store::InMemoryRecordStore;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Args, Debug)]
pub(crate) struct DemoArgs {
    /// Project to evaluate
    #[arg(long, default_value = "P1")]
    pub(crate) project_id: String,
    /// Lab administrator submitting the final evaluation
    #[arg(long, default_value = "admin1")]
    pub(crate) evaluator_id: String,
    /// Evaluation date (YYYY-MM-DD). Defaults to today.
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) date: Option<NaiveDate>,
    /// Delete the final evaluation at the end to show the unlock path
    #[arg(long)]
    pub(crate) unlock: bool,
}

#[derive(Args, Debug)]
pub(crate) struct ProjectImportArgs {
    /// CSV export with `Project ID,Name,Lab ID` columns
    pub(crate) path: PathBuf,
    /// Print the parsed catalog as JSON instead of a table
    #[arg(long)]
    pub(crate) json: bool,
}

pub(crate) fn run_project_import(args: ProjectImportArgs) -> Result<(), AppError> {
    let store = InMemoryRecordStore::default();
    let summary = seed_projects(&store, &args.path)?;
    let projects = store
        .list()
        .map_err(EvaluationServiceError::from)?;

    if args.json {
        println!("{}", render_catalog_json(&projects)?);
        return Ok(());
    }

    println!(
        "Imported {} project(s) from {} ({} duplicate row(s) skipped)",
        summary.imported,
        args.path.display(),
        summary.duplicates
    );
    for project in &projects {
        let lab = project
            .lab_id
            .as_ref()
            .map(|lab| lab.0.as_str())
            .unwrap_or("-");
        println!("  {:<12} {:<10} {}", project.id, lab, project.name);
    }
    Ok(())
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs {
        project_id,
        evaluator_id,
        date,
        unlock,
    } = args;

    let today = date.unwrap_or_else(|| Local::now().date_naive());
    let project_id = ProjectId(project_id);
    let evaluator_id = EvaluatorId(evaluator_id);

    let store = Arc::new(InMemoryRecordStore::default());
    let service = FinalEvaluationService::with_clock(
        store.clone(),
        store,
        EvaluationPolicy::default(),
        Arc::new(FixedClock(today)),
    );

    println!("Final evaluation lock demo ({today})");
    service.register_project(Project {
        id: project_id.clone(),
        name: format!("Demo project {project_id}"),
        lab_id: None,
    })?;

    let mentor_review = service.record_evaluation(&project_id, mentor_submission())?;
    println!(
        "  recorded {} evaluation {} for talent {}",
        mentor_review.evaluator_type.label(),
        mentor_review.id,
        mentor_review.evaluated_id
    );
    println!(
        "  locked before final evaluation: {}",
        service.is_project_locked(&project_id)?
    );

    let stored = service.create_final_evaluation(&project_id, &evaluator_id, final_payload())?;
    println!(
        "  final evaluation {} created by {} ({})",
        stored.id,
        stored.evaluator_id.0,
        stored.evaluator_type.label()
    );

    match service.create_final_evaluation(&project_id, &evaluator_id, final_payload()) {
        Err(err @ EvaluationServiceError::FinalEvaluationExists { .. }) => {
            println!("  second submission rejected: {err}")
        }
        Err(other) => return Err(other.into()),
        Ok(duplicate) => println!("  unexpected duplicate final evaluation {}", duplicate.id),
    }

    service.lock_project_evaluation(&project_id)?;
    if let Some(score) = service.get_final_score(&project_id)? {
        println!("  final score: {score:.2}");
    }
    render_summary(&service.get_final_summary(&project_id)?);

    if unlock {
        service.delete_final_evaluation(&project_id)?;
        println!(
            "  final evaluation deleted; locked: {}",
            service.is_project_locked(&project_id)?
        );
    }

    Ok(())
}

fn render_catalog_json(projects: &[Project]) -> Result<String, AppError> {
    serde_json::to_string_pretty(projects).map_err(|err| AppError::Io(err.into()))
}

fn render_summary(summary: &FinalSummary) {
    println!("\nProject summary for {}", summary.project_id);
    println!("  technical skills : {:.2}", summary.technical_skills);
    println!("  communication    : {:.2}", summary.communication);
    println!("  teamwork         : {:.2}", summary.teamwork);
    println!("  punctuality      : {:.2}", summary.punctuality);
    println!("  final score      : {:.2}", summary.final_score);
    println!("  evaluations      : {}", summary.total_evaluations);
    println!("  locked           : {}", summary.locked);
}

fn final_payload() -> EvaluationPayload {
    EvaluationPayload {
        scores: ScoreCard {
            technical_skills: 8.0,
            communication: 9.0,
            teamwork: 7.0,
            punctuality: 10.0,
        },
        rating: 8.5,
        feedback: "Good work".to_string(),
    }
}

fn mentor_submission() -> TalentEvaluationSubmission {
    TalentEvaluationSubmission {
        talent_id: "talent-1".to_string(),
        evaluator_id: EvaluatorId("mentor-1".to_string()),
        evaluator_type: EvaluatorType::Mentor,
        payload: EvaluationPayload {
            scores: ScoreCard {
                technical_skills: 7.0,
                communication: 8.0,
                teamwork: 9.0,
                punctuality: 8.0,
            },
            rating: 8.0,
            feedback: "Reliable sprint delivery".to_string(),
        },
    }
}
