mod db;
mod output;

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use journey_core::model::{
    AnswerSet, EvaluatorKind, FeedbackRecord, InsightReport, Milestone, Stage, UserId,
};
use journey_core::{Clock, ContentCatalog};
use serde_json::json;
use services::config::{self, DB_URL_ENV};
use services::AppServices;
use tracing_subscriber::EnvFilter;

use crate::output::{print_json, print_table, state_label};

#[derive(Parser)]
#[command(
    name = "journey",
    about = "Work through the seven-stage innovation journey with feedback on every stage",
    version
)]
struct Cli {
    /// SQLite database file or URL
    #[arg(long, global = true, env = DB_URL_ENV, default_value = "journey.sqlite3")]
    db: String,

    /// Journey owner
    #[arg(long, global = true, env = "JOURNEY_USER", default_value_t = 1)]
    user: u64,

    /// Feedback strategy: rubric or remote (overrides JOURNEY_EVALUATOR)
    #[arg(long, global = true)]
    evaluator: Option<EvaluatorKind>,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the stages in methodology order
    Stages,
    /// Show the questions, resources and tasks of one stage
    Show { stage: Stage },
    /// Save answers without asking for feedback
    Draft {
        stage: Stage,
        /// JSON object mapping question ids to answers
        #[arg(long)]
        answers: PathBuf,
    },
    /// Submit answers and print the feedback
    Submit {
        stage: Stage,
        /// JSON object mapping question ids to answers
        #[arg(long)]
        answers: PathBuf,
    },
    /// Mark a stage with approved feedback as completed
    Complete { stage: Stage },
    /// Show the state of every stage
    Status,
    /// Summarize the journey so far
    Insights,
    /// Delete the stored journey
    Reset,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    if let Err(err) = run(cli).await {
        eprintln!("error: {err:#}");
        std::process::exit(2);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    match &cli.command {
        Commands::Stages => return list_stages(&ContentCatalog::builtin()?, cli.json),
        Commands::Show { stage } => return show_stage(&ContentCatalog::builtin()?, *stage, cli.json),
        _ => {}
    }

    let mut draft = config::draft_from_env()?;
    if let Some(kind) = cli.evaluator {
        draft.kind = kind;
    }
    let settings = draft.validate()?;

    let db_url = db::normalize_sqlite_url(&cli.db);
    db::prepare_sqlite_file(&db_url)?;
    tracing::debug!(%db_url, evaluator = %settings.kind(), "opening journey store");
    let services = AppServices::new_sqlite(&db_url, Clock::default(), settings)
        .await
        .with_context(|| format!("opening {db_url}"))?;

    let user = UserId::new(cli.user);
    let journeys = services.journeys();
    let controller = services.controller();

    match cli.command {
        Commands::Stages | Commands::Show { .. } => Ok(()),
        Commands::Draft { stage, answers } => {
            let answers = read_answers(&answers)?;
            let handle = journeys.open(user).await?;
            controller.save_draft(&handle, stage, answers).await?;
            journeys.save(user, &handle).await?;
            if cli.json {
                print_json(&json!({ "stage": stage, "saved": true }))
            } else {
                println!("Draft saved for {}.", stage.name());
                Ok(())
            }
        }
        Commands::Submit { stage, answers } => {
            let answers = read_answers(&answers)?;
            let handle = journeys.open(user).await?;
            let record = controller.submit_for_feedback(&handle, stage, answers).await?;
            journeys.save(user, &handle).await?;
            if cli.json {
                print_json(&record)
            } else {
                print_feedback(stage, &record);
                Ok(())
            }
        }
        Commands::Complete { stage } => {
            let handle = journeys.open(user).await?;
            let newly = controller.complete_stage(&handle, stage)?;
            journeys.save(user, &handle).await?;
            let next = controller.next_stage(&handle);
            if cli.json {
                return print_json(&json!({ "stage": stage, "newlyCompleted": newly, "next": next }));
            }
            if newly {
                println!("{} completed.", stage.name());
            } else {
                println!("{} was already completed.", stage.name());
            }
            match next {
                Some(next) => println!("Next up: {}", next.name()),
                None => println!("All stages completed."),
            }
            Ok(())
        }
        Commands::Status => {
            let handle = journeys.open(user).await?;
            let progress = handle.snapshot();
            let next = progress.next_stage();
            if cli.json {
                let stages: Vec<_> = Stage::ALL
                    .iter()
                    .map(|&stage| json!({ "stage": stage, "state": progress.stage_state(stage) }))
                    .collect();
                return print_json(&json!({
                    "user": user.value(),
                    "completedCount": progress.completed_count(),
                    "next": next,
                    "stages": stages,
                }));
            }
            let rows: Vec<Vec<String>> = Stage::ALL
                .iter()
                .map(|&stage| {
                    vec![
                        stage.position().to_string(),
                        stage.name().to_string(),
                        state_label(progress.stage_state(stage)).to_string(),
                    ]
                })
                .collect();
            print_table(&["#", "STAGE", "STATE"], &rows);
            println!();
            println!(
                "{} of {} stages completed.",
                progress.completed_count(),
                Stage::ALL.len()
            );
            if let Some(next) = next {
                println!("Next up: {}", next.name());
            }
            Ok(())
        }
        Commands::Insights => {
            let progress = journeys.open(user).await?.snapshot();
            let unlocked =
                progress.completed_count() >= Milestone::InitialUnderstanding.threshold();
            if unlocked && !services.remote_enabled() {
                anyhow::bail!(
                    "journey insights need a remote model; set {}",
                    config::API_KEY_ENV
                );
            }
            let report = services.insights().compute_insights(&progress).await?;
            print_insights(report.as_ref(), cli.json)
        }
        Commands::Reset => {
            let removed = journeys.reset(user).await?;
            if cli.json {
                print_json(&json!({ "user": user.value(), "removed": removed }))
            } else {
                if removed {
                    println!("Journey for user {} deleted.", user.value());
                } else {
                    println!("No stored journey for user {}.", user.value());
                }
                Ok(())
            }
        }
    }
}

fn read_answers(path: &Path) -> anyhow::Result<AnswerSet> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("parsing answers in {}", path.display()))
}

fn list_stages(catalog: &ContentCatalog, as_json: bool) -> anyhow::Result<()> {
    if as_json {
        let stages: Vec<_> = catalog
            .stages()
            .map(|content| {
                json!({
                    "stage": content.stage,
                    "position": content.stage.position(),
                    "title": content.title,
                    "questions": content.questions.len(),
                })
            })
            .collect();
        return print_json(&stages);
    }

    let rows: Vec<Vec<String>> = catalog
        .stages()
        .map(|content| {
            vec![
                content.stage.position().to_string(),
                content.stage.key().to_string(),
                content.title.clone(),
                content.questions.len().to_string(),
            ]
        })
        .collect();
    print_table(&["#", "KEY", "TITLE", "QUESTIONS"], &rows);
    Ok(())
}

fn show_stage(catalog: &ContentCatalog, stage: Stage, as_json: bool) -> anyhow::Result<()> {
    let content = catalog.stage(stage);
    if as_json {
        return print_json(content);
    }

    println!("{} ({}/{})", content.title, stage.position(), Stage::ALL.len());
    println!("{}", content.description);

    println!("\nQuestions:");
    for question in &content.questions {
        let marker = if question.required { "*" } else { " " };
        println!("{marker} {:<24} {}", question.id, question.question);
    }

    if !content.tasks.is_empty() {
        println!("\nTasks:");
        for task in &content.tasks {
            println!("  - {}: {}", task.title, task.description);
        }
    }

    if !content.articles.is_empty() {
        println!("\nResources:");
        for article in &content.articles {
            println!("  - {} <{}>", article.title, article.url);
        }
    }
    Ok(())
}

fn print_feedback(stage: Stage, record: &FeedbackRecord) {
    let verdict = if record.is_approved() {
        "approved"
    } else {
        "needs revision"
    };
    println!("{}: {verdict}", stage.name());
    println!("\nWhat works:\n  {}", record.positive_feedback());
    if !record.constructive_feedback().is_empty() {
        println!("\nTo improve:\n  {}", record.constructive_feedback());
    }
    if !record.suggestions().is_empty() {
        println!("\nSuggested reading:");
        for suggestion in record.suggestions() {
            println!("  - {}: {}", suggestion.title, suggestion.description);
        }
    }
}

fn print_insights(report: Option<&InsightReport>, as_json: bool) -> anyhow::Result<()> {
    let Some(report) = report else {
        if as_json {
            return print_json(&serde_json::Value::Null);
        }
        println!(
            "Complete at least {} stages to unlock journey insights.",
            Milestone::InitialUnderstanding.threshold()
        );
        return Ok(());
    };

    if as_json {
        return print_json(&json!({
            "completedCount": report.completed_count(),
            "visible": report.visible_milestones().iter().map(|m| m.title()).collect::<Vec<_>>(),
            "initialUnderstanding": report.initial_understanding(),
            "solutionProgress": report.solution_progress(),
            "finalJourney": report.final_journey(),
        }));
    }

    let sections = [
        (Milestone::InitialUnderstanding, report.initial_understanding()),
        (Milestone::SolutionProgress, report.solution_progress()),
    ];
    for (milestone, section) in sections {
        match section {
            Some(section) => {
                println!("{}", milestone.title());
                println!("  {}", section.summary);
                for pattern in &section.patterns {
                    println!("  - {pattern}");
                }
                println!("  {}\n", section.evolution);
            }
            None => println!(
                "{} unlocks after {} completed stages.\n",
                milestone.title(),
                milestone.threshold()
            ),
        }
    }

    match report.final_journey() {
        Some(journey) => {
            println!("{}", Milestone::FinalJourney.title());
            for achievement in &journey.achievements {
                println!("  - {achievement}");
            }
            println!("  {}", journey.overall);
        }
        None => println!(
            "{} unlocks after {} completed stages.",
            Milestone::FinalJourney.title(),
            Milestone::FinalJourney.threshold()
        ),
    }
    Ok(())
}
