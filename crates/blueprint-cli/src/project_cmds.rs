//! `blueprint project ...` subcommands.

use anyhow::{Context, Result};
use uuid::Uuid;

use blueprint_core::Orchestrator;
use blueprint_core::orchestrator::CreateProjectInput;
use blueprint_core::plan::{ProjectAggregate, parse_generated_plan};

use crate::ProjectCommands;

pub async fn run_project_command(
    command: ProjectCommands,
    orchestrator: &Orchestrator,
) -> Result<()> {
    match command {
        ProjectCommands::Create {
            name,
            brief,
            idea,
            team_size,
            timeframe,
            dev_skills,
        } => {
            run_create(
                orchestrator,
                CreateProjectInput {
                    name,
                    brief,
                    idea,
                    team_size,
                    timeframe,
                    dev_skills,
                },
            )
            .await
        }
        ProjectCommands::List => run_list(orchestrator).await,
        ProjectCommands::Show { project_id } => {
            run_show(orchestrator, parse_project_id(&project_id)?).await
        }
        ProjectCommands::Replan { project_id, output } => {
            run_replan(orchestrator, parse_project_id(&project_id)?, output.as_deref()).await
        }
        ProjectCommands::Apply { project_id, file } => {
            run_apply(orchestrator, parse_project_id(&project_id)?, &file).await
        }
    }
}

fn parse_project_id(raw: &str) -> Result<Uuid> {
    Uuid::parse_str(raw).with_context(|| format!("invalid project ID: {raw}"))
}

fn print_aggregate(aggregate: &ProjectAggregate) {
    println!("{} ({})", aggregate.project.name, aggregate.project.id);
    println!("  created: {}", aggregate.project.created_at);
    if let Some(skills) = &aggregate.project.dev_skills {
        println!("  dev skills: {skills}");
    }
    if aggregate.phases.is_empty() {
        println!("  (no phases yet)");
        return;
    }
    for phase in &aggregate.phases {
        println!("  Phase {} - {}", phase.phase.ordinal, phase.phase.name);
        for task in &phase.tasks {
            println!(
                "    [{}] {} (priority {})",
                task.status, task.title, task.priority
            );
        }
    }
}

async fn run_create(orchestrator: &Orchestrator, input: CreateProjectInput) -> Result<()> {
    let (aggregate, plan) = orchestrator.create_with_plan(&input).await?;

    println!("Project created with generated plan.");
    println!("  summary: {}", plan.project_summary);
    print_aggregate(&aggregate);
    Ok(())
}

async fn run_list(orchestrator: &Orchestrator) -> Result<()> {
    let projects = orchestrator.list_projects().await?;

    if projects.is_empty() {
        println!("No projects found. Create one with `blueprint project create`.");
        return Ok(());
    }

    for aggregate in &projects {
        let tasks = aggregate.task_count();
        println!(
            "{}  {}  ({} phases, {} tasks)",
            aggregate.project.id,
            aggregate.project.name,
            aggregate.phases.len(),
            tasks
        );
    }
    Ok(())
}

async fn run_show(orchestrator: &Orchestrator, project_id: Uuid) -> Result<()> {
    let aggregate = orchestrator.get_project(project_id).await?;
    print_aggregate(&aggregate);
    Ok(())
}

async fn run_replan(
    orchestrator: &Orchestrator,
    project_id: Uuid,
    output: Option<&str>,
) -> Result<()> {
    let plan = orchestrator.replan(project_id).await?;
    let json = serde_json::to_string_pretty(&plan).context("failed to serialize plan")?;

    match output {
        Some(path) => {
            std::fs::write(path, &json)
                .with_context(|| format!("failed to write plan to {path}"))?;
            println!("Candidate plan written to {path}.");
        }
        None => println!("{json}"),
    }
    println!(
        "Nothing was persisted. Apply with: blueprint project apply {project_id} <plan.json>"
    );
    Ok(())
}

async fn run_apply(orchestrator: &Orchestrator, project_id: Uuid, file: &str) -> Result<()> {
    let raw = std::fs::read_to_string(file)
        .with_context(|| format!("failed to read plan file {file}"))?;
    let plan = parse_generated_plan(&raw)
        .with_context(|| format!("plan file {file} is not a valid plan"))?;

    let aggregate = orchestrator.apply(project_id, &plan).await?;

    println!("Plan applied.");
    print_aggregate(&aggregate);
    Ok(())
}
