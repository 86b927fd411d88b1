//! `blueprint brief` and `blueprint insight ...` commands.

use anyhow::{Context, Result};
use uuid::Uuid;

use blueprint_core::Orchestrator;
use blueprint_core::generate::DraftBriefInput;
use blueprint_core::orchestrator::InsightKind;

pub async fn run_brief(
    orchestrator: &Orchestrator,
    idea: String,
    name: Option<String>,
    team_size: Option<String>,
    timeframe: Option<String>,
    dev_skills: Option<String>,
) -> Result<()> {
    let input = DraftBriefInput {
        idea,
        name,
        team_size,
        timeframe,
        dev_skills,
    };
    let brief = orchestrator.draft_brief(&input).await?;
    println!("{brief}");
    Ok(())
}

pub async fn run_insight(
    orchestrator: &Orchestrator,
    kind: &str,
    project_id: &str,
) -> Result<()> {
    let kind: InsightKind = kind.parse()?;
    let id = Uuid::parse_str(project_id)
        .with_context(|| format!("invalid project ID: {project_id}"))?;

    let text = orchestrator.insight(kind, id).await?;
    println!("{text}");
    Ok(())
}
