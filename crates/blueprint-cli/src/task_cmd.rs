//! `blueprint task ...` subcommands.

use anyhow::{Context, Result};
use uuid::Uuid;

use blueprint_core::Orchestrator;
use blueprint_db::models::TaskStatus;
use blueprint_db::queries::tasks::TaskUpdate;

use crate::TaskCommands;

pub async fn run_task_command(command: TaskCommands, orchestrator: &Orchestrator) -> Result<()> {
    match command {
        TaskCommands::Update {
            task_id,
            title,
            description,
            status,
            priority,
            phase,
        } => {
            let id = Uuid::parse_str(&task_id)
                .with_context(|| format!("invalid task ID: {task_id}"))?;

            // Parse enum-valued flags before building the update so bad
            // values fail with a clear message and no write.
            let status = match status.as_deref() {
                Some(raw) => Some(raw.parse::<TaskStatus>()?),
                None => None,
            };
            let phase_id = match phase.as_deref() {
                Some(raw) => Some(
                    Uuid::parse_str(raw).with_context(|| format!("invalid phase ID: {raw}"))?,
                ),
                None => None,
            };

            let update = TaskUpdate {
                title: title.as_deref(),
                description: description.as_deref(),
                status,
                priority,
                phase_id,
            };
            let task = orchestrator.update_task(id, &update).await?;

            println!(
                "Task updated: [{}] {} (priority {})",
                task.status, task.title, task.priority
            );
            Ok(())
        }
    }
}
