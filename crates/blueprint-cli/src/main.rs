mod config;
mod insight_cmds;
mod project_cmds;
mod serve_cmd;
mod task_cmd;

use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use sqlx::PgPool;

use blueprint_core::Orchestrator;
use blueprint_core::generate::OpenAiGenerator;
use blueprint_db::pool;

use config::BlueprintConfig;

#[derive(Parser)]
#[command(name = "blueprint", about = "Turn a one-line idea into a phased, AI-planned project")]
struct Cli {
    /// Database URL (overrides BLUEPRINT_DATABASE_URL env var)
    #[arg(long, global = true)]
    database_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write a blueprint config file (no database required)
    Init {
        /// PostgreSQL connection URL
        #[arg(long, default_value = "postgresql://localhost:5432/blueprint")]
        db_url: String,
        /// Overwrite existing config file
        #[arg(long)]
        force: bool,
    },
    /// Initialize the blueprint database (create + migrate)
    DbInit,
    /// Run the HTTP API server
    Serve {
        /// Address to bind
        #[arg(long, default_value = "127.0.0.1")]
        bind: String,
        /// Port to listen on
        #[arg(long, default_value_t = 3000)]
        port: u16,
    },
    /// Generate a draft project brief from an idea
    Brief {
        /// One-line project idea
        idea: String,
        /// Project name
        #[arg(long)]
        name: Option<String>,
        /// Team size (free text, e.g. "3")
        #[arg(long)]
        team_size: Option<String>,
        /// Timeframe (free text, e.g. "6 weeks")
        #[arg(long)]
        timeframe: Option<String>,
        /// Team dev skills (free text)
        #[arg(long)]
        dev_skills: Option<String>,
    },
    /// Project management
    Project {
        #[command(subcommand)]
        command: ProjectCommands,
    },
    /// Task management
    Task {
        #[command(subcommand)]
        command: TaskCommands,
    },
    /// Read-only AI analyses of a project
    Insight {
        /// Kind of insight: risks, spec, or doc-tex
        kind: String,
        /// Project ID
        project_id: String,
    },
}

#[derive(Subcommand)]
pub enum ProjectCommands {
    /// Create a project and generate its initial plan
    Create {
        /// Project name
        name: String,
        /// Approved project brief
        #[arg(long)]
        brief: String,
        /// Original one-line idea (defaults to the brief)
        #[arg(long)]
        idea: Option<String>,
        /// Team size (free text)
        #[arg(long)]
        team_size: Option<String>,
        /// Timeframe (free text)
        #[arg(long)]
        timeframe: Option<String>,
        /// Team dev skills (free text)
        #[arg(long)]
        dev_skills: Option<String>,
    },
    /// List all projects
    List,
    /// Show a project with its phases and tasks
    Show {
        /// Project ID
        project_id: String,
    },
    /// Generate a candidate plan from current state (nothing is persisted)
    Replan {
        /// Project ID
        project_id: String,
        /// Write the candidate plan JSON to this file instead of stdout
        #[arg(long)]
        output: Option<String>,
    },
    /// Apply a plan JSON file, replacing the project's phases and tasks
    Apply {
        /// Project ID
        project_id: String,
        /// Path to the plan JSON file
        file: String,
    },
}

#[derive(Subcommand)]
pub enum TaskCommands {
    /// Update fields on a task
    Update {
        /// Task ID
        task_id: String,
        /// New title
        #[arg(long)]
        title: Option<String>,
        /// New description
        #[arg(long)]
        description: Option<String>,
        /// New status: todo, in_progress, or done
        #[arg(long)]
        status: Option<String>,
        /// New priority: 1 (low), 2 (medium), or 3 (high)
        #[arg(long)]
        priority: Option<i32>,
        /// Move the task to another phase
        #[arg(long)]
        phase: Option<String>,
    },
}

/// Execute the `blueprint init` command: write config file.
fn cmd_init(db_url: &str, force: bool) -> Result<()> {
    let path = config::config_path();

    if path.exists() && !force {
        anyhow::bail!(
            "config file already exists at {}\nUse --force to overwrite.",
            path.display()
        );
    }

    let cfg = config::ConfigFile {
        database: config::DatabaseSection {
            url: db_url.to_string(),
        },
        openai: config::OpenAiSection::default(),
    };

    config::save_config(&cfg)?;

    println!("Config written to {}", path.display());
    println!("  database.url = {db_url}");
    println!();
    println!("Set OPENAI_API_KEY (or openai.api_key in the config file),");
    println!("then run `blueprint db-init` to create and migrate the database.");

    Ok(())
}

/// Execute the `blueprint db-init` command: create database and run
/// migrations.
async fn cmd_db_init(cli_db_url: Option<&str>) -> Result<()> {
    let resolved = BlueprintConfig::resolve(cli_db_url)?;

    println!("Initializing blueprint database...");

    pool::ensure_database_exists(&resolved.db_config).await?;
    let db_pool = pool::create_pool(&resolved.db_config).await?;
    pool::run_migrations(&db_pool).await?;

    let counts = pool::table_counts(&db_pool).await?;
    println!("Database ready. Tables:");
    for (table, count) in &counts {
        println!("  {table}: {count} rows");
    }

    db_pool.close().await;

    println!("blueprint db-init complete.");
    Ok(())
}

/// Build an orchestrator with the configured generation client.
fn build_orchestrator(db_pool: PgPool, resolved: &BlueprintConfig) -> Result<Orchestrator> {
    let generator = OpenAiGenerator::new(resolved.generator_config()?)?;
    Ok(Orchestrator::new(db_pool, Arc::new(generator)))
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Init { db_url, force } => {
            cmd_init(&db_url, force)?;
        }
        Commands::DbInit => {
            cmd_db_init(cli.database_url.as_deref()).await?;
        }
        Commands::Serve { bind, port } => {
            let resolved = BlueprintConfig::resolve(cli.database_url.as_deref())?;
            let db_pool = pool::create_pool(&resolved.db_config).await?;
            let orchestrator = build_orchestrator(db_pool.clone(), &resolved)?;
            let result = serve_cmd::run_serve(Arc::new(orchestrator), &bind, port).await;
            db_pool.close().await;
            result?;
        }
        Commands::Brief {
            idea,
            name,
            team_size,
            timeframe,
            dev_skills,
        } => {
            let resolved = BlueprintConfig::resolve(cli.database_url.as_deref())?;
            let db_pool = pool::create_pool(&resolved.db_config).await?;
            let orchestrator = build_orchestrator(db_pool.clone(), &resolved)?;
            let result = insight_cmds::run_brief(
                &orchestrator,
                idea,
                name,
                team_size,
                timeframe,
                dev_skills,
            )
            .await;
            db_pool.close().await;
            result?;
        }
        Commands::Project { command } => {
            let resolved = BlueprintConfig::resolve(cli.database_url.as_deref())?;
            let db_pool = pool::create_pool(&resolved.db_config).await?;
            let orchestrator = build_orchestrator(db_pool.clone(), &resolved)?;
            let result = project_cmds::run_project_command(command, &orchestrator).await;
            db_pool.close().await;
            result?;
        }
        Commands::Task { command } => {
            let resolved = BlueprintConfig::resolve(cli.database_url.as_deref())?;
            let db_pool = pool::create_pool(&resolved.db_config).await?;
            let orchestrator = build_orchestrator(db_pool.clone(), &resolved)?;
            let result = task_cmd::run_task_command(command, &orchestrator).await;
            db_pool.close().await;
            result?;
        }
        Commands::Insight { kind, project_id } => {
            let resolved = BlueprintConfig::resolve(cli.database_url.as_deref())?;
            let db_pool = pool::create_pool(&resolved.db_config).await?;
            let orchestrator = build_orchestrator(db_pool.clone(), &resolved)?;
            let result = insight_cmds::run_insight(&orchestrator, &kind, &project_id).await;
            db_pool.close().await;
            result?;
        }
    }

    Ok(())
}
