//! Command-line interface for the velo lifecycle runner.

use anyhow::{bail, Result};
use clap::Parser;
use colored::Colorize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use velo::prelude::*;

#[derive(Parser)]
#[command(name = "velo")]
#[command(about = "Execute a project lifecycle up to a given stage", long_about = None)]
#[command(version)]
struct Cli {
    /// Lifecycle to execute
    lifecycle: Option<String>,

    /// Stage to stop at, inclusive
    stage: Option<String>,

    /// Directory of the project to run the lifecycle in
    #[arg(short, long)]
    project: Option<PathBuf>,

    /// List available lifecycles and stages
    #[arg(short, long)]
    list: bool,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();
    if let Err(error) = run(cli).await {
        eprintln!("{} {error:#}", "error:".red().bold());
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let cwd = std::env::current_dir()?;
    let dir = match cli.project {
        Some(project) => cwd.join(project),
        None => cwd,
    };

    if cli.list {
        return list_lifecycles(&dir).await;
    }

    let Some(name) = cli.lifecycle else {
        bail!("no lifecycle provided; run `velo --list` to show available lifecycles");
    };

    let config = Config::discover(&dir).await?;
    let Some(lifecycle) = config.lifecycle(&name) else {
        bail!("Could not find lifecycle {name}");
    };

    let ctx = StageContext::new(
        Arc::new(PackageScriptRunner::new()),
        Arc::new(StandardSink::stdout()),
        Arc::new(StandardSink::stderr()),
    )
    .with_events(Arc::new(LoggingEventSink::default()));

    let mut run = LifecycleRun::new(lifecycle, dir);
    if let Some(stage) = cli.stage {
        run = run.with_last_stage(stage);
    }

    execute_lifecycle(&run, &ctx).await?;
    Ok(())
}

async fn list_lifecycles(dir: &Path) -> Result<()> {
    let config = Config::discover(dir).await?;

    println!("Project lifecycles:\n");
    for (name, lifecycle) in config.all_lifecycles() {
        let stages = lifecycle
            .stages
            .iter()
            .map(|stage| stage.name.cyan().to_string())
            .collect::<Vec<_>>()
            .join(" ");
        println!("{}\nStages: {stages}\n", name.blue().bold());
    }

    Ok(())
}
