use clap::Parser;
use colored::*;
use eyre::{Context, Result};
use log::{LevelFilter, info};
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use taskheap::config::Config;
use taskheap::scheduler::{Scheduler, Task};
use taskheap::script::{self, Op, Outcome, Script};

mod cli;

use cli::Cli;
use cli::commands::Commands;

fn setup_logging(verbose: bool) -> Result<()> {
    // Create log directory
    let log_dir = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("taskheap")
        .join("logs");

    fs::create_dir_all(&log_dir).context("Failed to create log directory")?;

    let log_file = log_dir.join("taskheap.log");

    let target = Box::new(
        fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_file)
            .context("Failed to open log file")?,
    );

    let default_filter = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .target(env_logger::Target::Pipe(target))
        .init();

    info!("Logging initialized, writing to: {}", log_file.display());
    Ok(())
}

/// Narrow the log level to the configured one. RUST_LOG and --verbose set the ceiling.
fn apply_log_level(config: &Config) {
    if let Some(level) = config.log_level.as_deref() {
        match LevelFilter::from_str(level) {
            Ok(filter) if filter < log::max_level() => log::set_max_level(filter),
            Ok(_) => {}
            Err(_) => log::warn!("Ignoring unknown log level: {}", level),
        }
    }
}

fn run_application(cli: &Cli, config: &Config) -> Result<()> {
    info!("Starting application");

    // stdout carries only replay output
    if cli.is_verbose() {
        eprintln!("{}", "Verbose mode enabled".yellow());
    }

    match &cli.command {
        Commands::Replay { script, json } => handle_replay_command(script, *json, config),
        Commands::Demo => handle_demo_command(config),
    }
}

fn handle_replay_command(path: &Path, json: bool, config: &Config) -> Result<()> {
    info!("Replaying script: {}", path.display());
    let replay = script::replay_file(path, &config.scheduler)
        .context(format!("Failed to replay script {}", path.display()))?;
    info!(
        "Replayed {} operations, {} tasks left",
        replay.outcomes.len(),
        replay.scheduler.len()
    );

    if json {
        for line in replay.json_lines()? {
            println!("{}", line);
        }
    } else {
        for outcome in &replay.outcomes {
            println!("{}", render_outcome(outcome));
        }
        println!("{} {}", "Remaining:".cyan(), replay.scheduler.len());
    }
    Ok(())
}

fn handle_demo_command(config: &Config) -> Result<()> {
    info!("Running demo trace");
    let mut ops: Vec<Op> = (1..=5).map(|id| Op::Add { id, priority: id * 10 }).collect();
    ops.extend([
        Op::Get,
        Op::Get,
        Op::Change { id: 1, priority: 100 },
        Op::Peek,
        Op::Get,
        Op::Get,
        Op::Len,
    ]);

    let mut scheduler = Scheduler::from_config(&config.scheduler);
    let outcomes = Script::new(ops).run(&mut scheduler).context("Demo failed")?;
    for outcome in &outcomes {
        println!("{}", render_outcome(outcome));
    }
    Ok(())
}

fn render_task(task: Option<Task>) -> String {
    match task {
        Some(task) => task.to_string(),
        None => "empty".dimmed().to_string(),
    }
}

fn render_outcome(outcome: &Outcome) -> String {
    match outcome {
        Outcome::Added { task } => format!("{:<8} {}", "add".green(), task),
        Outcome::Changed { id, priority, applied } => {
            let note = if *applied { "" } else { " (no-op)" };
            format!("{:<8} {} -> {}{}", "change".yellow(), id, priority, note)
        }
        Outcome::Got { task } => format!("{:<8} {}", "get".cyan(), render_task(*task)),
        Outcome::Peeked { task } => format!("{:<8} {}", "peek".blue(), render_task(*task)),
        Outcome::Len { len } => format!("{:<8} {}", "len".magenta(), len),
    }
}

fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    setup_logging(cli.is_verbose()).context("Failed to setup logging")?;

    // Load configuration
    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;
    apply_log_level(&config);

    info!("Starting with config from: {:?}", cli.config);

    run_application(&cli, &config).context("Application failed")?;

    Ok(())
}
