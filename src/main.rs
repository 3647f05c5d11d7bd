use clap::Parser;
use colored::*;
use eyre::{Context, Result};
use log::info;
use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::Ordering;
use std::time::Duration;

use huntr::classify::ConsensusClassifier;
use huntr::cli::Cli;
use huntr::cli::commands::Commands;
use huntr::config::Config;
use huntr::domain::Candidate;
use huntr::generator::CandidateGenerator;
use huntr::guard::AnomalyGuard;
use huntr::notify::Notifier;
use huntr::pacing::PacingPolicy;
use huntr::probes::{ProbeSet, SignalCollector};
use huntr::runner::HuntRunner;
use huntr::store::{ResultStore, StateStore};

fn setup_logging() -> Result<()> {
    // Create log directory
    let log_dir = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("huntr")
        .join("logs");

    fs::create_dir_all(&log_dir).context("Failed to create log directory")?;

    let log_file = log_dir.join("huntr.log");

    // Setup env_logger with file output
    let target = Box::new(
        fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_file)
            .context("Failed to open log file")?,
    );

    env_logger::Builder::from_default_env()
        .target(env_logger::Target::Pipe(target))
        .init();

    info!("Logging initialized, writing to: {}", log_file.display());
    Ok(())
}

async fn run_application(cli: &Cli, config: &Config) -> Result<()> {
    info!("Starting application");

    if cli.is_verbose() {
        println!("{}", "Verbose mode enabled".yellow());
    }

    match &cli.command {
        None | Some(Commands::Run) => run_hunt(config).await,
        Some(Commands::Status) => handle_status_command(config),
        Some(Commands::Check { domain }) => handle_check_command(domain, config).await,
    }
}

async fn run_hunt(config: &Config) -> Result<()> {
    let collector = Arc::new(SignalCollector::new(config)?);
    let results = ResultStore::open(config.found_path(), config.uncertain_path())?;

    let mut runner = HuntRunner::new(
        CandidateGenerator::new(config.search.tlds.clone()),
        collector,
        ConsensusClassifier::new(Duration::from_millis(config.pacing.recheck_pause_ms)),
        AnomalyGuard::new(config.guard.window_secs),
        PacingPolicy::from_config(&config.pacing),
        StateStore::new(config.state_path()),
        results,
        Notifier::new(reqwest::Client::new(), &config.notify),
    )?;

    // stop cleanly after the in-flight candidate commits
    let shutdown = runner.shutdown_flag();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("shutdown requested");
            shutdown.store(true, Ordering::Relaxed);
        }
    });

    println!("{}", "Starting hunt (ctrl-c to stop)...".cyan());
    runner.run().await?;
    println!(
        "Stopped after {} candidates checked.",
        runner.state().total_checked
    );
    Ok(())
}

fn handle_status_command(config: &Config) -> Result<()> {
    println!("{}", "Huntr - Status Report".bold());

    let state = StateStore::new(config.state_path()).load()?;
    println!("\n{}", "Progress:".green());
    println!("  current length:  {} characters", state.current_length);
    println!("  current TLD #:   {}", state.current_tld_index);
    println!("  total checked:   {}", state.total_checked);
    match state.last_update {
        Some(at) => println!("  last update:     {}", at.to_rfc3339()),
        None => println!("  last update:     never"),
    }

    let results = ResultStore::open(config.found_path(), config.uncertain_path())?;

    if results.found().is_empty() {
        println!("\n{}", "No domains found yet".yellow());
    } else {
        println!(
            "\n{} ({} total):",
            "Found domains".green().bold(),
            results.found().len()
        );
        let mut by_length: BTreeMap<usize, Vec<&str>> = BTreeMap::new();
        for record in results.found() {
            let label_len = record.domain.split('.').next().unwrap_or("").len();
            by_length.entry(label_len).or_default().push(&record.domain);
        }
        for (length, domains) in by_length {
            println!("  {}-character ({}):", length, domains.len());
            for domain in domains {
                println!("    {}", domain.cyan());
            }
        }
    }

    println!("\nUncertain (manual review): {}", results.uncertain().len());
    Ok(())
}

async fn handle_check_command(domain: &str, config: &Config) -> Result<()> {
    let candidate = Candidate::parse(domain)?;
    let collector = SignalCollector::new(config)?;

    println!("Checking {}...", candidate.name.cyan());

    let readings = collector.collect(&candidate.name).await?;
    let classifier =
        ConsensusClassifier::new(Duration::from_millis(config.pacing.recheck_pause_ms));
    let result = classifier.classify(&candidate, readings, &collector).await;

    println!("\n{}", "Evidence:".bold());
    for reading in &result.evidence {
        println!(
            "  {:<10} {:?} (weight {})",
            reading.source.to_string(),
            reading.verdict,
            reading.weight
        );
    }

    let verdict = format!("{:?}", result.verdict);
    let colored_verdict = match result.verdict {
        huntr::domain::Verdict::Available => verdict.green().bold(),
        huntr::domain::Verdict::Taken => verdict.red(),
        huntr::domain::Verdict::Uncertain => verdict.yellow(),
    };
    print!("\nVerdict: {}", colored_verdict);
    if result.reverified {
        print!(" {}", "(re-verified)".dimmed());
    }
    println!();
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Setup logging first
    setup_logging().context("Failed to setup logging")?;

    // Parse CLI arguments
    let cli = Cli::parse();

    // Load configuration
    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;

    info!("Starting with config from: {:?}", cli.config);

    // Run the main application logic
    run_application(&cli, &config).await.context("Application failed")?;

    Ok(())
}
