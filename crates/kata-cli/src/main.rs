//! Kata CLI
//!
//! A command-line tool for judging JavaScript solutions against problem files.

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use kata::{Config, EXAMPLE_CONFIG, ExecuteError, ExecutionOutcome, Problem, Runner, Verdict};
use tracing::{Level, debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "kata")]
#[command(about = "A tool for judging JavaScript solutions in isolated workers")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize a new configuration file
    Init {
        /// Output path (default: kata.toml)
        #[arg(short, long, default_value = "kata.toml")]
        output: PathBuf,

        /// Overwrite existing file
        #[arg(short, long)]
        force: bool,
    },

    /// Judge a solution against a problem's test cases
    Run {
        /// JavaScript file containing the solution
        #[arg(value_name = "SOLUTION")]
        solution: PathBuf,

        /// Problem file (JSON)
        #[arg(short, long)]
        problem: PathBuf,

        /// Timeout in milliseconds (overrides the configuration)
        #[arg(short, long)]
        timeout_ms: Option<u64>,

        /// Print the outcome as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print a problem's starter code
    Starter {
        /// Problem file (JSON)
        #[arg(short, long)]
        problem: PathBuf,
    },

    /// Show effective configuration
    ShowConfig,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::from_default_env().add_directive(Level::DEBUG.into())
    } else {
        EnvFilter::from_default_env().add_directive(Level::INFO.into())
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    // Load configuration
    let config = if let Some(ref path) = cli.config {
        info!(?path, "loading configuration");
        Config::from_file(path).context("failed to load configuration")?
    } else {
        debug!("using default configuration");
        Config::default()
    };

    match cli.command {
        Commands::Init { output, force } => {
            init_config(&output, force).await?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Run {
            solution,
            problem,
            timeout_ms,
            json,
        } => run_solution(config, &solution, &problem, timeout_ms, json).await,
        Commands::Starter { problem } => {
            let problem = load_problem(&problem)?;
            println!("{}", problem.starter_code);
            Ok(ExitCode::SUCCESS)
        }
        Commands::ShowConfig => {
            show_config(&config);
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn load_problem(path: &Path) -> Result<Problem> {
    Problem::from_file(path).with_context(|| format!("failed to load problem '{}'", path.display()))
}

async fn run_solution(
    config: Config,
    solution: &Path,
    problem: &Path,
    timeout_ms: Option<u64>,
    json: bool,
) -> Result<ExitCode> {
    let problem = load_problem(problem)?;
    let source = tokio::fs::read_to_string(solution)
        .await
        .context("failed to read solution file")?;

    let timeout = timeout_ms
        .map(Duration::from_millis)
        .unwrap_or_else(|| config.timeout());

    info!(problem = %problem.id, tests = problem.tests.len(), "judging solution");

    let runner = Runner::new(config);
    let result = runner
        .execute_with_timeout(&source, &problem.function_name, &problem.tests, timeout)
        .await;

    // Worker plumbing faults are not outcomes the user can act on
    let result = match result {
        Err(ExecuteError::Worker(err)) => return Err(err).context("failed to run worker"),
        other => other,
    };

    let outcome = ExecutionOutcome::from(result);
    let all_passed = matches!(
        &outcome,
        ExecutionOutcome::Results { results } if results.iter().all(|v| v.passed)
    );

    if json {
        let text = serde_json::to_string_pretty(&outcome).context("failed to encode outcome")?;
        println!("{text}");
    } else {
        print_outcome(&problem, &outcome);
    }

    Ok(if all_passed {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn print_outcome(problem: &Problem, outcome: &ExecutionOutcome) {
    println!("{} ({})\n", problem.title, problem.difficulty);

    let results = match outcome {
        ExecutionOutcome::Results { results } => results,
        ExecutionOutcome::Failure { message } => {
            println!("Error: {message}");
            return;
        }
    };

    for verdict in results {
        print_verdict(verdict);
    }

    let passed = results.iter().filter(|v| v.passed).count();
    println!("{passed}/{} tests passed", results.len());
}

fn print_verdict(verdict: &Verdict) {
    let status = if verdict.passed { "Passed" } else { "Failed" };
    println!("Test {}: {status}", verdict.index + 1);

    let input: Vec<String> = verdict.input.iter().map(ToString::to_string).collect();
    println!("  Input:    {}", input.join(", "));

    match verdict.error {
        Some(ref error) => println!("  Error:    {error}"),
        None => {
            println!("  Expected: {}", verdict.expected_output);
            println!("  Received: {}", verdict.received_output);
        }
    }

    for line in &verdict.logs {
        println!("  Log:      {line}");
    }
    println!();
}

fn show_config(config: &Config) {
    println!("Worker binary: {}", config.worker_binary().display());
    println!("Timeout: {} ms", config.timeout_ms);
    println!("Max workers: {}", config.max_workers);
    println!("Max response: {} bytes", config.max_response_bytes);
    println!();
    println!("Engine limits:");
    println!("  Recursion limit: {:?}", config.engine.recursion_limit);
    println!(
        "  Loop iteration limit: {:?}",
        config.engine.loop_iteration_limit
    );
    println!("  Stack size limit: {:?}", config.engine.stack_size_limit);
    println!("  Thread stack: {} MB", config.engine.thread_stack_mb);
}

async fn init_config(output: &Path, force: bool) -> Result<()> {
    if output.exists() && !force {
        anyhow::bail!(
            "Configuration file already exists at '{}'. Use --force to overwrite.",
            output.display()
        );
    }

    tokio::fs::write(output, EXAMPLE_CONFIG)
        .await
        .context("failed to write configuration file")?;

    println!("Created configuration file at '{}'", output.display());
    Ok(())
}
