use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{debug, info};

use plan_cli::config::PlanConfig;
use plan_cli::report::{self, OutputFormat};
use plan_cli::{app, logging};
use plan_core::questionnaire::definitions;

// ─── CLI definition ──────────────────────────────────────────────────────────

/// Co-parenting plan calculator.
///
/// Derives net incomes and the guideline child-support amount from saved
/// questionnaire answers, and checks answers against the Advanced Plan
/// sections.
#[derive(Debug, Parser)]
#[command(name = "coparent-plan", version, about, long_about = None)]
struct Cli {
    /// TOML configuration file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log filter (e.g. `debug` or `plan_core=trace`). Overrides the
    /// config file and RUST_LOG.
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Append log output to this file.
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print incomes and the child-support calculation.
    Derive {
        /// JSON file with the questionnaire answers.
        #[arg(short, long)]
        answers: Option<PathBuf>,

        /// Override an answer, e.g. `--set children.count=2`. Repeatable.
        #[arg(long = "set", value_name = "PATH=VALUE")]
        assignments: Vec<String>,

        /// CSV schedule replacing the built-in one.
        #[arg(short, long)]
        schedule: Option<PathBuf>,

        #[arg(short, long, value_enum, default_value_t)]
        format: OutputFormat,
    },

    /// Validate answers against every Advanced Plan section.
    Validate {
        /// JSON file with the questionnaire answers.
        #[arg(short, long)]
        answers: Option<PathBuf>,

        /// Override an answer, e.g. `--set children.count=2`. Repeatable.
        #[arg(long = "set", value_name = "PATH=VALUE")]
        assignments: Vec<String>,

        /// Uploaded files, one `question_id=file name` per line.
        #[arg(short, long)]
        uploads: Option<PathBuf>,

        #[arg(short, long, value_enum, default_value_t)]
        format: OutputFormat,
    },

    /// List the Advanced Plan sections and their questions.
    Sections,
}

// ─── entry point ─────────────────────────────────────────────────────────────

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => PlanConfig::load(path)
            .with_context(|| format!("Failed to load config: {}", path.display()))?,
        None => PlanConfig::default(),
    };

    let log_level = cli.log_level.as_deref().or(config.log_level.as_deref());
    let log_file = cli.log_file.as_deref().or(config.log_file.as_deref());
    logging::init_logging(log_level, log_file)?;
    debug!(?cli, "starting");

    match cli.command {
        Command::Derive {
            answers,
            assignments,
            schedule,
            format,
        } => {
            let engine = app::build_engine(&config, schedule.as_deref())?;
            let answers = app::load_answers(answers.as_deref(), &assignments)?;
            let derived = engine.derive(&answers);
            print!("{}", report::render_derived(&derived, format)?);
            if format == OutputFormat::Json {
                println!();
            }
            Ok(ExitCode::SUCCESS)
        }
        Command::Validate {
            answers,
            assignments,
            uploads,
            format,
        } => {
            let answers = app::load_answers(answers.as_deref(), &assignments)?;
            let uploads = app::load_uploads(uploads.as_deref())?;
            let reports = app::validate_all(&definitions::advanced_plan(), &answers, &uploads);
            print!("{}", report::render_validation(&reports, format)?);
            if format == OutputFormat::Json {
                println!();
            }

            let failing = reports.iter().filter(|r| !r.errors.is_empty()).count();
            if failing > 0 {
                info!(failing, "validation failed");
                return Ok(ExitCode::FAILURE);
            }
            Ok(ExitCode::SUCCESS)
        }
        Command::Sections => {
            print!("{}", report::render_sections(&definitions::advanced_plan())?);
            Ok(ExitCode::SUCCESS)
        }
    }
}
