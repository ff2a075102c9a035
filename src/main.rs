use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

use py_diagnose::config::{self, DiagnoseConfig};
use py_diagnose::grader::{self, GradeOutcome, ScoreBand};
use py_diagnose::session::{format_duration, SessionStats};
use py_diagnose::{logging, scorer, simulator, Store, WeaknessReport};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Simulate a Python file and print its output
    Run {
        /// Path to the Python file
        #[arg(required = true)]
        file: PathBuf,
    },

    /// Score a Python file against the configured question
    Check {
        /// Path to the Python file
        #[arg(required = true)]
        file: PathBuf,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Compare two text files line by line
    Compare {
        expected: PathBuf,
        actual: PathBuf,
    },

    /// Save a Python file as the current submission
    Save {
        #[arg(required = true)]
        file: PathBuf,
    },

    /// Show session statistics
    Stats,

    /// Analyze weak spots from the session and a file (defaults to the saved code)
    Analyze {
        file: Option<PathBuf>,
    },

    /// Discard session statistics
    Reset,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_handle = logging::init(cli.verbose);

    let config = config::init_config(cli.config.as_deref())?;
    logging::apply_config_level(&log_handle, cli.verbose, &config.log_level);

    let store = Store::new(&config.data_dir);

    match cli.command {
        Commands::Run { file } => {
            let code = read_source(&file)?;
            let mut stats = store.load_stats(config.total_questions)?;
            stats.note_code(&code);

            if code.trim().is_empty() {
                error!("Refusing to run empty file {:?}", file);
                eprintln!("Error: code cannot be empty");
                stats.record_run(false);
            } else {
                match simulator::simulate(&code) {
                    Ok(lines) => {
                        println!("{}", lines.join("\n"));
                        stats.record_run(true);
                    }
                    Err(e) => {
                        warn!("Simulation failed for {:?}: {}", file, e);
                        eprintln!("Error: {}", e);
                        stats.record_run(false);
                    }
                }
            }

            store.save_stats(&stats)?;
        }

        Commands::Check { file, json } => {
            let code = read_source(&file)?;
            let mut stats = store.load_stats(config.total_questions)?;
            stats.note_code(&code);

            let report = grader::grade(&code, &config.question, &config.grading_policy());
            stats.record_grade(&report, &config.question);
            store.save_stats(&stats)?;

            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print_report(&report, &config);
                println!(
                    "\nProgress: {}/{} questions ({}%)",
                    stats.completed_questions,
                    stats.total_questions,
                    stats.progress_percent()
                );
            }
        }

        Commands::Compare { expected, actual } => {
            let expected = read_source(&expected)?;
            let actual = read_source(&actual)?;
            let similarity = scorer::compare(&expected, &actual);
            println!("Similarity: {:.4}", similarity);
            println!("Score: {}", grader::to_score(similarity));
            for diff in scorer::line_differences(&expected, &actual) {
                println!("  line {}: {:?} != {:?}", diff.line, diff.expected, diff.actual);
            }
        }

        Commands::Save { file } => {
            let code = read_source(&file)?;
            store.save_code(&code)?;
            println!("Saved {:?} to {:?}", file, store.root());
        }

        Commands::Stats => {
            let stats = store.load_stats(config.total_questions)?;
            print_stats(&stats);
        }

        Commands::Analyze { file } => {
            let code = match file {
                Some(path) => read_source(&path)?,
                None => store.load_code()?.unwrap_or_default(),
            };
            let stats = store.load_stats(config.total_questions)?;
            let report = WeaknessReport::analyze(&stats, &code, Utc::now());

            println!("Syntax errors: {}%", report.syntax_errors);
            println!("Edit frequency: {}%", report.coding_speed);
            println!("Naming issues: {}%", report.naming_issues);
            println!("Suggestions:");
            for suggestion in &report.suggestions {
                println!("- {}", suggestion);
            }
        }

        Commands::Reset => {
            store.reset_stats()?;
            info!("Session statistics reset");
            println!("Session statistics cleared");
        }
    }

    Ok(())
}

fn read_source(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("Failed to read file: {:?}", path))
}

fn print_report(report: &grader::GradeReport, config: &DiagnoseConfig) {
    println!("Question {}: {}", report.question_number, config.question.title);
    println!("Output:\n{}", report.output);
    match &report.outcome {
        GradeOutcome::Scored { score, passed, .. } => {
            let verdict = if *passed { "PASS" } else { "FAIL" };
            println!(
                "\nScore: {} ({}, pass at {}) {}",
                score,
                ScoreBand::from_score(*score).label(),
                config.pass_threshold,
                verdict
            );
        }
        GradeOutcome::SyntaxError(message) => println!("\n{}", message),
    }
    println!("Feedback:");
    for line in &report.feedback {
        println!("- {}", line);
    }
}

fn print_stats(stats: &SessionStats) {
    let sub = stats.sub_scores();
    println!("Session time: {}", format_duration(stats.elapsed(Utc::now())));
    println!("Runs: {} ({} ok, {}% success)", stats.run_count, stats.successful_runs, stats.success_rate());
    println!("Checks: {}", stats.check_count);
    println!("Errors: {}", stats.error_count);
    println!("Code modifications: {}", stats.code_modifications);
    println!(
        "Progress: {}/{} ({}%)",
        stats.completed_questions,
        stats.total_questions,
        stats.progress_percent()
    );
    println!(
        "Average score: {} ({}) over {} checks",
        stats.average_score(),
        ScoreBand::from_score(sub.main).label(),
        stats.scores.len()
    );
    println!(
        "Quality {} / Pass {} / Stability {}",
        sub.quality, sub.pass, sub.stability
    );
}
