//! Timetabler CLI
//!
//! Offline access to the scheduling pipeline and a client for a running
//! server:
//! - Validate an input workbook
//! - Generate a timetable locally
//! - Check a timetable for conflicts and curriculum coverage
//! - Submit a workbook to a server
//! - Print a default configuration file

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use timetabler::checker::{self, trimester_from_filename, CheckReport};
use timetabler::client::{safe_filename, ClientConfig, ScheduleClient, SubmitOutcome};
use timetabler::config::{generate_default_config, Config};
use timetabler::dataset::Dataset;
use timetabler::export::parse_timetable_json;
use timetabler::metrics::ScheduleMetrics;
use timetabler::model::Calendar;
use timetabler::pipeline::{self, parse_trimester};

#[derive(Parser)]
#[command(name = "timetabler-cli")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "University timetable generator")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file (default: search the usual locations)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Output format (table, json)
    #[arg(short, long, default_value = "table", global = true)]
    pub format: String,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Load an input workbook and report what would be scheduled
    Validate {
        /// GA input workbook (.xlsx)
        input: PathBuf,
        /// Trimester to report sessions for (1-3)
        #[arg(short, long, default_value = "1")]
        trimester: String,
    },

    /// Generate a timetable locally
    Generate {
        /// GA input workbook (.xlsx)
        input: PathBuf,
        #[arg(short, long, default_value = "1")]
        trimester: String,
        /// Output directory (default: output.dir from the configuration)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Override the random seed
        #[arg(long)]
        seed: Option<u64>,
        /// Override the number of generations
        #[arg(long)]
        generations: Option<usize>,
    },

    /// Check a timetable JSON for conflicts, and for coverage given the input
    Check {
        /// Timetable JSON produced by `generate`
        timetable: PathBuf,
        /// GA input workbook, enables curriculum coverage
        #[arg(short, long)]
        input: Option<PathBuf>,
        /// Trimester (default: from a T<n> in the file name)
        #[arg(short, long)]
        trimester: Option<String>,
    },

    /// Submit a workbook to a running server
    Submit {
        /// GA input workbook (.xlsx)
        input: PathBuf,
        #[arg(short, long, default_value = "1")]
        trimester: String,
        /// Server URL
        #[arg(long, default_value = "http://localhost:5000")]
        server: String,
        /// Also download the JSON and Excel timetables into this directory
        #[arg(short, long)]
        download: Option<PathBuf>,
    },

    /// Print a commented default configuration file
    Config,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::load_with_env(path)
            .with_context(|| format!("loading configuration from {}", path.display()))?,
        None => Config::load_default(),
    };
    config.logging.init();

    let json = match cli.format.to_lowercase().as_str() {
        "json" => true,
        "table" => false,
        other => bail!("unknown format '{}', expected table or json", other),
    };

    match cli.command {
        Commands::Validate { input, trimester } => {
            let trimester = parse_trimester(&trimester)?;
            validate(&config, &input, trimester, json)?;
        }

        Commands::Generate {
            input,
            trimester,
            output,
            seed,
            generations,
        } => {
            let trimester = parse_trimester(&trimester)?;
            let mut config = config;
            if let Some(seed) = seed {
                config.solver.seed = seed;
            }
            if let Some(generations) = generations {
                config.solver.generations = generations;
            }
            let output_dir = output.unwrap_or_else(|| PathBuf::from(&config.output.dir));
            generate(&config, &input, trimester, &output_dir, json).await?;
        }

        Commands::Check {
            timetable,
            input,
            trimester,
        } => {
            let report = check(&config, &timetable, input.as_deref(), trimester.as_deref())?;
            print_report(&report, json)?;
            if !report.is_clean() {
                std::process::exit(2);
            }
        }

        Commands::Submit {
            input,
            trimester,
            server,
            download,
        } => {
            let trimester = parse_trimester(&trimester)?;
            submit(&input, trimester, server, download.as_deref(), json).await?;
        }

        Commands::Config => {
            print!("{}", generate_default_config());
        }
    }

    Ok(())
}

fn validate(config: &Config, input: &Path, trimester: u8, json: bool) -> anyhow::Result<()> {
    let data = std::fs::read(input).with_context(|| format!("reading {}", input.display()))?;
    let dataset = Dataset::from_xlsx(&data, &config.dataset)?;
    let summary = dataset.summary();
    let sessions = dataset.session_requests(trimester, &config.calendar);

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({
                "summary": summary,
                "trimester": trimester,
                "sessions": sessions.len(),
            }))?
        );
        return Ok(());
    }

    println!("Input: {}", input.display());
    println!("  Programmes: {:?}", summary.programmes);
    println!("  Groups:     {}", summary.groups);
    println!("  Rooms:      {}", summary.rooms);
    println!("  Courses:    {}", summary.courses);
    println!();
    println!("Trimester {}: {} weekly sessions", trimester, sessions.len());

    let calendar = Calendar::new(&config.calendar);
    println!(
        "Week grid: {} days x {} hours",
        calendar.days().len(),
        calendar.hours().len()
    );
    Ok(())
}

async fn generate(
    config: &Config,
    input: &Path,
    trimester: u8,
    output_dir: &Path,
    json: bool,
) -> anyhow::Result<()> {
    let data = std::fs::read(input).with_context(|| format!("reading {}", input.display()))?;

    let worker_config = config.clone();
    let worker_dir = output_dir.to_path_buf();
    let output = tokio::task::spawn_blocking(move || {
        pipeline::generate(&data, trimester, &worker_config, &worker_dir, |report| {
            tracing::info!(
                generation = report.generation,
                best_penalty = report.best_penalty,
                conflicts = report.conflicts,
                "Generation finished"
            );
        })
    })
    .await??;

    if json {
        println!("{}", serde_json::to_string_pretty(&output.metrics)?);
        return Ok(());
    }

    print_metrics(&output.metrics);
    println!();
    println!("Files:");
    println!("  {}", output.paths.json.display());
    println!("  {}", output.paths.excel.display());
    println!("  {}", output.paths.csv.display());
    println!("  {}", output.paths.fitness.display());
    Ok(())
}

fn check(
    config: &Config,
    timetable_path: &Path,
    input: Option<&Path>,
    trimester: Option<&str>,
) -> anyhow::Result<CheckReport> {
    let trimester = match trimester {
        Some(raw) => Some(parse_trimester(raw)?),
        None => timetable_path
            .file_name()
            .and_then(|f| f.to_str())
            .and_then(trimester_from_filename),
    };

    let data = std::fs::read(timetable_path)
        .with_context(|| format!("reading {}", timetable_path.display()))?;
    let timetable = parse_timetable_json(trimester.unwrap_or(1), &data)?;

    let dataset = match input {
        Some(path) => {
            let data = std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
            Some(Dataset::from_xlsx(&data, &config.dataset)?)
        }
        None => None,
    };

    Ok(checker::check(&timetable, dataset.as_ref(), trimester, &config.calendar))
}

fn print_report(report: &CheckReport, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
        return Ok(());
    }

    if report.conflicts.is_empty() {
        println!("No conflicts found.");
    } else {
        println!("{:<7} {:<4} {:<6} {:<12} {}", "Kind", "Day", "Time", "Entity", "Sessions");
        println!("{}", "-".repeat(72));
        for c in &report.conflicts {
            let kind = match c.kind {
                checker::ConflictKind::Room => "room",
                checker::ConflictKind::Group => "group",
            };
            println!("{:<7} {:<4} {:<6} {:<12} {}", kind, c.day, c.time, c.entity, c.details);
        }
    }

    if !report.coverage_checked {
        println!();
        println!("Curriculum coverage not checked (pass --input and a trimester).");
        return Ok(());
    }

    println!();
    if report.violations.is_empty() {
        println!("All curriculum hours covered.");
    } else {
        println!(
            "{:<10} {:<30} {:<9} {:>8} {:>6} {:>7}",
            "Group", "Course", "Type", "Required", "Actual", "Missing"
        );
        println!("{}", "-".repeat(75));
        for v in &report.violations {
            println!(
                "{:<10} {:<30} {:<9} {:>8} {:>6} {:>7}",
                v.group,
                v.course,
                v.kind.as_str(),
                v.required,
                v.actual,
                v.missing
            );
        }
    }
    Ok(())
}

async fn submit(
    input: &Path,
    trimester: u8,
    server: String,
    download: Option<&Path>,
    json: bool,
) -> anyhow::Result<()> {
    let client = ScheduleClient::new(ClientConfig {
        base_url: server,
        ..ClientConfig::default()
    })?;

    match client.submit(input, trimester).await? {
        SubmitOutcome::Metrics(metrics) => {
            if json {
                println!("{}", serde_json::to_string_pretty(&metrics)?);
            } else {
                print_metrics(&metrics);
            }
        }
        SubmitOutcome::File { filename, bytes } => {
            let target = save_into(download.unwrap_or_else(|| Path::new(".")), &filename, &bytes)?;
            println!("Saved {}", target.display());
        }
    }

    if let Some(dir) = download {
        for file in [client.download_json(trimester).await?, client.download_excel(trimester).await?] {
            let target = save_into(dir, &file.filename, &file.bytes)?;
            println!("Saved {}", target.display());
        }
    }
    Ok(())
}

/// Write a downloaded file inside `dir`, never outside it
fn save_into(dir: &Path, filename: &str, bytes: &[u8]) -> anyhow::Result<PathBuf> {
    std::fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
    let target = dir.join(safe_filename(filename, "timetable"));
    std::fs::write(&target, bytes)?;
    Ok(target)
}

fn print_metrics(metrics: &ScheduleMetrics) {
    println!("Fitness score: {}%", metrics.fitness_score);
    println!("Conflicts:     {}", metrics.conflicts);
    println!("Hard:          {}%", metrics.hard);
    println!("Soft:          {}%", metrics.soft);
    println!("Time:          {}s", metrics.time);
    println!(
        "Generations:   {}{}",
        metrics.generations,
        if metrics.stopped_early { " (stopped early)" } else { "" }
    );
    println!();
    println!("{}", metrics.band());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_into_stays_in_directory() {
        let root = tempfile::tempdir().unwrap();
        let dir = root.path().join("downloads");

        // Directory does not exist yet
        let target = save_into(&dir, "../../owned.txt", b"x").unwrap();
        assert_eq!(target, dir.join("owned.txt"));
        assert!(target.exists());

        let target = save_into(&dir, "/etc/cron.d/x", b"x").unwrap();
        assert_eq!(target, dir.join("x"));

        let target = save_into(&dir, "..", b"x").unwrap();
        assert_eq!(target, dir.join("timetable"));
        assert!(!root.path().join("owned.txt").exists());
    }
}
