use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use school_scheduler::driver::{Algorithm, DriverConfig};
use school_scheduler::oracle::NullOracle;
use school_scheduler::parser::{load_catalog_from_dir, validate_catalog};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "school-scheduler")]
#[command(about = "Master scheduling for a secondary school")]
#[command(version)]
struct Cli {
    /// Log verbosity: trace, debug, info, warn, error
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the greedy/MILP/oracle iteration loop over a directory of CSVs
    Run {
        /// Directory containing the input CSVs
        #[arg(long)]
        input: PathBuf,

        /// Output directory for per-iteration and final artifacts
        #[arg(long, default_value = "./output")]
        output: PathBuf,

        /// Utilization floor below which a section counts as underutilized
        #[arg(long, default_value_t = 0.75)]
        threshold: f64,

        /// Maximum number of greedy/MILP/oracle iterations
        #[arg(long, default_value_t = 5)]
        max_iterations: u32,

        /// Which optimizer(s) to run each iteration
        #[arg(long, value_enum, default_value_t = AlgorithmArg::Both)]
        algorithm: AlgorithmArg,

        /// Suppress progress output, print a JSON summary only
        #[arg(short, long)]
        quiet: bool,

        /// Path to a JSON file of oracle-proposed actions, read once per
        /// iteration. Without this, no actions are ever proposed.
        #[arg(long)]
        oracle_actions: Option<PathBuf>,
    },

    /// Materialize a small synthetic CSV fixture under a directory
    Demo {
        /// Directory to write the demo CSVs into
        #[arg(long, default_value = "./data/demo")]
        path: PathBuf,
    },
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
enum AlgorithmArg {
    Greedy,
    Milp,
    Both,
}

impl From<AlgorithmArg> for Algorithm {
    fn from(value: AlgorithmArg) -> Self {
        match value {
            AlgorithmArg::Greedy => Algorithm::Greedy,
            AlgorithmArg::Milp => Algorithm::Milp,
            AlgorithmArg::Both => Algorithm::Both,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(&cli.log_level),
    )
    .init();

    match cli.command {
        Commands::Run {
            input,
            output,
            threshold,
            max_iterations,
            algorithm,
            quiet,
            oracle_actions,
        } => run_command(
            &input,
            &output,
            threshold,
            max_iterations,
            algorithm.into(),
            quiet,
            oracle_actions,
        ),
        Commands::Demo { path } => run_demo(&path),
    }
}

fn run_command(
    input: &Path,
    output: &Path,
    threshold: f64,
    max_iterations: u32,
    algorithm: Algorithm,
    quiet: bool,
    oracle_actions: Option<PathBuf>,
) -> Result<()> {
    let mut catalog = load_catalog_from_dir(input).context("failed to load input catalog")?;
    catalog.policy.utilization_floor = threshold;

    let validation = validate_catalog(&catalog);
    if !validation.errors.is_empty() {
        for error in &validation.errors {
            eprintln!("{} {error}", "error:".red().bold());
        }
        anyhow::bail!("input catalog failed validation ({} errors)", validation.errors.len());
    }
    if !quiet {
        for warning in &validation.warnings {
            println!("{} {warning}", "warning:".yellow().bold());
        }
        println!(
            "Loaded {} students, {} teachers, {} sections, {} periods",
            catalog.students.len(),
            catalog.teachers.len(),
            catalog.sections.len(),
            catalog.periods.len(),
        );
    }

    let config = DriverConfig {
        algorithm,
        max_iterations,
        output_dir: output.to_path_buf(),
    };

    let outcome = match oracle_actions {
        Some(path) => {
            let oracle = school_scheduler::oracle::JsonFileOracle::new(path);
            school_scheduler::driver::run(catalog, &config, &oracle)?
        }
        None => school_scheduler::driver::run(catalog, &config, &NullOracle)?,
    };

    if quiet {
        println!("{}", serde_json::to_string(&outcome.metrics)?);
    } else {
        println!("{}", "Run complete".green().bold());
        println!("  Iterations: {}", outcome.metrics.iterations);
        println!(
            "  Utilization: {:.1}% -> {:.1}%",
            outcome.metrics.initial_utilization * 100.0,
            outcome.metrics.final_utilization * 100.0
        );
        println!("  Sections adjusted: {}", outcome.metrics.sections_adjusted);
        println!("  Assignments: {}", outcome.schedule.total_assignments());
        println!("  Reports written to: {}", output.display());
    }

    Ok(())
}

fn run_demo(path: &Path) -> Result<()> {
    if path.join("Student_Info.csv").exists() {
        println!(
            "Demo data already exists at {}, leaving it in place",
            path.display()
        );
        return Ok(());
    }
    school_scheduler::parser::demo::write_demo_catalog(path).context("failed to write demo data")?;
    println!("{}", "Demo data created.".green().bold());
    println!("Try: school-scheduler run --input {} --algorithm greedy", path.display());
    Ok(())
}
