//! mcq-eval CLI

use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use mcq_eval::{
    analysis::{Aggregate, MatchMode},
    config::{Config, LetterSet, MalformedPolicy},
    reporting::{print_console_report, print_detailed_report, write_reports, JsonSummary, ReportPaths},
    runner::Evaluator,
};

#[derive(Parser)]
#[command(name = "mcq-eval")]
#[command(about = "Score multiple-choice model answers stored as line-delimited JSON")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Option letters to recognize, e.g. ABCD or A-Z
    #[arg(long, global = true)]
    letters: Option<LetterSet>,

    /// Match mode: extract or substring
    #[arg(long, global = true)]
    mode: Option<MatchMode>,

    /// Abort on the first line that is not valid JSON
    #[arg(long, global = true)]
    strict: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Print accuracy for a JSONL file, or for every JSONL file in a directory
    Score {
        /// JSONL file or directory of JSONL files
        path: PathBuf,

        /// Print summaries as JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Detailed per-item report with CSV and text output
    Report {
        /// JSONL file to score
        input: PathBuf,

        /// Directory for report files (default: next to the input)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Print the report without writing any files
        #[arg(long)]
        no_write: bool,

        /// Also print one line per item
        #[arg(long)]
        show_items: bool,

        /// Number of mismatches to list
        #[arg(long)]
        mismatches: Option<usize>,
    },

    /// Print (gold, predicted) letter pairs as JSON lines
    Pairs {
        /// JSONL file to read
        input: PathBuf,
    },

    /// Generate sample configuration
    InitConfig {
        /// Output path for configuration file
        #[arg(short, long, default_value = "mcq-eval.toml")]
        output: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("mcq_eval=debug,info")
    } else {
        EnvFilter::new("mcq_eval=info,warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config(&cli)?;

    match cli.command {
        Commands::Score { path, json } => score(config, &path, json),
        Commands::Report {
            input,
            output,
            no_write,
            show_items,
            mismatches,
        } => report(config, &input, output.as_deref(), no_write, show_items, mismatches),
        Commands::Pairs { input } => pairs(config, &input),
        Commands::InitConfig { output } => init_config(config, output),
    }
}

/// Configuration file first, then command-line overrides
fn load_config(cli: &Cli) -> Result<Config, Box<dyn std::error::Error>> {
    let mut config = Config::load_or_default(cli.config.as_deref())?;

    if let Some(letters) = &cli.letters {
        config.extraction.letters = letters.clone();
    }
    if let Some(mode) = cli.mode {
        config.scoring.mode = mode;
    }
    if cli.strict {
        config.scoring.on_malformed = MalformedPolicy::Abort;
    }

    Ok(config)
}

fn score(config: Config, path: &Path, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let evaluator = Evaluator::new(config)?;

    let evaluations = if path.is_dir() {
        evaluator.evaluate_directory(path)?
    } else {
        vec![evaluator.evaluate_file(path)?]
    };

    if json {
        let summaries: Vec<_> = evaluations.iter().map(|e| e.summary()).collect();
        println!("{}", serde_json::to_string_pretty(&summaries)?);
        return Ok(());
    }

    for (i, evaluation) in evaluations.iter().enumerate() {
        if i > 0 {
            println!();
        }
        print_console_report(&evaluation.summary());
    }

    if evaluations.len() > 1 {
        let mut overall = Aggregate::new();
        for evaluation in &evaluations {
            overall.merge(&evaluation.aggregate);
        }
        println!("\n{:=<50}", "");
        println!(
            "Overall ({} files): {}/{} correct, {}",
            evaluations.len(),
            overall.correct,
            overall.total,
            overall.summary("overall").accuracy_label()
        );
    }

    Ok(())
}

fn report(
    config: Config,
    input: &Path,
    output_dir: Option<&Path>,
    no_write: bool,
    show_items: bool,
    mismatches: Option<usize>,
) -> Result<(), Box<dyn std::error::Error>> {
    let evaluator = Evaluator::new(config)?;
    let evaluation = evaluator.evaluate_file(input)?;

    let report_config = &evaluator.config().report;
    let mismatch_limit = mismatches.unwrap_or(report_config.mismatch_limit);

    if !no_write {
        let summary = JsonSummary::from_evaluation(
            &evaluation,
            evaluator.scorer().mode().as_str(),
            evaluator.config().extraction.letters.to_string(),
            mismatch_limit,
        );
        let paths = ReportPaths::for_input(input, output_dir);
        for path in write_reports(&evaluation, &summary, &paths, report_config)? {
            println!("Wrote: {}", path.display());
        }
        println!();
    }

    print_detailed_report(&evaluation, mismatch_limit, show_items);
    Ok(())
}

fn pairs(config: Config, input: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let evaluator = Evaluator::new(config)?;
    let evaluation = evaluator.evaluate_file(input)?;

    for item in &evaluation.items {
        let pair = (item.verdict.gold(), item.verdict.predicted());
        println!("{}", serde_json::to_string(&pair)?);
    }
    Ok(())
}

fn init_config(config: Config, output: PathBuf) -> Result<(), Box<dyn std::error::Error>> {
    // Ensure parent directory exists
    if let Some(parent) = output.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    config.save_toml(&output)?;
    println!("Configuration written to: {}", output.display());
    Ok(())
}
