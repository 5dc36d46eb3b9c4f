//! Rollup CLI - Join two counter-party datasets into a subtotal report
//!
//! # Commands
//!
//! ```bash
//! rollup report --dataset1 a.csv --dataset2 b.csv --output report.csv
//! rollup report --dataset1 a.csv --dataset2 b.csv --output report.json --format json
//! rollup inspect a.csv              # Show what the parser detects
//! ```
//!
//! Every `report` option except the paths can also come from the environment
//! (`ROLLUP_DELIMITER`, `ROLLUP_OUTPUT_DELIMITER`, `ROLLUP_FORMAT`,
//! `ROLLUP_TIER_POLICY`), including a `.env` file in the working directory.

use clap::{Parser, Subcommand, ValueEnum};
use rollup::logs::{log_error, log_info, log_success, log_warning, set_quiet, LogLevel, LOGGER};
use rollup::{
    format_delimiter, parse_csv_file_auto, run_report, OutputFormat, ReportOptions,
    RollupOptions, TierPolicy, WriteOptions,
};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "rollup")]
#[command(about = "Join two counter-party datasets and write a multi-level subtotal report", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Join, roll up and write the report
    Report {
        /// First input CSV file
        #[arg(long)]
        dataset1: PathBuf,

        /// Second input CSV file
        #[arg(long)]
        dataset2: PathBuf,

        /// Output file (replaced if it exists)
        #[arg(short, long)]
        output: PathBuf,

        /// Input delimiter (auto-detect if not specified)
        #[arg(short, long, env = "ROLLUP_DELIMITER")]
        delimiter: Option<char>,

        /// Output delimiter for CSV output
        #[arg(long, env = "ROLLUP_OUTPUT_DELIMITER", default_value = ",")]
        output_delimiter: char,

        /// Output format
        #[arg(short, long, env = "ROLLUP_FORMAT", value_enum, default_value_t = FormatArg::Csv)]
        format: FormatArg,

        /// How a legal entity / counter-party pair picks its tier
        #[arg(long, env = "ROLLUP_TIER_POLICY", value_enum, default_value_t = TierPolicyArg::First)]
        tier_policy: TierPolicyArg,

        /// Only print errors
        #[arg(short, long)]
        quiet: bool,
    },

    /// Parse a CSV file and show what was detected
    Inspect {
        /// Input CSV file
        input: PathBuf,

        /// CSV delimiter (auto-detect if not specified)
        #[arg(short, long)]
        delimiter: Option<char>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum FormatArg {
    Csv,
    Json,
}

impl From<FormatArg> for OutputFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Csv => OutputFormat::Csv,
            FormatArg::Json => OutputFormat::Json,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum TierPolicyArg {
    /// First non-empty tier wins
    First,
    /// Fail on conflicting tiers
    Strict,
}

impl From<TierPolicyArg> for TierPolicy {
    fn from(arg: TierPolicyArg) -> Self {
        match arg {
            TierPolicyArg::First => TierPolicy::First,
            TierPolicyArg::Strict => TierPolicy::Strict,
        }
    }
}

fn main() {
    // Load .env file (if present)
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Report {
            dataset1,
            dataset2,
            output,
            delimiter,
            output_delimiter,
            format,
            tier_policy,
            quiet,
        } => {
            set_quiet(quiet);
            let options = ReportOptions {
                delimiter,
                rollup: RollupOptions {
                    tier_policy: tier_policy.into(),
                },
                output: WriteOptions {
                    format: format.into(),
                    delimiter: output_delimiter,
                },
            };
            cmd_report(&dataset1, &dataset2, &output, &options)
        }

        Commands::Inspect { input, delimiter } => cmd_inspect(&input, delimiter),
    };

    if let Err(e) = result {
        log_error(format!("Error: {}", e));
        std::process::exit(1);
    }
}

fn cmd_report(
    dataset1: &Path,
    dataset2: &Path,
    output: &Path,
    options: &ReportOptions,
) -> Result<(), Box<dyn std::error::Error>> {
    let summary = run_report(dataset1, dataset2, output, options)?;

    let warnings = LOGGER.count(LogLevel::Warning);
    if warnings > 0 {
        log_warning(format!("Finished with {} warning(s)", warnings));
    }
    log_info(format!(
        "\n✨ Done! {} rows in {}",
        summary.total_rows,
        summary.output.display()
    ));
    Ok(())
}

fn cmd_inspect(input: &Path, delimiter: Option<char>) -> Result<(), Box<dyn std::error::Error>> {
    log_info(format!("📄 Parsing CSV: {}", input.display()));

    let result = parse_csv_file_auto(input, delimiter)?;

    println!("Encoding:  {}", result.encoding);
    println!(
        "Delimiter: '{}'{}",
        format_delimiter(result.delimiter),
        if delimiter.is_none() { " (auto-detected)" } else { "" }
    );
    println!("Columns:   {}", result.table.headers.join(", "));
    println!("Rows:      {}", result.table.len());

    log_success(format!("Parsed {} rows", result.table.len()));
    Ok(())
}
