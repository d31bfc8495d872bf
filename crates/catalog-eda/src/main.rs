//! CLI entry point for the catalog EDA pipeline.

use anyhow::{Result, anyhow};
use catalog_eda::{
    CorrelationValue, EdaConfig, EdaReport, EdaSession, OutlierMode, SectionOutcome,
};
use clap::Parser;
use dotenv::dotenv;
use std::path::PathBuf;
use tracing::{debug, info};

/// Catalog EDA - Exploratory analysis of a movies/series catalog
///
/// Loads a delimited catalog file, classifies its columns, expands the genre
/// list and computes every analysis section as a single report.
#[derive(Parser, Debug)]
#[command(
    author = "Catalog EDA Team",
    version,
    about = "Exploratory data analysis for a movies/series catalog",
    long_about = "Catalog EDA computes the quality audit, univariate profiles, outlier \
                  detection, score breakdowns, correlation matrix and scatter matrix of a \
                  catalog dataset.\n\n\
                  EXAMPLES:\n  \
                  catalog-eda -i netflix.csv\n  \
                  catalog-eda -i netflix.csv -m \"IMDb Score\" --skew-gated\n  \
                  catalog-eda -i netflix.csv --json | jq .quality\n  \
                  catalog-eda -c eda.json -o report.json"
)]
struct Args {
    /// Input catalog file path
    ///
    /// Overrides `data_path` from the config file when both are given.
    #[arg(short, long, env = "CATALOG_EDA_INPUT")]
    input: Option<String>,

    /// JSON configuration file
    ///
    /// Missing fields fall back to the defaults.
    #[arg(short, long)]
    config: Option<String>,

    /// Score metric for the bar charts (default: first configured metric)
    #[arg(short, long)]
    metric: Option<String>,

    /// Only test columns whose |skewness| exceeds the skew threshold
    #[arg(long)]
    skew_gated: bool,

    /// Skewness threshold for --skew-gated
    #[arg(long)]
    skew_threshold: Option<f64>,

    /// Number of groups kept for high-cardinality dimensions
    #[arg(long)]
    top_n: Option<usize>,

    /// Show the full correlation heatmap instead of the lower triangle
    #[arg(long)]
    no_mask: bool,

    /// Output JSON to stdout instead of human-readable summary
    ///
    /// Disables all progress logs; only outputs the final JSON report.
    /// Useful for piping to other tools: `... --json | jq .correlation`
    #[arg(long)]
    json: bool,

    /// Write the JSON report to this file
    #[arg(short, long)]
    output: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Suppress progress output (only show errors and final result)
    #[arg(short, long)]
    quiet: bool,
}

/// Initialize the tracing subscriber for logging.
///
/// When `json_output` is true, logging is completely disabled to ensure
/// only JSON is written to stdout.
fn init_logging(level: &str, quiet: bool, json_output: bool) {
    if json_output {
        return;
    }

    use tracing_subscriber::EnvFilter;

    let effective_level = if quiet { "warn" } else { level };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(effective_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    // Load .env first so CATALOG_EDA_INPUT can back --input
    dotenv().ok();

    let args = Args::parse();

    init_logging(&args.log_level, args.quiet, args.json);

    let config = build_config(&args)?;
    let input = config
        .data_path
        .clone()
        .ok_or_else(|| anyhow!("No input file given (use --input or data_path in --config)"))?;
    if !input.exists() {
        return Err(anyhow!("Input file not found: {}", input.display()));
    }

    info!("Loading catalog from: {}", input.display());
    let session = EdaSession::open(config)?;

    let report = match args.metric.as_deref() {
        Some(metric) => EdaReport::build_with_metric(&session, metric),
        None => EdaReport::build(&session),
    };

    if let Some(ref output) = args.output {
        report.write_to_file(output)?;
        info!("Report written to: {}", output);
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else if !args.quiet {
        print_human_readable_summary(&report, args.output.as_deref());
    }

    Ok(())
}

/// Merge the config file (or defaults) with command-line overrides.
fn build_config(args: &Args) -> Result<EdaConfig> {
    let mut config = match args.config {
        Some(ref path) => {
            debug!("Reading config from: {}", path);
            EdaConfig::from_json_file(path)?
        }
        None => EdaConfig::default(),
    };

    if let Some(ref input) = args.input {
        config.data_path = Some(PathBuf::from(input));
    }
    if args.skew_gated {
        config.outlier_mode = OutlierMode::SkewGated;
    }
    if let Some(threshold) = args.skew_threshold {
        config.skew_threshold = threshold;
    }
    if let Some(top_n) = args.top_n {
        config.top_n = top_n;
    }
    if args.no_mask {
        config.mask_upper_triangle = false;
    }

    config.validate()?;
    Ok(config)
}

/// Print a human-readable summary of the report.
///
/// This is the default output when neither `--json` nor `--quiet` are specified.
fn print_human_readable_summary(report: &EdaReport, output: Option<&str>) {
    println!();
    println!("{}", "=".repeat(80));
    println!("CATALOG EDA COMPLETE");
    println!("{}", "=".repeat(80));
    println!();

    println!(
        "Input:  {} ({} rows x {} columns)",
        report.source, report.row_count, report.column_count
    );
    if let Some(output) = output {
        println!("Report: {}", output);
    }
    println!("Duration: {}ms", report.duration_ms);
    println!();

    println!("Columns:");
    println!(
        "  {} numeric, {} categorical, {} multi-valued",
        report.classification.numeric().len(),
        report.classification.categorical().len(),
        report.classification.multi_valued().len()
    );
    if let Some(ref tokens) = report.genre_tokens {
        println!("  {} genres in '{}'", tokens.len(), tokens.column);
    }
    println!();

    if let SectionOutcome::Ok { data: ref quality } = report.quality {
        println!("Data Quality:");
        println!("  Duplicate rows: {}", quality.duplicate_count);
        println!(
            "  Missing cells: {} across {} columns",
            quality.total_missing_cells, quality.columns_with_missing
        );
        for column in quality.columns.iter().filter(|c| c.missing_count > 0).take(5) {
            println!(
                "  - {:<24} {:>6} missing ({:.1}%)",
                truncate_str(&column.name, 24),
                column.missing_count,
                column.missing_percentage
            );
        }
        println!();
    }

    if let SectionOutcome::Ok { data: ref outliers } = report.outliers {
        let flagged = outliers.flagged_columns();
        println!("Outliers ({:?}):", outliers.mode);
        if flagged.is_empty() {
            println!("  No outliers detected");
        } else {
            for column in flagged {
                println!("  - {}", column);
            }
        }
        println!();
    }

    if let SectionOutcome::Ok { data: ref breakdown } = report.score_breakdown {
        println!("Mean {} (top group per dimension):", breakdown.metric);
        for dimension in &breakdown.dimensions {
            match dimension.outcome {
                SectionOutcome::Ok { data: ref result } => {
                    let top = result
                        .groups
                        .iter()
                        .filter_map(|g| g.mean.map(|mean| (g, mean)))
                        .max_by(|a, b| a.1.total_cmp(&b.1));
                    if let Some((group, mean)) = top {
                        println!(
                            "  {:<18} {} ({:.2}, {} titles)",
                            truncate_str(&dimension.dimension, 18),
                            group.category,
                            mean,
                            group.count
                        );
                    }
                }
                SectionOutcome::Error { ref error } => {
                    println!("  {:<18} ! {}", truncate_str(&dimension.dimension, 18), error);
                }
            }
        }
        println!();
    }

    if let SectionOutcome::Ok { data: ref matrix } = report.correlation {
        let mut pairs = Vec::new();
        for i in 0..matrix.size() {
            for j in 0..i {
                if let CorrelationValue::Coefficient(r) = matrix.values[i][j] {
                    pairs.push((&matrix.columns[i], &matrix.columns[j], r));
                }
            }
        }
        pairs.sort_by(|a, b| b.2.abs().total_cmp(&a.2.abs()));

        println!("Strongest Correlations:");
        if pairs.is_empty() {
            println!("  Not enough numeric columns");
        }
        for (a, b, r) in pairs.into_iter().take(5) {
            println!("  {} / {}: {:+.3}", a, b, r);
        }
        println!();
    }

    let failed = report.failed_sections();
    if !failed.is_empty() {
        println!("Warnings:");
        for (section, error) in failed {
            println!("  ! {}: {}", section, error);
        }
        println!();
    }

    println!("Use --json for machine-readable output");
    if output.is_none() {
        println!("Use -o <file> to save the JSON report");
    }
    println!("{}", "=".repeat(80));
}

/// Truncate a string to max length with ellipsis
fn truncate_str(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
