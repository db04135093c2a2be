//! Visitor-log report tool.
//!
//! Reads an exported visits JSON file, applies the requested filters and
//! prints the full report as pretty JSON on stdout.
//!
//! # Usage
//!
//! ```text
//! visit-report <records.json> [--config engine.toml] [--start YYYY-MM-DD]
//!              [--end YYYY-MM-DD] [--category all|adults-only|children-only]
//! ```
//!
//! # Environment Variables
//!
//! - `RUST_LOG`: Log level (default: info). Logs go to stderr.
//!
//! Without `--config`, a `visitlog.toml` in the working directory is used
//! when present.

use std::env;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use visitlog::algorithms::build_report;
use visitlog::config::EngineConfig;
use visitlog::core::CategoryFilter;
use visitlog::preprocessing::PreprocessPipeline;

const USAGE: &str = "usage: visit-report <records.json> [--config engine.toml] \
[--start YYYY-MM-DD] [--end YYYY-MM-DD] [--category all|adults-only|children-only]";

#[derive(Debug, Default)]
struct Args {
    input: PathBuf,
    config: Option<PathBuf>,
    start: Option<String>,
    end: Option<String>,
    category: Option<CategoryFilter>,
}

fn parse_args(mut args: impl Iterator<Item = String>) -> Result<Args> {
    let mut input = None;
    let mut parsed = Args::default();

    while let Some(arg) = args.next() {
        let mut value = |flag: &str| {
            args.next()
                .with_context(|| format!("{} requires a value\n{}", flag, USAGE))
        };
        match arg.as_str() {
            "--config" => parsed.config = Some(PathBuf::from(value("--config")?)),
            "--start" => parsed.start = Some(value("--start")?),
            "--end" => parsed.end = Some(value("--end")?),
            "--category" => parsed.category = Some(value("--category")?.parse()?),
            "-h" | "--help" => bail!("{}", USAGE),
            flag if flag.starts_with("--") => bail!("unknown option {}\n{}", flag, USAGE),
            path if input.is_none() => input = Some(PathBuf::from(path)),
            extra => bail!("unexpected argument {}\n{}", extra, USAGE),
        }
    }

    parsed.input = input.with_context(|| format!("missing input file\n{}", USAGE))?;
    Ok(parsed)
}

fn main() -> Result<()> {
    FmtSubscriber::builder()
        .with_max_level(
            env::var("RUST_LOG")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(Level::INFO),
        )
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let args = parse_args(env::args().skip(1))?;

    let config = match &args.config {
        Some(path) => EngineConfig::from_file(path)?,
        None => EngineConfig::from_default_location().unwrap_or_else(|e| {
            info!("{}; using built-in defaults", e);
            EngineConfig::default()
        }),
    };

    let pre = PreprocessPipeline::with_config(&config)
        .process(&args.input)
        .with_context(|| format!("Failed to preprocess {}", args.input.display()))?;
    info!(
        "Loaded {} visits ({} kept, {} dropped)",
        pre.total_records,
        pre.records.len(),
        pre.report.dropped.len()
    );

    let mut criteria = config.default_criteria();
    criteria.start_date = args.start;
    criteria.end_date = args.end;
    if let Some(category) = args.category {
        criteria.category = category;
    }

    let report = build_report(&pre.records, &criteria, &config)?;
    info!(
        "Report covers {} visits on {} days",
        report.snapshot.total_visits, report.snapshot.active_days
    );

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
