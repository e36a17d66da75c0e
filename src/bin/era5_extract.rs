//! Command-line front end: extract point time series from ERA5-Land archives.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use era5_extract::batch::{BatchPlan, BatchSummary, JobReport, JobStatus, run_batch};
use era5_extract::config::{DEFAULT_PATTERN, ExtractConfig};
use era5_extract::interpolate::BoundaryPolicy;
use era5_extract::source::NetcdfOpener;
use era5_extract::table::{CoordinatesTable, MetadataTable};

/// ERA5-Land point time series extraction
#[derive(Parser)]
#[command(name = "era5-extract")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(
    about = "Bilinear point time series extraction from ERA5-Land NetCDF files",
    long_about = None
)]
struct Cli {
    /// Log level (RUST_LOG overrides when set)
    #[arg(
        short,
        long,
        global = true,
        value_enum,
        ignore_case = true,
        default_value_t = LogLevel::Info
    )]
    logging: LogLevel,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract one variable at one location for one month
    Extract(ExtractArgs),
    /// Extract every combination of locations, variables, years and months
    Batch(BatchArgs),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
#[value(rename_all = "UPPER")]
enum LogLevel {
    Critical,
    Error,
    Warning,
    Info,
    Debug,
    Notset,
}

impl LogLevel {
    fn directive(self) -> &'static str {
        match self {
            LogLevel::Critical | LogLevel::Error => "error",
            LogLevel::Warning => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Notset => "trace",
        }
    }
}

/// Inputs, output and flags shared by both subcommands
#[derive(Args)]
struct CommonArgs {
    /// Root directory of the NetCDF archive
    #[arg(short, long)]
    path: PathBuf,

    /// Coordinates table (index,name,latitude,longitude)
    #[arg(short, long)]
    coordinates: PathBuf,

    /// Variable metadata table (short_name,field_name,...)
    #[arg(long)]
    metadata: PathBuf,

    /// Output directory for the series tables
    #[arg(short, long, default_value = "output")]
    output: PathBuf,

    /// Archive file pattern; placeholders {year} {month} {variable} {field}
    #[arg(long, default_value = DEFAULT_PATTERN)]
    pattern: String,

    /// Delimiter of input and output tables
    #[arg(long, default_value_t = ',')]
    delimiter: char,

    /// Only log what would be done
    #[arg(long)]
    check: bool,

    /// Clamp points on or beyond the grid edge instead of failing
    #[arg(long)]
    clamp: bool,

    /// Rewrite output tables that already exist
    #[arg(long)]
    overwrite: bool,

    /// Cross-check every value against the reference interpolator
    #[arg(long)]
    verify: bool,
}

#[derive(Args)]
struct ExtractArgs {
    /// Location index in the coordinates table
    #[arg(short, long)]
    index: usize,

    /// Variable short name from the metadata table
    #[arg(short, long)]
    variable: String,

    #[arg(short, long)]
    year: i32,

    /// Month (1-12)
    #[arg(short, long)]
    month: u32,

    #[command(flatten)]
    common: CommonArgs,
}

#[derive(Args)]
struct BatchArgs {
    /// Location indexes, comma separated
    #[arg(long, value_delimiter = ',', required = true)]
    indexes: Vec<usize>,

    /// Variable short names, comma separated
    #[arg(long, value_delimiter = ',', required = true)]
    variables: Vec<String>,

    /// Years, comma separated
    #[arg(long, value_delimiter = ',', required = true)]
    years: Vec<i32>,

    /// Months, comma separated (default: all)
    #[arg(long, value_delimiter = ',')]
    months: Vec<u32>,

    #[command(flatten)]
    common: CommonArgs,
}

fn init_logging(level: LogLevel) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.directive()));

    fmt().with_env_filter(filter).with_target(false).init();
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_logging(cli.logging);

    let (plan, common) = into_plan(cli.command);
    let config = build_config(&common)?;
    let metadata = MetadataTable::read(&common.metadata, config.delimiter)
        .with_context(|| format!("reading metadata table {}", common.metadata.display()))?;
    let coordinates = CoordinatesTable::read(&common.coordinates, config.delimiter)
        .with_context(|| format!("reading coordinates table {}", common.coordinates.display()))?;
    info!(
        "{} variables, {} locations, archive {}",
        metadata.len(),
        coordinates.len(),
        config.layout.root.display()
    );

    let reports = run_batch(&plan, &config, &metadata, &coordinates, &NetcdfOpener)?;
    report_failures(&reports);

    let summary = BatchSummary::from_reports(&reports);
    if summary.has_failures() {
        error!("{}", summary);
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}

/// Turn a subcommand into a batch plan; `extract` is a one-job plan.
fn into_plan(command: Commands) -> (BatchPlan, CommonArgs) {
    match command {
        Commands::Extract(args) => (
            BatchPlan::new(vec![args.index], vec![args.variable], vec![args.year])
                .with_months(vec![args.month]),
            args.common,
        ),
        Commands::Batch(args) => {
            let mut plan = BatchPlan::new(args.indexes, args.variables, args.years);
            if !args.months.is_empty() {
                plan = plan.with_months(args.months);
            }
            (plan, args.common)
        }
    }
}

fn build_config(common: &CommonArgs) -> Result<ExtractConfig> {
    if !common.delimiter.is_ascii() {
        bail!("delimiter must be a single ASCII character, got '{}'", common.delimiter);
    }
    let boundary = if common.clamp {
        BoundaryPolicy::Clamp
    } else {
        BoundaryPolicy::Strict
    };

    let config = ExtractConfig::new(&common.path, &common.output)
        .with_pattern(common.pattern.as_str())
        .context("invalid --pattern")?
        .with_boundary(boundary)
        .with_delimiter(common.delimiter as u8)
        .with_overwrite(common.overwrite)
        .with_check(common.check)
        .with_verify_reference(common.verify);
    Ok(config)
}

fn report_failures(reports: &[JobReport]) {
    for report in reports {
        match &report.status {
            JobStatus::Failed(reason) => warn!("failed {}: {}", report.job, reason),
            JobStatus::Planned {
                input,
                input_exists: false,
                ..
            } => warn!("{}: input {} not found", report.job, input.display()),
            _ => {}
        }
    }
}
