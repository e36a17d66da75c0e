//! Batch extraction over locations × variables × years × months.
//!
//! Every combination is one [`Job`]: one location, one variable, one
//! monthly grid file, one output table. Jobs are independent; a failing job
//! is recorded in its [`JobReport`] and the rest of the batch carries on.
//!
//! # Example
//!
//! ```
//! use era5_extract::batch::BatchPlan;
//!
//! let plan = BatchPlan::new(vec![1, 2], vec!["T2".into()], vec![2018]).with_months(vec![1, 2]);
//! let jobs = plan.jobs();
//! assert_eq!(jobs.len(), 4);
//! assert_eq!(jobs[0].output_file_name(), "1_T2_2018_01.csv");
//! assert_eq!(jobs[3].output_file_name(), "2_T2_2018_02.csv");
//! ```

use std::fmt;
use std::path::PathBuf;

use tracing::{debug, error, info};

use crate::config::{ConfigError, ExtractConfig};
use crate::series::{ExtractError, extract_point_series};
use crate::source::SourceOpener;
use crate::table::{CoordinatesTable, MetadataTable, write_series_file};

/// One extraction: a location, a variable and a month.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Job {
    pub index: usize,
    pub variable: String,
    pub year: i32,
    pub month: u32,
}

impl Job {
    /// File name of the output table (`<index>_<variable>_<year>_<MM>.csv`).
    pub fn output_file_name(&self) -> String {
        format!(
            "{}_{}_{}_{:02}.csv",
            self.index, self.variable, self.year, self.month
        )
    }
}

impl fmt::Display for Job {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "#{} {} {}-{:02}",
            self.index, self.variable, self.year, self.month
        )
    }
}

/// Lists of indexes, variables, years and months to combine.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BatchPlan {
    pub indexes: Vec<usize>,
    pub variables: Vec<String>,
    pub years: Vec<i32>,
    pub months: Vec<u32>,
}

impl BatchPlan {
    /// Plan covering all twelve months.
    pub fn new(indexes: Vec<usize>, variables: Vec<String>, years: Vec<i32>) -> Self {
        Self {
            indexes,
            variables,
            years,
            months: (1..=12).collect(),
        }
    }

    /// Restrict the plan to the given months.
    pub fn with_months(mut self, months: Vec<u32>) -> Self {
        self.months = months;
        self
    }

    /// Reject empty lists and months outside 1..=12.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.indexes.is_empty() {
            return Err(ConfigError::Empty("location indexes"));
        }
        if self.variables.is_empty() {
            return Err(ConfigError::Empty("variables"));
        }
        if self.years.is_empty() {
            return Err(ConfigError::Empty("years"));
        }
        if self.months.is_empty() {
            return Err(ConfigError::Empty("months"));
        }
        if let Some(&m) = self.months.iter().find(|m| !(1..=12).contains(*m)) {
            return Err(ConfigError::InvalidMonth(m));
        }
        Ok(())
    }

    /// Expand to jobs, ordered index → variable → year → month.
    ///
    /// Repeated list entries are dropped (first occurrence wins), so no two
    /// jobs share an output file.
    pub fn jobs(&self) -> Vec<Job> {
        let indexes = distinct(&self.indexes);
        let variables = distinct(&self.variables);
        let years = distinct(&self.years);
        let months = distinct(&self.months);

        let mut jobs =
            Vec::with_capacity(indexes.len() * variables.len() * years.len() * months.len());
        for &index in &indexes {
            for variable in &variables {
                for &year in &years {
                    for &month in &months {
                        jobs.push(Job {
                            index,
                            variable: variable.clone(),
                            year,
                            month,
                        });
                    }
                }
            }
        }
        jobs
    }
}

fn distinct<T: Clone + PartialEq>(items: &[T]) -> Vec<T> {
    let mut out: Vec<T> = Vec::with_capacity(items.len());
    for item in items {
        if !out.contains(item) {
            out.push(item.clone());
        }
    }
    out
}

/// Outcome of one job.
#[derive(Clone, Debug, PartialEq)]
pub enum JobStatus {
    /// Check mode: nothing read or written
    Planned {
        input: PathBuf,
        output: PathBuf,
        input_exists: bool,
    },
    /// Output already present and overwrite disabled
    Skipped { output: PathBuf },
    /// Table written
    Written {
        output: PathBuf,
        rows: usize,
        undefined: usize,
    },
    /// Job failed; other jobs are unaffected
    Failed(String),
}

/// A job together with its outcome.
#[derive(Clone, Debug, PartialEq)]
pub struct JobReport {
    pub job: Job,
    pub status: JobStatus,
}

/// Outcome counts of a batch run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub planned: usize,
    pub skipped: usize,
    pub written: usize,
    pub failed: usize,
}

impl BatchSummary {
    pub fn from_reports(reports: &[JobReport]) -> Self {
        let mut summary = Self::default();
        for report in reports {
            match report.status {
                JobStatus::Planned { .. } => summary.planned += 1,
                JobStatus::Skipped { .. } => summary.skipped += 1,
                JobStatus::Written { .. } => summary.written += 1,
                JobStatus::Failed(_) => summary.failed += 1,
            }
        }
        summary
    }

    pub fn has_failures(&self) -> bool {
        self.failed > 0
    }

    pub fn total(&self) -> usize {
        self.planned + self.skipped + self.written + self.failed
    }
}

impl fmt::Display for BatchSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} jobs: {} written, {} skipped, {} planned, {} failed",
            self.total(),
            self.written,
            self.skipped,
            self.planned,
            self.failed
        )
    }
}

/// Run every job of `plan`.
///
/// Reports come back in plan order. Only an invalid plan is an error;
/// per-job problems end up as [`JobStatus::Failed`].
pub fn run_batch<O: SourceOpener>(
    plan: &BatchPlan,
    config: &ExtractConfig,
    metadata: &MetadataTable,
    coordinates: &CoordinatesTable,
    opener: &O,
) -> Result<Vec<JobReport>, ConfigError> {
    plan.validate()?;
    let jobs = plan.jobs();
    info!(
        "Running {} jobs{}",
        jobs.len(),
        if config.check { " (check mode)" } else { "" }
    );

    let run = |job: Job| {
        let status = match run_job(&job, config, metadata, coordinates, opener) {
            Ok(status) => status,
            Err(e) => {
                error!("{}: {}", job, e);
                JobStatus::Failed(e.to_string())
            }
        };
        JobReport { job, status }
    };

    #[cfg(feature = "parallel")]
    let reports: Vec<JobReport> = {
        use rayon::prelude::*;
        jobs.into_par_iter().map(run).collect()
    };

    #[cfg(not(feature = "parallel"))]
    let reports: Vec<JobReport> = jobs.into_iter().map(run).collect();

    info!("{}", BatchSummary::from_reports(&reports));
    Ok(reports)
}

/// Run a single job.
pub fn run_job<O: SourceOpener>(
    job: &Job,
    config: &ExtractConfig,
    metadata: &MetadataTable,
    coordinates: &CoordinatesTable,
    opener: &O,
) -> Result<JobStatus, ExtractError> {
    let variable = metadata.get(&job.variable)?;
    let location = coordinates.get(job.index)?;
    let input = config.layout.resolve(job.year, job.month, variable)?;
    let output = config.output_dir.join(job.output_file_name());

    if config.check {
        let input_exists = input.exists();
        info!(
            "[check] {}: {} -> {}{}",
            job,
            input.display(),
            output.display(),
            if input_exists { "" } else { " (input missing)" }
        );
        return Ok(JobStatus::Planned {
            input,
            output,
            input_exists,
        });
    }

    if output.exists() && !config.overwrite {
        info!("{}: {} exists, skipping", job, output.display());
        return Ok(JobStatus::Skipped { output });
    }

    debug!("{}: opening {}", job, input.display());
    let series = {
        let source = opener.open(&input)?;
        extract_point_series(&source, variable, location.point, config.options())?
    };

    let rows = write_series_file(&output, &series, config.delimiter)?;
    let undefined = series.n_undefined();
    info!(
        "{}: wrote {} rows to {} ({} undefined)",
        job,
        rows,
        output.display(),
        undefined
    );
    Ok(JobStatus::Written {
        output,
        rows,
        undefined,
    })
}
