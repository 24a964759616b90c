use std::fs::File;
use std::path::PathBuf;
use std::thread;
use std::time::Instant;

use anyhow::{Context, anyhow};
use memmap2::Mmap;

use crate::error::Error;
use crate::process;
use crate::report::Report;

/// Aggregate a measurements file into a [Report].
///
/// # Examples
/// ```no_run
/// use std::path::PathBuf;
/// use station_stats::Aggregation;
///
/// fn averages(input: PathBuf) -> Result<(), anyhow::Error> {
///     let mut aggregation = Aggregation::new(input);
///     // use four threads instead of one per available core
///     aggregation.with_workers(4);
///     let report = aggregation.run()?;
///     println!("{report}");
///     Ok(())
/// }
/// ```
pub struct Aggregation {
    input: PathBuf,
    workers: usize,
}

impl Aggregation {
    /// Create an aggregation that uses every available core.
    pub fn new(input: PathBuf) -> Aggregation {
        Aggregation { input, workers: 0 }
    }

    /// Set the number of worker threads. The default is zero which will result in using all
    /// available cores
    pub fn with_workers(&mut self, workers: usize) {
        self.workers = workers;
    }

    pub fn input(&self) -> &PathBuf {
        &self.input
    }

    /// The worker count this aggregation will actually run with.
    pub fn workers(&self) -> usize {
        if self.workers == 0 {
            available_workers()
        } else {
            self.workers
        }
    }

    pub fn run(&self) -> Result<Report, anyhow::Error> {
        let start = Instant::now();
        let file = File::open(&self.input)
            .map_err(Error::Io)
            .with_context(|| anyhow!("path: {}", self.input.display()))?;
        let length = file
            .metadata()
            .map_err(Error::Io)
            .with_context(|| anyhow!("path: {}", self.input.display()))?
            .len();
        if length == 0 {
            log::info!("Empty input: {}", self.input.display());
            return Ok(Report::default());
        }

        // the file is only read, and nothing else is expected to write it during the run
        let map = unsafe { Mmap::map(&file) }
            .map_err(Error::Io)
            .with_context(|| anyhow!("mmap path: {}", self.input.display()))?;
        #[cfg(unix)]
        map.advise(memmap2::Advice::Sequential)
            .map_err(Error::Io)
            .with_context(|| anyhow!("madvise path: {}", self.input.display()))?;

        let workers = self.workers();
        log::info!(
            "Aggregating {} bytes from {} with {} workers",
            length,
            self.input.display(),
            workers
        );
        let stations = process::aggregate(&map, workers)
            .with_context(|| anyhow!("path: {}", self.input.display()))?;
        let report = Report::new(stations);

        log::info!(
            "Number of stations: {}; measurements: {} (= {} million)",
            report.len(),
            report.measurements(),
            report.measurements() / 1_000_000
        );
        log::info!("Elapsed: {} millis", start.elapsed().as_millis());
        Ok(report)
    }
}

/// Hardware parallelism, falling back to a single worker when it cannot be queried.
pub fn available_workers() -> usize {
    thread::available_parallelism()
        .map(Into::into)
        .unwrap_or(1)
}
