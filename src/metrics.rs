//! CSV-fed metrics producer.
//!
//! Replays a recorded stream of per-symbol load samples into the assignment
//! manager, honoring each record's delay so a capture plays back with its
//! original pacing. Record format, one per line:
//!
//! ```csv
//! # delay_ms, symbol, msgs_per_sec, trades_per_sec, avg_order_size
//! 0,    TSLA, 120.0, 40.0, 512.0
//! 1000, AAPL,  80.0, 10.0, 256.0
//! ```
//!
//! `#` starts a comment and blank lines are skipped.

use crate::rebalance::{MetricSample, ThreadAssignmentManager};
use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::JoinHandle;
use std::time::Duration;
use tracing::{debug, info};

/// Errors raised by the metrics producer.
#[derive(Debug)]
#[non_exhaustive]
pub enum MetricsError {
    /// The sample file could not be opened.
    Io {
        /// Path that failed to open.
        path: PathBuf,
        /// Underlying I/O error message.
        message: String,
    },

    /// A record could not be parsed.
    Parse {
        /// Underlying parser message.
        message: String,
    },

    /// The file held no usable records.
    NoSamples {
        /// The empty sample file.
        path: PathBuf,
    },

    /// The producer thread is already running.
    AlreadyRunning,
}

impl fmt::Display for MetricsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetricsError::Io { path, message } => {
                write!(f, "failed to open metrics file {}: {message}", path.display())
            }
            MetricsError::Parse { message } => write!(f, "failed to parse metrics: {message}"),
            MetricsError::NoSamples { path } => {
                write!(f, "no samples in metrics file {}", path.display())
            }
            MetricsError::AlreadyRunning => write!(f, "metrics producer already running"),
        }
    }
}

impl std::error::Error for MetricsError {}

#[derive(Debug, Deserialize)]
struct CsvRecord {
    delay_ms: u64,
    symbol: String,
    msgs_per_sec: f64,
    trades_per_sec: f64,
    avg_order_size: f64,
}

/// One replayable sample: how long to wait after the previous record, then
/// what to report.
#[derive(Debug, Clone)]
pub struct SampleRecord {
    /// Delay relative to the previous record.
    pub delay: Duration,
    /// The observed symbol.
    pub symbol: String,
    /// Messages per second over the window (informational).
    pub msgs_per_sec: f64,
    /// Executions per second over the window.
    pub trades_per_sec: f64,
    /// Mean order size over the window.
    pub avg_order_size: f64,
}

/// Parse a metrics CSV file into replayable records.
pub fn read_samples(path: impl AsRef<Path>) -> Result<Vec<SampleRecord>, MetricsError> {
    let path = path.as_ref();
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .comment(Some(b'#'))
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|err| MetricsError::Io {
            path: path.to_path_buf(),
            message: err.to_string(),
        })?;

    let mut samples = Vec::new();
    for record in reader.deserialize::<CsvRecord>() {
        let record = record.map_err(|err| MetricsError::Parse {
            message: err.to_string(),
        })?;
        samples.push(SampleRecord {
            delay: Duration::from_millis(record.delay_ms),
            symbol: record.symbol,
            msgs_per_sec: record.msgs_per_sec,
            trades_per_sec: record.trades_per_sec,
            avg_order_size: record.avg_order_size,
        });
    }

    if samples.is_empty() {
        return Err(MetricsError::NoSamples {
            path: path.to_path_buf(),
        });
    }
    Ok(samples)
}

/// Background thread replaying samples into the assignment manager.
pub struct LiveMetricsProducer {
    manager: Arc<ThreadAssignmentManager>,
    stop: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl LiveMetricsProducer {
    /// Create a producer feeding `manager`. Nothing runs until a `start_*`
    /// call.
    pub fn new(manager: Arc<ThreadAssignmentManager>) -> Self {
        Self {
            manager,
            stop: Arc::new(AtomicBool::new(false)),
            handle: None,
        }
    }

    /// Parse `path` and start replaying its records.
    pub fn start_from_file(&mut self, path: impl AsRef<Path>) -> Result<(), MetricsError> {
        let samples = read_samples(path)?;
        self.start_from_samples(samples)
    }

    /// Start replaying an in-memory record list.
    pub fn start_from_samples(&mut self, samples: Vec<SampleRecord>) -> Result<(), MetricsError> {
        if self.handle.is_some() {
            return Err(MetricsError::AlreadyRunning);
        }
        self.stop.store(false, Ordering::Release);

        let manager = Arc::clone(&self.manager);
        let stop = Arc::clone(&self.stop);
        let spawned = std::thread::Builder::new()
            .name("metrics-producer".to_string())
            .spawn(move || replay_loop(&samples, &manager, &stop));
        match spawned {
            Ok(handle) => {
                self.handle = Some(handle);
                info!("metrics producer started");
                Ok(())
            }
            Err(err) => Err(MetricsError::Io {
                path: PathBuf::new(),
                message: err.to_string(),
            }),
        }
    }

    /// Stop the replay thread and join it. Safe to call repeatedly.
    pub fn stop(&mut self) {
        self.stop.store(true, Ordering::Release);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for LiveMetricsProducer {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Sleep each record's delay in short chunks (so stop requests bite quickly),
/// then submit it.
fn replay_loop(samples: &[SampleRecord], manager: &ThreadAssignmentManager, stop: &AtomicBool) {
    const CHUNK: Duration = Duration::from_millis(50);

    for sample in samples {
        let mut remaining = sample.delay;
        while !remaining.is_zero() && !stop.load(Ordering::Acquire) {
            let nap = remaining.min(CHUNK);
            std::thread::sleep(nap);
            remaining = remaining.saturating_sub(nap);
        }
        if stop.load(Ordering::Acquire) {
            return;
        }

        debug!(symbol = %sample.symbol, trades_per_sec = sample.trades_per_sec, "metric sample");
        manager.submit_sample(MetricSample::now(
            sample.symbol.clone(),
            sample.trades_per_sec,
            sample.avg_order_size,
        ));
    }
}
