// Dweve Pipesweep - Compression Pipeline Sweep Harness
//
// Copyright (c) 2025 Dweve IP B.V. and individual contributors.
//
// SPDX-License-Identifier: Apache-2.0
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License in the LICENSE file at the
// root of this repository or at: http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Metrics recorder.
//!
//! A single recorder thread owns the [`ResultSink`]. Workers hand finished
//! runs to it through a [`RecordSender`] and never touch the sink, so rows
//! are appended one at a time and each is flushed before the next arrives.
//!
//! The CSV table is append-only: an existing, non-empty table is extended
//! without rewriting its header, and a table with a different header is
//! refused rather than mixed.

use crate::cancel::CancelToken;
use crate::error::{HarnessError, Result};
use crate::pipeline::StageSet;
use crate::results::ResultSet;
use crate::run::BenchmarkRun;
use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::{self, JoinHandle};
use tracing::{debug, error, info};

/// Columns after the stage toggles.
const MEASUREMENT_COLUMNS: [&str; 6] = [
    "original_size",
    "compressed_size",
    "compression_ratio",
    "compress_secs",
    "decompress_secs",
    "round_trip_verified",
];

/// Baseline columns, always present and empty when not measured.
const BASELINE_COLUMNS: [&str; 5] = [
    "baseline_tool",
    "baseline_compressed_size",
    "baseline_ratio",
    "baseline_compress_secs",
    "baseline_decompress_secs",
];

/// Destination of recorded runs.
pub trait ResultSink: Send {
    /// Persists one run; must be durable when this returns.
    fn append(&mut self, run: &BenchmarkRun) -> Result<()>;

    /// Called once after the last run.
    fn finish(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Discards every run; the recorder still collects the [`ResultSet`].
#[derive(Debug, Default)]
pub struct NullSink;

impl ResultSink for NullSink {
    fn append(&mut self, _run: &BenchmarkRun) -> Result<()> {
        Ok(())
    }
}

/// Result table header for a stage set.
pub fn header(stages: &StageSet) -> Vec<String> {
    ["category", "file"]
        .iter()
        .map(|s| s.to_string())
        .chain(stages.names().iter().cloned())
        .chain(MEASUREMENT_COLUMNS.iter().map(|s| s.to_string()))
        .chain(BASELINE_COLUMNS.iter().map(|s| s.to_string()))
        .collect()
}

fn secs(value: f64) -> String {
    format!("{:.6}", value)
}

/// Formats one run as a table row matching [`header`].
pub fn row(run: &BenchmarkRun) -> Vec<String> {
    let mut fields = vec![run.category.dir_name().to_string(), run.file.clone()];
    fields.extend(run.config.args().into_iter().map(str::to_string));
    fields.push(run.original_size.to_string());
    fields.push(run.compressed_size.to_string());
    fields.push(format!("{:.6}", run.compression_ratio()));
    fields.push(secs(run.compress_secs));
    fields.push(run.decompress_secs.map(secs).unwrap_or_default());
    fields.push(run.round_trip_verified.to_string());

    match &run.baseline {
        Some(baseline) => {
            fields.push(baseline.tool.clone());
            fields.push(baseline.compressed_size.to_string());
            fields.push(format!("{:.6}", baseline.ratio(run.original_size)));
            fields.push(secs(baseline.compress_secs));
            fields.push(secs(baseline.decompress_secs));
        }
        None => fields.extend(std::iter::repeat(String::new()).take(BASELINE_COLUMNS.len())),
    }
    fields
}

/// Append-only CSV result table.
pub struct CsvSink {
    path: PathBuf,
    writer: csv::Writer<File>,
}

impl CsvSink {
    /// Opens `path` for appending, writing the header only if the file is new or empty.
    ///
    /// # Errors
    ///
    /// [`HarnessError::HeaderMismatch`] if the file already holds a table with
    /// a different header; [`HarnessError::Sink`] on I/O failure.
    pub fn open(path: &Path, stages: &StageSet) -> Result<Self> {
        let expected = header(stages);
        let existing = match fs::metadata(path) {
            Ok(meta) => meta.len() > 0,
            Err(_) => false,
        };

        if existing {
            let found = read_header(path)?;
            if found != expected {
                return Err(HarnessError::HeaderMismatch {
                    path: path.to_path_buf(),
                    expected: expected.join(","),
                    found: found.join(","),
                });
            }
        } else if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| HarnessError::sink(parent, e))?;
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|e| HarnessError::sink(path, e))?;
        let mut writer = csv::WriterBuilder::new().has_headers(false).from_writer(file);

        if !existing {
            writer
                .write_record(&expected)
                .and_then(|_| writer.flush().map_err(csv::Error::from))
                .map_err(|e| HarnessError::sink(path, e))?;
            debug!(path = %path.display(), "created result table");
        } else {
            info!(path = %path.display(), "appending to existing result table");
        }

        Ok(Self {
            path: path.to_path_buf(),
            writer,
        })
    }

    /// Table path.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn read_header(path: &Path) -> Result<Vec<String>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .map_err(|e| HarnessError::sink(path, e))?;
    match reader.records().next() {
        Some(Ok(record)) => Ok(record.iter().map(str::to_string).collect()),
        Some(Err(e)) => Err(HarnessError::sink(path, e)),
        None => Ok(Vec::new()),
    }
}

impl ResultSink for CsvSink {
    fn append(&mut self, run: &BenchmarkRun) -> Result<()> {
        self.writer
            .write_record(row(run))
            .map_err(|e| HarnessError::sink(&self.path, e))?;
        self.writer
            .flush()
            .map_err(|e| HarnessError::sink(&self.path, e))
    }

    fn finish(&mut self) -> Result<()> {
        self.writer
            .flush()
            .map_err(|e| HarnessError::sink(&self.path, e))
    }
}

/// Handle workers use to submit runs.
#[derive(Debug, Clone)]
pub struct RecordSender {
    tx: Sender<BenchmarkRun>,
}

impl RecordSender {
    /// Submits a run; returns `false` if the recorder has stopped.
    pub fn send(&self, run: BenchmarkRun) -> bool {
        self.tx.send(run).is_ok()
    }
}

/// The recorder thread.
pub struct Recorder {
    handle: JoinHandle<Result<ResultSet>>,
}

impl Recorder {
    /// Starts the recorder thread around `sink`.
    ///
    /// A sink failure trips `cancel` so no further runs start.
    pub fn spawn(sink: Box<dyn ResultSink>, cancel: CancelToken) -> Result<(Self, RecordSender)> {
        let (tx, rx) = mpsc::channel();
        let handle = thread::Builder::new()
            .name("pipesweep-recorder".to_string())
            .spawn(move || record_loop(sink, rx, cancel))
            .map_err(|e| HarnessError::config(format!("cannot start recorder thread: {}", e)))?;
        Ok((Self { handle }, RecordSender { tx }))
    }

    /// Waits until every sender is dropped and every received run is written.
    pub fn finish(self) -> Result<ResultSet> {
        self.handle
            .join()
            .map_err(|_| HarnessError::config("recorder thread panicked"))?
    }
}

fn record_loop(
    mut sink: Box<dyn ResultSink>,
    rx: Receiver<BenchmarkRun>,
    cancel: CancelToken,
) -> Result<ResultSet> {
    let mut results = ResultSet::new();
    for run in rx {
        if let Err(e) = sink.append(&run) {
            error!(error = %e, "result sink failed, stopping sweep");
            cancel.cancel();
            return Err(e);
        }
        debug!(corpus = %run.corpus_id, config = %run.config, "recorded run");
        results.push(run);
    }
    sink.finish()?;
    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::baseline::BaselineMeasurement;
    use pipesweep_corpus::Category;
    use tempfile::tempdir;

    fn sample_run(tag: &str) -> BenchmarkRun {
        BenchmarkRun {
            corpus_id: "binary_like/binary_00".to_string(),
            category: Category::BinaryLike,
            file: "binary_00.txt".to_string(),
            config: tag.parse().unwrap(),
            original_size: 1000,
            compressed_size: 250,
            compress_secs: 0.5,
            decompress_secs: Some(0.25),
            round_trip_verified: true,
            baseline: None,
        }
    }

    #[test]
    fn test_header_layout() {
        let h = header(&StageSet::default());
        assert_eq!(&h[..5], &["category", "file", "bwt", "mtf", "rle"]);
        assert_eq!(h[5], "original_size");
        assert_eq!(h.last().unwrap(), "baseline_decompress_secs");
        assert_eq!(h.len(), 2 + 3 + 6 + 5);
    }

    #[test]
    fn test_row_matches_header() {
        let mut run = sample_run("101");
        let fields = row(&run);
        assert_eq!(fields.len(), header(&StageSet::default()).len());
        assert_eq!(&fields[..5], &["binary_like", "binary_00.txt", "1", "0", "1"]);
        assert_eq!(fields[7], "0.250000");
        assert_eq!(fields[10], "true");
        assert!(fields[11..].iter().all(String::is_empty));

        run.baseline = Some(BaselineMeasurement {
            tool: "zip".to_string(),
            compressed_size: 400,
            compress_secs: 0.1,
            decompress_secs: 0.05,
        });
        let fields = row(&run);
        assert_eq!(fields[11], "zip");
        assert_eq!(fields[13], "0.400000");
    }

    #[test]
    fn test_new_table_gets_header_once() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("results.csv");
        let stages = StageSet::default();

        let mut sink = CsvSink::open(&path, &stages).unwrap();
        sink.append(&sample_run("000")).unwrap();
        drop(sink);

        let mut sink = CsvSink::open(&path, &stages).unwrap();
        sink.append(&sample_run("111")).unwrap();
        drop(sink);

        let text = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("category,file,bwt,mtf,rle,"));
        assert_eq!(text.matches("category,file").count(), 1);
    }

    #[test]
    fn test_header_mismatch_is_fatal() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("results.csv");
        fs::write(&path, "category,file,bwt,mtf,rle,original_size\n").unwrap();

        let result = CsvSink::open(&path, &StageSet::default());
        assert!(matches!(result, Err(HarnessError::HeaderMismatch { .. })));
    }

    #[test]
    fn test_empty_file_is_treated_as_new() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("results.csv");
        fs::write(&path, "").unwrap();
        CsvSink::open(&path, &StageSet::default()).unwrap();
        assert!(fs::read_to_string(&path).unwrap().starts_with("category,"));
    }

    #[test]
    fn test_recorder_collects_in_order() {
        let (recorder, sender) = Recorder::spawn(Box::new(NullSink), CancelToken::new()).unwrap();
        let worker = sender.clone();
        assert!(worker.send(sample_run("000")));
        assert!(sender.send(sample_run("111")));
        drop(worker);
        drop(sender);

        let results = recorder.finish().unwrap();
        let tags: Vec<String> = results.runs().iter().map(|r| r.config.tag()).collect();
        assert_eq!(tags, vec!["000", "111"]);
    }

    struct FailingSink;

    impl ResultSink for FailingSink {
        fn append(&mut self, _run: &BenchmarkRun) -> Result<()> {
            Err(HarnessError::sink("/dev/full", "disk full"))
        }
    }

    #[test]
    fn test_sink_failure_cancels() {
        let cancel = CancelToken::new();
        let (recorder, sender) = Recorder::spawn(Box::new(FailingSink), cancel.clone()).unwrap();
        sender.send(sample_run("000"));
        drop(sender);
        assert!(matches!(recorder.finish(), Err(HarnessError::Sink { .. })));
        assert!(cancel.is_cancelled());
    }
}
