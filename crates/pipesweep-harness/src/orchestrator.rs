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

//! Benchmark orchestrator.
//!
//! Drives the external compressor over every (corpus, configuration) pair on
//! a dedicated rayon pool. Every run is independent: a failed invocation,
//! missing output, timeout or round-trip mismatch removes only that run.
//! Successful runs go to the recorder thread; nothing else is shared between
//! workers except the cancel token.

use crate::baseline::BaselineMeasurement;
use crate::cancel::CancelToken;
use crate::compressor::{ArtifactPaths, Compressor};
use crate::config::SweepConfig;
use crate::error::{FailureKind, HarnessError, Result, RunFailure};
use crate::pipeline::PipelineConfig;
use crate::recorder::RecordSender;
use crate::run::BenchmarkRun;
use chrono::{DateTime, Utc};
use pipesweep_corpus::CorpusDescriptor;
use rayon::prelude::*;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs;
use std::time::Instant;
use tracing::{debug, error, info, warn};

/// Counters of one sweep.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SweepSummary {
    /// When the sweep started.
    pub started_at: DateTime<Utc>,
    /// Wall-clock duration in seconds.
    pub elapsed_secs: f64,
    /// Corpora visited.
    pub corpora: usize,
    /// Configurations per corpus.
    pub configs: usize,
    /// Runs started.
    pub attempted: usize,
    /// Runs handed to the recorder.
    pub recorded: usize,
    /// Runs never started because the sweep was cancelled.
    pub skipped: usize,
    /// Failed runs by kind.
    pub failures: BTreeMap<FailureKind, usize>,
    /// Baseline measurements that failed.
    pub baseline_failures: usize,
    /// Whether the sweep stopped early.
    pub cancelled: bool,
}

impl SweepSummary {
    /// Total failed runs.
    pub fn failed(&self) -> usize {
        self.failures.values().sum()
    }

    /// Failed runs of one kind.
    pub fn failures_of(&self, kind: FailureKind) -> usize {
        self.failures.get(&kind).copied().unwrap_or(0)
    }
}

#[derive(Debug, Default)]
struct Tally {
    attempted: usize,
    recorded: usize,
    skipped: usize,
    failures: BTreeMap<FailureKind, usize>,
    baseline_failures: usize,
}

impl Tally {
    fn merge(mut self, other: Tally) -> Tally {
        self.attempted += other.attempted;
        self.recorded += other.recorded;
        self.skipped += other.skipped;
        self.baseline_failures += other.baseline_failures;
        for (kind, count) in other.failures {
            *self.failures.entry(kind).or_default() += count;
        }
        self
    }
}

enum RunOutcome {
    Done(BenchmarkRun),
    Failed(FailureKind),
    Skipped,
}

/// Runs sweeps for one configuration.
pub struct Orchestrator {
    config: SweepConfig,
    compressor: Compressor,
    cancel: CancelToken,
}

impl Orchestrator {
    /// Validates `config` and prepares the work directory.
    pub fn new(config: SweepConfig, cancel: CancelToken) -> Result<Self> {
        config.validate()?;
        fs::create_dir_all(&config.work_dir)
            .map_err(|e| HarnessError::io_error(&config.work_dir, e))?;
        let compressor = Compressor::new(&config.compressor, config.timeout());
        Ok(Self {
            config,
            compressor,
            cancel,
        })
    }

    /// The sweep configuration.
    pub fn config(&self) -> &SweepConfig {
        &self.config
    }

    /// Runs every configuration against every corpus.
    ///
    /// Returns once all started runs have finished and been handed to
    /// `sender`. Per-run failures are counted, never returned.
    pub fn run_sweep(
        &self,
        corpora: &[CorpusDescriptor],
        configs: &[PipelineConfig],
        sender: RecordSender,
    ) -> Result<SweepSummary> {
        for config in configs {
            self.config.stages.check(config)?;
        }
        let configs = PipelineConfig::dedup(configs.iter().copied());

        let started_at = Utc::now();
        let started = Instant::now();
        let workers = self.config.worker_count();
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("pipesweep-worker-{}", i))
            .build()
            .map_err(|e| HarnessError::config(format!("cannot build worker pool: {}", e)))?;

        info!(
            corpora = corpora.len(),
            configs = configs.len(),
            workers,
            verify = self.config.verify_round_trip,
            baseline = ?self.config.baseline,
            "starting sweep"
        );

        let tally = pool.install(|| {
            corpora
                .par_iter()
                .map_with(sender, |sender, corpus| self.sweep_corpus(corpus, &configs, sender))
                .reduce(Tally::default, Tally::merge)
        });

        let summary = SweepSummary {
            started_at,
            elapsed_secs: started.elapsed().as_secs_f64(),
            corpora: corpora.len(),
            configs: configs.len(),
            attempted: tally.attempted,
            recorded: tally.recorded,
            skipped: tally.skipped,
            failures: tally.failures,
            baseline_failures: tally.baseline_failures,
            cancelled: self.cancel.is_cancelled(),
        };
        info!(
            attempted = summary.attempted,
            recorded = summary.recorded,
            failed = summary.failed(),
            skipped = summary.skipped,
            elapsed_secs = summary.elapsed_secs,
            "sweep finished"
        );
        Ok(summary)
    }

    /// All configurations of one corpus, with the baseline measured alongside.
    fn sweep_corpus(
        &self,
        corpus: &CorpusDescriptor,
        configs: &[PipelineConfig],
        sender: &mut RecordSender,
    ) -> Tally {
        let (baseline, outcomes) = rayon::join(
            || self.measure_baseline(corpus),
            || {
                configs
                    .par_iter()
                    .map(|config| self.run_one(corpus, config))
                    .collect::<Vec<_>>()
            },
        );

        let mut tally = Tally::default();
        let baseline = match baseline {
            Ok(measurement) => measurement,
            Err(failure) => {
                warn!(corpus = %corpus.id, error = %failure, "baseline failed");
                tally.baseline_failures += 1;
                None
            }
        };

        for outcome in outcomes {
            match outcome {
                RunOutcome::Done(run) => {
                    tally.attempted += 1;
                    if sender.send(run.with_baseline(baseline.clone())) {
                        tally.recorded += 1;
                    } else {
                        self.cancel.cancel();
                    }
                }
                RunOutcome::Failed(kind) => {
                    tally.attempted += 1;
                    *tally.failures.entry(kind).or_default() += 1;
                }
                RunOutcome::Skipped => tally.skipped += 1,
            }
        }
        tally
    }

    fn measure_baseline(
        &self,
        corpus: &CorpusDescriptor,
    ) -> std::result::Result<Option<BaselineMeasurement>, RunFailure> {
        match self.config.baseline {
            Some(tool) if !self.cancel.is_cancelled() => {
                let measurement = tool.measure(corpus, &self.config.work_dir, self.config.timeout())?;
                debug!(
                    corpus = %corpus.id,
                    tool = %tool,
                    size = measurement.compressed_size,
                    "baseline measured"
                );
                Ok(Some(measurement))
            }
            _ => Ok(None),
        }
    }

    fn run_one(&self, corpus: &CorpusDescriptor, config: &PipelineConfig) -> RunOutcome {
        if self.cancel.is_cancelled() {
            return RunOutcome::Skipped;
        }

        let artifacts = ArtifactPaths::new(&self.config.work_dir, corpus, config);
        let result = self.execute(corpus, config, &artifacts);
        if !self.config.keep_artifacts {
            artifacts.remove();
        }

        match result {
            Ok(run) => {
                debug!(
                    corpus = %corpus.id,
                    config = %config,
                    ratio = run.compression_ratio(),
                    "run succeeded"
                );
                RunOutcome::Done(run)
            }
            Err(failure) => {
                let kind = failure.kind();
                if kind == FailureKind::RoundTripMismatch {
                    error!(corpus = %corpus.id, config = %config, error = %failure, "round trip failed");
                } else {
                    warn!(corpus = %corpus.id, config = %config, kind = %kind, error = %failure, "run skipped");
                }
                RunOutcome::Failed(kind)
            }
        }
    }

    /// One compression, plus decompression and comparison when enabled.
    pub fn execute(
        &self,
        corpus: &CorpusDescriptor,
        config: &PipelineConfig,
        artifacts: &ArtifactPaths,
    ) -> std::result::Result<BenchmarkRun, RunFailure> {
        let compression = self.compressor.compress_once(corpus, config, artifacts)?;
        let run = BenchmarkRun::new(
            corpus,
            *config,
            compression.compressed_size,
            compression.elapsed.as_secs_f64(),
        );

        if !self.config.verify_round_trip {
            return Ok(run);
        }
        let elapsed = self.compressor.verify_round_trip(corpus, config, artifacts)?;
        Ok(run.with_round_trip(elapsed.as_secs_f64()))
    }
}
