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

//! Pipesweep sweep harness
//!
//! Drives an external compressor through every combination of optional
//! pipeline stages over a manifest of corpora, measuring compression ratio
//! and timing and checking round trips.
//!
//! ## Components
//!
//! - **Orchestrator**: enumerates (corpus, configuration) runs on a worker pool
//! - **Compressor contract**: `compressor <c|d> <in> <out> [toggles...]`
//! - **Baseline**: `zip` or in-process DEFLATE, once per corpus
//! - **Recorder**: single-writer, append-only CSV table
//!
//! ## Usage
//!
//! ```no_run
//! use pipesweep_harness::{execute_sweep, CancelToken, SweepConfig};
//!
//! let config = SweepConfig::new("./compressor")
//!     .with_corpora_dir("data")
//!     .with_round_trip(true);
//! let outcome = execute_sweep(&config, CancelToken::new())?;
//! println!("{} runs recorded", outcome.results.len());
//! # Ok::<(), pipesweep_harness::HarnessError>(())
//! ```

pub mod baseline;
pub mod cancel;
pub mod compressor;
pub mod config;
pub mod error;
pub mod orchestrator;
pub mod pipeline;
pub mod process;
pub mod recorder;
pub mod report;
pub mod results;
pub mod run;

pub use baseline::{BaselineMeasurement, BaselineTool};
pub use cancel::CancelToken;
pub use compressor::{ArtifactPaths, Compressor, Operation};
pub use config::SweepConfig;
pub use error::{FailureKind, HarnessError, Result, RunFailure};
pub use orchestrator::{Orchestrator, SweepSummary};
pub use pipeline::{PipelineConfig, StageSet};
pub use recorder::{CsvSink, NullSink, RecordSender, Recorder, ResultSink};
pub use results::ResultSet;
pub use run::{compression_ratio, BenchmarkRun};

use pipesweep_corpus::CorpusManifest;
use tracing::info;

/// Result of [`execute_sweep`].
#[derive(Debug, Clone)]
pub struct SweepOutcome {
    /// Sweep counters.
    pub summary: SweepSummary,
    /// Runs written to the result table, in recording order.
    pub results: ResultSet,
}

/// Loads the manifest, runs the sweep and records every successful run.
///
/// # Errors
///
/// Only fatal errors are returned: invalid configuration, unreadable
/// manifest, result table I/O or schema mismatch. Failed runs are counted in
/// the summary.
pub fn execute_sweep(config: &SweepConfig, cancel: CancelToken) -> Result<SweepOutcome> {
    let configs = config.resolved_configs()?;
    let orchestrator = Orchestrator::new(config.clone(), cancel.clone())?;
    let manifest = CorpusManifest::load(&config.corpora_dir)?;
    info!(
        corpora = manifest.len(),
        dir = %config.corpora_dir.display(),
        "loaded corpus manifest"
    );

    let sink = CsvSink::open(&config.results_path, &config.stages)?;
    let (recorder, sender) = Recorder::spawn(Box::new(sink), cancel)?;

    let swept = orchestrator.run_sweep(&manifest.corpora, &configs, sender);
    let recorded = recorder.finish();
    let summary = swept?;
    let results = recorded?;

    if let Some(path) = &config.json_path {
        results.export_json(path)?;
        info!(path = %path.display(), runs = results.len(), "exported results");
    }

    Ok(SweepOutcome { summary, results })
}
