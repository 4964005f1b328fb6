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

//! Sweep configuration.
//!
//! Provides the settings of one sweep: which compressor to drive, over which
//! corpora and configurations, with how many workers, and where results go.

use crate::baseline::BaselineTool;
use crate::error::{HarnessError, Result};
use crate::pipeline::{PipelineConfig, StageSet};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

/// Default per-invocation timeout.
pub const DEFAULT_TIMEOUT_SECS: u64 = 300;

/// Default corpus directory.
pub const DEFAULT_CORPORA_DIR: &str = "data";

/// Default result table.
pub const DEFAULT_RESULTS_PATH: &str = "results.csv";

/// Configuration of one sweep.
///
/// # Example
///
/// ```no_run
/// use pipesweep_harness::config::SweepConfig;
///
/// let config = SweepConfig::new("./compressor")
///     .with_corpora_dir("data")
///     .with_jobs(4)
///     .with_round_trip(true);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SweepConfig {
    /// Compressor binary.
    pub compressor: PathBuf,
    /// Directory holding the corpora and their manifest.
    pub corpora_dir: PathBuf,
    /// Names of the toggled stages.
    pub stages: StageSet,
    /// Explicit configurations; the full product when absent.
    pub configs: Option<Vec<PipelineConfig>>,
    /// Worker count; available parallelism when absent.
    pub jobs: Option<usize>,
    /// Per-invocation timeout in seconds; 0 disables it.
    pub timeout_secs: u64,
    /// Directory for compressed and restored artifacts.
    pub work_dir: PathBuf,
    /// Keep artifacts after each run.
    pub keep_artifacts: bool,
    /// Decompress and compare every compressed artifact.
    pub verify_round_trip: bool,
    /// Baseline tool measured once per corpus.
    pub baseline: Option<BaselineTool>,
    /// Result table path.
    pub results_path: PathBuf,
    /// Optional JSON export of the recorded runs.
    pub json_path: Option<PathBuf>,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self::new("compressor")
    }
}

impl SweepConfig {
    /// Creates a configuration for `compressor` with default settings.
    pub fn new(compressor: impl Into<PathBuf>) -> Self {
        Self {
            compressor: compressor.into(),
            corpora_dir: PathBuf::from(DEFAULT_CORPORA_DIR),
            stages: StageSet::default(),
            configs: None,
            jobs: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            work_dir: std::env::temp_dir().join("pipesweep"),
            keep_artifacts: false,
            verify_round_trip: false,
            baseline: None,
            results_path: PathBuf::from(DEFAULT_RESULTS_PATH),
            json_path: None,
        }
    }

    /// Sets the compressor binary.
    pub fn with_compressor(mut self, compressor: impl Into<PathBuf>) -> Self {
        self.compressor = compressor.into();
        self
    }

    /// Sets the corpus directory.
    pub fn with_corpora_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.corpora_dir = dir.into();
        self
    }

    /// Sets the stage names.
    pub fn with_stages(mut self, stages: StageSet) -> Self {
        self.stages = stages;
        self
    }

    /// Restricts the sweep to explicit configurations.
    pub fn with_configs(mut self, configs: Vec<PipelineConfig>) -> Self {
        self.configs = Some(configs);
        self
    }

    /// Sets the worker count.
    pub fn with_jobs(mut self, jobs: usize) -> Self {
        self.jobs = Some(jobs);
        self
    }

    /// Sets the per-invocation timeout in seconds (0 disables it).
    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    /// Sets the artifact directory.
    pub fn with_work_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.work_dir = dir.into();
        self
    }

    /// Keeps artifacts after each run.
    pub fn with_keep_artifacts(mut self, keep: bool) -> Self {
        self.keep_artifacts = keep;
        self
    }

    /// Enables round-trip verification.
    pub fn with_round_trip(mut self, verify: bool) -> Self {
        self.verify_round_trip = verify;
        self
    }

    /// Enables a baseline tool.
    pub fn with_baseline(mut self, tool: BaselineTool) -> Self {
        self.baseline = Some(tool);
        self
    }

    /// Sets the result table path.
    pub fn with_results_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.results_path = path.into();
        self
    }

    /// Sets the JSON export path.
    pub fn with_json_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.json_path = Some(path.into());
        self
    }

    /// Invocation timeout, `None` when disabled.
    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs))
    }

    /// Effective worker count.
    pub fn worker_count(&self) -> usize {
        self.jobs
            .filter(|&j| j > 0)
            .unwrap_or_else(|| thread::available_parallelism().map(|n| n.get()).unwrap_or(1))
    }

    /// Configurations to visit, deduplicated in order of first appearance.
    pub fn resolved_configs(&self) -> Result<Vec<PipelineConfig>> {
        let configs = match &self.configs {
            Some(configs) => {
                for config in configs {
                    self.stages.check(config)?;
                }
                PipelineConfig::dedup(configs.iter().copied())
            }
            None => PipelineConfig::all(self.stages.len())?,
        };
        if configs.is_empty() {
            return Err(HarnessError::config("no pipeline configurations selected"));
        }
        Ok(configs)
    }

    /// Checks the configuration before any work starts.
    pub fn validate(&self) -> Result<()> {
        if self.compressor.as_os_str().is_empty() {
            return Err(HarnessError::config("compressor path is empty"));
        }
        if self.jobs == Some(0) {
            return Err(HarnessError::config("jobs must be at least 1"));
        }
        if let Some(BaselineTool::Deflate { level }) = self.baseline {
            if level > 9 {
                return Err(HarnessError::config(format!(
                    "deflate level must be 0..=9, got {}",
                    level
                )));
            }
        }
        self.resolved_configs()?;
        Ok(())
    }

    /// Loads a configuration from a JSON file; missing fields take defaults.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let json = fs::read_to_string(path).map_err(|e| HarnessError::io_error(path, e))?;
        serde_json::from_str(&json)
            .map_err(|e| HarnessError::config(format!("{}: {}", path.display(), e)))
    }
}
