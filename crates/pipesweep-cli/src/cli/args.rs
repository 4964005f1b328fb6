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

//! Shared argument groups.
//!
//! Flags are layered over a JSON configuration file when one is given: any
//! flag present on the command line replaces the file's value.

use crate::error::CliError;
use clap::{Args, ValueEnum};
use pipesweep_corpus::{Category, CorpusConfig};
use pipesweep_harness::{BaselineTool, PipelineConfig, StageSet, SweepConfig};
use std::path::PathBuf;

/// Corpus configuration preset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Preset {
    /// The full reference matrix (1,000,000 characters per file).
    Reference,
    /// A reduced matrix for quick runs and tests.
    Small,
}

/// Arguments of `pipesweep generate`.
#[derive(Debug, Clone, Args)]
pub struct GenerateArgs {
    /// Output directory for the corpora and manifest
    #[arg(short, long, value_name = "DIR", default_value = "data")]
    pub out: PathBuf,

    /// Master seed
    #[arg(long)]
    pub seed: Option<u64>,

    /// Characters per skew, shuffle and uniform corpus
    #[arg(long, value_name = "N")]
    pub chars: Option<usize>,

    /// Members of the skew and shuffle families
    #[arg(long, value_name = "N")]
    pub levels: Option<usize>,

    /// Draws per uniform and markup category
    #[arg(long, value_name = "N")]
    pub draws: Option<usize>,

    /// Restrict generation to these categories (comma separated)
    #[arg(long, value_delimiter = ',', value_name = "CATEGORY")]
    pub categories: Vec<String>,

    /// Starting preset
    #[arg(long, value_enum, default_value_t = Preset::Reference)]
    pub preset: Preset,

    /// JSON corpus configuration (replaces the preset)
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

impl GenerateArgs {
    /// Builds the corpus configuration: file or preset, then flag overrides.
    pub fn to_config(&self) -> Result<CorpusConfig, CliError> {
        let mut config = match (&self.config, self.preset) {
            (Some(path), _) => CorpusConfig::from_json_file(path)?,
            (None, Preset::Reference) => CorpusConfig::reference(),
            (None, Preset::Small) => CorpusConfig::small(),
        };
        if let Some(seed) = self.seed {
            config = config.with_seed(seed);
        }
        if let Some(chars) = self.chars {
            config = config.with_chars_per_file(chars);
        }
        if let Some(levels) = self.levels {
            config = config.with_levels(levels);
        }
        if let Some(draws) = self.draws {
            config = config.with_draws(draws);
        }
        if !self.categories.is_empty() {
            let categories = self
                .categories
                .iter()
                .map(|name| {
                    Category::from_dir_name(name.trim())
                        .ok_or_else(|| CliError::invalid_input(format!("unknown category '{}'", name)))
                })
                .collect::<Result<Vec<_>, _>>()?;
            config = config.with_categories(&categories);
        }
        config.validate()?;
        Ok(config)
    }
}

/// Arguments shared by `sweep`, `validate` and `compare`.
#[derive(Debug, Clone, Args)]
pub struct SweepArgs {
    /// Directory holding the corpora and manifest
    #[arg(long, value_name = "DIR")]
    pub corpora: Option<PathBuf>,

    /// Compressor binary honouring `<c|d> <in> <out> [toggles]`
    #[arg(long, value_name = "PATH")]
    pub compressor: Option<PathBuf>,

    /// Result table (appended to when it exists)
    #[arg(long, value_name = "FILE")]
    pub results: Option<PathBuf>,

    /// Toggled stage names, first is the most significant toggle
    #[arg(long, value_name = "NAMES")]
    pub stages: Option<String>,

    /// Explicit configurations such as 000,111 (default: all)
    #[arg(long = "config-bits", value_delimiter = ',', value_name = "BITS")]
    pub config_bits: Vec<String>,

    /// Worker count (default: available parallelism)
    #[arg(short, long, value_name = "N")]
    pub jobs: Option<usize>,

    /// Per-invocation timeout in seconds, 0 disables it
    #[arg(long, value_name = "SECS")]
    pub timeout_secs: Option<u64>,

    /// Directory for compressed and restored artifacts
    #[arg(long, value_name = "DIR")]
    pub work_dir: Option<PathBuf>,

    /// Keep artifacts after each run
    #[arg(long)]
    pub keep_artifacts: bool,

    /// Also export the recorded runs as JSON
    #[arg(long, value_name = "FILE")]
    pub json: Option<PathBuf>,

    /// JSON sweep configuration
    #[arg(long, value_name = "FILE")]
    pub sweep_config: Option<PathBuf>,
}

impl SweepArgs {
    /// Builds the sweep configuration: file or defaults, then flag overrides.
    pub fn to_config(&self) -> Result<SweepConfig, CliError> {
        let mut config = match &self.sweep_config {
            Some(path) => SweepConfig::from_json_file(path)?,
            None => {
                let compressor = self.compressor.clone().ok_or_else(|| {
                    CliError::invalid_input("--compressor is required without --sweep-config")
                })?;
                SweepConfig::new(compressor)
            }
        };

        if let Some(compressor) = &self.compressor {
            config = config.with_compressor(compressor);
        }
        if let Some(dir) = &self.corpora {
            config = config.with_corpora_dir(dir);
        }
        if let Some(path) = &self.results {
            config = config.with_results_path(path);
        }
        if let Some(stages) = &self.stages {
            config = config.with_stages(StageSet::parse(stages)?);
        }
        if !self.config_bits.is_empty() {
            let configs = self
                .config_bits
                .iter()
                .map(|bits| bits.parse::<PipelineConfig>())
                .collect::<Result<Vec<_>, _>>()?;
            config = config.with_configs(configs);
        }
        if let Some(jobs) = self.jobs {
            config = config.with_jobs(jobs);
        }
        if let Some(secs) = self.timeout_secs {
            config = config.with_timeout_secs(secs);
        }
        if let Some(dir) = &self.work_dir {
            config = config.with_work_dir(dir);
        }
        if self.keep_artifacts {
            config = config.with_keep_artifacts(true);
        }
        if let Some(path) = &self.json {
            config = config.with_json_path(path);
        }

        config.validate()?;
        Ok(config)
    }

    /// Configuration for `compare`: round trips on, and the baseline taken
    /// from `--baseline`, then the sweep configuration, then zip.
    pub fn to_compare_config(
        &self,
        baseline: Option<BaselineTool>,
    ) -> Result<SweepConfig, CliError> {
        let config = self.to_config()?.with_round_trip(true);
        let baseline = baseline.or(config.baseline).unwrap_or(BaselineTool::Zip);
        let config = config.with_baseline(baseline);
        config.validate()?;
        Ok(config)
    }
}

/// Parses `--baseline`.
pub fn parse_baseline(s: &str) -> Result<BaselineTool, String> {
    s.parse::<BaselineTool>().map_err(|e| e.to_string())
}
