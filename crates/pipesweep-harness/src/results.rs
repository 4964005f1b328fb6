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

//! In-memory result collection and aggregation.

use crate::error::{HarnessError, Result};
use crate::pipeline::PipelineConfig;
use crate::run::BenchmarkRun;
use pipesweep_corpus::Category;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Ordered, append-only sequence of recorded runs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultSet {
    runs: Vec<BenchmarkRun>,
}

/// Mean figures for one (category, configuration) cell.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategorySummary {
    /// Corpus category.
    pub category: Category,
    /// Pipeline configuration.
    pub config: PipelineConfig,
    /// Number of runs aggregated.
    pub runs: usize,
    /// Mean compression ratio.
    pub mean_ratio: f64,
    /// Mean compression time in seconds.
    pub mean_compress_secs: f64,
    /// Mean baseline ratio, when every run carried one.
    pub mean_baseline_ratio: Option<f64>,
}

impl ResultSet {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a run.
    pub fn push(&mut self, run: BenchmarkRun) {
        self.runs.push(run);
    }

    /// Runs in recording order.
    pub fn runs(&self) -> &[BenchmarkRun] {
        &self.runs
    }

    /// Number of runs.
    pub fn len(&self) -> usize {
        self.runs.len()
    }

    /// Whether no run was recorded.
    pub fn is_empty(&self) -> bool {
        self.runs.is_empty()
    }

    /// Runs for one corpus.
    pub fn for_corpus<'a>(&'a self, corpus_id: &'a str) -> impl Iterator<Item = &'a BenchmarkRun> {
        self.runs.iter().filter(move |r| r.corpus_id == corpus_id)
    }

    /// Per-category means, ordered by category then configuration.
    pub fn summarize(&self) -> Vec<CategorySummary> {
        let mut cells: BTreeMap<(Category, PipelineConfig), Vec<&BenchmarkRun>> = BTreeMap::new();
        for run in &self.runs {
            cells.entry((run.category, run.config)).or_default().push(run);
        }

        cells
            .into_iter()
            .map(|((category, config), runs)| {
                let n = runs.len() as f64;
                let baseline: Option<Vec<f64>> = runs.iter().map(|r| r.baseline_ratio()).collect();
                CategorySummary {
                    category,
                    config,
                    runs: runs.len(),
                    mean_ratio: runs.iter().map(|r| r.compression_ratio()).sum::<f64>() / n,
                    mean_compress_secs: runs.iter().map(|r| r.compress_secs).sum::<f64>() / n,
                    mean_baseline_ratio: baseline.map(|b| b.iter().sum::<f64>() / n),
                }
            })
            .collect()
    }

    /// Writes the runs as pretty JSON.
    pub fn export_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(&self.runs)
            .map_err(|e| HarnessError::sink(path, e))?;
        fs::write(path, json).map_err(|e| HarnessError::sink(path, e))
    }

    /// Reads runs written by [`export_json`](Self::export_json).
    pub fn import_json(path: &Path) -> Result<Self> {
        let json = fs::read_to_string(path).map_err(|e| HarnessError::io_error(path, e))?;
        let runs = serde_json::from_str(&json).map_err(|e| HarnessError::sink(path, e))?;
        Ok(Self { runs })
    }
}

impl FromIterator<BenchmarkRun> for ResultSet {
    fn from_iter<I: IntoIterator<Item = BenchmarkRun>>(iter: I) -> Self {
        Self {
            runs: iter.into_iter().collect(),
        }
    }
}
