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

//! One recorded (corpus, configuration) measurement.

use crate::baseline::BaselineMeasurement;
use crate::pipeline::PipelineConfig;
use pipesweep_corpus::{Category, CorpusDescriptor};
use serde::{Deserialize, Serialize};

/// `compressed / original`, or 0 when the original is empty.
#[inline]
pub fn compression_ratio(compressed_size: u64, original_size: u64) -> f64 {
    if original_size == 0 {
        0.0
    } else {
        compressed_size as f64 / original_size as f64
    }
}

/// A successful run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkRun {
    /// Corpus identifier.
    pub corpus_id: String,
    /// Corpus category.
    pub category: Category,
    /// Corpus file name.
    pub file: String,
    /// Stage toggles used.
    pub config: PipelineConfig,
    /// Corpus size in bytes.
    pub original_size: u64,
    /// Compressed artifact size in bytes.
    pub compressed_size: u64,
    /// Compression wall-clock time in seconds.
    pub compress_secs: f64,
    /// Decompression time, when the round trip was checked.
    pub decompress_secs: Option<f64>,
    /// Whether decompression reproduced the corpus exactly.
    pub round_trip_verified: bool,
    /// Baseline measurement of the same corpus.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub baseline: Option<BaselineMeasurement>,
}

impl BenchmarkRun {
    /// Starts a record for a compressed corpus.
    pub fn new(
        corpus: &CorpusDescriptor,
        config: PipelineConfig,
        compressed_size: u64,
        compress_secs: f64,
    ) -> Self {
        Self {
            corpus_id: corpus.id.clone(),
            category: corpus.category,
            file: corpus.file_name.clone(),
            config,
            original_size: corpus.len,
            compressed_size,
            compress_secs,
            decompress_secs: None,
            round_trip_verified: false,
            baseline: None,
        }
    }

    /// Marks the run as round-trip verified.
    pub fn with_round_trip(mut self, decompress_secs: f64) -> Self {
        self.decompress_secs = Some(decompress_secs);
        self.round_trip_verified = true;
        self
    }

    /// Attaches a baseline measurement.
    pub fn with_baseline(mut self, baseline: Option<BaselineMeasurement>) -> Self {
        self.baseline = baseline;
        self
    }

    /// `compressed_size / original_size`.
    pub fn compression_ratio(&self) -> f64 {
        compression_ratio(self.compressed_size, self.original_size)
    }

    /// Baseline ratio for the same corpus, when measured.
    pub fn baseline_ratio(&self) -> Option<f64> {
        self.baseline.as_ref().map(|b| b.ratio(self.original_size))
    }
}
