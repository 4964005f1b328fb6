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

//! Corpus suite configuration.
//!
//! Mirrors the reference experiment matrix by default and offers a `small`
//! preset for tests and quick local runs.

use crate::corpus::Category;
use crate::error::{validate_corpus_len, CorpusError, Result};
use crate::markov::MarkovParams;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

/// Default master seed.
pub const DEFAULT_SEED: u64 = 69;

/// Default length of fixed-size corpora.
pub const DEFAULT_CHARS_PER_FILE: usize = 1_000_000;

/// Default number of members in the skew and shuffle families.
pub const DEFAULT_LEVELS: usize = 30;

/// Default number of independent draws per uniform or markup category.
pub const DEFAULT_DRAWS: usize = 30;

/// Default size cap of a record corpus (100 MiB).
pub const DEFAULT_MAX_RECORD_BYTES: usize = 100 * 1024 * 1024;

const MIB: usize = 1024 * 1024;

/// Configuration of one corpus generation run.
///
/// # Example
///
/// ```
/// use pipesweep_corpus::config::CorpusConfig;
///
/// let config = CorpusConfig::small().with_seed(7).with_levels(4);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CorpusConfig {
    /// Master seed; every corpus derives its own stream from it.
    pub seed: u64,
    /// Length of the skew, shuffle and uniform corpora.
    pub chars_per_file: usize,
    /// Members of the skew and shuffle families.
    pub levels: usize,
    /// Record counts run from `10^1` to `10^record_max_power`.
    pub record_max_power: u32,
    /// Size cap for a single record corpus.
    pub max_record_bytes: usize,
    /// Vocabulary and graph parameters of the Markov corpora.
    pub markov: MarkovParams,
    /// Target lengths of the Markov corpora (and their random-text pairs).
    pub markov_sizes: Vec<usize>,
    /// Independent draws per uniform or markup category.
    pub draws: usize,
    /// Records per markup corpus.
    pub markup_records: usize,
    /// Categories to generate, in suite order.
    pub categories: Vec<Category>,
}

impl Default for CorpusConfig {
    fn default() -> Self {
        Self::reference()
    }
}

impl CorpusConfig {
    /// The full reference matrix.
    pub fn reference() -> Self {
        Self {
            seed: DEFAULT_SEED,
            chars_per_file: DEFAULT_CHARS_PER_FILE,
            levels: DEFAULT_LEVELS,
            record_max_power: 7,
            max_record_bytes: DEFAULT_MAX_RECORD_BYTES,
            markov: MarkovParams::default(),
            markov_sizes: vec![MIB, 4 * MIB, 9 * MIB],
            draws: DEFAULT_DRAWS,
            markup_records: 10_000,
            categories: Category::all().to_vec(),
        }
    }

    /// A matrix small enough for tests: every category, a few kilobytes each.
    pub fn small() -> Self {
        Self {
            seed: DEFAULT_SEED,
            chars_per_file: 4_096,
            levels: 4,
            record_max_power: 3,
            max_record_bytes: 64 * 1024,
            markov: MarkovParams {
                vocab_size: 200,
                min_word_len: 3,
                max_word_len: 8,
                successors: 5,
            },
            markov_sizes: vec![2_048, 8_192],
            draws: 2,
            markup_records: 50,
            categories: Category::all().to_vec(),
        }
    }

    /// Sets the master seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Sets the length of fixed-size corpora.
    pub fn with_chars_per_file(mut self, chars: usize) -> Self {
        self.chars_per_file = chars;
        self
    }

    /// Sets the number of skew and shuffle levels.
    pub fn with_levels(mut self, levels: usize) -> Self {
        self.levels = levels;
        self
    }

    /// Sets the largest record-count exponent.
    pub fn with_record_max_power(mut self, power: u32) -> Self {
        self.record_max_power = power;
        self
    }

    /// Sets the record corpus size cap.
    pub fn with_max_record_bytes(mut self, bytes: usize) -> Self {
        self.max_record_bytes = bytes;
        self
    }

    /// Sets the Markov vocabulary parameters.
    pub fn with_markov(mut self, markov: MarkovParams) -> Self {
        self.markov = markov;
        self
    }

    /// Sets the Markov size series.
    pub fn with_markov_sizes(mut self, sizes: Vec<usize>) -> Self {
        self.markov_sizes = sizes;
        self
    }

    /// Sets the number of draws per uniform or markup category.
    pub fn with_draws(mut self, draws: usize) -> Self {
        self.draws = draws;
        self
    }

    /// Sets the number of records per markup corpus.
    pub fn with_markup_records(mut self, records: usize) -> Self {
        self.markup_records = records;
        self
    }

    /// Restricts generation to the given categories.
    pub fn with_categories(mut self, categories: &[Category]) -> Self {
        self.categories = categories.to_vec();
        self
    }

    /// Returns whether a category is selected.
    pub fn includes(&self, category: Category) -> bool {
        self.categories.contains(&category)
    }

    /// Checks every parameter before any corpus is produced.
    pub fn validate(&self) -> Result<()> {
        validate_corpus_len(self.chars_per_file)?;
        validate_corpus_len(self.max_record_bytes)?;
        let mut sizes = HashSet::new();
        for &size in &self.markov_sizes {
            validate_corpus_len(size)?;
            // Equal sizes map to the same file name.
            if !sizes.insert(size) {
                return Err(CorpusError::invalid(
                    "markov_sizes",
                    format!("size {} is listed more than once", size),
                ));
            }
        }
        let leveled =
            self.includes(Category::Repetitiveness) || self.includes(Category::StructureRandomness);
        if self.levels == 0 && leveled {
            return Err(CorpusError::invalid("levels", "must be at least 1"));
        }
        if self.record_max_power > 18 {
            return Err(CorpusError::invalid(
                "record_max_power",
                format!("10^{} records is not addressable", self.record_max_power),
            ));
        }
        if self.includes(Category::MarkovText) {
            self.markov.validate()?;
        }
        Ok(())
    }

    /// Loads a configuration from a JSON file; missing fields take reference values.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let json = fs::read_to_string(path).map_err(|e| CorpusError::io_error(path, e))?;
        let config: Self = serde_json::from_str(&json)?;
        config.validate()?;
        Ok(config)
    }
}
