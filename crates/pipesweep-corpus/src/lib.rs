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

//! Pipesweep corpus generator
//!
//! Deterministic synthetic text corpora with tunable entropy, structure,
//! vocabulary and size, used to exercise compression pipelines under
//! controlled statistical conditions.
//!
//! ## Families
//!
//! - **Skewed alphabet**: one character carries mass `s`, the rest is uniform
//! - **Structural randomness**: tiled prose degraded by pairwise swaps
//! - **Structured records**: access-log lines at increasing counts
//! - **Markov text**: random walks over a random word graph
//! - **Uniform noise**: printable, binary and base64 alphabets
//! - **Markup**: JSON lines and tag-delimited records
//!
//! ## Usage
//!
//! ```no_run
//! use pipesweep_corpus::{CorpusConfig, CorpusSuite};
//! use std::path::Path;
//!
//! let suite = CorpusSuite::generate(&CorpusConfig::reference())?;
//! let report = suite.write_to(Path::new("data"))?;
//! println!("{} corpora", report.manifest.len());
//! # Ok::<(), pipesweep_corpus::CorpusError>(())
//! ```

pub mod ascii;
pub mod config;
pub mod corpus;
pub mod entropy;
pub mod error;
pub mod markov;
pub mod markup;
pub mod records;
pub mod seed;
pub mod shuffle;
pub mod skewed;
pub mod suite;
pub mod uniform;

pub use config::CorpusConfig;
pub use corpus::{Category, Corpus, CorpusDescriptor, CorpusManifest, CorpusParams};
pub use entropy::{empirical_entropy, shannon_entropy};
pub use error::{validate_corpus_len, CorpusError, Result, MAX_CORPUS_BYTES};
pub use markov::{MarkovChain, MarkovParams};
pub use markup::{generate_markup, MarkupSyntax};
pub use records::{generate_records, RecordBatch};
pub use seed::{derive_seed, stream_rng};
pub use shuffle::{generate_shuffled, tiled_base};
pub use skewed::{generate_skewed, skew_entropy};
pub use suite::{CorpusSuite, GenerationFailure, SuiteReport};
pub use uniform::{generate_uniform, Alphabet};
