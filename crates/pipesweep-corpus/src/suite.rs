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

//! Generation of the full corpus matrix.
//!
//! The matrix is first expanded into an ordered plan of jobs. Jobs run in
//! parallel on the rayon pool, but every corpus seeds its own generator from
//! the master seed and its identifier, so neither scheduling nor the selected
//! subset of categories changes any corpus's bytes. Results are collected in
//! plan order.

use crate::config::CorpusConfig;
use crate::corpus::{Category, Corpus, CorpusDescriptor, CorpusManifest, CorpusParams};
use crate::error::{CorpusError, Result};
use crate::markov::MarkovChain;
use crate::markup::{generate_markup, MarkupSyntax};
use crate::records::{generate_records, record_counts};
use crate::seed::stream_rng;
use crate::shuffle::{fraction_for_level, generate_shuffled, swap_count};
use crate::skewed::{generate_skewed, skew_entropy, skew_for_level};
use crate::uniform::{generate_uniform, Alphabet};
use rayon::prelude::*;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Stream name of the shared Markov vocabulary.
const VOCABULARY_STREAM: &str = "markov_text/vocabulary";

/// A corpus that could not be produced.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationFailure {
    /// Identifier of the corpus (or series) that failed.
    pub id: String,
    /// Why it failed.
    pub error: CorpusError,
}

/// Outcome of writing a suite to disk.
#[derive(Debug, Clone)]
pub struct SuiteReport {
    /// The manifest that was written.
    pub manifest: CorpusManifest,
    /// Corpora that could not be generated or written.
    pub failures: Vec<GenerationFailure>,
}

#[derive(Debug, Clone)]
enum Job {
    Skewed { level: usize },
    Shuffled { level: usize },
    RecordSeries,
    Markov { size: usize },
    RandomText { size: usize },
    Uniform { category: Category, alphabet: Alphabet, draw: usize },
    Markup { category: Category, syntax: MarkupSyntax, draw: usize },
}

fn uniform_file(alphabet: Alphabet, draw: usize) -> String {
    let prefix = match alphabet {
        Alphabet::Printable => "flat",
        Alphabet::Binary => "binary",
        Alphabet::Base64 => "base64",
    };
    format!("{}_{:02}.txt", prefix, draw)
}

fn markup_file(syntax: MarkupSyntax, draw: usize) -> String {
    let prefix = match syntax {
        MarkupSyntax::Json => "json",
        MarkupSyntax::Xml => "xml",
    };
    format!("{}_{:02}.txt", prefix, draw)
}

fn stream_id(category: Category, file_name: &str) -> String {
    let stem = file_name.strip_suffix(".txt").unwrap_or(file_name);
    format!("{}/{}", category.dir_name(), stem)
}

impl Job {
    /// Identifier used in logs and failure reports.
    fn label(&self, config: &CorpusConfig) -> String {
        match self {
            Job::RecordSeries => Category::StructuredSize.dir_name().to_string(),
            job => {
                let (category, file_name) = job.naming(config);
                stream_id(category, &file_name)
            }
        }
    }

    fn naming(&self, config: &CorpusConfig) -> (Category, String) {
        match *self {
            Job::Skewed { level } => (
                Category::Repetitiveness,
                format!("skew_{:02}_s{:.3}.txt", level, skew_for_level(level, config.levels)),
            ),
            Job::Shuffled { level } => (
                Category::StructureRandomness,
                format!(
                    "shuffle_{:02}_f{:.3}.txt",
                    level,
                    fraction_for_level(level, config.levels)
                ),
            ),
            Job::RecordSeries => (Category::StructuredSize, "records.txt".to_string()),
            Job::Markov { size } => (Category::MarkovText, format!("markov_{}.txt", size)),
            Job::RandomText { size } => (Category::RandomText, format!("random_{}.txt", size)),
            Job::Uniform {
                category,
                alphabet,
                draw,
            } => (category, uniform_file(alphabet, draw)),
            Job::Markup {
                category,
                syntax,
                draw,
            } => (category, markup_file(syntax, draw)),
        }
    }

    fn run(&self, config: &CorpusConfig, chain: Option<&MarkovChain>) -> Result<Vec<Corpus>> {
        match self {
            Job::RecordSeries => record_series(config),
            job => Ok(vec![job.single(config, chain)?]),
        }
    }

    fn single(&self, config: &CorpusConfig, chain: Option<&MarkovChain>) -> Result<Corpus> {
        let (category, file_name) = self.naming(config);
        let mut rng = stream_rng(config.seed, &stream_id(category, &file_name));
        let len = config.chars_per_file;

        let corpus = match *self {
            Job::Skewed { level } => {
                let skew = skew_for_level(level, config.levels);
                let bytes = generate_skewed(&mut rng, skew, len)?;
                Corpus::new(
                    category,
                    file_name,
                    CorpusParams::Skewed { level, skew },
                    Some(skew_entropy(skew)?),
                    bytes,
                )?
            }
            Job::Shuffled { level } => {
                let fraction = fraction_for_level(level, config.levels);
                let bytes = generate_shuffled(&mut rng, fraction, len)?;
                Corpus::new(
                    category,
                    file_name,
                    CorpusParams::Shuffled {
                        level,
                        fraction,
                        swaps: swap_count(fraction, len),
                    },
                    None,
                    bytes,
                )?
            }
            Job::Markov { size } => {
                let chain = chain.ok_or_else(|| {
                    CorpusError::invalid("markov", "vocabulary was not built")
                })?;
                let bytes = chain.generate(&mut rng, size)?;
                Corpus::new(
                    category,
                    file_name,
                    CorpusParams::Markov {
                        vocab_size: chain.params().vocab_size,
                        successors: chain.params().successors,
                        target_len: size,
                    },
                    None,
                    bytes,
                )?
            }
            Job::RandomText { size } => {
                let bytes = generate_uniform(&mut rng, Alphabet::Printable, size)?;
                Corpus::new(
                    category,
                    file_name,
                    CorpusParams::Uniform {
                        alphabet: Alphabet::Printable,
                        draw: 0,
                    },
                    Some(Alphabet::Printable.entropy()),
                    bytes,
                )?
            }
            Job::Uniform { alphabet, draw, .. } => {
                let bytes = generate_uniform(&mut rng, alphabet, len)?;
                Corpus::new(
                    category,
                    file_name,
                    CorpusParams::Uniform { alphabet, draw },
                    Some(alphabet.entropy()),
                    bytes,
                )?
            }
            Job::Markup { syntax, draw, .. } => {
                let records = config.markup_records;
                let bytes = generate_markup(&mut rng, syntax, records)?;
                Corpus::new(
                    category,
                    file_name,
                    CorpusParams::Markup {
                        syntax,
                        draw,
                        records,
                    },
                    None,
                    bytes,
                )?
            }
            Job::RecordSeries => {
                return Err(CorpusError::invalid("job", "record series yields several corpora"));
            }
        };

        Ok(corpus)
    }
}

/// Generates the record size series, stopping after the first capped count.
fn record_series(config: &CorpusConfig) -> Result<Vec<Corpus>> {
    let mut corpora = Vec::new();
    for count in record_counts(config.record_max_power) {
        let file_name = format!("records_{}.txt", count);
        let mut rng = stream_rng(config.seed, &stream_id(Category::StructuredSize, &file_name));
        let batch = generate_records(&mut rng, count, config.max_record_bytes)?;
        let capped = batch.capped;
        if capped {
            info!(
                requested = count,
                emitted = batch.emitted,
                max_bytes = config.max_record_bytes,
                "record corpus reached size cap"
            );
        }

        corpora.push(Corpus::new(
            Category::StructuredSize,
            file_name,
            CorpusParams::Records {
                requested: count,
                emitted: batch.emitted,
                capped,
                max_bytes: config.max_record_bytes,
            },
            None,
            batch.bytes,
        )?);

        if capped {
            break;
        }
    }
    Ok(corpora)
}

fn plan(config: &CorpusConfig) -> Vec<Job> {
    let mut jobs = Vec::new();
    for &category in &config.categories {
        match category {
            Category::Repetitiveness => {
                jobs.extend((0..config.levels).map(|level| Job::Skewed { level }));
            }
            Category::StructureRandomness => {
                jobs.extend((0..config.levels).map(|level| Job::Shuffled { level }));
            }
            Category::StructuredSize => jobs.push(Job::RecordSeries),
            Category::MarkovText => {
                jobs.extend(config.markov_sizes.iter().map(|&size| Job::Markov { size }));
            }
            Category::RandomText => {
                jobs.extend(config.markov_sizes.iter().map(|&size| Job::RandomText { size }));
            }
            Category::MixedContent | Category::BinaryLike | Category::Base64Noise => {
                let alphabet = match category {
                    Category::BinaryLike => Alphabet::Binary,
                    Category::Base64Noise => Alphabet::Base64,
                    _ => Alphabet::Printable,
                };
                jobs.extend((0..config.draws).map(|draw| Job::Uniform {
                    category,
                    alphabet,
                    draw,
                }));
            }
            Category::JsonStructured | Category::XmlStructured => {
                let syntax = if category == Category::JsonStructured {
                    MarkupSyntax::Json
                } else {
                    MarkupSyntax::Xml
                };
                jobs.extend((0..config.draws).map(|draw| Job::Markup {
                    category,
                    syntax,
                    draw,
                }));
            }
        }
    }
    jobs
}

/// An ordered, in-memory set of generated corpora.
#[derive(Debug, Clone)]
pub struct CorpusSuite {
    seed: u64,
    corpora: Vec<Corpus>,
    failures: Vec<GenerationFailure>,
}

impl CorpusSuite {
    /// Generates every corpus the configuration selects.
    ///
    /// # Errors
    ///
    /// Fails only when the configuration itself is invalid. Individual
    /// corpora that cannot be produced are reported by [`failures`](Self::failures).
    pub fn generate(config: &CorpusConfig) -> Result<Self> {
        config.validate()?;
        let started = Instant::now();

        let mut failures = Vec::new();
        let chain = if config.includes(Category::MarkovText) {
            let mut rng = stream_rng(config.seed, VOCABULARY_STREAM);
            match MarkovChain::build(&mut rng, &config.markov) {
                Ok(chain) => Some(chain),
                Err(error) => {
                    warn!(error = %error, "failed to build Markov vocabulary");
                    failures.push(GenerationFailure {
                        id: VOCABULARY_STREAM.to_string(),
                        error,
                    });
                    None
                }
            }
        } else {
            None
        };

        let jobs = plan(config);
        debug!(jobs = jobs.len(), seed = config.seed, "corpus plan expanded");

        let outcomes: Vec<(String, Result<Vec<Corpus>>)> = jobs
            .par_iter()
            .map(|job| (job.label(config), job.run(config, chain.as_ref())))
            .collect();

        let mut corpora = Vec::new();
        for (id, outcome) in outcomes {
            match outcome {
                Ok(generated) => {
                    for corpus in generated {
                        let d = corpus.descriptor();
                        info!(
                            corpus = %d.id,
                            bytes = d.len,
                            entropy = d.empirical_entropy,
                            "generated corpus"
                        );
                        corpora.push(corpus);
                    }
                }
                Err(error) => {
                    warn!(corpus = %id, error = %error, "corpus generation failed");
                    failures.push(GenerationFailure { id, error });
                }
            }
        }

        info!(
            corpora = corpora.len(),
            failures = failures.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "corpus suite generated"
        );

        Ok(Self {
            seed: config.seed,
            corpora,
            failures,
        })
    }

    /// Master seed the suite was generated with.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Generated corpora in plan order.
    pub fn corpora(&self) -> &[Corpus] {
        &self.corpora
    }

    /// Corpora that failed to generate.
    pub fn failures(&self) -> &[GenerationFailure] {
        &self.failures
    }

    /// Descriptors in plan order.
    pub fn descriptors(&self) -> Vec<CorpusDescriptor> {
        self.corpora.iter().map(|c| c.descriptor().clone()).collect()
    }

    /// Looks up a corpus by identifier.
    pub fn get(&self, id: &str) -> Option<&Corpus> {
        self.corpora.iter().find(|c| c.id() == id)
    }

    /// Writes every corpus under `root` and saves the manifest.
    ///
    /// A corpus that cannot be written is reported in
    /// [`SuiteReport::failures`] and left out of the manifest. Only a
    /// manifest that cannot be saved is an error.
    pub fn write_to(&self, root: &Path) -> Result<SuiteReport> {
        let written: Vec<Result<CorpusDescriptor>> = self
            .corpora
            .par_iter()
            .map(|corpus| corpus.write_to(root))
            .collect();

        let mut descriptors = Vec::with_capacity(written.len());
        let mut failures = self.failures.clone();
        for (corpus, result) in self.corpora.iter().zip(written) {
            match result {
                Ok(descriptor) => descriptors.push(descriptor),
                Err(error) => {
                    warn!(corpus = %corpus.id(), error = %error, "corpus could not be written");
                    failures.push(GenerationFailure {
                        id: corpus.id().to_string(),
                        error,
                    });
                }
            }
        }

        let manifest = CorpusManifest::new(self.seed, descriptors);
        let path = manifest.save(root)?;
        info!(path = %path.display(), corpora = manifest.len(), "manifest written");

        Ok(SuiteReport { manifest, failures })
    }
}
