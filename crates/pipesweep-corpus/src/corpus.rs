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

//! Corpus data model and the on-disk manifest.
//!
//! A [`Corpus`] is immutable once built: its bytes are validated as 7-bit
//! printable text at construction and only exposed by shared reference. The
//! [`CorpusDescriptor`] half carries everything the benchmark side needs
//! (identity, category, parameters, size, location) without the bytes, and
//! an ordered list of descriptors is persisted as a [`CorpusManifest`].

use crate::ascii::ensure_printable;
use crate::entropy::empirical_entropy;
use crate::error::{CorpusError, Result};
use crate::markup::MarkupSyntax;
use crate::uniform::Alphabet;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

/// Statistical regime a corpus belongs to; also its directory name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// Skewed-alphabet draws ordered by redundancy.
    Repetitiveness,
    /// Tiled text with increasing shuffle fraction.
    StructureRandomness,
    /// Log records at increasing counts.
    StructuredSize,
    /// Random walks over a word graph.
    MarkovText,
    /// Printable noise sized like the Markov corpora.
    RandomText,
    /// Uniform printable draws.
    MixedContent,
    /// Uniform `0`/`1` draws.
    BinaryLike,
    /// Uniform base64 draws.
    Base64Noise,
    /// JSON-lines records.
    JsonStructured,
    /// Tag-delimited records.
    XmlStructured,
}

impl Category {
    /// Directory (and CSV) name of the category.
    pub fn dir_name(&self) -> &'static str {
        match self {
            Self::Repetitiveness => "repetitiveness",
            Self::StructureRandomness => "structure_randomness",
            Self::StructuredSize => "structured_size",
            Self::MarkovText => "markov_text",
            Self::RandomText => "random_text",
            Self::MixedContent => "mixed_content",
            Self::BinaryLike => "binary_like",
            Self::Base64Noise => "base64_noise",
            Self::JsonStructured => "json_structured",
            Self::XmlStructured => "xml_structured",
        }
    }

    /// All categories in suite order.
    pub fn all() -> &'static [Category] {
        &[
            Self::Repetitiveness,
            Self::StructureRandomness,
            Self::StructuredSize,
            Self::MarkovText,
            Self::RandomText,
            Self::MixedContent,
            Self::BinaryLike,
            Self::Base64Noise,
            Self::JsonStructured,
            Self::XmlStructured,
        ]
    }

    /// Parses a directory name back into a category.
    pub fn from_dir_name(name: &str) -> Option<Self> {
        Self::all().iter().copied().find(|c| c.dir_name() == name)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.dir_name())
    }
}

/// Parameters that produced a corpus, one variant per generator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "generator", rename_all = "snake_case")]
pub enum CorpusParams {
    /// Skewed-alphabet draws.
    Skewed {
        /// Position in the skew family.
        level: usize,
        /// Mass of the designated character.
        skew: f64,
    },
    /// Shuffled tiled text.
    Shuffled {
        /// Position in the shuffle family.
        level: usize,
        /// Shuffle fraction.
        fraction: f64,
        /// Number of swaps performed.
        swaps: usize,
    },
    /// Log records.
    Records {
        /// Requested record count.
        requested: usize,
        /// Records actually emitted.
        emitted: usize,
        /// Whether the size cap stopped generation early.
        capped: bool,
        /// Size cap in bytes.
        max_bytes: usize,
    },
    /// Random walk over the word graph.
    Markov {
        /// Vocabulary size.
        vocab_size: usize,
        /// Out-degree of the word graph.
        successors: usize,
        /// Requested length in bytes.
        target_len: usize,
    },
    /// Uniform draws.
    Uniform {
        /// Alphabet drawn from.
        alphabet: Alphabet,
        /// Independent draw number.
        draw: usize,
    },
    /// Serialized records.
    Markup {
        /// Record syntax.
        syntax: MarkupSyntax,
        /// Independent draw number.
        draw: usize,
        /// Record count.
        records: usize,
    },
}

/// Everything known about a corpus except its bytes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorpusDescriptor {
    /// Unique identifier, `<category>/<stem>`.
    pub id: String,
    /// Category of the corpus.
    pub category: Category,
    /// File name inside the category directory.
    pub file_name: String,
    /// Generation parameters.
    pub params: CorpusParams,
    /// Length in bytes.
    pub len: u64,
    /// Entropy of the generating distribution, when one is defined.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theoretical_entropy: Option<f64>,
    /// Entropy of the emitted byte histogram.
    pub empirical_entropy: f64,
    /// Location on disk once written or loaded from a manifest.
    #[serde(skip)]
    pub path: Option<PathBuf>,
}

impl CorpusDescriptor {
    /// File name without extension.
    pub fn stem(&self) -> &str {
        self.file_name
            .rsplit_once('.')
            .map(|(stem, _)| stem)
            .unwrap_or(&self.file_name)
    }

    /// Path relative to the corpus root.
    pub fn relative_path(&self) -> PathBuf {
        Path::new(self.category.dir_name()).join(&self.file_name)
    }

    /// Identifier flattened into something usable inside a file name.
    pub fn artifact_stem(&self) -> String {
        self.id.replace(['/', '\\'], "__")
    }
}

/// An immutable, validated corpus.
#[derive(Debug, Clone, PartialEq)]
pub struct Corpus {
    descriptor: CorpusDescriptor,
    bytes: Vec<u8>,
}

impl Corpus {
    /// Builds a corpus, validating that every byte is printable ASCII.
    ///
    /// The identifier is derived from the category and file name; length and
    /// empirical entropy are measured on `bytes`.
    pub fn new(
        category: Category,
        file_name: impl Into<String>,
        params: CorpusParams,
        theoretical_entropy: Option<f64>,
        bytes: Vec<u8>,
    ) -> Result<Self> {
        let file_name = file_name.into();
        let stem = file_name
            .rsplit_once('.')
            .map(|(stem, _)| stem)
            .unwrap_or(&file_name);
        let id = format!("{}/{}", category.dir_name(), stem);
        ensure_printable(&id, &bytes)?;

        let descriptor = CorpusDescriptor {
            id,
            category,
            params,
            len: bytes.len() as u64,
            theoretical_entropy,
            empirical_entropy: empirical_entropy(&bytes),
            path: None,
            file_name,
        };
        Ok(Self { descriptor, bytes })
    }

    /// The corpus descriptor.
    pub fn descriptor(&self) -> &CorpusDescriptor {
        &self.descriptor
    }

    /// Identifier, `<category>/<stem>`.
    pub fn id(&self) -> &str {
        &self.descriptor.id
    }

    /// Corpus content.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Length in bytes.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Whether the corpus is empty.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Writes the corpus under `root/<category>/<file_name>`.
    ///
    /// Returns a descriptor whose `path` points at the written file.
    pub fn write_to(&self, root: &Path) -> Result<CorpusDescriptor> {
        let path = root.join(self.descriptor.relative_path());
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| CorpusError::io_error(parent, e))?;
        }
        fs::write(&path, &self.bytes).map_err(|e| CorpusError::io_error(&path, e))?;

        let mut descriptor = self.descriptor.clone();
        descriptor.path = Some(path);
        Ok(descriptor)
    }
}

/// Ordered list of the corpora produced by one generation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorpusManifest {
    /// Master seed of the run.
    pub seed: u64,
    /// When the corpora were generated.
    pub generated_at: DateTime<Utc>,
    /// Descriptors in generation order.
    pub corpora: Vec<CorpusDescriptor>,
}

impl CorpusManifest {
    /// File name of the manifest inside the corpus root.
    pub const FILE_NAME: &'static str = "manifest.json";

    /// Creates a manifest stamped with the current time.
    pub fn new(seed: u64, corpora: Vec<CorpusDescriptor>) -> Self {
        Self {
            seed,
            generated_at: Utc::now(),
            corpora,
        }
    }

    /// Writes `root/manifest.json`.
    pub fn save(&self, root: &Path) -> Result<PathBuf> {
        fs::create_dir_all(root).map_err(|e| CorpusError::io_error(root, e))?;
        let path = root.join(Self::FILE_NAME);
        let json = serde_json::to_string_pretty(self)?;
        fs::write(&path, json).map_err(|e| CorpusError::io_error(&path, e))?;
        Ok(path)
    }

    /// Reads `root/manifest.json`, resolving each corpus path against `root`.
    pub fn load(root: &Path) -> Result<Self> {
        let path = root.join(Self::FILE_NAME);
        let json = fs::read_to_string(&path).map_err(|e| CorpusError::io_error(&path, e))?;
        let mut manifest: Self = serde_json::from_str(&json)?;
        for descriptor in &mut manifest.corpora {
            descriptor.path = Some(root.join(descriptor.relative_path()));
        }
        Ok(manifest)
    }

    /// Descriptors of one category, in manifest order.
    pub fn by_category(&self, category: Category) -> impl Iterator<Item = &CorpusDescriptor> {
        self.corpora.iter().filter(move |d| d.category == category)
    }

    /// Number of corpora.
    pub fn len(&self) -> usize {
        self.corpora.len()
    }

    /// Whether the manifest lists no corpora.
    pub fn is_empty(&self) -> bool {
        self.corpora.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn sample() -> Corpus {
        Corpus::new(
            Category::BinaryLike,
            "binary_03.txt",
            CorpusParams::Uniform {
                alphabet: Alphabet::Binary,
                draw: 3,
            },
            Some(1.0),
            b"0110".to_vec(),
        )
        .unwrap()
    }

    #[test]
    fn test_corpus_identity() {
        let corpus = sample();
        assert_eq!(corpus.id(), "binary_like/binary_03");
        assert_eq!(corpus.descriptor().stem(), "binary_03");
        assert_eq!(corpus.descriptor().artifact_stem(), "binary_like__binary_03");
        assert_eq!(corpus.len(), 4);
        assert!((corpus.descriptor().empirical_entropy - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_rejects_control_bytes() {
        let result = Corpus::new(
            Category::MixedContent,
            "flat_00.txt",
            CorpusParams::Uniform {
                alphabet: Alphabet::Printable,
                draw: 0,
            },
            None,
            vec![b'a', 0x1b, b'b'],
        );
        assert!(matches!(
            result,
            Err(CorpusError::EncodingViolation { offset: 1, .. })
        ));
    }

    #[test]
    fn test_category_names_round_trip() {
        for category in Category::all() {
            assert_eq!(Category::from_dir_name(category.dir_name()), Some(*category));
        }
        assert_eq!(Category::from_dir_name("nope"), None);
    }

    #[test]
    fn test_manifest_save_and_load() {
        let dir = tempdir().unwrap();
        let written = sample().write_to(dir.path()).unwrap();
        assert_eq!(fs::read(written.path.as_ref().unwrap()).unwrap(), b"0110");

        let manifest = CorpusManifest::new(69, vec![written.clone()]);
        manifest.save(dir.path()).unwrap();

        let loaded = CorpusManifest::load(dir.path()).unwrap();
        assert_eq!(loaded.seed, 69);
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded.corpora[0].id, written.id);
        assert_eq!(loaded.corpora[0].path, written.path);
        assert_eq!(loaded.by_category(Category::BinaryLike).count(), 1);
        assert_eq!(loaded.by_category(Category::MarkovText).count(), 0);
    }

    #[test]
    fn test_params_serialize_tagged() {
        let json = serde_json::to_string(&CorpusParams::Skewed { level: 2, skew: 0.5 }).unwrap();
        assert!(json.contains("\"generator\":\"skewed\""));
    }
}
