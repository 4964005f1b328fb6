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

//! Suite-level tests: determinism, on-disk layout and manifest round trips.

use pipesweep_corpus::ascii::is_permitted;
use pipesweep_corpus::entropy::histogram;
use pipesweep_corpus::{
    tiled_base, Category, CorpusConfig, CorpusManifest, CorpusParams, CorpusSuite,
};
use std::fs;
use tempfile::TempDir;

fn quick() -> CorpusConfig {
    CorpusConfig::small()
}

#[test]
fn test_same_seed_same_bytes() {
    let first = CorpusSuite::generate(&quick()).unwrap();
    let second = CorpusSuite::generate(&quick()).unwrap();
    assert_eq!(first.corpora().len(), second.corpora().len());
    for (a, b) in first.corpora().iter().zip(second.corpora()) {
        assert_eq!(a.id(), b.id());
        assert_eq!(a.bytes(), b.bytes(), "{} differs between runs", a.id());
    }
}

#[test]
fn test_different_seed_different_bytes() {
    let first = CorpusSuite::generate(&quick()).unwrap();
    let second = CorpusSuite::generate(&quick().with_seed(70)).unwrap();
    let id = "mixed_content/flat_00";
    assert_ne!(first.get(id).unwrap().bytes(), second.get(id).unwrap().bytes());
}

#[test]
fn test_every_corpus_is_printable() {
    let suite = CorpusSuite::generate(&quick()).unwrap();
    assert!(suite.failures().is_empty());
    for corpus in suite.corpora() {
        assert!(
            corpus.bytes().iter().all(|&b| is_permitted(b)),
            "{} contains a non-printable byte",
            corpus.id()
        );
    }
}

#[test]
fn test_ids_are_unique() {
    let suite = CorpusSuite::generate(&quick()).unwrap();
    let mut ids: Vec<&str> = suite.corpora().iter().map(|c| c.id()).collect();
    let total = ids.len();
    ids.sort_unstable();
    ids.dedup();
    assert_eq!(ids.len(), total);
}

#[test]
fn test_shuffle_extremes() {
    let config = quick()
        .with_chars_per_file(20_000)
        .with_categories(&[Category::StructureRandomness]);
    let suite = CorpusSuite::generate(&config).unwrap();
    let corpora = suite.corpora();
    assert_eq!(corpora.len(), config.levels);

    let base = tiled_base(20_000);
    assert_eq!(corpora[0].bytes(), base.as_slice());

    let last = corpora.last().unwrap();
    assert!(matches!(
        last.descriptor().params,
        CorpusParams::Shuffled { fraction, swaps: 20_000, .. } if fraction == 1.0
    ));
    assert_ne!(last.bytes(), base.as_slice());
    assert_eq!(histogram(last.bytes()), histogram(&base));
}

#[test]
fn test_skew_family_lowers_entropy() {
    let config = quick()
        .with_chars_per_file(50_000)
        .with_categories(&[Category::Repetitiveness]);
    let suite = CorpusSuite::generate(&config).unwrap();
    let entropies: Vec<f64> = suite
        .corpora()
        .iter()
        .map(|c| c.descriptor().empirical_entropy)
        .collect();
    for pair in entropies.windows(2) {
        assert!(pair[0] > pair[1], "entropy not decreasing: {:?}", entropies);
    }
    for corpus in suite.corpora() {
        let d = corpus.descriptor();
        let theoretical = d.theoretical_entropy.unwrap();
        assert!((theoretical - d.empirical_entropy).abs() < 0.05);
    }
}

#[test]
fn test_write_and_load_manifest() {
    let dir = TempDir::new().unwrap();
    let suite = CorpusSuite::generate(&quick()).unwrap();
    let report = suite.write_to(dir.path()).unwrap();
    assert!(report.failures.is_empty());
    assert_eq!(report.manifest.len(), suite.corpora().len());

    for category in Category::all() {
        assert!(dir.path().join(category.dir_name()).is_dir(), "missing {}", category);
    }
    assert!(dir.path().join("repetitiveness").join("skew_00_s0.020.txt").is_file());
    assert!(dir.path().join("structured_size").join("records_10.txt").is_file());
    assert!(dir.path().join("xml_structured").join("xml_01.txt").is_file());

    let loaded = CorpusManifest::load(dir.path()).unwrap();
    assert_eq!(loaded.seed, 69);
    assert_eq!(loaded.corpora.len(), suite.corpora().len());
    for (descriptor, corpus) in loaded.corpora.iter().zip(suite.corpora()) {
        assert_eq!(descriptor.id, corpus.id());
        let on_disk = fs::read(descriptor.path.as_ref().unwrap()).unwrap();
        assert_eq!(on_disk, corpus.bytes());
        assert_eq!(descriptor.len, on_disk.len() as u64);
    }
}

#[test]
fn test_invalid_config_is_rejected() {
    let config = quick().with_levels(0);
    assert!(CorpusSuite::generate(&config).is_err());
}

#[test]
fn test_unwritable_corpus_is_reported_and_skipped() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("binary_like"), b"not a directory").unwrap();

    let config = quick().with_categories(&[Category::Repetitiveness, Category::BinaryLike]);
    let suite = CorpusSuite::generate(&config).unwrap();
    let blocked = suite
        .corpora()
        .iter()
        .filter(|c| c.descriptor().category == Category::BinaryLike)
        .count();
    assert!(blocked > 0);

    let report = suite.write_to(dir.path()).unwrap();
    assert_eq!(report.failures.len(), blocked);
    assert!(report.failures.iter().all(|f| f.id.starts_with("binary_like/")));
    assert_eq!(report.manifest.len(), suite.corpora().len() - blocked);
    assert_eq!(report.manifest.by_category(Category::BinaryLike).count(), 0);

    let loaded = CorpusManifest::load(dir.path()).unwrap();
    assert_eq!(loaded.corpora.len(), report.manifest.len());
}
