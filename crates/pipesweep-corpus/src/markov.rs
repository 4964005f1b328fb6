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

//! Markov/vocabulary generator.
//!
//! Builds a vocabulary of random lowercase words and a random directed graph
//! over it where every word has the same number of successors. Text is a
//! random walk on that graph, which yields word-level structure (repeated
//! tokens, constrained transitions) with no natural-language semantics.

use crate::error::{validate_corpus_len, CorpusError, Result};
use rand::seq::index;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Parameters of the vocabulary and its successor graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkovParams {
    /// Number of distinct words.
    pub vocab_size: usize,
    /// Shortest word length (inclusive).
    pub min_word_len: usize,
    /// Longest word length (inclusive).
    pub max_word_len: usize,
    /// Out-degree of every word in the successor graph.
    pub successors: usize,
}

impl Default for MarkovParams {
    fn default() -> Self {
        Self {
            vocab_size: 10_000,
            min_word_len: 5,
            max_word_len: 10,
            successors: 10,
        }
    }
}

impl MarkovParams {
    /// Checks that a vocabulary with these parameters can be built.
    pub fn validate(&self) -> Result<()> {
        if self.vocab_size < 2 {
            return Err(CorpusError::invalid("vocab_size", "must be at least 2"));
        }
        if self.min_word_len == 0 || self.min_word_len > self.max_word_len {
            return Err(CorpusError::invalid(
                "word_len",
                format!(
                    "need 1 <= min <= max, got {}..={}",
                    self.min_word_len, self.max_word_len
                ),
            ));
        }
        if self.successors == 0 || self.successors >= self.vocab_size {
            return Err(CorpusError::invalid(
                "successors",
                format!(
                    "must be within 1..{} for a vocabulary of {}",
                    self.vocab_size, self.vocab_size
                ),
            ));
        }
        if word_space(self.min_word_len, self.max_word_len) < self.vocab_size {
            return Err(CorpusError::invalid(
                "vocab_size",
                format!(
                    "{} distinct words do not fit in lengths {}..={}",
                    self.vocab_size, self.min_word_len, self.max_word_len
                ),
            ));
        }
        Ok(())
    }
}

/// Number of distinct lowercase words with lengths in `min..=max`, saturating.
fn word_space(min: usize, max: usize) -> usize {
    (min..=max)
        .map(|len| 26usize.checked_pow(len as u32).unwrap_or(usize::MAX))
        .fold(0usize, usize::saturating_add)
}

/// A vocabulary plus its successor graph.
///
/// Words are kept in insertion order and successors as indices, so the chain
/// built from a given generator state is always identical.
#[derive(Debug, Clone)]
pub struct MarkovChain {
    words: Vec<String>,
    successors: Vec<Vec<usize>>,
    params: MarkovParams,
}

impl MarkovChain {
    /// Builds a vocabulary and successor table from `rng`.
    pub fn build<R: Rng + ?Sized>(rng: &mut R, params: &MarkovParams) -> Result<Self> {
        params.validate()?;

        let mut seen = HashSet::with_capacity(params.vocab_size);
        let mut words = Vec::with_capacity(params.vocab_size);
        while words.len() < params.vocab_size {
            let len = rng.gen_range(params.min_word_len..=params.max_word_len);
            let word: String = (0..len)
                .map(|_| char::from(b'a' + rng.gen_range(0..26u8)))
                .collect();
            if seen.insert(word.clone()) {
                words.push(word);
            }
        }

        // Sample among the other V-1 words, then shift past the word itself.
        let successors = (0..words.len())
            .map(|own| {
                index::sample(rng, words.len() - 1, params.successors)
                    .into_iter()
                    .map(|i| if i >= own { i + 1 } else { i })
                    .collect()
            })
            .collect();

        Ok(Self {
            words,
            successors,
            params: params.clone(),
        })
    }

    /// The vocabulary, in insertion order.
    pub fn words(&self) -> &[String] {
        &self.words
    }

    /// Successor indices of the word at `index`.
    pub fn successors_of(&self, index: usize) -> &[usize] {
        &self.successors[index]
    }

    /// Parameters the chain was built with.
    pub fn params(&self) -> &MarkovParams {
        &self.params
    }

    /// Generates text by a random walk until at least `target_len` bytes exist.
    ///
    /// Words are separated by a single space. The result overshoots the target
    /// by less than one separator plus one word.
    pub fn generate<R: Rng + ?Sized>(&self, rng: &mut R, target_len: usize) -> Result<Vec<u8>> {
        validate_corpus_len(target_len)?;
        let mut out = Vec::with_capacity(target_len + self.params.max_word_len + 1);
        if target_len == 0 {
            return Ok(out);
        }

        let mut current = rng.gen_range(0..self.words.len());
        loop {
            if !out.is_empty() {
                out.push(b' ');
            }
            out.extend_from_slice(self.words[current].as_bytes());
            if out.len() >= target_len {
                break;
            }
            let next = &self.successors[current];
            current = next[rng.gen_range(0..next.len())];
        }

        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn small_params() -> MarkovParams {
        MarkovParams {
            vocab_size: 200,
            min_word_len: 3,
            max_word_len: 6,
            successors: 5,
        }
    }

    #[test]
    fn test_vocabulary_is_unique_and_lowercase() {
        let mut rng = StdRng::seed_from_u64(69);
        let chain = MarkovChain::build(&mut rng, &small_params()).unwrap();
        assert_eq!(chain.words().len(), 200);

        let unique: HashSet<&String> = chain.words().iter().collect();
        assert_eq!(unique.len(), 200);
        for word in chain.words() {
            assert!((3..=6).contains(&word.len()));
            assert!(word.bytes().all(|b| b.is_ascii_lowercase()));
        }
    }

    #[test]
    fn test_successors_exclude_self() {
        let mut rng = StdRng::seed_from_u64(69);
        let chain = MarkovChain::build(&mut rng, &small_params()).unwrap();
        for i in 0..chain.words().len() {
            let succ = chain.successors_of(i);
            assert_eq!(succ.len(), 5);
            assert!(!succ.contains(&i));
            let distinct: HashSet<&usize> = succ.iter().collect();
            assert_eq!(distinct.len(), 5);
            assert!(succ.iter().all(|&s| s < chain.words().len()));
        }
    }

    #[test]
    fn test_walk_follows_graph() {
        let mut rng = StdRng::seed_from_u64(69);
        let chain = MarkovChain::build(&mut rng, &small_params()).unwrap();
        let text = chain.generate(&mut rng, 5_000).unwrap();
        let text = String::from_utf8(text).unwrap();

        let position: std::collections::HashMap<&str, usize> = chain
            .words()
            .iter()
            .enumerate()
            .map(|(i, w)| (w.as_str(), i))
            .collect();
        let tokens: Vec<usize> = text.split(' ').map(|t| position[t]).collect();
        for pair in tokens.windows(2) {
            assert!(chain.successors_of(pair[0]).contains(&pair[1]));
        }
    }

    #[test]
    fn test_length_bound() {
        let mut rng = StdRng::seed_from_u64(7);
        let chain = MarkovChain::build(&mut rng, &small_params()).unwrap();
        for target in [1, 10, 999, 4_096] {
            let text = chain.generate(&mut rng, target).unwrap();
            assert!(text.len() >= target);
            assert!(text.len() < target + 6 + 1);
        }
        assert!(chain.generate(&mut rng, 0).unwrap().is_empty());
    }

    #[test]
    fn test_invalid_params() {
        let mut params = small_params();
        params.successors = 200;
        assert!(params.validate().is_err());

        let params = MarkovParams {
            vocab_size: 30,
            min_word_len: 1,
            max_word_len: 1,
            successors: 2,
        };
        assert!(params.validate().is_err());

        let params = MarkovParams {
            vocab_size: 10,
            min_word_len: 4,
            max_word_len: 2,
            successors: 2,
        };
        assert!(params.validate().is_err());
    }
}
