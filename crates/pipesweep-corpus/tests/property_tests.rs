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

//! Property-based tests for the corpus generators using proptest.
//!
//! - Shuffling preserves the byte multiset of the tiled base
//! - Every generator emits printable ASCII only
//! - Markov output is vocabulary tokens separated by single spaces
//! - Generation is a pure function of (seed, parameters)

use pipesweep_corpus::ascii::is_permitted;
use pipesweep_corpus::entropy::histogram;
use pipesweep_corpus::{
    generate_markup, generate_shuffled, generate_skewed, generate_uniform, stream_rng, tiled_base,
    Alphabet, MarkovChain, MarkovParams, MarkupSyntax,
};
use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::HashSet;

fn alphabet() -> impl Strategy<Value = Alphabet> {
    prop_oneof![
        Just(Alphabet::Printable),
        Just(Alphabet::Binary),
        Just(Alphabet::Base64),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_shuffle_preserves_multiset(seed in any::<u64>(), fraction in 0.0f64..=1.0, len in 0usize..4_000) {
        let mut rng = StdRng::seed_from_u64(seed);
        let shuffled = generate_shuffled(&mut rng, fraction, len).unwrap();
        prop_assert_eq!(shuffled.len(), len);
        prop_assert_eq!(histogram(&shuffled), histogram(&tiled_base(len)));
    }

    #[test]
    fn prop_skewed_is_printable(seed in any::<u64>(), skew in 0.0f64..=1.0, len in 0usize..2_000) {
        let mut rng = StdRng::seed_from_u64(seed);
        let out = generate_skewed(&mut rng, skew, len).unwrap();
        prop_assert_eq!(out.len(), len);
        prop_assert!(out.iter().all(|b| (0x20..=0x7E).contains(b)));
    }

    #[test]
    fn prop_uniform_is_deterministic(seed in any::<u64>(), alphabet in alphabet(), len in 0usize..2_000) {
        let first = generate_uniform(&mut StdRng::seed_from_u64(seed), alphabet, len).unwrap();
        let second = generate_uniform(&mut StdRng::seed_from_u64(seed), alphabet, len).unwrap();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn prop_markup_is_printable(seed in any::<u64>(), records in 0usize..200, json in any::<bool>()) {
        let syntax = if json { MarkupSyntax::Json } else { MarkupSyntax::Xml };
        let out = generate_markup(&mut StdRng::seed_from_u64(seed), syntax, records).unwrap();
        prop_assert!(out.iter().all(|&b| is_permitted(b)));
        let lines = if records == 0 { 0 } else { out.split(|&b| b == b'\n').count() };
        prop_assert_eq!(lines, records);
    }

    #[test]
    fn prop_markov_tokens_and_length(seed in any::<u64>(), target in 1usize..3_000) {
        let params = MarkovParams { vocab_size: 64, min_word_len: 2, max_word_len: 7, successors: 4 };
        let mut rng = stream_rng(seed, "markov_text/vocabulary");
        let chain = MarkovChain::build(&mut rng, &params).unwrap();
        let text = chain.generate(&mut rng, target).unwrap();

        prop_assert!(text.len() >= target);
        prop_assert!(text.len() < target + params.max_word_len + 1);

        let vocabulary: HashSet<&[u8]> = chain.words().iter().map(|w| w.as_bytes()).collect();
        for token in text.split(|&b| b == b' ') {
            prop_assert!(vocabulary.contains(token), "unknown token {:?}", token);
        }
    }
}
