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

//! Uniform draws from fixed alphabets.

use crate::ascii::{BASE64, BINARY, PRINTABLE};
use crate::error::{validate_corpus_len, Result};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Alphabets for uniform corpora.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Alphabet {
    /// All 95 printable characters.
    Printable,
    /// `'0'` and `'1'`.
    Binary,
    /// The 64 base64 symbols.
    Base64,
}

impl Alphabet {
    /// Symbols of the alphabet.
    pub fn symbols(&self) -> &'static [u8] {
        match self {
            Self::Printable => &PRINTABLE,
            Self::Binary => &BINARY,
            Self::Base64 => BASE64,
        }
    }

    /// Entropy of a uniform draw, `log2(|alphabet|)`.
    pub fn entropy(&self) -> f64 {
        (self.symbols().len() as f64).log2()
    }
}

/// Draws `len` symbols uniformly from `alphabet`.
pub fn generate_uniform<R: Rng + ?Sized>(rng: &mut R, alphabet: Alphabet, len: usize) -> Result<Vec<u8>> {
    validate_corpus_len(len)?;
    let symbols = alphabet.symbols();
    Ok((0..len)
        .map(|_| symbols[rng.gen_range(0..symbols.len())])
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_symbols_stay_in_alphabet() {
        let mut rng = StdRng::seed_from_u64(69);
        for alphabet in [Alphabet::Printable, Alphabet::Binary, Alphabet::Base64] {
            let out = generate_uniform(&mut rng, alphabet, 10_000).unwrap();
            assert_eq!(out.len(), 10_000);
            assert!(out.iter().all(|b| alphabet.symbols().contains(b)));
        }
    }

    #[test]
    fn test_binary_is_balanced() {
        let mut rng = StdRng::seed_from_u64(69);
        let out = generate_uniform(&mut rng, Alphabet::Binary, 100_000).unwrap();
        let ones = out.iter().filter(|&&b| b == b'1').count() as f64 / 100_000.0;
        assert!((ones - 0.5).abs() < 0.01);
    }

    #[test]
    fn test_entropy() {
        assert_eq!(Alphabet::Binary.entropy(), 1.0);
        assert_eq!(Alphabet::Base64.entropy(), 6.0);
    }
}
