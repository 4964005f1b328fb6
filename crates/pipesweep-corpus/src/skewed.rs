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

//! Skewed-alphabet generator.
//!
//! One designated character carries probability mass `s`; the remaining
//! `1 - s` is spread evenly over the other 94 printable characters. Raising
//! `s` lowers the entropy of the source, which gives a family of corpora
//! ordered by increasing redundancy.

use crate::ascii::{PRINTABLE, PRINTABLE_COUNT};
use crate::entropy::shannon_entropy;
use crate::error::{validate_corpus_len, validate_unit_interval, CorpusError, Result};
use rand::distributions::{Distribution, WeightedIndex};
use rand::Rng;

/// The character that receives the skewed mass (the first printable, space).
pub const DESIGNATED: u8 = PRINTABLE[0];

/// Lowest skew of the reference family.
pub const MIN_REFERENCE_SKEW: f64 = 0.02;

/// Highest skew of the reference family.
pub const MAX_REFERENCE_SKEW: f64 = 0.98;

/// Probability of each printable character, indexed like [`PRINTABLE`].
pub fn skew_distribution(skew: f64) -> Result<Vec<f64>> {
    validate_unit_interval("skew", skew)?;
    let rest = (1.0 - skew) / (PRINTABLE_COUNT - 1) as f64;
    let mut probabilities = vec![rest; PRINTABLE_COUNT];
    probabilities[0] = skew;
    Ok(probabilities)
}

/// Theoretical entropy, in bits per character, of the distribution for `skew`.
pub fn skew_entropy(skew: f64) -> Result<f64> {
    Ok(shannon_entropy(&skew_distribution(skew)?))
}

/// Skew of member `index` in a reference family of `levels` members.
///
/// Spreads linearly from 0.02 to 0.98.
pub fn skew_for_level(index: usize, levels: usize) -> f64 {
    if levels <= 1 {
        return MIN_REFERENCE_SKEW;
    }
    let step = (MAX_REFERENCE_SKEW - MIN_REFERENCE_SKEW) / (levels - 1) as f64;
    (MIN_REFERENCE_SKEW + index as f64 * step).min(MAX_REFERENCE_SKEW)
}

/// Draws `len` independent characters from the skewed distribution.
///
/// # Errors
///
/// Returns [`CorpusError::InvalidParameter`] if `skew` is outside `[0, 1]`
/// and [`CorpusError::TooLarge`] if `len` exceeds the corpus limit.
pub fn generate_skewed<R: Rng + ?Sized>(rng: &mut R, skew: f64, len: usize) -> Result<Vec<u8>> {
    validate_corpus_len(len)?;
    let probabilities = skew_distribution(skew)?;
    let dist = WeightedIndex::new(&probabilities)
        .map_err(|e| CorpusError::invalid("skew", e.to_string()))?;

    Ok((0..len).map(|_| PRINTABLE[dist.sample(rng)]).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_distribution_sums_to_one() {
        for skew in [0.0, 0.3, 0.5, 0.98, 1.0] {
            let total: f64 = skew_distribution(skew).unwrap().iter().sum();
            assert!((total - 1.0).abs() < 1e-9, "skew {} sums to {}", skew, total);
        }
    }

    #[test]
    fn test_entropy_bounds() {
        let uniform = skew_entropy(1.0 / 95.0).unwrap();
        assert!((uniform - (95f64).log2()).abs() < 1e-9);
        assert_eq!(skew_entropy(1.0).unwrap(), 0.0);
        assert!(skew_entropy(0.5).unwrap() < uniform);
    }

    #[test]
    fn test_reference_levels() {
        assert_eq!(skew_for_level(0, 30), MIN_REFERENCE_SKEW);
        assert!((skew_for_level(29, 30) - MAX_REFERENCE_SKEW).abs() < 1e-12);
        assert!(skew_for_level(10, 30) < skew_for_level(11, 30));
    }

    #[test]
    fn test_designated_frequency_converges() {
        let mut rng = StdRng::seed_from_u64(69);
        let n = 200_000;
        for skew in [0.1, 0.5, 0.9] {
            let bytes = generate_skewed(&mut rng, skew, n).unwrap();
            assert_eq!(bytes.len(), n);
            let freq = bytes.iter().filter(|&&b| b == DESIGNATED).count() as f64 / n as f64;
            assert!(
                (freq - skew).abs() < 0.01,
                "skew {} produced frequency {}",
                skew,
                freq
            );
        }
    }

    #[test]
    fn test_extreme_skews() {
        let mut rng = StdRng::seed_from_u64(1);
        let all_space = generate_skewed(&mut rng, 1.0, 1_000).unwrap();
        assert!(all_space.iter().all(|&b| b == DESIGNATED));

        let no_space = generate_skewed(&mut rng, 0.0, 1_000).unwrap();
        assert!(no_space.iter().all(|&b| b != DESIGNATED && (0x21..=0x7E).contains(&b)));
    }

    #[test]
    fn test_invalid_skew() {
        let mut rng = StdRng::seed_from_u64(1);
        assert!(matches!(
            generate_skewed(&mut rng, 1.2, 10),
            Err(CorpusError::InvalidParameter { .. })
        ));
    }
}
