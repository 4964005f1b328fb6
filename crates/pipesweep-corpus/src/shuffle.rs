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

//! Structural-randomness generator.
//!
//! Starts from natural-language text tiled to the requested length and
//! destroys its structure with random pairwise swaps. The byte multiset
//! never changes, so the zeroth-order entropy stays fixed while the
//! higher-order structure a block-sorting stage exploits degrades with the
//! shuffle fraction.

use crate::error::{validate_corpus_len, validate_unit_interval, Result};
use rand::Rng;

/// Fixed literal text block tiled to form the unshuffled corpus.
pub const BASE_BLOCK: &str = concat!(
    "THE NIGHT SHIFT AT THE OBSERVATORY NEVER REALLY ENDS, IT JUST CHANGES HANDS. ",
    "By the time the dome closes the archive machines are already busy, copying ",
    "plates into tape, tape into disk, and disk into whatever the next budget allows. ",
    "Nobody on the day crew remembers who wrote the first ingest script; everybody ",
    "remembers the week it silently dropped every frame taken under a full moon. ",
    "Since then the rule has been simple: every file that goes in must come back out ",
    "byte for byte, and every tool that touches the archive is tested on the ugliest ",
    "data we can find. Some nights that means star fields so sparse the images are ",
    "almost all zeros. Other nights it means telemetry logs where every line looks ",
    "the same except for a counter and a timestamp, or calibration notes typed in a ",
    "hurry, full of abbreviations, half sentences, and coffee-stained optimism. ",
    "The compressor does not care what the bytes mean, only how often they repeat ",
    "and how far apart the repeats are. So we feed it text we understand, then ",
    "scramble it a little at a time, and watch how long it keeps up. ",
);

/// Returns [`BASE_BLOCK`] tiled and truncated to exactly `len` bytes.
pub fn tiled_base(len: usize) -> Vec<u8> {
    BASE_BLOCK.bytes().cycle().take(len).collect()
}

/// Number of swaps performed for a shuffle fraction: `round(fraction * len)`.
pub fn swap_count(fraction: f64, len: usize) -> usize {
    (fraction * len as f64).round() as usize
}

/// Shuffle fraction of member `index` in a family of `levels` members.
///
/// Spreads linearly from 0 (fully structured) to 1.
pub fn fraction_for_level(index: usize, levels: usize) -> f64 {
    if levels <= 1 {
        0.0
    } else {
        (index as f64 / (levels - 1) as f64).min(1.0)
    }
}

/// Produces a structurally randomized corpus of `len` bytes.
///
/// Performs `round(fraction * len)` independent swaps of two uniformly chosen
/// positions (a position may be swapped with itself).
pub fn generate_shuffled<R: Rng + ?Sized>(rng: &mut R, fraction: f64, len: usize) -> Result<Vec<u8>> {
    validate_unit_interval("shuffle_fraction", fraction)?;
    validate_corpus_len(len)?;

    let mut data = tiled_base(len);
    if len < 2 {
        return Ok(data);
    }

    for _ in 0..swap_count(fraction, len) {
        let a = rng.gen_range(0..len);
        let b = rng.gen_range(0..len);
        data.swap(a, b);
    }

    Ok(data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entropy::histogram;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_base_block_is_printable() {
        assert!(BASE_BLOCK.bytes().all(|b| (0x20..=0x7E).contains(&b)));
    }

    #[test]
    fn test_tiled_base_length() {
        assert_eq!(tiled_base(0).len(), 0);
        assert_eq!(tiled_base(7), BASE_BLOCK.as_bytes()[..7].to_vec());
        let long = tiled_base(BASE_BLOCK.len() * 2 + 3);
        assert_eq!(&long[BASE_BLOCK.len()..BASE_BLOCK.len() + 3], &BASE_BLOCK.as_bytes()[..3]);
    }

    #[test]
    fn test_zero_fraction_is_identity() {
        let mut rng = StdRng::seed_from_u64(69);
        let out = generate_shuffled(&mut rng, 0.0, 50_000).unwrap();
        assert_eq!(out, tiled_base(50_000));
    }

    #[test]
    fn test_full_fraction_preserves_histogram() {
        let mut rng = StdRng::seed_from_u64(69);
        let out = generate_shuffled(&mut rng, 1.0, 50_000).unwrap();
        let base = tiled_base(50_000);
        assert_ne!(out, base);
        assert_eq!(histogram(&out), histogram(&base));
    }

    #[test]
    fn test_swap_count_rounds() {
        assert_eq!(swap_count(0.5, 3), 2);
        assert_eq!(swap_count(0.0, 1_000), 0);
        assert_eq!(swap_count(1.0, 1_000), 1_000);
    }

    #[test]
    fn test_fraction_levels() {
        assert_eq!(fraction_for_level(0, 30), 0.0);
        assert_eq!(fraction_for_level(29, 30), 1.0);
        assert_eq!(fraction_for_level(0, 1), 0.0);
    }
}
