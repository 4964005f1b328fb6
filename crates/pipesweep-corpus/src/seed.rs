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

//! Per-corpus random streams.
//!
//! Every corpus owns a `StdRng` seeded from the suite's master seed and the
//! corpus identifier. Two corpora never share a stream, so generating them in
//! a different order, or in parallel, cannot change a single byte.

use rand::rngs::StdRng;
use rand::SeedableRng;

const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

fn fnv1a(stream: &str) -> u64 {
    stream.bytes().fold(FNV_OFFSET, |hash, b| {
        (hash ^ u64::from(b)).wrapping_mul(FNV_PRIME)
    })
}

fn splitmix64(mut z: u64) -> u64 {
    z = z.wrapping_add(0x9e37_79b9_7f4a_7c15);
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    z ^ (z >> 31)
}

/// Derives the seed of a named stream from the master seed.
pub fn derive_seed(master: u64, stream: &str) -> u64 {
    splitmix64(master ^ fnv1a(stream))
}

/// Creates the random generator for a named stream.
pub fn stream_rng(master: u64, stream: &str) -> StdRng {
    StdRng::seed_from_u64(derive_seed(master, stream))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    #[test]
    fn test_derive_seed_is_stable() {
        assert_eq!(derive_seed(69, "a/b"), derive_seed(69, "a/b"));
        assert_ne!(derive_seed(69, "a/b"), derive_seed(69, "a/c"));
        assert_ne!(derive_seed(69, "a/b"), derive_seed(70, "a/b"));
    }

    #[test]
    fn test_stream_rng_reproduces() {
        let mut first = stream_rng(1, "x");
        let mut second = stream_rng(1, "x");
        for _ in 0..8 {
            assert_eq!(first.gen::<u64>(), second.gen::<u64>());
        }
    }
}
