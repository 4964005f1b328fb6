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

//! Shannon entropy in bits per symbol.

/// Entropy of a probability distribution, `-Σ p·log2(p)`.
///
/// Zero-probability terms contribute nothing.
pub fn shannon_entropy(probabilities: &[f64]) -> f64 {
    probabilities
        .iter()
        .filter(|&&p| p > 0.0)
        .map(|&p| -p * p.log2())
        .sum()
}

/// Byte histogram of a buffer.
pub fn histogram(bytes: &[u8]) -> [u64; 256] {
    let mut counts = [0u64; 256];
    for &b in bytes {
        counts[b as usize] += 1;
    }
    counts
}

/// Entropy of the observed byte frequencies.
///
/// Returns 0 for an empty buffer.
pub fn empirical_entropy(bytes: &[u8]) -> f64 {
    if bytes.is_empty() {
        return 0.0;
    }
    let total = bytes.len() as f64;
    let probabilities: Vec<f64> = histogram(bytes)
        .iter()
        .filter(|&&c| c > 0)
        .map(|&c| c as f64 / total)
        .collect();
    shannon_entropy(&probabilities)
}
