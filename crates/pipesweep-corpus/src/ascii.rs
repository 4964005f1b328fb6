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

//! Alphabets and the 7-bit output guard shared by every generator.

use crate::error::{CorpusError, Result};

/// Number of printable ASCII characters (`0x20..=0x7E`).
pub const PRINTABLE_COUNT: usize = 95;

/// The printable ASCII range in code-point order, space first.
pub const PRINTABLE: [u8; PRINTABLE_COUNT] = printable_table();

/// Two-symbol alphabet used for binary-like corpora.
pub const BINARY: [u8; 2] = [b'0', b'1'];

/// The standard base64 alphabet.
pub const BASE64: &[u8; 64] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789+/";

const fn printable_table() -> [u8; PRINTABLE_COUNT] {
    let mut table = [0u8; PRINTABLE_COUNT];
    let mut i = 0;
    while i < PRINTABLE_COUNT {
        table[i] = 0x20 + i as u8;
        i += 1;
    }
    table
}

/// Returns whether a byte may appear in a corpus.
///
/// Printable ASCII plus `\n`, which record-style corpora use as separator.
#[inline]
pub fn is_permitted(byte: u8) -> bool {
    (0x20..=0x7E).contains(&byte) || byte == b'\n'
}

/// Converts text to bytes, dropping every non-ASCII code point.
///
/// Wide characters are removed outright rather than escaped, so the output
/// never contains multi-byte sequences.
pub fn retain_ascii(text: &str) -> Vec<u8> {
    text.chars()
        .filter(char::is_ascii)
        .map(|c| c as u8)
        .collect()
}

/// Checks that every byte is permitted, reporting the first violation.
pub fn ensure_printable(corpus: &str, bytes: &[u8]) -> Result<()> {
    match bytes.iter().position(|&b| !is_permitted(b)) {
        None => Ok(()),
        Some(offset) => Err(CorpusError::EncodingViolation {
            corpus: corpus.to_string(),
            offset,
            byte: bytes[offset],
        }),
    }
}
