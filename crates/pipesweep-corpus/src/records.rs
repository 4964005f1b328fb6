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

//! Structured-record generator.
//!
//! Emits access-log style lines:
//!
//! ```text
//! [2024-01-01 00:00:07] USER:000007 ACTION:UPLOAD   STATUS:SUCCESS
//! ```
//!
//! Structure is rigid and the vocabulary tiny, so these corpora isolate the
//! effect of size on an otherwise highly regular input.

use crate::error::{validate_corpus_len, CorpusError, Result};
use chrono::{Duration, NaiveDate, NaiveDateTime};
use rand::Rng;

/// Action vocabulary.
pub const ACTIONS: [&str; 6] = ["LOGIN", "LOGOUT", "DOWNLOAD", "UPLOAD", "ERROR", "UPDATE"];

/// Status vocabulary.
pub const STATUSES: [&str; 4] = ["SUCCESS", "FAIL", "TIMEOUT", "PENDING"];

/// Output of [`generate_records`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordBatch {
    /// Newline-separated records.
    pub bytes: Vec<u8>,
    /// Number of records actually emitted.
    pub emitted: usize,
    /// Whether generation stopped at the size cap before `count` records.
    pub capped: bool,
}

fn epoch() -> Result<NaiveDateTime> {
    NaiveDate::from_ymd_opt(2024, 1, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .ok_or_else(|| CorpusError::invalid("epoch", "2024-01-01 00:00:00 is not a valid date"))
}

/// Formats record number `index`; timestamps advance one second per record.
fn format_record(epoch: NaiveDateTime, index: usize, action: &str, status: &str) -> String {
    let timestamp = epoch + Duration::seconds(index as i64);
    format!(
        "[{}] USER:{:06} ACTION:{:<8} STATUS:{}",
        timestamp.format("%Y-%m-%d %H:%M:%S"),
        index,
        action,
        status
    )
}

/// Generates up to `count` records, never exceeding `max_bytes` in total.
///
/// Stops before the first record that would push the output past the cap;
/// records are never cut in half.
pub fn generate_records<R: Rng + ?Sized>(
    rng: &mut R,
    count: usize,
    max_bytes: usize,
) -> Result<RecordBatch> {
    validate_corpus_len(max_bytes)?;
    let epoch = epoch()?;

    let mut bytes = Vec::new();
    let mut emitted = 0;
    let mut capped = false;

    for index in 0..count {
        let action = ACTIONS[rng.gen_range(0..ACTIONS.len())];
        let status = STATUSES[rng.gen_range(0..STATUSES.len())];
        let line = format_record(epoch, index, action, status);

        let separator = usize::from(!bytes.is_empty());
        if bytes.len() + separator + line.len() > max_bytes {
            capped = true;
            break;
        }
        if separator == 1 {
            bytes.push(b'\n');
        }
        bytes.extend_from_slice(line.as_bytes());
        emitted += 1;
    }

    Ok(RecordBatch {
        bytes,
        emitted,
        capped,
    })
}

/// Record counts of the size series: `10^1 ..= 10^max_power`.
pub fn record_counts(max_power: u32) -> Vec<usize> {
    (1..=max_power)
        .filter_map(|p| 10usize.checked_pow(p))
        .collect()
}
