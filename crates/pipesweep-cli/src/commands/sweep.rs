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

//! Sweep command - shared by `sweep`, `validate` and `compare`

use crate::error::CliError;
use pipesweep_harness::report::print_summary;
use pipesweep_harness::{execute_sweep, CancelToken, SweepConfig};

/// Runs one sweep and prints its summary.
///
/// Per-run failures do not fail the command. An interrupted sweep does,
/// after the runs recorded so far have been written and summarized.
pub fn sweep(config: SweepConfig, cancel: &CancelToken) -> Result<(), CliError> {
    let outcome = execute_sweep(&config, cancel.clone())?;
    print_summary(&outcome.summary, &outcome.results);

    if outcome.summary.cancelled {
        return Err(CliError::Cancelled {
            recorded: outcome.summary.recorded,
            skipped: outcome.summary.skipped,
        });
    }
    Ok(())
}
