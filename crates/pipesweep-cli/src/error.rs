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

//! Structured error types for the Pipesweep CLI.
//!
//! Every command returns `Result<T, CliError>`. Library errors are wrapped
//! unchanged so their messages reach the user as written.

use pipesweep_corpus::CorpusError;
use pipesweep_harness::HarnessError;
use thiserror::Error;

/// Errors that end a CLI command with a non-zero exit code.
#[derive(Error, Debug, Clone)]
pub enum CliError {
    /// Corpus generation or manifest error.
    #[error(transparent)]
    Corpus(#[from] CorpusError),

    /// Fatal sweep error.
    #[error(transparent)]
    Harness(#[from] HarnessError),

    /// Invalid combination of arguments.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The sweep was interrupted before it finished.
    #[error("Sweep cancelled after {recorded} recorded runs ({skipped} runs not started)")]
    Cancelled {
        /// Runs recorded before cancellation.
        recorded: usize,
        /// Runs never started.
        skipped: usize,
    },
}

impl CliError {
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }
}
