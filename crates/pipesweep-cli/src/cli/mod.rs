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

//! CLI command definitions and argument parsing.

mod args;

pub use args::{parse_baseline, GenerateArgs, Preset, SweepArgs};

use crate::commands;
use crate::error::CliError;
use clap::Subcommand;
use pipesweep_harness::{BaselineTool, CancelToken};

/// Top-level commands.
///
/// ```text
/// Commands
/// ├── generate   write the synthetic corpus suite
/// ├── sweep      run every configuration over the corpora
/// ├── validate   sweep with round-trip verification
/// └── compare    sweep with verification and a baseline tool
/// ```
#[derive(Subcommand)]
pub enum Commands {
    /// Generate the synthetic corpus suite and its manifest
    Generate(GenerateArgs),

    /// Run the compressor over every corpus and configuration
    Sweep(SweepArgs),

    /// Sweep with decompression and byte-exact comparison of every run
    Validate(SweepArgs),

    /// Validated sweep plus a baseline archiver measured once per corpus
    Compare {
        #[command(flatten)]
        sweep: SweepArgs,

        /// Baseline tool: zip, deflate or deflate:<level> (default: the
        /// sweep configuration's baseline, else zip)
        #[arg(long, value_parser = parse_baseline)]
        baseline: Option<BaselineTool>,
    },
}

impl Commands {
    /// Executes the command.
    ///
    /// # Errors
    ///
    /// Returns `Err` on fatal errors only; failed runs inside a sweep are
    /// reported in the summary.
    pub fn execute(self, cancel: &CancelToken) -> Result<(), CliError> {
        match self {
            Commands::Generate(args) => commands::generate(&args.to_config()?, &args.out),
            Commands::Sweep(args) => commands::sweep(args.to_config()?, cancel),
            Commands::Validate(args) => {
                commands::sweep(args.to_config()?.with_round_trip(true), cancel)
            }
            Commands::Compare { sweep, baseline } => {
                commands::sweep(sweep.to_compare_config(baseline)?, cancel)
            }
        }
    }
}
