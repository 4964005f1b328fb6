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

//! Pipesweep Command Line Interface

use clap::Parser;
use colored::Colorize;
use pipesweep_cli::cli::Commands;
use pipesweep_harness::CancelToken;
use std::process::ExitCode;
use tracing::warn;
use tracing_subscriber::EnvFilter;

/// Pipesweep - compression pipeline sweep harness
///
/// Generates deterministic synthetic corpora and drives an external
/// compressor through every combination of its optional stages, recording
/// ratio and timing per run.
#[derive(Parser)]
#[command(name = "pipesweep")]
#[command(author = "Dweve B.V.")]
#[command(version, about = "Pipesweep - compression pipeline sweep harness", long_about = None)]
struct Cli {
    /// Log every invocation (debug level)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

fn init_tracing(verbose: bool) {
    let directive = if verbose {
        "pipesweep=debug"
    } else {
        "pipesweep=info"
    };
    let mut filter = EnvFilter::from_default_env();
    if let Ok(directive) = directive.parse() {
        filter = filter.add_directive(directive);
    }
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let cancel = CancelToken::new();
    let on_interrupt = cancel.clone();
    if let Err(e) = ctrlc::set_handler(move || on_interrupt.cancel()) {
        warn!(error = %e, "cannot install interrupt handler");
    }

    match cli.command.execute(&cancel) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", "Error:".red().bold(), e);
            ExitCode::FAILURE
        }
    }
}
