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

//! Generate command - writes the corpus suite and manifest

use crate::error::CliError;
use colored::Colorize;
use pipesweep_corpus::{Category, CorpusConfig, CorpusManifest, CorpusSuite, SuiteReport};
use std::path::Path;

/// Generates every corpus of `config` and writes them under `out`.
///
/// Corpora that fail to generate or write are listed and skipped; the
/// manifest only names the corpora that were written.
///
/// # Output
///
/// Prints a per-category count, the manifest path and any failures.
pub fn generate(config: &CorpusConfig, out: &Path) -> Result<(), CliError> {
    let suite = CorpusSuite::generate(config)?;
    let report = suite.write_to(out)?;
    print_report(&report, out);
    Ok(())
}

fn print_report(report: &SuiteReport, out: &Path) {
    let rule = "═".repeat(60);
    println!();
    println!("{}", rule.bright_blue());
    println!(
        "{} {}",
        "Corpus suite:".bright_blue().bold(),
        out.display().to_string().bright_white()
    );
    println!("{}", rule.bright_blue());
    println!("  {} {}", "Seed:".bright_cyan(), report.manifest.seed);

    for &category in Category::all() {
        let count = report.manifest.by_category(category).count();
        if count > 0 {
            println!("    {:<24} {}", category.dir_name(), count);
        }
    }
    println!(
        "  {} {}",
        "Written:".green().bold(),
        report.manifest.len().to_string().bright_white()
    );
    println!(
        "  {} {}",
        "Manifest:".bright_cyan(),
        out.join(CorpusManifest::FILE_NAME).display()
    );

    if !report.failures.is_empty() {
        println!(
            "  {} {}",
            "Failed:".red().bold(),
            report.failures.len().to_string().bright_white()
        );
        for failure in &report.failures {
            println!("    {} {}: {}", "✗".red(), failure.id, failure.error);
        }
    }
    println!("{}", rule.bright_blue());
}
