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

//! Console summary of a finished sweep.

use crate::error::FailureKind;
use crate::orchestrator::SweepSummary;
use crate::results::ResultSet;
use colored::Colorize;
use std::fmt::Write;

/// Renders the sweep summary and per-category table.
pub fn render_summary(summary: &SweepSummary, results: &ResultSet) -> String {
    let mut out = String::new();
    let rule = "═".repeat(72);

    let _ = writeln!(out);
    let _ = writeln!(out, "{}", rule.bright_blue());
    let _ = writeln!(
        out,
        "{} {}",
        "Sweep:".bright_blue().bold(),
        summary
            .started_at
            .format("%Y-%m-%d %H:%M:%S UTC")
            .to_string()
            .bright_white()
    );
    let _ = writeln!(out, "{}", rule.bright_blue());
    let _ = writeln!(
        out,
        "  {} {} corpora x {} configurations",
        "Matrix:".bright_cyan(),
        summary.corpora,
        summary.configs
    );
    let _ = writeln!(
        out,
        "  {} {}",
        "Recorded:".green().bold(),
        summary.recorded.to_string().bright_white()
    );
    let _ = writeln!(
        out,
        "  {} {}",
        "Failed:".red().bold(),
        summary.failed().to_string().bright_white()
    );
    for kind in FailureKind::ALL {
        let count = summary.failures_of(kind);
        if count > 0 {
            let _ = writeln!(out, "    {:<20} {}", kind.as_str(), count);
        }
    }
    if summary.baseline_failures > 0 {
        let _ = writeln!(
            out,
            "  {} {}",
            "Baseline failures:".yellow().bold(),
            summary.baseline_failures
        );
    }
    if summary.cancelled {
        let _ = writeln!(
            out,
            "  {} {} runs not started",
            "Cancelled:".yellow().bold(),
            summary.skipped
        );
    }
    let _ = writeln!(
        out,
        "  {} {:.2}s",
        "Elapsed:".bright_cyan(),
        summary.elapsed_secs
    );

    let rows = results.summarize();
    if !rows.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(
            out,
            "  {:<22} {:<8} {:>5} {:>10} {:>10} {:>10}",
            "category".bold(),
            "config".bold(),
            "runs".bold(),
            "ratio".bold(),
            "comp s".bold(),
            "baseline".bold()
        );
        for row in rows {
            let baseline = row
                .mean_baseline_ratio
                .map(|r| format!("{:.4}", r))
                .unwrap_or_else(|| "-".to_string());
            let _ = writeln!(
                out,
                "  {:<22} {:<8} {:>5} {:>10.4} {:>10.4} {:>10}",
                row.category.dir_name(),
                row.config.tag(),
                row.runs,
                row.mean_ratio,
                row.mean_compress_secs,
                baseline
            );
        }
    }
    let _ = writeln!(out, "{}", rule.bright_blue());
    out
}

/// Prints [`render_summary`] to stdout.
pub fn print_summary(summary: &SweepSummary, results: &ResultSet) {
    print!("{}", render_summary(summary, results));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::run::BenchmarkRun;
    use chrono::Utc;
    use pipesweep_corpus::Category;
    use std::collections::BTreeMap;

    #[test]
    fn test_render_contains_counts() {
        colored::control::set_override(false);

        let mut failures = BTreeMap::new();
        failures.insert(FailureKind::Timeout, 2);
        let summary = SweepSummary {
            started_at: Utc::now(),
            elapsed_secs: 1.5,
            corpora: 1,
            configs: 2,
            attempted: 3,
            recorded: 1,
            skipped: 0,
            failures,
            baseline_failures: 0,
            cancelled: false,
        };
        let results: ResultSet = vec![BenchmarkRun {
            corpus_id: "markov_text/markov_100".to_string(),
            category: Category::MarkovText,
            file: "markov_100.txt".to_string(),
            config: "101".parse().unwrap(),
            original_size: 100,
            compressed_size: 40,
            compress_secs: 0.01,
            decompress_secs: None,
            round_trip_verified: false,
            baseline: None,
        }]
        .into_iter()
        .collect();

        let text = render_summary(&summary, &results);
        assert!(text.contains("Recorded: 1"));
        assert!(text.contains("Failed: 2"));
        assert!(text.contains("timeout"));
        assert!(text.contains("markov_text"));
        assert!(text.contains("0.4000"));
    }
}
