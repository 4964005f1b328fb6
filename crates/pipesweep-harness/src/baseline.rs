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

//! Baseline archivers for comparison sweeps.

use crate::compressor::{tool_failure, Operation};
use crate::error::{HarnessError, RunFailure};
use crate::process::{StdoutTarget, ToolCommand};
use crate::run::compression_ratio;
use flate2::read::DeflateDecoder;
use flate2::write::DeflateEncoder;
use flate2::Compression;
use pipesweep_corpus::CorpusDescriptor;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::{Duration, Instant};

/// Default DEFLATE level.
pub const DEFAULT_DEFLATE_LEVEL: u32 = 6;

/// A reference compressor measured once per corpus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "tool", rename_all = "snake_case")]
pub enum BaselineTool {
    /// External `zip`/`unzip`.
    Zip,
    /// In-process DEFLATE.
    Deflate {
        /// Compression level, 0..=9.
        level: u32,
    },
}

/// Size and timing of one baseline measurement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BaselineMeasurement {
    /// Tool name as shown in the result table.
    pub tool: String,
    /// Size of the baseline artifact.
    pub compressed_size: u64,
    /// Compression time in seconds.
    pub compress_secs: f64,
    /// Decompression time in seconds.
    pub decompress_secs: f64,
}

impl BaselineMeasurement {
    /// Ratio of the baseline artifact to `original_size`.
    pub fn ratio(&self, original_size: u64) -> f64 {
        compression_ratio(self.compressed_size, original_size)
    }
}

impl fmt::Display for BaselineTool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Zip => f.write_str("zip"),
            Self::Deflate { level } => write!(f, "deflate-{}", level),
        }
    }
}

impl FromStr for BaselineTool {
    type Err = HarnessError;

    /// Accepts `zip`, `deflate` and `deflate:<level>`.
    fn from_str(s: &str) -> Result<Self, HarnessError> {
        let s = s.trim();
        match s.split_once(':') {
            None if s == "zip" => Ok(Self::Zip),
            None if s == "deflate" => Ok(Self::Deflate {
                level: DEFAULT_DEFLATE_LEVEL,
            }),
            Some(("deflate", level)) => match level.parse::<u32>() {
                Ok(level) if level <= 9 => Ok(Self::Deflate { level }),
                _ => Err(HarnessError::config(format!(
                    "deflate level must be 0..=9, got '{}'",
                    level
                ))),
            },
            _ => Err(HarnessError::config(format!("unknown baseline tool '{}'", s))),
        }
    }
}

impl BaselineTool {
    /// Compresses and decompresses `corpus` once, timing both directions.
    ///
    /// Temporary artifacts are created in `work_dir` and removed afterwards.
    pub fn measure(
        &self,
        corpus: &CorpusDescriptor,
        work_dir: &Path,
        timeout: Option<Duration>,
    ) -> Result<BaselineMeasurement, RunFailure> {
        let input = corpus.path.as_deref().ok_or_else(|| RunFailure::Io {
            path: PathBuf::from(&corpus.id),
            message: "corpus has not been written to disk".to_string(),
        })?;

        let (compressed_size, compress, decompress) = match *self {
            Self::Zip => {
                let archive = work_dir.join(format!("{}.baseline.zip", corpus.artifact_stem()));
                let measured = zip_round(input, &archive, timeout);
                let _ = fs::remove_file(&archive);
                measured?
            }
            Self::Deflate { level } => deflate_round(input, level)?,
        };

        Ok(BaselineMeasurement {
            tool: self.to_string(),
            compressed_size,
            compress_secs: compress.as_secs_f64(),
            decompress_secs: decompress.as_secs_f64(),
        })
    }
}

fn run_tool(
    command: ToolCommand,
    operation: Operation,
    timeout: Option<Duration>,
) -> Result<Duration, RunFailure> {
    let program = command.program().to_path_buf();
    let output = command
        .run()
        .map_err(|e| tool_failure(e, &program, operation, timeout))?;

    match output.status.code() {
        Some(0) => Ok(output.elapsed),
        Some(code) => Err(RunFailure::Rejected {
            operation,
            code,
            stderr: output.stderr_tail,
        }),
        None => Err(RunFailure::Crashed {
            operation,
            stderr: output.stderr_tail,
        }),
    }
}

/// `zip -j -qq <archive> <input>` then `unzip -p -qq <archive>`.
fn zip_round(
    input: &Path,
    archive: &Path,
    timeout: Option<Duration>,
) -> Result<(u64, Duration, Duration), RunFailure> {
    // zip appends to an existing archive.
    match fs::remove_file(archive) {
        Err(e) if e.kind() != io::ErrorKind::NotFound => {
            return Err(RunFailure::io_error(archive, e));
        }
        _ => {}
    }

    let compress = run_tool(
        ToolCommand::new("zip")
            .args(["-j", "-qq"])
            .arg(archive)
            .arg(input)
            .timeout(timeout),
        Operation::Compress,
        timeout,
    )?;
    let size = fs::metadata(archive)
        .map_err(|_| RunFailure::MissingArtifact {
            operation: Operation::Compress,
            path: archive.to_path_buf(),
        })?
        .len();

    let decompress = run_tool(
        ToolCommand::new("unzip")
            .args(["-p", "-qq"])
            .arg(archive)
            .stdout(StdoutTarget::Null)
            .timeout(timeout),
        Operation::Decompress,
        timeout,
    )?;

    Ok((size, compress, decompress))
}

fn deflate_round(input: &Path, level: u32) -> Result<(u64, Duration, Duration), RunFailure> {
    let original = fs::read(input).map_err(|e| RunFailure::io_error(input, e))?;

    let started = Instant::now();
    let mut encoder = DeflateEncoder::new(Vec::new(), Compression::new(level));
    encoder
        .write_all(&original)
        .map_err(|e| RunFailure::io_error(input, e))?;
    let compressed = encoder.finish().map_err(|e| RunFailure::io_error(input, e))?;
    let compress = started.elapsed();

    let started = Instant::now();
    let mut restored = Vec::with_capacity(original.len());
    DeflateDecoder::new(compressed.as_slice())
        .read_to_end(&mut restored)
        .map_err(|e| RunFailure::io_error(input, e))?;
    let decompress = started.elapsed();

    if restored != original {
        let offset = original
            .iter()
            .zip(&restored)
            .position(|(a, b)| a != b)
            .unwrap_or_else(|| original.len().min(restored.len()));
        return Err(RunFailure::RoundTripMismatch {
            offset: offset as u64,
            expected_len: original.len() as u64,
            actual_len: restored.len() as u64,
        });
    }

    Ok((compressed.len() as u64, compress, decompress))
}
