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

//! The external compressor contract.
//!
//! ```text
//! compressor <c|d> <input_path> <output_path> [toggle_1 ... toggle_k]
//! ```
//!
//! Exit code 0 means success; anything else is a failure regardless of what
//! was written. Toggles are positional `0`/`1` flags and must be identical
//! for compression and decompression of the same artifact.

use crate::error::RunFailure;
use crate::pipeline::PipelineConfig;
use crate::process::{ToolCommand, ToolError};
use pipesweep_corpus::CorpusDescriptor;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs::{self, File};
use std::io::{self, BufReader, Read};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

const COMPARE_CHUNK: usize = 64 * 1024;

/// Direction of a compressor invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    /// `c`
    Compress,
    /// `d`
    Decompress,
}

impl Operation {
    /// Mode argument passed to the compressor.
    pub fn flag(&self) -> &'static str {
        match self {
            Self::Compress => "c",
            Self::Decompress => "d",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Compress => "compress",
            Self::Decompress => "decompress",
        })
    }
}

/// Per-run artifact locations inside the work directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactPaths {
    /// Compressed artifact, `<stem>.<tag>.cmp`.
    pub compressed: PathBuf,
    /// Restored output, `<stem>.<tag>.out`.
    pub restored: PathBuf,
}

impl ArtifactPaths {
    /// Paths for one (corpus, configuration) pair; unique across a sweep.
    pub fn new(work_dir: &Path, corpus: &CorpusDescriptor, config: &PipelineConfig) -> Self {
        let stem = format!("{}.{}", corpus.artifact_stem(), config.tag());
        Self {
            compressed: work_dir.join(format!("{}.cmp", stem)),
            restored: work_dir.join(format!("{}.out", stem)),
        }
    }

    /// Removes whichever artifacts exist.
    pub fn remove(&self) {
        for path in [&self.compressed, &self.restored] {
            if let Err(e) = fs::remove_file(path) {
                if e.kind() != io::ErrorKind::NotFound {
                    debug!(path = %path.display(), error = %e, "could not remove artifact");
                }
            }
        }
    }
}

/// Result of a successful compression.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Compression {
    /// Size of the compressed artifact.
    pub compressed_size: u64,
    /// Wall-clock time of the compressor call.
    pub elapsed: Duration,
}

/// First difference between two files.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mismatch {
    /// Offset of the first differing byte (or the shorter length).
    pub offset: u64,
    /// Length of the first file.
    pub expected_len: u64,
    /// Length of the second file.
    pub actual_len: u64,
}

/// Handle on the external compressor binary.
#[derive(Debug, Clone)]
pub struct Compressor {
    program: PathBuf,
    timeout: Option<Duration>,
}

impl Compressor {
    /// Creates a handle; `timeout` bounds every single invocation.
    pub fn new(program: impl Into<PathBuf>, timeout: Option<Duration>) -> Self {
        Self {
            program: program.into(),
            timeout,
        }
    }

    /// Path of the compressor binary.
    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Builds the command line for one invocation.
    pub fn command(
        &self,
        operation: Operation,
        input: &Path,
        output: &Path,
        config: &PipelineConfig,
    ) -> ToolCommand {
        ToolCommand::new(&self.program)
            .arg(operation.flag())
            .arg(input)
            .arg(output)
            .args(config.args())
            .timeout(self.timeout)
    }

    fn invoke(
        &self,
        operation: Operation,
        input: &Path,
        output: &Path,
        config: &PipelineConfig,
    ) -> Result<Duration, RunFailure> {
        let command = self.command(operation, input, output, config);
        let outcome = command
            .run()
            .map_err(|e| tool_failure(e, &self.program, operation, self.timeout))?;

        if !outcome.status.success() {
            return Err(match outcome.status.code() {
                Some(code) => RunFailure::Rejected {
                    operation,
                    code,
                    stderr: outcome.stderr_tail,
                },
                None => RunFailure::Crashed {
                    operation,
                    stderr: outcome.stderr_tail,
                },
            });
        }
        if !output.is_file() {
            return Err(RunFailure::MissingArtifact {
                operation,
                path: output.to_path_buf(),
            });
        }

        debug!(
            %operation,
            config = %config,
            elapsed_ms = outcome.elapsed.as_secs_f64() * 1000.0,
            "compressor call finished"
        );
        Ok(outcome.elapsed)
    }

    /// Compresses `corpus` into `artifacts.compressed` with the given toggles.
    pub fn compress_once(
        &self,
        corpus: &CorpusDescriptor,
        config: &PipelineConfig,
        artifacts: &ArtifactPaths,
    ) -> Result<Compression, RunFailure> {
        let input = corpus_path(corpus)?;
        // Stale output from an earlier sweep must not pass the existence check.
        artifacts.remove();

        let elapsed = self.invoke(Operation::Compress, input, &artifacts.compressed, config)?;
        let compressed_size = fs::metadata(&artifacts.compressed)
            .map_err(|e| RunFailure::io_error(&artifacts.compressed, e))?
            .len();
        if compressed_size == 0 && corpus.len > 0 {
            return Err(RunFailure::EmptyArtifact {
                operation: Operation::Compress,
                path: artifacts.compressed.clone(),
            });
        }

        Ok(Compression {
            compressed_size,
            elapsed,
        })
    }

    /// Decompresses `artifacts.compressed` and compares it with the corpus.
    ///
    /// Returns the decompression time when the restored bytes equal the
    /// original exactly.
    pub fn verify_round_trip(
        &self,
        corpus: &CorpusDescriptor,
        config: &PipelineConfig,
        artifacts: &ArtifactPaths,
    ) -> Result<Duration, RunFailure> {
        let original = corpus_path(corpus)?;
        let elapsed = self.invoke(
            Operation::Decompress,
            &artifacts.compressed,
            &artifacts.restored,
            config,
        )?;

        match compare_files(original, &artifacts.restored) {
            Ok(None) => Ok(elapsed),
            Ok(Some(m)) => Err(RunFailure::RoundTripMismatch {
                offset: m.offset,
                expected_len: m.expected_len,
                actual_len: m.actual_len,
            }),
            Err(e) => Err(RunFailure::io_error(&artifacts.restored, e)),
        }
    }
}

/// Maps a process-level error onto the run failure it stands for.
///
/// Only a failed spawn counts as [`RunFailure::Spawn`]; a failed wait on a
/// running child is harness-side I/O.
pub(crate) fn tool_failure(
    error: ToolError,
    program: &Path,
    operation: Operation,
    timeout: Option<Duration>,
) -> RunFailure {
    match error {
        ToolError::Spawn(e) => RunFailure::Spawn {
            program: program.to_path_buf(),
            message: e.to_string(),
        },
        ToolError::Wait(e) => RunFailure::Io {
            path: program.to_path_buf(),
            message: format!("waiting for {} failed: {}", operation, e),
        },
        ToolError::Timeout(_) => RunFailure::Timeout {
            operation,
            timeout_secs: timeout.map(|t| t.as_secs_f64()).unwrap_or_default(),
        },
    }
}

fn corpus_path(corpus: &CorpusDescriptor) -> Result<&Path, RunFailure> {
    corpus.path.as_deref().ok_or_else(|| RunFailure::Io {
        path: PathBuf::from(&corpus.id),
        message: "corpus has not been written to disk".to_string(),
    })
}

/// Compares two files chunk by chunk.
///
/// Returns `None` when they are byte-identical.
pub fn compare_files(expected: &Path, actual: &Path) -> io::Result<Option<Mismatch>> {
    let expected_len = fs::metadata(expected)?.len();
    let actual_len = fs::metadata(actual)?.len();

    let mut a = BufReader::with_capacity(COMPARE_CHUNK, File::open(expected)?);
    let mut b = BufReader::with_capacity(COMPARE_CHUNK, File::open(actual)?);
    let mut buf_a = vec![0u8; COMPARE_CHUNK];
    let mut buf_b = vec![0u8; COMPARE_CHUNK];
    let mut offset = 0u64;

    loop {
        let n_a = read_full(&mut a, &mut buf_a)?;
        let n_b = read_full(&mut b, &mut buf_b)?;
        let common = n_a.min(n_b);
        if let Some(i) = buf_a[..common]
            .iter()
            .zip(&buf_b[..common])
            .position(|(x, y)| x != y)
        {
            return Ok(Some(Mismatch {
                offset: offset + i as u64,
                expected_len,
                actual_len,
            }));
        }
        if n_a != n_b {
            return Ok(Some(Mismatch {
                offset: offset + common as u64,
                expected_len,
                actual_len,
            }));
        }
        if n_a == 0 {
            return Ok(None);
        }
        offset += n_a as u64;
    }
}

/// Fills `buf` as far as the reader allows; short only at end of input.
fn read_full(reader: &mut impl Read, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FailureKind;
    use pipesweep_corpus::{Alphabet, Category, Corpus, CorpusParams};
    use tempfile::tempdir;

    fn descriptor() -> CorpusDescriptor {
        Corpus::new(
            Category::BinaryLike,
            "binary_00.txt",
            CorpusParams::Uniform {
                alphabet: Alphabet::Binary,
                draw: 0,
            },
            None,
            b"0101".to_vec(),
        )
        .unwrap()
        .descriptor()
        .clone()
    }

    #[test]
    fn test_artifact_paths_unique_per_config() {
        let dir = Path::new("/work");
        let corpus = descriptor();
        let a = ArtifactPaths::new(dir, &corpus, &"000".parse().unwrap());
        let b = ArtifactPaths::new(dir, &corpus, &"111".parse().unwrap());
        assert_eq!(a.compressed, dir.join("binary_like__binary_00.000.cmp"));
        assert_eq!(a.restored, dir.join("binary_like__binary_00.000.out"));
        assert_ne!(a.compressed, b.compressed);
    }

    #[test]
    fn test_command_line() {
        let compressor = Compressor::new("/bin/compressor", None);
        let config: PipelineConfig = "101".parse().unwrap();
        let command = compressor.command(
            Operation::Decompress,
            Path::new("in.cmp"),
            Path::new("out.txt"),
            &config,
        );
        let args: Vec<&str> = command
            .arguments()
            .iter()
            .map(|a| a.to_str().unwrap())
            .collect();
        assert_eq!(args, vec!["d", "in.cmp", "out.txt", "1", "0", "1"]);
    }

    #[test]
    fn test_compare_files() {
        let dir = tempdir().unwrap();
        let a = dir.path().join("a");
        let b = dir.path().join("b");

        let data: Vec<u8> = (0..200_000u32).map(|i| (i % 251) as u8).collect();
        fs::write(&a, &data).unwrap();
        fs::write(&b, &data).unwrap();
        assert_eq!(compare_files(&a, &b).unwrap(), None);

        let mut changed = data.clone();
        changed[150_000] ^= 1;
        fs::write(&b, &changed).unwrap();
        let m = compare_files(&a, &b).unwrap().unwrap();
        assert_eq!(m.offset, 150_000);

        fs::write(&b, &data[..1000]).unwrap();
        let m = compare_files(&a, &b).unwrap().unwrap();
        assert_eq!(m.offset, 1000);
        assert_eq!(m.expected_len, 200_000);
        assert_eq!(m.actual_len, 1000);
    }

    #[test]
    fn test_unwritten_corpus_is_io_failure() {
        let compressor = Compressor::new("/bin/true", None);
        let corpus = descriptor();
        let artifacts = ArtifactPaths::new(Path::new("/tmp"), &corpus, &"0".parse().unwrap());
        let err = compressor
            .compress_once(&corpus, &"0".parse().unwrap(), &artifacts)
            .unwrap_err();
        assert!(matches!(err, RunFailure::Io { .. }));
    }

    #[test]
    fn test_tool_failure_mapping() {
        let program = Path::new("/bin/compressor");
        let timeout = Some(Duration::from_secs(2));

        let spawn = ToolError::Spawn(io::Error::new(io::ErrorKind::NotFound, "no such file"));
        assert_eq!(
            tool_failure(spawn, program, Operation::Compress, timeout).kind(),
            FailureKind::Spawn
        );

        let wait = ToolError::Wait(io::Error::new(io::ErrorKind::Interrupted, "wait failed"));
        let failure = tool_failure(wait, program, Operation::Decompress, timeout);
        assert_eq!(failure.kind(), FailureKind::Io);
        assert!(failure.to_string().contains("decompress"));

        let expired = ToolError::Timeout(Duration::from_secs(3));
        assert_eq!(
            tool_failure(expired, program, Operation::Compress, timeout),
            RunFailure::Timeout {
                operation: Operation::Compress,
                timeout_secs: 2.0,
            }
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_empty_artifact_for_non_empty_corpus() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempdir().unwrap();
        let script = dir.path().join("truncate.sh");
        fs::write(&script, "#!/bin/sh\n: > \"$3\"\n").unwrap();
        fs::set_permissions(&script, fs::Permissions::from_mode(0o755)).unwrap();

        let corpus = Corpus::new(
            Category::BinaryLike,
            "binary_00.txt",
            CorpusParams::Uniform {
                alphabet: Alphabet::Binary,
                draw: 0,
            },
            None,
            b"0101".to_vec(),
        )
        .unwrap()
        .write_to(dir.path())
        .unwrap();
        let config: PipelineConfig = "0".parse().unwrap();
        let artifacts = ArtifactPaths::new(dir.path(), &corpus, &config);

        let err = Compressor::new(&script, None)
            .compress_once(&corpus, &config, &artifacts)
            .unwrap_err();
        assert_eq!(err.kind(), FailureKind::EmptyArtifact);
    }
}
