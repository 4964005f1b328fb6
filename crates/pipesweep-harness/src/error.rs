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

//! Error types for the sweep harness.
//!
//! Two layers:
//!
//! - [`RunFailure`]: one (corpus, configuration) run failed. Recoverable; the
//!   run is excluded from the results and the sweep continues.
//! - [`HarnessError`]: the sweep itself cannot continue (result sink I/O,
//!   schema mismatch, bad configuration, unreadable manifest).

use crate::compressor::Operation;
use pipesweep_corpus::CorpusError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for fatal harness operations.
pub type Result<T> = std::result::Result<T, HarnessError>;

/// Fatal sweep errors.
#[derive(Error, Debug, Clone)]
pub enum HarnessError {
    /// Writing to the result table failed.
    #[error("Result sink error for '{path}': {message}")]
    Sink {
        /// Table path
        path: PathBuf,
        /// The error message
        message: String,
    },

    /// An existing table was written with a different schema.
    #[error("Result table '{path}' has header [{found}], expected [{expected}]")]
    HeaderMismatch {
        /// Table path
        path: PathBuf,
        /// Expected header, comma separated
        expected: String,
        /// Header found in the file, comma separated
        found: String,
    },

    /// Invalid sweep configuration.
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// The corpus manifest could not be read.
    #[error("Manifest error: {0}")]
    Manifest(String),

    /// Filesystem operation outside the result table failed.
    #[error("I/O error for '{path}': {message}")]
    Io {
        /// Path involved in the failed operation
        path: PathBuf,
        /// The error message
        message: String,
    },
}

impl HarnessError {
    /// Create a sink error with path context.
    pub fn sink(path: impl Into<PathBuf>, message: impl fmt::Display) -> Self {
        Self::Sink {
            path: path.into(),
            message: message.to_string(),
        }
    }

    /// Create an I/O error with path context.
    pub fn io_error(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            message: source.to_string(),
        }
    }

    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }
}

impl From<CorpusError> for HarnessError {
    fn from(source: CorpusError) -> Self {
        Self::Manifest(source.to_string())
    }
}

/// Classification of a failed run, used for counting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// The tool could not be started.
    Spawn,
    /// The tool exited with a non-zero status.
    Rejected,
    /// The tool was terminated by a signal.
    Crashed,
    /// The tool exceeded its time budget.
    Timeout,
    /// The tool reported success but produced no output file.
    MissingArtifact,
    /// The compressor reported success but wrote zero bytes for non-empty input.
    EmptyArtifact,
    /// Decompressed bytes differ from the original.
    RoundTripMismatch,
    /// Harness-side file handling failed.
    Io,
}

impl FailureKind {
    /// All kinds, in reporting order.
    pub const ALL: [FailureKind; 8] = [
        Self::Spawn,
        Self::Rejected,
        Self::Crashed,
        Self::Timeout,
        Self::MissingArtifact,
        Self::EmptyArtifact,
        Self::RoundTripMismatch,
        Self::Io,
    ];

    /// Short name used in logs and summaries.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Spawn => "spawn",
            Self::Rejected => "rejected",
            Self::Crashed => "crashed",
            Self::Timeout => "timeout",
            Self::MissingArtifact => "missing_artifact",
            Self::EmptyArtifact => "empty_artifact",
            Self::RoundTripMismatch => "round_trip_mismatch",
            Self::Io => "io",
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single run that failed and was excluded.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RunFailure {
    /// The tool could not be started.
    #[error("Failed to start '{program}': {message}")]
    Spawn {
        /// Program path
        program: PathBuf,
        /// The error message
        message: String,
    },

    /// The tool exited with a non-zero status.
    #[error("{operation} exited with status {code}: {stderr}")]
    Rejected {
        /// Operation that failed
        operation: Operation,
        /// Exit code
        code: i32,
        /// Tail of the tool's stderr
        stderr: String,
    },

    /// The tool was terminated without an exit code.
    #[error("{operation} terminated by signal: {stderr}")]
    Crashed {
        /// Operation that failed
        operation: Operation,
        /// Tail of the tool's stderr
        stderr: String,
    },

    /// The tool exceeded the invocation timeout and was killed.
    #[error("{operation} timed out after {timeout_secs:.1}s")]
    Timeout {
        /// Operation that timed out
        operation: Operation,
        /// Configured timeout in seconds
        timeout_secs: f64,
    },

    /// The tool exited successfully but the expected output is absent.
    #[error("{operation} reported success but '{path}' does not exist")]
    MissingArtifact {
        /// Operation that should have produced the file
        operation: Operation,
        /// Expected output path
        path: PathBuf,
    },

    /// The compressor exited successfully but left an empty artifact.
    #[error("{operation} reported success but '{path}' is empty")]
    EmptyArtifact {
        /// Operation that should have produced the data
        operation: Operation,
        /// Artifact path
        path: PathBuf,
    },

    /// Decompressed output differs from the original corpus.
    #[error("Round trip mismatch at byte {offset} (original {expected_len} bytes, restored {actual_len} bytes)")]
    RoundTripMismatch {
        /// First differing offset
        offset: u64,
        /// Original length
        expected_len: u64,
        /// Restored length
        actual_len: u64,
    },

    /// Harness-side file handling failed.
    #[error("I/O error for '{path}': {message}")]
    Io {
        /// Path involved in the failed operation
        path: PathBuf,
        /// The error message
        message: String,
    },
}

impl RunFailure {
    /// Create an I/O failure with path context.
    pub fn io_error(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            message: source.to_string(),
        }
    }

    /// Kind of the failure.
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::Spawn { .. } => FailureKind::Spawn,
            Self::Rejected { .. } => FailureKind::Rejected,
            Self::Crashed { .. } => FailureKind::Crashed,
            Self::Timeout { .. } => FailureKind::Timeout,
            Self::MissingArtifact { .. } => FailureKind::MissingArtifact,
            Self::EmptyArtifact { .. } => FailureKind::EmptyArtifact,
            Self::RoundTripMismatch { .. } => FailureKind::RoundTripMismatch,
            Self::Io { .. } => FailureKind::Io,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_kinds() {
        let failure = RunFailure::Rejected {
            operation: Operation::Compress,
            code: 2,
            stderr: "bad input".to_string(),
        };
        assert_eq!(failure.kind(), FailureKind::Rejected);
        assert_eq!(failure.to_string(), "compress exited with status 2: bad input");

        let mismatch = RunFailure::RoundTripMismatch {
            offset: 10,
            expected_len: 20,
            actual_len: 20,
        };
        assert_eq!(mismatch.kind(), FailureKind::RoundTripMismatch);
        assert!(mismatch.to_string().contains("byte 10"));
    }

    #[test]
    fn test_empty_artifact_kind() {
        let failure = RunFailure::EmptyArtifact {
            operation: Operation::Compress,
            path: PathBuf::from("work/a.000.cmp"),
        };
        assert_eq!(failure.kind(), FailureKind::EmptyArtifact);
        assert_eq!(failure.kind().as_str(), "empty_artifact");
        assert!(failure.to_string().contains("is empty"));
    }

    #[test]
    fn test_kind_names_unique() {
        let mut names: Vec<&str> = FailureKind::ALL.iter().map(|k| k.as_str()).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), FailureKind::ALL.len());
    }

    #[test]
    fn test_corpus_error_becomes_manifest_error() {
        let err: HarnessError = CorpusError::Serialization("eof".to_string()).into();
        assert!(matches!(err, HarnessError::Manifest(_)));
    }
}
