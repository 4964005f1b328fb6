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

//! Error types for corpus generation.
//!
//! A [`CorpusError`] always concerns a single corpus (or the configuration of
//! a whole suite). Suite generation collects per-corpus errors instead of
//! aborting, so one bad parameter never prevents the rest of the matrix from
//! being produced.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Largest corpus the generators will produce (1 GiB).
///
/// Requests above this limit are rejected before any allocation happens.
pub const MAX_CORPUS_BYTES: usize = 1 << 30;

/// Result type for corpus operations.
pub type Result<T> = std::result::Result<T, CorpusError>;

/// Errors that can occur while generating, writing or loading corpora.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CorpusError {
    /// A generator parameter is outside its valid range.
    #[error("Invalid parameter '{parameter}': {reason}")]
    InvalidParameter {
        /// Parameter name
        parameter: String,
        /// Reason for invalidity
        reason: String,
    },

    /// Generated content contains a byte outside the permitted 7-bit range.
    #[error("Encoding violation in {corpus}: byte 0x{byte:02x} at offset {offset} is not printable ASCII")]
    EncodingViolation {
        /// Corpus identifier (or generator name when no id exists yet)
        corpus: String,
        /// Offset of the first offending byte
        offset: usize,
        /// The offending byte
        byte: u8,
    },

    /// Requested corpus length exceeds [`MAX_CORPUS_BYTES`].
    #[error("Requested corpus length {requested} exceeds maximum allowed limit of {max}")]
    TooLarge {
        /// Requested length in bytes
        requested: usize,
        /// Maximum allowed length in bytes
        max: usize,
    },

    /// Filesystem operation failed.
    #[error("I/O error for '{path}': {message}")]
    Io {
        /// Path involved in the failed operation
        path: PathBuf,
        /// The error message
        message: String,
    },

    /// Manifest or configuration (de)serialization failed.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl CorpusError {
    /// Create an invalid-parameter error.
    pub fn invalid(parameter: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            parameter: parameter.into(),
            reason: reason.into(),
        }
    }

    /// Create an I/O error with path context.
    pub fn io_error(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            message: source.to_string(),
        }
    }
}

impl From<serde_json::Error> for CorpusError {
    fn from(source: serde_json::Error) -> Self {
        Self::Serialization(source.to_string())
    }
}

/// Validate that a requested corpus length is within acceptable limits.
///
/// # Examples
///
/// ```
/// use pipesweep_corpus::error::{validate_corpus_len, MAX_CORPUS_BYTES};
///
/// assert!(validate_corpus_len(1_000_000).is_ok());
/// assert!(validate_corpus_len(MAX_CORPUS_BYTES + 1).is_err());
/// ```
#[inline]
pub fn validate_corpus_len(len: usize) -> Result<()> {
    if len > MAX_CORPUS_BYTES {
        Err(CorpusError::TooLarge {
            requested: len,
            max: MAX_CORPUS_BYTES,
        })
    } else {
        Ok(())
    }
}

/// Validate that a probability-like parameter lies in `[0, 1]`.
pub(crate) fn validate_unit_interval(parameter: &str, value: f64) -> Result<()> {
    if value.is_finite() && (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(CorpusError::invalid(
            parameter,
            format!("must be within [0, 1], got {}", value),
        ))
    }
}
