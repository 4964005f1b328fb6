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

//! Pipesweep CLI library for command-line parsing and execution.
//!
//! # Commands
//!
//! - **generate**: Write the synthetic corpus suite and its manifest
//! - **sweep**: Run a compressor over every corpus and stage configuration
//! - **validate**: Sweep with round-trip verification of every run
//! - **compare**: Validated sweep plus a `zip` or DEFLATE baseline
//!
//! # Examples
//!
//! ```bash
//! pipesweep generate --out data --preset small
//! pipesweep validate --corpora data --compressor ./compressor --config-bits 000,111
//! pipesweep compare --corpora data --compressor ./compressor --baseline deflate
//! ```

pub mod cli;
pub mod commands;
pub mod error;
