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

//! Pipeline configurations and stage names.
//!
//! A [`PipelineConfig`] is an ordered tuple of independent on/off toggles,
//! one per optional stage of the external compressor. It is stored as a bit
//! pattern with the first stage in the most significant position, so
//! ascending numeric order is the usual Cartesian product order:
//! `000, 001, 010, ..., 111`.

use crate::error::{HarnessError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

/// Maximum number of stages a sweep can toggle.
pub const MAX_STAGES: usize = 16;

/// Default stage names of the reference pipeline.
pub const DEFAULT_STAGES: [&str; 3] = ["bwt", "mtf", "rle"];

/// An ordered tuple of stage toggles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct PipelineConfig {
    width: u8,
    bits: u16,
}

fn check_width(width: usize) -> Result<()> {
    if width == 0 || width > MAX_STAGES {
        return Err(HarnessError::config(format!(
            "pipeline width must be within 1..={}, got {}",
            MAX_STAGES, width
        )));
    }
    Ok(())
}

impl PipelineConfig {
    /// Builds a configuration from explicit toggles, first stage first.
    pub fn new(toggles: &[bool]) -> Result<Self> {
        check_width(toggles.len())?;
        let bits = toggles
            .iter()
            .fold(0u16, |acc, &on| (acc << 1) | u16::from(on));
        Ok(Self {
            width: toggles.len() as u8,
            bits,
        })
    }

    /// Builds a configuration from a bit pattern of the given width.
    pub fn from_bits(bits: u16, width: usize) -> Result<Self> {
        check_width(width)?;
        if width < MAX_STAGES && bits >> width != 0 {
            return Err(HarnessError::config(format!(
                "bit pattern {:#b} does not fit in {} stages",
                bits, width
            )));
        }
        Ok(Self {
            width: width as u8,
            bits,
        })
    }

    /// Every configuration of `width` stages, in ascending bit order.
    pub fn all(width: usize) -> Result<Vec<Self>> {
        check_width(width)?;
        let count = 1u32 << width;
        Ok((0..count)
            .map(|bits| Self {
                width: width as u8,
                bits: bits as u16,
            })
            .collect())
    }

    /// Removes duplicates, keeping the order of first appearance.
    pub fn dedup(configs: impl IntoIterator<Item = Self>) -> Vec<Self> {
        let mut seen = HashSet::new();
        configs.into_iter().filter(|c| seen.insert(*c)).collect()
    }

    /// Number of stages.
    pub fn width(&self) -> usize {
        usize::from(self.width)
    }

    /// Raw bit pattern.
    pub fn bits(&self) -> u16 {
        self.bits
    }

    /// Whether stage `index` (0 = first) is enabled.
    pub fn is_enabled(&self, index: usize) -> bool {
        index < self.width() && (self.bits >> (self.width() - 1 - index)) & 1 == 1
    }

    /// Toggles, first stage first.
    pub fn toggles(&self) -> Vec<bool> {
        (0..self.width()).map(|i| self.is_enabled(i)).collect()
    }

    /// Positional `0`/`1` arguments for the compressor command line.
    pub fn args(&self) -> Vec<&'static str> {
        self.toggles()
            .into_iter()
            .map(|on| if on { "1" } else { "0" })
            .collect()
    }

    /// Compact tag such as `101`, used in artifact names and tables.
    pub fn tag(&self) -> String {
        self.args().concat()
    }
}

impl fmt::Display for PipelineConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.tag())
    }
}

impl FromStr for PipelineConfig {
    type Err = HarnessError;

    fn from_str(s: &str) -> Result<Self> {
        let toggles = s
            .trim()
            .chars()
            .map(|c| match c {
                '0' => Ok(false),
                '1' => Ok(true),
                other => Err(HarnessError::config(format!(
                    "invalid toggle '{}' in pipeline configuration '{}'",
                    other, s
                ))),
            })
            .collect::<Result<Vec<_>>>()?;
        Self::new(&toggles)
    }
}

impl From<PipelineConfig> for String {
    fn from(config: PipelineConfig) -> Self {
        config.tag()
    }
}

impl TryFrom<String> for PipelineConfig {
    type Error = HarnessError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

/// Ordered names of the toggled stages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct StageSet {
    names: Vec<String>,
}

impl Default for StageSet {
    fn default() -> Self {
        Self {
            names: DEFAULT_STAGES.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl StageSet {
    /// Builds a stage set, checking count and name uniqueness.
    pub fn new(names: Vec<String>) -> Result<Self> {
        check_width(names.len())?;
        let mut seen = HashSet::new();
        for name in &names {
            let valid = !name.is_empty()
                && name
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
            if !valid {
                return Err(HarnessError::config(format!("invalid stage name '{}'", name)));
            }
            if !seen.insert(name.as_str()) {
                return Err(HarnessError::config(format!("duplicate stage name '{}'", name)));
            }
        }
        Ok(Self { names })
    }

    /// Parses a comma separated list such as `bwt,mtf,rle`.
    pub fn parse(list: &str) -> Result<Self> {
        Self::new(list.split(',').map(|s| s.trim().to_string()).collect())
    }

    /// Stage names in order.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Number of stages.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Always false; a stage set has at least one stage.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// The full Cartesian product of toggles for these stages.
    pub fn all_configs(&self) -> Vec<PipelineConfig> {
        PipelineConfig::all(self.len()).unwrap_or_default()
    }

    /// Checks that a configuration has one toggle per stage.
    pub fn check(&self, config: &PipelineConfig) -> Result<()> {
        if config.width() != self.len() {
            return Err(HarnessError::config(format!(
                "configuration {} has {} toggles but {} stages are defined",
                config,
                config.width(),
                self.len()
            )));
        }
        Ok(())
    }
}

impl TryFrom<Vec<String>> for StageSet {
    type Error = HarnessError;

    fn try_from(names: Vec<String>) -> Result<Self> {
        Self::new(names)
    }
}

impl From<StageSet> for Vec<String> {
    fn from(stages: StageSet) -> Self {
        stages.names
    }
}
