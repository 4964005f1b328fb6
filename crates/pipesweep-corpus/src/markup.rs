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

//! Serialized record formats: JSON lines and tag-delimited events.

use crate::ascii::retain_ascii;
use crate::error::Result;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Record syntax of a markup corpus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkupSyntax {
    /// One JSON object per line.
    Json,
    /// One `<event>` element per line.
    Xml,
}

const JSON_EVENTS: [&str; 3] = ["click", "scroll", "type"];
const XML_ACTIONS: [&str; 3] = ["open", "close", "edit"];

#[derive(Serialize)]
struct EventRecord<'a> {
    user: String,
    id: usize,
    event: &'a str,
    value: u32,
}

fn json_line<R: Rng + ?Sized>(rng: &mut R, id: usize) -> Result<String> {
    let record = EventRecord {
        user: format!("user_{}", id),
        id,
        event: JSON_EVENTS[rng.gen_range(0..JSON_EVENTS.len())],
        value: rng.gen_range(0..=100),
    };
    Ok(serde_json::to_string(&record)?)
}

fn xml_line<R: Rng + ?Sized>(rng: &mut R, id: usize) -> String {
    format!(
        "<event><user>user_{id}</user><id>{id}</id><action>{}</action></event>",
        XML_ACTIONS[rng.gen_range(0..XML_ACTIONS.len())]
    )
}

/// Generates `records` newline-separated records in the given syntax.
pub fn generate_markup<R: Rng + ?Sized>(rng: &mut R, syntax: MarkupSyntax, records: usize) -> Result<Vec<u8>> {
    let mut lines = Vec::with_capacity(records);
    for id in 0..records {
        let line = match syntax {
            MarkupSyntax::Json => json_line(rng, id)?,
            MarkupSyntax::Xml => xml_line(rng, id),
        };
        lines.push(line);
    }
    Ok(retain_ascii(&lines.join("\n")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_json_lines_parse() {
        let mut rng = StdRng::seed_from_u64(69);
        let out = generate_markup(&mut rng, MarkupSyntax::Json, 50).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 50);

        for (i, line) in lines.iter().enumerate() {
            let value: serde_json::Value = serde_json::from_str(line).unwrap();
            assert_eq!(value["id"], i);
            assert_eq!(value["user"], format!("user_{}", i));
            assert!(value["value"].as_u64().unwrap() <= 100);
        }
        assert!(lines[0].starts_with("{\"user\":"));
    }

    #[test]
    fn test_xml_lines() {
        let mut rng = StdRng::seed_from_u64(69);
        let out = generate_markup(&mut rng, MarkupSyntax::Xml, 3).unwrap();
        let text = String::from_utf8(out).unwrap();
        let first = text.lines().next().unwrap();
        assert!(first.starts_with("<event><user>user_0</user><id>0</id><action>"));
        assert!(first.ends_with("</action></event>"));
        assert_eq!(text.lines().count(), 3);
    }

    #[test]
    fn test_empty() {
        let mut rng = StdRng::seed_from_u64(69);
        assert!(generate_markup(&mut rng, MarkupSyntax::Xml, 0).unwrap().is_empty());
    }
}
