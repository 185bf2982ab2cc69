// Copyright 2026 The Dumpgraft Authors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
// https://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Optional TOML config file overriding the branch convention and the
//! `emit_empty_commits` policy (spec.md section 9's open question). Absent a
//! config file, [`dumpgraft_core::convert::ConverterConfig::default`] wins.
//!
//! ```toml
//! emit_empty_commits = false
//!
//! [branch_convention]
//! trunk = "trunk"
//! branches = "branches"
//! tags = "tags"
//! ```

use std::path::Path;

use anyhow::{Context, Result};
use dumpgraft_core::commit_driver::CommitPolicy;
use dumpgraft_core::convert::ConverterConfig;
use dumpgraft_core::path_classifier::BranchConvention;

pub fn load(path: &Path) -> Result<ConverterConfig> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading config file {}", path.display()))?;
    parse(&text).with_context(|| format!("parsing config file {}", path.display()))
}

fn parse(text: &str) -> Result<ConverterConfig> {
    let doc: toml_edit::DocumentMut = text.parse().context("invalid TOML")?;

    let mut convention = BranchConvention::default();
    if let Some(table) = doc.get("branch_convention").and_then(|item| item.as_table()) {
        if let Some(v) = table.get("trunk").and_then(|i| i.as_str()) {
            convention.trunk_segment = v.to_string();
        }
        if let Some(v) = table.get("branches").and_then(|i| i.as_str()) {
            convention.branches_segment = v.to_string();
        }
        if let Some(v) = table.get("tags").and_then(|i| i.as_str()) {
            convention.tags_segment = v.to_string();
        }
    }

    let emit_empty_commits = doc
        .get("emit_empty_commits")
        .and_then(|item| item.as_bool())
        .unwrap_or(false);

    Ok(ConverterConfig {
        convention,
        policy: CommitPolicy { emit_empty_commits },
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_when_sections_are_absent() {
        let config = parse("").unwrap();
        assert_eq!(config.convention.trunk_segment, "trunk");
        assert!(!config.policy.emit_empty_commits);
    }

    #[test]
    fn overrides_branch_convention_and_empty_commit_policy() {
        let text = r#"
            emit_empty_commits = true

            [branch_convention]
            trunk = "mainline"
            branches = "streams"
            tags = "releases"
        "#;
        let config = parse(text).unwrap();
        assert_eq!(config.convention.trunk_segment, "mainline");
        assert_eq!(config.convention.branches_segment, "streams");
        assert_eq!(config.convention.tags_segment, "releases");
        assert!(config.policy.emit_empty_commits);
    }
}
