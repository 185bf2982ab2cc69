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

//! Parses the authors-map file (spec.md section 6): line-based text,
//! `svn_user = Full Name <email@host>`, `#`-prefixed comments, blank lines
//! ignored. Reading the file is this CLI's job; applying the parsed table
//! (including the unmapped-user fallback) is `dumpgraft_core::authors`'s.

use std::collections::HashMap;
use std::path::Path;

use anyhow::{bail, Context, Result};

pub fn parse(path: &Path) -> Result<HashMap<String, (String, String)>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading authors file {}", path.display()))?;
    parse_str(&text).with_context(|| format!("parsing authors file {}", path.display()))
}

fn parse_str(text: &str) -> Result<HashMap<String, (String, String)>> {
    let mut table = HashMap::new();
    for (lineno, raw_line) in text.lines().enumerate() {
        let line = raw_line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let Some((svn_user, identity)) = line.split_once('=') else {
            bail!("line {}: missing '=' in {:?}", lineno + 1, raw_line);
        };
        let svn_user = svn_user.trim();
        let identity = identity.trim();
        let Some((name, rest)) = identity.split_once('<') else {
            bail!("line {}: expected \"Name <email>\", got {:?}", lineno + 1, identity);
        };
        let Some(email) = rest.strip_suffix('>') else {
            bail!("line {}: identity missing closing '>': {:?}", lineno + 1, identity);
        };
        table.insert(svn_user.to_string(), (name.trim().to_string(), email.trim().to_string()));
    }
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_mapped_users_and_skips_comments_and_blanks() {
        let text = "# comment\n\njsmith = John Smith <js@example.com>\nbwayne=Bruce Wayne<bw@wayne.example>\n";
        let table = parse_str(text).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table["jsmith"], ("John Smith".to_string(), "js@example.com".to_string()));
        assert_eq!(table["bwayne"], ("Bruce Wayne".to_string(), "bw@wayne.example".to_string()));
    }

    #[test]
    fn missing_equals_is_an_error() {
        let err = parse_str("not-a-valid-line\n").unwrap_err();
        assert!(err.to_string().contains("missing '='"));
    }
}
