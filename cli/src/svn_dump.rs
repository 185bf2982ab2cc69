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

//! Dump-stream lexer/parser, the external collaborator spec.md section 1
//! keeps out of the core crate. Reads the `svnadmin dump`-style text format:
//! a header block per record (`Key: value` lines terminated by a blank
//! line), optionally followed by a properties block and raw content bytes
//! whose lengths the headers declare.
//!
//! The whole stream is read up front into `Vec<Revision>` rather than
//! streamed, because `dumpgraft_core::convert::Converter::convert_all` needs
//! the full slice to compute copy-source retention horizons (spec.md
//! section 4.4).

use std::collections::BTreeMap;
use std::io::{BufRead, Read};

use anyhow::{bail, Context, Result};
use dumpgraft_core::dump::{CopySource, Node, NodeAction, NodeKind, Revision};
use dumpgraft_core::object_store::Timestamp;

struct RecordHeaders {
    fields: BTreeMap<String, String>,
}

impl RecordHeaders {
    fn get(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }

    fn len_field(&self, key: &str) -> Result<Option<usize>> {
        self.get(key)
            .map(|v| v.parse::<usize>().context("malformed Content-length header"))
            .transpose()
    }
}

fn read_headers(reader: &mut impl BufRead) -> Result<Option<RecordHeaders>> {
    let mut fields = BTreeMap::new();
    let mut saw_any = false;
    loop {
        let mut line = String::new();
        let read = reader.read_line(&mut line)?;
        if read == 0 {
            return if saw_any {
                bail!("dump stream truncated mid-header")
            } else {
                Ok(None)
            };
        }
        let trimmed = line.trim_end_matches(['\n', '\r']);
        if trimmed.is_empty() {
            if saw_any {
                return Ok(Some(RecordHeaders { fields }));
            }
            continue;
        }
        let Some((key, value)) = trimmed.split_once(':') else {
            bail!("malformed dump header line: {trimmed:?}");
        };
        fields.insert(key.to_string(), value.trim_start().to_string());
        saw_any = true;
    }
}

fn read_exact_bytes(reader: &mut impl BufRead, len: usize) -> Result<Vec<u8>> {
    let mut buf = vec![0u8; len];
    reader.read_exact(&mut buf).context("dump stream truncated mid-content")?;
    Ok(buf)
}

fn node_kind(s: &str) -> Result<NodeKind> {
    match s {
        "file" => Ok(NodeKind::File),
        "dir" => Ok(NodeKind::Dir),
        other => bail!("unknown Node-kind: {other}"),
    }
}

fn node_action(s: &str) -> Result<NodeAction> {
    match s {
        "add" => Ok(NodeAction::Add),
        "change" => Ok(NodeAction::Change),
        "delete" => Ok(NodeAction::Delete),
        "replace" => Ok(NodeAction::Replace),
        other => bail!("unknown Node-action: {other}"),
    }
}

fn timestamp_from_8601(date: &str) -> Timestamp {
    // SVN dumps stamp dates as RFC 3339 in UTC (e.g.
    // "2024-01-02T03:04:05.000000Z"). Fall back to zero on anything else
    // rather than failing the whole conversion over an unparsable date.
    let parsed = chrono::DateTime::parse_from_rfc3339(date)
        .or_else(|_| chrono::DateTime::parse_from_rfc3339(&date.replace(".000000Z", "Z")));
    match parsed {
        Ok(dt) => Timestamp {
            seconds: dt.timestamp(),
            tz_offset_minutes: 0,
        },
        Err(_) => Timestamp { seconds: 0, tz_offset_minutes: 0 },
    }
}

/// Reads an entire dump stream into memory, in revision order.
pub fn read_dump(reader: &mut impl BufRead) -> Result<Vec<Revision>> {
    let version_headers = read_headers(reader)?.context("empty dump stream")?;
    let _ = version_headers
        .get("SVN-fs-dump-format-version")
        .context("missing dump format version header")?;

    let mut revisions: Vec<Revision> = Vec::new();

    while let Some(headers) = read_headers(reader)? {
        if let Some(rev_str) = headers.get("Revision-number") {
            let number: u32 = rev_str.parse().context("malformed Revision-number")?;
            if let Some(len) = headers.len_field("Prop-content-length")? {
                let props_bytes = read_exact_bytes(reader, len)?;
                let props = parse_revision_props(&props_bytes)?;
                let author = props.get("svn:author").cloned();
                let date = props
                    .get("svn:date")
                    .map(|d| timestamp_from_8601(d))
                    .unwrap_or(Timestamp { seconds: 0, tz_offset_minutes: 0 });
                let log = props.get("svn:log").cloned().unwrap_or_default();
                revisions.push(Revision { number, author, date, log, props, nodes: Vec::new() });
            } else {
                revisions.push(Revision {
                    number,
                    author: None,
                    date: Timestamp { seconds: 0, tz_offset_minutes: 0 },
                    log: String::new(),
                    props: BTreeMap::new(),
                    nodes: Vec::new(),
                });
            }
            continue;
        }

        if let Some(path) = headers.get("Node-path") {
            let kind = node_kind(headers.get("Node-kind").context("Node-path without Node-kind")?)?;
            let action = node_action(headers.get("Node-action").context("Node-path without Node-action")?)?;
            let copy_source = match (headers.get("Node-copyfrom-rev"), headers.get("Node-copyfrom-path")) {
                (Some(rev), Some(path)) => Some(CopySource {
                    revision: rev.parse().context("malformed Node-copyfrom-rev")?,
                    path: path.to_string(),
                }),
                _ => None,
            };

            let mut properties = BTreeMap::new();
            if let Some(len) = headers.len_field("Prop-content-length")? {
                let props_bytes = read_exact_bytes(reader, len)?;
                properties = parse_revision_props(&props_bytes)?;
            }
            let content = if let Some(len) = headers.len_field("Text-content-length")? {
                Some(read_exact_bytes(reader, len)?)
            } else {
                None
            };

            let node = Node { kind, action, path: path.to_string(), copy_source, content, properties };
            let current = revisions.last_mut().context("Node-path record before any Revision-number record")?;
            current.nodes.push(node);
            continue;
        }

        bail!("unrecognized dump record: neither Revision-number nor Node-path");
    }

    Ok(revisions)
}

/// Same `K len / key / V len / value / ... PROPS-END` block format used for
/// both revision properties and node properties.
fn parse_revision_props(bytes: &[u8]) -> Result<BTreeMap<String, String>> {
    let mut props = BTreeMap::new();
    let mut cursor = bytes;
    loop {
        let line_end = find_newline(cursor)?;
        let tag_line = std::str::from_utf8(&cursor[..line_end])?;
        cursor = &cursor[line_end + 1..];
        if tag_line == "PROPS-END" {
            break;
        }
        let Some((tag, len)) = tag_line.split_once(' ') else {
            bail!("malformed props directive: {tag_line:?}");
        };
        let len: usize = len.parse().context("malformed props length")?;
        let text = std::str::from_utf8(&cursor[..len])?.to_string();
        cursor = &cursor[len + 1..];
        match tag {
            "K" => {
                let key = text;
                let value_line_end = find_newline(cursor)?;
                let value_tag_line = std::str::from_utf8(&cursor[..value_line_end])?;
                cursor = &cursor[value_line_end + 1..];
                let Some(("V", value_len)) = value_tag_line.split_once(' ') else {
                    bail!("expected V directive after K: {value_tag_line:?}");
                };
                let value_len: usize = value_len.parse().context("malformed props length")?;
                let value = std::str::from_utf8(&cursor[..value_len])?.to_string();
                cursor = &cursor[value_len + 1..];
                props.insert(key, value);
            }
            "D" => {}
            other => bail!("unexpected props directive tag: {other}"),
        }
    }
    Ok(props)
}

fn find_newline(bytes: &[u8]) -> Result<usize> {
    bytes.iter().position(|&b| b == b'\n').context("malformed props block")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::BufReader;

    fn sample() -> &'static str {
        "SVN-fs-dump-format-version: 2\n\n\
         Revision-number: 0\n\
         Prop-content-length: 10\n\
         Content-length: 10\n\
         \n\
         PROPS-END\n\
         \n\
         Revision-number: 1\n\
         Prop-content-length: 56\n\
         Content-length: 56\n\
         \n\
         K 10\n\
         svn:author\n\
         V 6\n\
         jsmith\n\
         K 7\n\
         svn:log\n\
         V 2\n\
         hi\n\
         PROPS-END\n\
         \n\
         Node-path: trunk/a.txt\n\
         Node-kind: file\n\
         Node-action: add\n\
         Text-content-length: 3\n\
         Content-length: 3\n\
         \n\
         hi\n\n"
    }

    #[test]
    fn parses_one_revision_with_one_file_add() {
        let text = sample();
        let mut reader = BufReader::new(text.as_bytes());
        let revisions = read_dump(&mut reader).unwrap();

        assert_eq!(revisions.len(), 2);
        let rev1 = &revisions[1];
        assert_eq!(rev1.number, 1);
        assert_eq!(rev1.author.as_deref(), Some("jsmith"));
        assert_eq!(rev1.nodes.len(), 1);
        assert_eq!(rev1.nodes[0].path, "trunk/a.txt");
        assert_eq!(rev1.nodes[0].content.as_deref(), Some(&b"hi\n"[..]));
    }
}
