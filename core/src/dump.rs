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

//! Dump event shapes the core consumes. Lexing the actual dump file format
//! is an external collaborator (spec.md section 1) — these are just the
//! typed events a reader hands to the apply engine.

use std::collections::BTreeMap;

use crate::object_store::Timestamp;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    File,
    Dir,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeAction {
    Add,
    Change,
    Delete,
    Replace,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CopySource {
    pub revision: u32,
    pub path: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub kind: NodeKind,
    pub action: NodeAction,
    pub path: String,
    pub copy_source: Option<CopySource>,
    pub content: Option<Vec<u8>>,
    pub properties: BTreeMap<String, String>,
}

#[derive(Debug, Clone)]
pub struct Revision {
    pub number: u32,
    pub author: Option<String>,
    pub date: Timestamp,
    pub log: String,
    pub props: BTreeMap<String, String>,
    pub nodes: Vec<Node>,
}
