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

//! C4 — Revision tree cache.
//!
//! Retains the whole-repository working root as it stood after each
//! revision, so later revisions can resolve `copy_source = (src_rev,
//! src_path)` against it (spec.md section 4.4). Snapshotting is just an
//! `Rc` clone of the root handle — the real cost of retention is keeping
//! old subtrees reachable at all, not copying them, thanks to the
//! structural sharing in `entry.rs`.
//!
//! Retention is driven by the oldest source revision still referenced by a
//! pending copy, never a fixed window, per spec.md section 4.4.

use std::collections::BTreeMap;

use crate::entry::{lookup, EntryRef};
use crate::error::{ConvertError, ConvertResult};

#[derive(Debug, Default)]
pub struct RevisionTreeCache {
    snapshots: BTreeMap<u32, EntryRef>,
}

impl RevisionTreeCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, revision: u32, root: EntryRef) {
        self.snapshots.insert(revision, root);
    }

    /// Resolves `(src_rev, src_path)` against the retained snapshot,
    /// spec.md section 4.6's copy resolution. `CopySourceMissing` covers
    /// both "revision not retained" and "path absent in that snapshot".
    pub fn resolve(&self, src_rev: u32, src_path: &str) -> ConvertResult<EntryRef> {
        let root = self
            .snapshots
            .get(&src_rev)
            .ok_or_else(|| ConvertError::CopySourceMissing {
                src_rev,
                src_path: src_path.to_string(),
            })?;
        let found = lookup(root, src_path)?.ok_or_else(|| ConvertError::CopySourceMissing {
            src_rev,
            src_path: src_path.to_string(),
        })?;
        Ok(found.clone())
    }

    /// Drops every snapshot strictly older than `min_needed`, the smallest
    /// source revision still referenced by a pending copy operation.
    pub fn prune(&mut self, min_needed: u32) {
        self.snapshots.retain(|&rev, _| rev >= min_needed);
    }

    pub fn contains(&self, revision: u32) -> bool {
        self.snapshots.contains_key(&revision)
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::{update, Entry};
    use crate::object_store::{mode, ObjectId};
    use assert_matches::assert_matches;

    #[test]
    fn resolve_missing_revision_reports_copy_source_missing() {
        let cache = RevisionTreeCache::new();
        let err = cache.resolve(1, "a.txt").unwrap_err();
        assert_matches!(err, ConvertError::CopySourceMissing { .. });
    }

    #[test]
    fn prune_drops_only_older_snapshots() {
        let mut root = Entry::empty_subtree();
        update(&mut root, "a.txt", Entry::new_blob(ObjectId::new(vec![1]), mode::BLOB)).unwrap();

        let mut cache = RevisionTreeCache::new();
        cache.insert(1, root.clone());
        cache.insert(2, root.clone());
        cache.insert(3, root);

        cache.prune(2);
        assert!(!cache.contains(1));
        assert!(cache.contains(2));
        assert!(cache.contains(3));
    }
}
