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

//! C6 — Apply engine.
//!
//! Translates one dump node into mutations on the current in-flight working
//! tree (spec.md section 4.6), and runs the prescan pass that registers new
//! branches/tags before any node in a revision is applied.

use std::collections::{HashMap, HashSet};

use crate::branch::{BranchId, BranchRegistry};
use crate::dump::{CopySource, Node, NodeAction, NodeKind, Revision};
use crate::entry::{self, copy_to_name, lookup, Entry, EntryRef};
use crate::error::{ConvertError, ConvertResult};
use crate::object_store::{mode, ObjectId, ObjectStore};
use crate::path_classifier::BranchConvention;
use crate::revision_cache::RevisionTreeCache;

/// Which branches were touched by a revision's nodes, split the way
/// `commit_driver.rs` needs: branches whose tree actually changed always
/// get a commit; branches merely *mentioned* (e.g. a property-only `dir
/// change`) only get one if `emit_empty_commits` is set.
#[derive(Debug, Default)]
pub struct RevisionEffects {
    pub structurally_modified: HashSet<BranchId>,
    pub referenced: HashSet<BranchId>,
    /// Destination branch -> (source branch, source revision), recorded
    /// when a directory Add's copy source is exactly another branch's root
    /// (spec.md section 8 S2: a branch born from a whole-branch copy
    /// parents onto that source commit). The commit driver consults this
    /// only for a branch's very first commit.
    pub branch_parent_hints: HashMap<BranchId, (BranchId, u32)>,
}

/// Per spec.md section 4.6: registers any branch/tag a node's path implies
/// for the first time. Existing registrations are left untouched
/// (`BranchRegistry::register` is idempotent by name).
pub fn prescan_branches(registry: &mut BranchRegistry, convention: &BranchConvention, revision: &Revision) {
    for node in &revision.nodes {
        convention.ensure_registered(registry, &node.path);
        if let Some(src) = &node.copy_source {
            convention.ensure_registered(registry, &src.path);
        }
    }
}

/// For every `src_rev` any node in `revisions` copies from, the largest
/// revision number that still references it. Drives the cache's retention
/// floor (spec.md section 4.4) without guessing a fixed window: a snapshot
/// is safe to drop only once no later revision can still reach for it.
pub fn copy_source_horizons(revisions: &[Revision]) -> HashMap<u32, u32> {
    let mut horizons: HashMap<u32, u32> = HashMap::new();
    for revision in revisions {
        for node in &revision.nodes {
            if let Some(CopySource { revision: src_rev, .. }) = &node.copy_source {
                horizons
                    .entry(*src_rev)
                    .and_modify(|h| *h = (*h).max(revision.number))
                    .or_insert(revision.number);
            }
        }
    }
    horizons
}

/// Applies one node to `root`, recording which branch(es) it touched in
/// `effects`. `store` is needed only to hash new blob content — tree hashing
/// itself is deferred to the commit driver's `write()` pass.
pub fn apply_node(
    root: &mut EntryRef,
    registry: &BranchRegistry,
    cache: &RevisionTreeCache,
    store: &mut dyn ObjectStore,
    node: &Node,
    effects: &mut RevisionEffects,
) -> ConvertResult<()> {
    let (branch_id, _) = registry.classify(&node.path);
    effects.referenced.insert(branch_id);

    match (node.kind, node.action) {
        (NodeKind::File, NodeAction::Add) => apply_file_add(root, cache, store, node, effects, branch_id)?,
        (NodeKind::File, NodeAction::Change) => apply_file_change(root, store, node, effects, branch_id)?,
        (NodeKind::File, NodeAction::Delete) => apply_delete(root, node, effects, branch_id)?,
        (NodeKind::File, NodeAction::Replace) => {
            let _ = entry::remove(root, &node.path);
            apply_file_add(root, cache, store, node, effects, branch_id)?;
        }
        (NodeKind::Dir, NodeAction::Add) => {
            apply_dir_add_with_registry(root, Some(registry), cache, node, effects, branch_id)?
        }
        (NodeKind::Dir, NodeAction::Change) => {
            // Structural no-op: property-only changes are not represented
            // in the working tree at all (spec.md section 4.6's table).
        }
        (NodeKind::Dir, NodeAction::Delete) => apply_delete(root, node, effects, branch_id)?,
        (NodeKind::Dir, NodeAction::Replace) => {
            let _ = entry::remove(root, &node.path);
            apply_dir_add_with_registry(root, Some(registry), cache, node, effects, branch_id)?;
        }
    }
    Ok(())
}

fn blob_mode(node: &Node) -> u32 {
    if node.properties.get("svn:executable").is_some() {
        mode::BLOB_EXECUTABLE
    } else {
        mode::BLOB
    }
}

fn apply_file_add(
    root: &mut EntryRef,
    cache: &RevisionTreeCache,
    store: &mut dyn ObjectStore,
    node: &Node,
    effects: &mut RevisionEffects,
    branch_id: BranchId,
) -> ConvertResult<()> {
    let incoming = if let Some(src) = &node.copy_source {
        copy_to_name(&cache.resolve(src.revision, &src.path)?)
    } else {
        let content = node.content.as_deref().unwrap_or(&[]);
        let id = store.put_blob(content)?;
        Entry::new_blob(id, blob_mode(node))
    };

    if let Some(existing) = lookup(root, &node.path)? {
        if let (Entry::Blob { id: old, .. }, Entry::Blob { id: new, .. }) =
            (existing.as_ref(), incoming.as_ref())
        {
            if old == new {
                tracing::debug!(path = %node.path, "idempotent re-add of identical blob");
                return Ok(());
            }
        }
    }

    entry::update(root, &node.path, incoming)?;
    effects.structurally_modified.insert(branch_id);
    Ok(())
}

fn apply_file_change(
    root: &mut EntryRef,
    store: &mut dyn ObjectStore,
    node: &Node,
    effects: &mut RevisionEffects,
    branch_id: BranchId,
) -> ConvertResult<()> {
    match lookup(root, &node.path)? {
        Some(existing) if matches!(existing.as_ref(), Entry::Blob { .. }) => {}
        _ => return Err(ConvertError::NotFound(node.path.clone())),
    }
    let content = node.content.as_deref().unwrap_or(&[]);
    let id = store.put_blob(content)?;
    entry::update(root, &node.path, Entry::new_blob(id, blob_mode(node)))?;
    effects.structurally_modified.insert(branch_id);
    Ok(())
}

fn apply_delete(
    root: &mut EntryRef,
    node: &Node,
    effects: &mut RevisionEffects,
    branch_id: BranchId,
) -> ConvertResult<()> {
    entry::remove(root, &node.path)?;
    effects.structurally_modified.insert(branch_id);
    Ok(())
}

/// `registry` is consulted only to detect a whole-branch copy for parent
/// linkage (spec.md section 8 S2); pass `None` when no such linkage is
/// possible (e.g. isolated unit tests of directory-add in this module).
fn apply_dir_add_with_registry(
    root: &mut EntryRef,
    registry: Option<&BranchRegistry>,
    cache: &RevisionTreeCache,
    node: &Node,
    effects: &mut RevisionEffects,
    branch_id: BranchId,
) -> ConvertResult<()> {
    if let (Some(registry), Some(src)) = (registry, &node.copy_source) {
        let (src_branch, src_subpath) = registry.classify(&src.path);
        if src_subpath.is_empty() {
            effects.branch_parent_hints.insert(branch_id, (src_branch, src.revision));
        }
    }
    let incoming = if let Some(src) = &node.copy_source {
        match cache.resolve(src.revision, &src.path) {
            Ok(found) => copy_to_name(&found),
            // spec.md section 7: CopySourceMissing for a *directory* copy
            // degrades to an empty add rather than failing the revision.
            Err(ConvertError::CopySourceMissing { src_rev, src_path }) => {
                tracing::warn!(
                    revision = src_rev,
                    path = %src_path,
                    "directory copy source missing; installing empty directory"
                );
                Entry::empty_subtree()
            }
            Err(other) => return Err(other),
        }
    } else {
        Entry::empty_subtree()
    };

    entry::update(root, &node.path, incoming)?;
    effects.structurally_modified.insert(branch_id);
    Ok(())
}
