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

//! C2 — Entry model: the in-memory working tree.
//!
//! Generalizes the teacher's `TreeBuilder` (override-map over a single base
//! tree, `tree_builder.rs`) into the eagerly-mutable, lazily-hashed tree
//! spec.md section 3 and section 4.2 call for, closer to
//! `original_source/src/gitutil.h`'s `Git::Tree`: a subtree owns a name→Entry
//! map directly, carries a `modified` bit, and is only re-hashed on `write`
//! when something under it changed.
//!
//! Structural sharing across copies is expressed with `Rc`: cloning a
//! subtree clones its child map (cheap — one `Rc` bump per child) without
//! touching the children themselves. A child is only deep-copied the moment
//! something tries to mutate it while shared, via [`Rc::make_mut`].

use std::collections::BTreeMap;
use std::rc::Rc;

use crate::error::{ConvertError, ConvertResult};
use crate::object_store::{mode, ObjectId, ObjectStore, TreeEntry};

/// Reference-counted handle to an [`Entry`]. Cheap to clone; mutation goes
/// through [`Rc::make_mut`] so sharing is copy-on-write.
pub type EntryRef = Rc<Entry>;

/// A node of the working tree: blob, subtree, or embedded commit reference.
/// Matches the three Entry kinds of spec.md section 3.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Entry {
    Blob { id: ObjectId, mode: u32 },
    Subtree(Subtree),
    CommitRef { id: ObjectId },
}

impl Entry {
    pub fn new_blob(id: ObjectId, mode: u32) -> EntryRef {
        Rc::new(Self::Blob { id, mode })
    }

    pub fn new_commit_ref(id: ObjectId) -> EntryRef {
        Rc::new(Self::CommitRef { id })
    }

    pub fn empty_subtree() -> EntryRef {
        Rc::new(Self::Subtree(Subtree::default()))
    }

    pub fn as_subtree(&self) -> Option<&Subtree> {
        match self {
            Self::Subtree(s) => Some(s),
            _ => None,
        }
    }

    /// A Blob's hash is set at construction and is immutable (invariant 4);
    /// a CommitRef is likewise always already-written. Only a Subtree's
    /// `written` state can be false.
    pub fn is_written(&self) -> bool {
        match self {
            Self::Blob { .. } | Self::CommitRef { .. } => true,
            Self::Subtree(s) => s.written_id.is_some() && !s.modified,
        }
    }
}

/// Directory-like Entry. `children` is a `BTreeMap` so iteration order is
/// always ASCII byte order of the basename (invariant satisfied for free,
/// matching spec.md section 4.7's "children emitted in ASCII-byte order").
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Subtree {
    children: BTreeMap<String, EntryRef>,
    modified: bool,
    written_id: Option<ObjectId>,
}

impl Subtree {
    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&EntryRef> {
        self.children.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &EntryRef)> {
        self.children.iter().map(|(k, v)| (k.as_str(), v))
    }
}

fn split_first(path: &str) -> Option<(&str, &str)> {
    if path.is_empty() {
        return None;
    }
    match path.split_once('/') {
        Some((head, rest)) => Some((head, rest)),
        None => Some((path, "")),
    }
}

/// `lookup`, spec.md section 4.2. `root` need not itself be a Subtree's
/// Entry wrapper — callers always start from `Entry::Subtree`.
pub fn lookup<'a>(root: &'a EntryRef, path: &str) -> ConvertResult<Option<&'a EntryRef>> {
    let Entry::Subtree(sub) = root.as_ref() else {
        unreachable!("lookup must start from a Subtree");
    };
    let Some((head, rest)) = split_first(path) else {
        return Ok(None);
    };
    let Some(child) = sub.get(head) else {
        return Ok(None);
    };
    if rest.is_empty() {
        return Ok(Some(child));
    }
    match child.as_ref() {
        Entry::Subtree(_) => lookup(child, rest),
        _ => Err(ConvertError::NotADirectory(path.to_string())),
    }
}

fn mark_modified(entry: &mut EntryRef) {
    if let Entry::Subtree(sub) = Rc::make_mut(entry) {
        sub.modified = true;
        sub.written_id = None;
    }
}

/// `update`, spec.md section 4.2: installs `value` at `path`, creating
/// intermediate subtrees as needed, replacing any existing entry of the same
/// name. An empty `path` merges `value` (which must be a Subtree) into
/// `root` rather than replacing it (invariant 3).
pub fn update(root: &mut EntryRef, path: &str, value: EntryRef) -> ConvertResult<()> {
    let Some((head, rest)) = split_first(path) else {
        let Entry::Subtree(incoming) = value.as_ref() else {
            return Err(ConvertError::NotADirectory(
                "merge target must be a subtree".to_string(),
            ));
        };
        let incoming_children = incoming.children.clone();
        mark_modified(root);
        if let Entry::Subtree(sub) = Rc::make_mut(root) {
            for (name, entry) in incoming_children {
                sub.children.insert(name, entry);
            }
        }
        return Ok(());
    };

    mark_modified(root);
    let Entry::Subtree(sub) = Rc::make_mut(root) else {
        unreachable!("update must start from a Subtree");
    };

    if rest.is_empty() {
        sub.children.insert(head.to_string(), value);
        return Ok(());
    }

    let child = sub
        .children
        .entry(head.to_string())
        .or_insert_with(Entry::empty_subtree);
    if !matches!(child.as_ref(), Entry::Subtree(_)) {
        return Err(ConvertError::NotADirectory(path.to_string()));
    }
    update(child, rest, value)
}

/// `remove`, spec.md section 4.2. An empty `path` clears all children of
/// `root`. Intermediate subtrees are never pruned just because they became
/// empty — callers that want that do it themselves.
pub fn remove(root: &mut EntryRef, path: &str) -> ConvertResult<()> {
    let Some((head, rest)) = split_first(path) else {
        mark_modified(root);
        if let Entry::Subtree(sub) = Rc::make_mut(root) {
            sub.children.clear();
        }
        return Ok(());
    };

    mark_modified(root);
    let Entry::Subtree(sub) = Rc::make_mut(root) else {
        unreachable!("remove must start from a Subtree");
    };

    if rest.is_empty() {
        if sub.children.remove(head).is_none() {
            return Err(ConvertError::NotFound(path.to_string()));
        }
        return Ok(());
    }

    let Some(child) = sub.children.get_mut(head) else {
        return Err(ConvertError::NotFound(path.to_string()));
    };
    if !matches!(child.as_ref(), Entry::Subtree(_)) {
        return Err(ConvertError::NotADirectory(path.to_string()));
    }
    remove(child, rest)
}

/// `write`, spec.md section 4.2: no-op if already written; otherwise writes
/// every child bottom-up (lexicographic, for free via `BTreeMap`) then calls
/// `put_tree`, clearing `modified` and caching the resulting hash.
pub fn write(root: &mut EntryRef, store: &mut dyn ObjectStore) -> ConvertResult<ObjectId> {
    if let Entry::Subtree(sub) = root.as_ref() {
        if let Some(id) = &sub.written_id {
            if !sub.modified {
                return Ok(id.clone());
            }
        }
    } else {
        unreachable!("write must start from a Subtree");
    }

    let inner = Rc::make_mut(root);
    let Entry::Subtree(sub) = inner else {
        unreachable!()
    };

    let mut tree_entries = Vec::with_capacity(sub.children.len());
    for (name, child) in sub.children.iter_mut() {
        let (entry_mode, id) = match child.as_ref() {
            Entry::Blob { id, mode } => (*mode, id.clone()),
            Entry::CommitRef { id } => (mode::COMMIT, id.clone()),
            Entry::Subtree(_) => {
                let id = write(child, store)?;
                (mode::SUBTREE, id)
            }
        };
        tree_entries.push(TreeEntry {
            name: name.clone(),
            mode: entry_mode,
            id,
        });
    }

    let id = store.put_tree(&tree_entries)?;
    sub.written_id = Some(id.clone());
    sub.modified = false;
    Ok(id)
}

/// Writes the Subtree reached by `path` (root itself if `path` is empty),
/// caching the result back into `root`'s own structure rather than into a
/// detached clone. This matters because the branch whose prefix is `path`
/// may be a strict subset of `root` — we still want the hash cached where
/// later revisions (and the `flat-history` branch's full-root write) will
/// find it already done.
pub fn write_at(root: &mut EntryRef, path: &str, store: &mut dyn ObjectStore) -> ConvertResult<ObjectId> {
    let Some((head, rest)) = split_first(path) else {
        return write(root, store);
    };
    let Entry::Subtree(sub) = Rc::make_mut(root) else {
        unreachable!("write_at must start from a Subtree");
    };
    let Some(child) = sub.children.get_mut(head) else {
        return Err(ConvertError::NotFound(path.to_string()));
    };
    if !matches!(child.as_ref(), Entry::Subtree(_)) {
        return Err(ConvertError::NotADirectory(path.to_string()));
    }
    write_at(child, rest, store)
}

/// Copy-on-rename for a Blob: reuses the hash, never re-hashes (invariant
/// 4). Copying a Subtree is just an `Rc` clone of the handle — the
/// structural-sharing story is the same one `update`/`write` rely on: the
/// copy starts fully shared with its source and only diverges (via
/// `Rc::make_mut`) where a later mutation touches it.
pub fn copy_to_name(entry: &EntryRef) -> EntryRef {
    Rc::clone(entry)
}
