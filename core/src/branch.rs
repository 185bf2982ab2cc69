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

//! C3 — Branch registry.
//!
//! Two indices over the same branches: by display name and by source
//! path-prefix, per spec.md section 4.3. Modeled after
//! `original_source/src/gitutil.h`'s `Repository::branches_by_name` /
//! `branches_by_path` maps, generalized from raw pointers to an index-based
//! handle the way the teacher's code favors small `Copy` ids
//! (`CommitId`/`TreeId` in `backend.rs`) over shared pointers for lookup
//! keys.

use std::collections::BTreeMap;

use indexmap::IndexMap;

use crate::object_store::ObjectId;

/// spec.md section 4.8: Unborn -> Active -> (tags only) Sealed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BranchState {
    Unborn,
    Active,
    Sealed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BranchId(usize);

#[derive(Debug, Clone)]
pub struct Branch {
    pub display_name: String,
    pub prefix: String,
    pub is_tag: bool,
    pub state: BranchState,
    pub head: Option<ObjectId>,
    /// Set when a node lands under this branch's prefix during the
    /// in-flight revision; drained by the commit driver at revision end.
    pub pending: bool,
    /// The commit this branch's head pointed to immediately after each
    /// revision that advanced it. Consulted when a *different* branch is
    /// born from a whole-branch copy of this one (spec.md section 8 S2:
    /// the new branch's first commit parents onto the copy source's commit
    /// at that revision), not for this branch's own continuation.
    pub head_history: BTreeMap<u32, ObjectId>,
}

impl Branch {
    fn new(display_name: impl Into<String>, prefix: impl Into<String>, is_tag: bool) -> Self {
        Self {
            display_name: display_name.into(),
            prefix: prefix.into(),
            is_tag,
            state: BranchState::Unborn,
            head: None,
            pending: false,
            head_history: BTreeMap::new(),
        }
    }

    /// The commit this branch pointed to as of `revision`, i.e. the most
    /// recent entry in `head_history` at or before `revision`.
    pub fn head_as_of(&self, revision: u32) -> Option<&ObjectId> {
        self.head_history.range(..=revision).next_back().map(|(_, id)| id)
    }

    pub fn refname(&self) -> String {
        if self.is_tag {
            format!("refs/tags/{}", self.display_name)
        } else {
            format!("refs/heads/{}", self.display_name)
        }
    }
}

#[derive(Debug)]
pub struct BranchRegistry {
    branches: Vec<Branch>,
    by_name: IndexMap<String, BranchId>,
    /// Insertion order is preserved; longest-prefix-match ties are broken by
    /// scanning in this order and never overwriting an equally-long match.
    by_prefix_order: Vec<BranchId>,
    flat_history: BranchId,
}

impl BranchRegistry {
    /// Registers the default `master` branch (empty prefix) and the
    /// `flat-history` audit branch (spec.md section 6), matching the order
    /// `ConvertRepository`'s constructor builds them in
    /// original_source/src/converter.h.
    pub fn new() -> Self {
        let mut reg = Self {
            branches: Vec::new(),
            by_name: IndexMap::new(),
            by_prefix_order: Vec::new(),
            flat_history: BranchId(0),
        };
        reg.register("master", "", false);
        reg.flat_history = reg.register("flat-history", "", false);
        reg
    }

    pub fn register(&mut self, display_name: &str, prefix: &str, is_tag: bool) -> BranchId {
        if let Some(&id) = self.by_name.get(display_name) {
            return id;
        }
        let id = BranchId(self.branches.len());
        self.branches.push(Branch::new(display_name, prefix, is_tag));
        self.by_name.insert(display_name.to_string(), id);
        self.by_prefix_order.push(id);
        id
    }

    pub fn flat_history(&self) -> BranchId {
        self.flat_history
    }

    pub fn default_branch(&self) -> BranchId {
        BranchId(0)
    }

    pub fn get(&self, id: BranchId) -> &Branch {
        &self.branches[id.0]
    }

    pub fn get_mut(&mut self, id: BranchId) -> &mut Branch {
        &mut self.branches[id.0]
    }

    pub fn find_by_name(&self, name: &str) -> Option<BranchId> {
        self.by_name.get(name).copied()
    }

    pub fn iter_ids(&self) -> impl Iterator<Item = BranchId> + '_ {
        (0..self.branches.len()).map(BranchId)
    }

    /// Longest-prefix match against `path`, excluding the reserved
    /// `flat-history` audit branch (it never claims ordinary paths — every
    /// revision is routed to it separately, see spec.md section 6). Falls
    /// back to the default branch (empty prefix) with the full path as
    /// subpath when nothing more specific matches.
    pub fn classify<'a>(&self, path: &'a str) -> (BranchId, &'a str) {
        let mut best: Option<(BranchId, usize)> = None;
        for &id in &self.by_prefix_order {
            if id == self.flat_history {
                continue;
            }
            let prefix = &self.branches[id.0].prefix;
            let matches = if prefix.is_empty() {
                true
            } else {
                path == prefix.as_str() || path.starts_with(&format!("{prefix}/"))
            };
            if !matches {
                continue;
            }
            let len = prefix.len();
            match best {
                Some((_, best_len)) if best_len >= len => {}
                _ => best = Some((id, len)),
            }
        }
        let (id, prefix_len) = best.unwrap_or((self.default_branch(), 0));
        let subpath = if prefix_len == 0 {
            path
        } else {
            path[prefix_len..].trim_start_matches('/')
        };
        (id, subpath)
    }
}

impl Default for BranchRegistry {
    fn default() -> Self {
        Self::new()
    }
}
