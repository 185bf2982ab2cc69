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

//! C5 — Path classifier.
//!
//! Pure with respect to a given [`BranchRegistry`] snapshot: classifying a
//! path never mutates the registry (spec.md section 4.5). Registering a
//! *new* branch because a path matches the branch convention for the first
//! time is a distinct, explicit step the apply engine's prescan performs
//! (spec.md section 4.6) — kept here because the convention itself (which
//! path shapes mean "branch" or "tag") belongs with path classification.

use crate::branch::{BranchId, BranchRegistry};

/// Configurable branch convention, spec.md section 6. Defaults match
/// Subversion's usual `trunk`/`branches`/`tags` layout.
#[derive(Debug, Clone)]
pub struct BranchConvention {
    pub trunk_segment: String,
    pub branches_segment: String,
    pub tags_segment: String,
}

impl Default for BranchConvention {
    fn default() -> Self {
        Self {
            trunk_segment: "trunk".to_string(),
            branches_segment: "branches".to_string(),
            tags_segment: "tags".to_string(),
        }
    }
}

/// What a path implies about branch/tag boundaries, independent of whether
/// the registry already knows about it.
pub enum Detected {
    Trunk,
    Branch { name: String, prefix: String },
    Tag { name: String, prefix: String },
    None,
}

impl BranchConvention {
    /// Inspects a single path's leading segments for a branch/tag boundary.
    /// Does not look past the second segment — a path `branches/feat/x/y`
    /// and `branches/feat` both detect the same `(feat, "branches/feat")`
    /// boundary.
    pub fn detect(&self, path: &str) -> Detected {
        let mut segments = path.splitn(3, '/');
        let Some(first) = segments.next() else {
            return Detected::None;
        };
        if first == self.trunk_segment {
            return Detected::Trunk;
        }
        let Some(second) = segments.next() else {
            return Detected::None;
        };
        if first == self.branches_segment {
            Detected::Branch {
                name: second.to_string(),
                prefix: format!("{first}/{second}"),
            }
        } else if first == self.tags_segment {
            Detected::Tag {
                name: second.to_string(),
                prefix: format!("{first}/{second}"),
            }
        } else {
            Detected::None
        }
    }

    /// Registers whatever branch/tag `path` implies, if not already known.
    /// `trunk` maps onto the registry's pre-existing `master` branch rather
    /// than creating a new one (spec.md section 6). Existing content under
    /// a newly-registered prefix is left in place; only future events route
    /// there (spec.md section 4.6).
    pub fn ensure_registered(&self, registry: &mut BranchRegistry, path: &str) {
        match self.detect(path) {
            Detected::Trunk => {
                let master = registry.default_branch();
                if registry.get(master).prefix.is_empty() {
                    registry.get_mut(master).prefix = self.trunk_segment.clone();
                }
            }
            Detected::Branch { name, prefix } => {
                registry.register(&name, &prefix, false);
            }
            Detected::Tag { name, prefix } => {
                registry.register(&name, &prefix, true);
            }
            Detected::None => {}
        }
    }
}

/// Thin re-export of `BranchRegistry::classify` so callers can depend on
/// "the path classifier" as a unit without reaching into `branch`.
pub fn classify<'a>(registry: &BranchRegistry, path: &'a str) -> (BranchId, &'a str) {
    registry.classify(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn detects_branch_and_tag_boundaries() {
        let conv = BranchConvention::default();
        assert_matches!(conv.detect("trunk/a.txt"), Detected::Trunk);
        assert_matches!(conv.detect("branches/feat/a.txt"), Detected::Branch { .. });
        assert_matches!(conv.detect("tags/v1/a.txt"), Detected::Tag { .. });
        assert_matches!(conv.detect("misc/a.txt"), Detected::None);
    }

    #[test]
    fn ensure_registered_sets_trunk_prefix_once() {
        let conv = BranchConvention::default();
        let mut reg = BranchRegistry::new();
        conv.ensure_registered(&mut reg, "trunk/a.txt");
        assert_eq!(reg.get(reg.default_branch()).prefix, "trunk");

        conv.ensure_registered(&mut reg, "branches/feat/a.txt");
        assert!(reg.find_by_name("feat").is_some());
    }
}
