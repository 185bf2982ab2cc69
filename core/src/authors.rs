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

//! Author resolution. Reading the authors-map *file* is an external
//! collaborator (spec.md section 1); this module only applies an
//! already-parsed `svn_user -> (name, email)` table, including the
//! unmapped-user fallback spec.md section 7 calls `AuthorUnmapped`.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};

/// A resolved identity plus whether it came from the map or the synthetic
/// fallback, so the commit driver can log `AuthorUnmapped` exactly once per
/// user (spec.md section 7).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedAuthor {
    pub name: String,
    pub email: String,
    pub mapped: bool,
}

pub trait AuthorResolver {
    fn resolve(&self, svn_user: &str) -> ResolvedAuthor;
}

/// Default resolver: a parsed `svn_user -> "Name <email>"` table with the
/// `svn_user <svn_user@localhost>` fallback spec.md section 6 specifies.
/// Warns (via `tracing::warn!`) at most once per unmapped user.
#[derive(Debug, Default)]
pub struct AuthorsMap {
    table: HashMap<String, (String, String)>,
    warned: RefCell<HashSet<String>>,
}

impl AuthorsMap {
    pub fn new(table: HashMap<String, (String, String)>) -> Self {
        Self {
            table,
            warned: RefCell::new(HashSet::new()),
        }
    }
}

impl AuthorResolver for AuthorsMap {
    fn resolve(&self, svn_user: &str) -> ResolvedAuthor {
        if let Some((name, email)) = self.table.get(svn_user) {
            return ResolvedAuthor {
                name: name.clone(),
                email: email.clone(),
                mapped: true,
            };
        }
        if self.warned.borrow_mut().insert(svn_user.to_string()) {
            tracing::warn!(user = svn_user, "no authors-map entry; using synthetic identity");
        }
        ResolvedAuthor {
            name: svn_user.to_string(),
            email: format!("{svn_user}@localhost"),
            mapped: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mapped_user_resolves_exactly() {
        let mut table = HashMap::new();
        table.insert(
            "jsmith".to_string(),
            ("John Smith".to_string(), "js@example.com".to_string()),
        );
        let authors = AuthorsMap::new(table);
        let resolved = authors.resolve("jsmith");
        assert_eq!(resolved.name, "John Smith");
        assert_eq!(resolved.email, "js@example.com");
        assert!(resolved.mapped);
    }

    #[test]
    fn unmapped_user_falls_back_to_synthetic_identity() {
        let authors = AuthorsMap::new(HashMap::new());
        let resolved = authors.resolve("nobody");
        assert_eq!(resolved.name, "nobody");
        assert_eq!(resolved.email, "nobody@localhost");
        assert!(!resolved.mapped);
    }
}
