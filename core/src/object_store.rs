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

//! C1 — ObjectStore adapter.
//!
//! Wraps the target format's low-level primitives behind a small synchronous
//! trait. Hashing/encoding a blob, tree, or commit, and moving refs, are the
//! target backend's concern; this module only states the contract the rest
//! of the core needs from it. Grounded on the `Backend` trait shape in the
//! teacher's `backend.rs`, narrowed to what spec.md section 4.1 names and
//! made synchronous since the converter has no concurrent callers (spec.md
//! section 5).

use std::fmt;

use crate::error::StoreError;

/// Content hash of a blob, tree, or commit object. The concrete backend
/// decides the hash function and width; the core treats it as opaque bytes.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ObjectId(Vec<u8>);

impl ObjectId {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(&self.0)
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// File-mode bits recorded on a tree entry. Mirrors the modes a target
/// backend based on git object semantics understands; spec.md section 3
/// names the blob default explicitly, the others are carried from
/// original_source/src/gitutil.h's `Blob`/`Tree` constructor defaults.
pub mod mode {
    pub const BLOB: u32 = 0o100644;
    pub const BLOB_EXECUTABLE: u32 = 0o100755;
    pub const SYMLINK: u32 = 0o120000;
    pub const SUBTREE: u32 = 0o040000;
    pub const COMMIT: u32 = 0o160000;
}

/// One entry of a tree about to be written: basename, mode, and the hash of
/// whatever it points to (blob, subtree, or embedded commit).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeEntry {
    pub name: String,
    pub mode: u32,
    pub id: ObjectId,
}

/// Author/committer signature, per spec.md's Commit data model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature {
    pub name: String,
    pub email: String,
    pub timestamp: Timestamp,
}

/// Seconds-since-epoch timestamp with a timezone offset, deliberately not
/// tied to a calendar library in the core — the CLI boundary translates dump
/// timestamps into this shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timestamp {
    pub seconds: i64,
    pub tz_offset_minutes: i32,
}

/// A commit ready to be handed to the backend. `parents` is ordered;
/// `commit_driver.rs` only ever produces zero or one parent, but the type
/// doesn't assume that so a backend used outside this converter (e.g. one
/// that models octopus merges) isn't constrained.
#[derive(Debug, Clone)]
pub struct PendingCommit {
    pub parents: Vec<ObjectId>,
    pub tree: ObjectId,
    pub author: Signature,
    pub committer: Signature,
    pub message: String,
}

/// C1. Exposes exactly the primitives spec.md section 4.1 lists. All
/// operations are synchronous and side-effecting on disk; idempotent where
/// the doc comment says so.
pub trait ObjectStore {
    /// Content-addressed; calling this twice with the same bytes returns the
    /// same id without writing twice.
    fn put_blob(&mut self, bytes: &[u8]) -> Result<ObjectId, StoreError>;

    /// Canonicalizes `entries` into ASCII byte order of `name` before
    /// hashing, regardless of the order they're passed in.
    fn put_tree(&mut self, entries: &[TreeEntry]) -> Result<ObjectId, StoreError>;

    fn put_commit(&mut self, commit: &PendingCommit) -> Result<ObjectId, StoreError>;

    fn set_ref(&mut self, refname: &str, id: &ObjectId) -> Result<(), StoreError>;

    fn read_ref(&self, refname: &str) -> Result<Option<ObjectId>, StoreError>;

    /// Opaque; invoked once at end of run. Backends without a meaningful
    /// notion of GC may no-op.
    fn gc(&mut self) -> Result<(), StoreError>;
}
