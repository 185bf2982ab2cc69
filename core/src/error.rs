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

//! Error kinds for the conversion core, per spec section 7.

use thiserror::Error;

/// Failure returned by an [`crate::object_store::ObjectStore`] implementation.
///
/// Kept separate from [`ConvertError`] because store failures originate
/// below the core's own logic and widen into it via `From`.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("object store unavailable: {0}")]
    StoreUnavailable(String),
    #[error("object store reported corruption: {0}")]
    Corrupt(String),
    #[error("I/O error talking to the object store")]
    Io(#[from] std::io::Error),
}

/// Every error the conversion core can raise, per spec.md section 7's table.
#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("malformed dump input: {0}")]
    DumpParse(String),

    #[error("revision {got} observed out of order (expected {expected})")]
    RevisionOrder { expected: u32, got: u32 },

    #[error("path not found: {0}")]
    NotFound(String),

    #[error("path traverses a file as if it were a directory: {0}")]
    NotADirectory(String),

    #[error("copy source (r{src_rev}, {src_path}) is not available")]
    CopySourceMissing { src_rev: u32, src_path: String },

    #[error("tag {tag} was already sealed by its first commit")]
    TagMutation { tag: String },

    #[error(transparent)]
    Store(#[from] StoreError),
}

pub type ConvertResult<T> = Result<T, ConvertError>;
