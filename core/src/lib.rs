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

//! Replays a linearized stream of revisions (each a sequence of add/change/
//! delete/copy events over paths) into a content-addressed object graph of
//! blobs, trees, and commits on named branches.
//!
//! The crate has no opinion on the wire format of the input stream or the
//! concrete object store backing it — both are supplied by a caller (see
//! [`dump`] and [`object_store::ObjectStore`]). [`convert::Converter`] is the
//! entry point that wires the rest of the modules into the per-revision
//! apply/commit pipeline.

pub mod apply;
pub mod authors;
pub mod branch;
pub mod commit_driver;
pub mod convert;
pub mod dump;
pub mod entry;
pub mod error;
pub mod git_store;
pub mod object_store;
pub mod path_classifier;
pub mod revision_cache;

pub use branch::{Branch, BranchId, BranchRegistry, BranchState};
pub use convert::{ConversionSummary, Converter, ConverterConfig};
pub use error::{ConvertError, ConvertResult, StoreError};
pub use object_store::ObjectStore;
