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

//! Drives the compiled `dumpgraft` binary end to end: a tiny dump stream in,
//! a bare git repository out, verified by reopening it with `gix` directly
//! rather than a golden-file snapshot (no object graph here is large enough
//! to need one).

use assert_cmd::Command;

const SAMPLE_DUMP: &str = "SVN-fs-dump-format-version: 2\n\n\
     Revision-number: 0\n\
     Prop-content-length: 10\n\
     Content-length: 10\n\
     \n\
     PROPS-END\n\
     \n\
     Revision-number: 1\n\
     Prop-content-length: 56\n\
     Content-length: 56\n\
     \n\
     K 10\n\
     svn:author\n\
     V 6\n\
     jsmith\n\
     K 7\n\
     svn:log\n\
     V 2\n\
     hi\n\
     PROPS-END\n\
     \n\
     Node-path: trunk/a.txt\n\
     Node-kind: file\n\
     Node-action: add\n\
     Text-content-length: 3\n\
     Content-length: 3\n\
     \n\
     hi\n\n";

#[test]
fn converts_a_simple_dump_into_a_bare_git_repo() {
    let tmp = tempfile::tempdir().unwrap();
    let dump_path = tmp.path().join("sample.dump");
    std::fs::write(&dump_path, SAMPLE_DUMP).unwrap();
    let git_dir = tmp.path().join("target.git");

    Command::cargo_bin("dumpgraft")
        .unwrap()
        .arg(&dump_path)
        .arg(&git_dir)
        .assert()
        .success();

    let repo = gix::open(&git_dir).expect("conversion must leave an openable bare repository");
    let commit = repo
        .find_reference("refs/heads/master")
        .expect("master branch is created")
        .peel_to_commit()
        .expect("master's ref must resolve to a commit");
    assert!(commit.parent_ids().next().is_none(), "master's first commit has no parent");
    let tree = commit.tree().expect("commit must have a tree");
    assert!(
        tree.iter()
            .filter_map(Result::ok)
            .any(|entry| entry.filename().to_string() == "a.txt"),
        "a.txt must be present in master's tree"
    );

    let flat_commit = repo
        .find_reference("refs/heads/flat-history")
        .expect("flat-history audit branch is always created")
        .peel_to_commit()
        .expect("flat-history ref must resolve to a commit");
    assert_eq!(flat_commit.tree_id().unwrap(), commit.tree_id().unwrap());
}

#[test]
fn rejects_a_truncated_dump_stream() {
    let tmp = tempfile::tempdir().unwrap();
    let dump_path = tmp.path().join("broken.dump");
    // Declares a 999-byte property block that the stream never supplies.
    std::fs::write(
        &dump_path,
        "SVN-fs-dump-format-version: 2\n\n\
         Revision-number: 1\n\
         Prop-content-length: 999\n\
         Content-length: 999\n\
         \n",
    )
    .unwrap();
    let git_dir = tmp.path().join("target.git");

    Command::cargo_bin("dumpgraft")
        .unwrap()
        .arg(&dump_path)
        .arg(&git_dir)
        .assert()
        .failure();
}
