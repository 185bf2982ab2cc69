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

mod authors_file;
mod config;
mod logging;
mod svn_dump;

use std::io::BufReader;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use dumpgraft_core::authors::AuthorsMap;
use dumpgraft_core::convert::{Converter, ConverterConfig};
use dumpgraft_core::git_store::GitObjectStore;

/// Replays a dump-stream history into a git repository.
#[derive(Debug, Parser)]
#[command(name = "dumpgraft", version, about)]
struct Cli {
    /// Path to the dump stream to read.
    dump_file: PathBuf,

    /// Path to the target git repository. Created bare if it doesn't exist.
    git_dir: PathBuf,

    /// Path to the `svn_user = Name <email>` authors-map file.
    #[arg(long)]
    authors_file: Option<PathBuf>,

    /// Path to a TOML config overriding branch convention / commit policy.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Increase logging verbosity; repeatable.
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let converter_config = match &cli.config {
        Some(path) => config::load(path)?,
        None => ConverterConfig::default(),
    };

    let authors_table = match &cli.authors_file {
        Some(path) => authors_file::parse(path)?,
        None => Default::default(),
    };
    let authors = AuthorsMap::new(authors_table);

    let dump_file = std::fs::File::open(&cli.dump_file)
        .with_context(|| format!("opening dump file {}", cli.dump_file.display()))?;
    let mut reader = BufReader::new(dump_file);
    let revisions = svn_dump::read_dump(&mut reader)
        .with_context(|| format!("reading dump file {}", cli.dump_file.display()))?;
    tracing::info!(revisions = revisions.len(), "dump stream parsed");

    let mut store = if cli.git_dir.join("HEAD").exists() {
        GitObjectStore::open(&cli.git_dir)
    } else {
        GitObjectStore::init_bare(&cli.git_dir)
    }
    .with_context(|| format!("opening target repository {}", cli.git_dir.display()))?;

    let mut converter = Converter::new(converter_config, Box::new(|_info| {}));
    let summary = converter
        .convert_all(&revisions, &mut store, &authors, || false)
        .context("conversion failed")?;

    match summary.last_committed_revision {
        Some(rev) => tracing::info!(revision = rev, "conversion complete"),
        None => tracing::warn!("no revisions were committed"),
    }
    Ok(())
}
