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

//! Tracing setup, grounded on the teacher's `TracingSubscription` in
//! `cli_util.rs`, trimmed to what this CLI needs: an env-var filter plus a
//! `-v`/`--verbose` count that raises the default level.

use tracing_subscriber::prelude::*;

const ENV_VAR_NAME: &str = "DUMPGRAFT_LOG";

pub fn init(verbosity: u8) {
    let default_level = match verbosity {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        2 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };
    let filter = tracing_subscriber::EnvFilter::builder()
        .with_default_directive(default_level.into())
        .with_env_var(ENV_VAR_NAME)
        .from_env_lossy();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::Layer::default().with_writer(std::io::stderr).with_filter(filter))
        .init();
}
