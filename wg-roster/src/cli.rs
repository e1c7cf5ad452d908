// Copyright 2025 Anapaya Systems
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//! wg-roster CLI options.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// WireGuard roster manager
#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Opts {
    /// Top-level subcommand
    #[command(subcommand)]
    pub command: Commands,

    /// Logging options
    #[command(flatten)]
    pub logging: LoggingOptions,

    /// Path of the settings file (JSON).
    #[arg(long, global = true, default_value = "wg-roster.json")]
    pub settings: PathBuf,
}

/// Logging options.
#[derive(Debug, Args)]
pub struct LoggingOptions {
    /// Log wg-roster output to stderr.
    #[arg(long, global = true, default_value = "true")]
    pub stderr: bool,

    /// Directory for the wg-roster log.
    #[arg(long, global = true)]
    pub log_dir: Option<PathBuf>,
}

/// Top-level subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Add a peer and assign it the lowest free address.
    AddPeer {
        /// The peer's base64 public key.
        public_key: String,
        /// Display name stored with the peer.
        name: String,
    },
    /// Remove a peer from the roster.
    RemovePeer {
        /// The peer's base64 public key.
        public_key: String,
    },
    /// List all peers on the roster.
    ListPeers,
    /// Print the client configuration for a peer.
    ClientConfig {
        /// The peer's base64 public key.
        public_key: String,
    },
    /// Manage the roster through a console chat session.
    Chat,
}
