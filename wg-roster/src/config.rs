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
//! WireGuard roster model and file store.
//!
//! The on-disk format is the wg-quick INI dialect: one `[Interface]`
//! section, zero or more `[Peer]` sections, and a peer's display name
//! carried as a `#` comment directly above its section header. The file is
//! always read and replaced as a whole; [snapshot] and [restore] capture
//! and re-apply the raw bytes for the mutation rollback path.

use std::{
    net::IpAddr,
    path::{Path, PathBuf},
};

use ipnet::IpNet;
use thiserror::Error;

mod format;

pub use format::ParseError;

/// One WireGuard roster: the interface section plus all peer sections.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WgConfig {
    /// The `[Interface]` section.
    pub interface: Interface,
    /// The `[Peer]` sections, in file order.
    pub peers: Vec<Peer>,
}

/// The `[Interface]` section of the roster.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Interface {
    /// Interface address with the subnet prefix, e.g. `192.168.3.1/24`.
    pub address: IpNet,
    /// Base64-encoded Curve25519 private key.
    pub private_key: String,
    /// UDP port the interface listens on.
    pub listen_port: u16,
}

/// One `[Peer]` section of the roster.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Peer {
    /// Base64-encoded Curve25519 public key, unique within the roster.
    pub public_key: String,
    /// Free-text display name, persisted as a comment above the section.
    pub name: String,
    /// The peer's host address as a /32 or /128 network.
    pub allowed_ips: IpNet,
}

impl WgConfig {
    /// Looks up a peer by public key.
    pub fn peer(&self, public_key: &str) -> Option<&Peer> {
        self.peers.iter().find(|peer| peer.public_key == public_key)
    }

    /// All addresses currently in use: the interface address and every
    /// peer's host address.
    pub fn reserved_addresses(&self) -> Vec<IpAddr> {
        let mut addresses = Vec::with_capacity(self.peers.len() + 1);
        addresses.push(self.interface.address.addr());
        addresses.extend(self.peers.iter().map(|peer| peer.allowed_ips.addr()));
        addresses
    }
}

/// Errors from loading or storing the roster file.
#[derive(Debug, Error)]
pub enum PersistenceError {
    /// Underlying file system failure.
    #[error("roster file i/o failed: {0}")]
    Io(#[from] std::io::Error),
    /// The file content does not parse as a roster.
    #[error("roster file is malformed: {0}")]
    Parse(#[from] ParseError),
}

/// Reads and parses the roster file at `path`.
pub async fn load(path: impl AsRef<Path>) -> Result<WgConfig, PersistenceError> {
    let text = tokio::fs::read_to_string(path.as_ref()).await?;
    Ok(text.parse()?)
}

/// Writes `config` to `path`, replacing the prior content as a whole.
pub async fn save(path: impl AsRef<Path>, config: &WgConfig) -> Result<(), PersistenceError> {
    replace_file(path.as_ref(), config.to_string().as_bytes()).await?;
    Ok(())
}

/// Captures the persisted bytes; the rollback point for a mutation.
pub async fn snapshot(path: impl AsRef<Path>) -> Result<Vec<u8>, PersistenceError> {
    Ok(tokio::fs::read(path.as_ref()).await?)
}

/// Restores a previously captured [snapshot] verbatim.
pub async fn restore(path: impl AsRef<Path>, bytes: &[u8]) -> Result<(), PersistenceError> {
    replace_file(path.as_ref(), bytes).await?;
    Ok(())
}

/// Writes `bytes` to a temporary sibling file and renames it over `path`,
/// so a crash mid-write never leaves a half-written roster behind.
async fn replace_file(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let mut tmp_name = path.as_os_str().to_owned();
    tmp_name.push(".tmp");
    let tmp = PathBuf::from(tmp_name);

    tokio::fs::write(&tmp, bytes).await?;
    tokio::fs::rename(&tmp, path).await
}
