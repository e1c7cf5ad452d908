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
//! Transactional roster mutations.

use std::{net::IpAddr, path::PathBuf, sync::Arc};

use address_allocator::allocator::{self, AllocationError};
use ipnet::{IpNet, Ipv4Net, Ipv6Net};
use thiserror::Error;
use tokio::sync::Mutex;

use crate::{
    client::{self, ClientConfig, ClientInterface, ClientPeer},
    config::{self, Peer, PersistenceError, WgConfig},
    keys::{self, KeyFormatError},
    process::{ProcessError, ProcessManager},
};

/// Roster mutation and query errors.
#[derive(Debug, Error)]
pub enum ManagerError {
    /// A peer with the same public key is already on the roster.
    #[error("peer with public key {public_key} already exists: {name}")]
    DuplicateKey { public_key: String, name: String },
    /// No peer with the given public key.
    #[error("no peer with public key {public_key}")]
    PeerNotFound { public_key: String },
    /// No free address for the new peer.
    #[error("address allocation failed: {0}")]
    Allocation(#[from] AllocationError),
    /// Loading or storing the roster failed.
    #[error(transparent)]
    Persistence(#[from] PersistenceError),
    /// Reloading the live configuration failed; the previous roster was
    /// restored.
    #[error("live reload failed, previous roster restored: {source}")]
    Reload { source: ProcessError },
    /// Reloading failed and restoring the previous roster failed as well.
    #[error("live reload failed ({source}), restoring the previous roster failed too ({rollback})")]
    ReloadAndRollback {
        source: ProcessError,
        rollback: PersistenceError,
    },
    /// The roster's private key cannot be turned into a public key.
    #[error("cannot derive the server public key: {0}")]
    KeyDerivation(#[from] KeyFormatError),
}

/// Applies roster mutations to the configuration file and the running
/// WireGuard service.
///
/// Every operation reconstructs the roster from disk, so edits made by
/// other tools between operations are picked up. Mutations follow a fixed
/// protocol: load, validate and mutate in memory, snapshot the persisted
/// bytes, persist the new roster as a whole, reload the live service, and
/// restore the snapshot if the reload fails.
pub struct ConfigManager {
    config_path: PathBuf,
    hostname: String,
    dns: String,
    process_manager: Arc<dyn ProcessManager>,
    /// Serializes the load-mutate-persist-reload sequence. A load racing a
    /// concurrent persist would silently drop the other caller's change.
    mutation_lock: Mutex<()>,
}

impl ConfigManager {
    /// Creates a manager for the roster file at `config_path`.
    ///
    /// `hostname` and `dns` are handed out verbatim in client configs.
    pub fn new(
        config_path: impl Into<PathBuf>,
        hostname: impl Into<String>,
        dns: impl Into<String>,
        process_manager: Arc<dyn ProcessManager>,
    ) -> Self {
        Self {
            config_path: config_path.into(),
            hostname: hostname.into(),
            dns: dns.into(),
            process_manager,
            mutation_lock: Mutex::new(()),
        }
    }

    /// Adds a peer, assigning it the lowest free host address in the
    /// roster's subnet.
    pub async fn add_peer(&self, public_key: &str, name: &str) -> Result<(), ManagerError> {
        let _guard = self.mutation_lock.lock().await;
        let mut roster = config::load(&self.config_path).await?;

        if let Some(existing) = roster.peer(public_key) {
            return Err(ManagerError::DuplicateKey {
                public_key: public_key.to_string(),
                name: existing.name.clone(),
            });
        }

        let address = allocator::next_free_address(
            roster.interface.address,
            &roster.reserved_addresses(),
        )?;
        roster.peers.push(Peer {
            public_key: public_key.to_string(),
            name: name.to_string(),
            allowed_ips: host_net(address),
        });

        self.commit(&roster).await?;
        tracing::debug!(public_key, name, address = %address, "added peer");
        Ok(())
    }

    /// Removes the peer with the given public key.
    pub async fn remove_peer(&self, public_key: &str) -> Result<(), ManagerError> {
        let _guard = self.mutation_lock.lock().await;
        let mut roster = config::load(&self.config_path).await?;

        let index = roster
            .peers
            .iter()
            .position(|peer| peer.public_key == public_key)
            .ok_or_else(|| ManagerError::PeerNotFound {
                public_key: public_key.to_string(),
            })?;
        roster.peers.remove(index);

        self.commit(&roster).await?;
        tracing::debug!(public_key, "removed peer");
        Ok(())
    }

    /// Returns the roster's peers in file order.
    pub async fn list_peers(&self) -> Result<Vec<Peer>, ManagerError> {
        Ok(config::load(&self.config_path).await?.peers)
    }

    /// Builds the client-side configuration bundle for a peer.
    pub async fn client_config(&self, public_key: &str) -> Result<ClientConfig, ManagerError> {
        let roster = config::load(&self.config_path).await?;
        let peer = roster
            .peer(public_key)
            .ok_or_else(|| ManagerError::PeerNotFound {
                public_key: public_key.to_string(),
            })?;

        let subnet = roster.interface.address;
        // Re-express the peer's host address with the subnet's prefix; a
        // peer of the other address family keeps its host prefix.
        let address = IpNet::new(peer.allowed_ips.addr(), subnet.prefix_len())
            .unwrap_or(peer.allowed_ips);
        let server_public_key = keys::derive_public_key(&roster.interface.private_key)?;

        Ok(ClientConfig {
            interface: ClientInterface {
                address,
                dns: self.dns.clone(),
            },
            peer: ClientPeer {
                public_key: server_public_key,
                allowed_ips: client::ALL_TRAFFIC,
                endpoint: format!("{}:{}", self.hostname, roster.interface.listen_port),
            },
        })
    }

    /// Persists `roster` and pushes it into the running service, restoring
    /// the previous file content if the reload fails.
    async fn commit(&self, roster: &WgConfig) -> Result<(), ManagerError> {
        let backup = config::snapshot(&self.config_path).await?;
        config::save(&self.config_path, roster).await?;

        if let Err(source) = self.process_manager.reload_config().await {
            return Err(match config::restore(&self.config_path, &backup).await {
                Ok(()) => {
                    tracing::warn!(error = %source, "reload failed, previous roster restored");
                    ManagerError::Reload { source }
                }
                Err(rollback) => {
                    tracing::error!(
                        reload_error = %source,
                        rollback_error = %rollback,
                        "reload failed and the previous roster could not be restored"
                    );
                    ManagerError::ReloadAndRollback { source, rollback }
                }
            });
        }
        Ok(())
    }
}

/// The single-host network for an address: /32 for v4, /128 for v6.
fn host_net(address: IpAddr) -> IpNet {
    match address {
        IpAddr::V4(addr) => IpNet::V4(Ipv4Net::new_assert(addr, 32)),
        IpAddr::V6(addr) => IpNet::V6(Ipv6Net::new_assert(addr, 128)),
    }
}
