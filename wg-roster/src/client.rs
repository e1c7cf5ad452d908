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
//! Client-side configuration bundle for one peer.

use std::fmt;

use ipnet::IpNet;

/// Catch-all `AllowedIPs` for generated client configs: all traffic goes
/// through the tunnel, regardless of the roster subnet.
pub const ALL_TRAFFIC: &str = "0.0.0.0/0, ::/0";

/// Placeholder emitted where the client has to fill in its private key.
pub const PRIVATE_KEY_PLACEHOLDER: &str = "<put your private key here>";

/// The `[Interface]` half of a client configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientInterface {
    /// The peer's address, expressed with the roster subnet's prefix.
    pub address: IpNet,
    /// DNS server handed to the client.
    pub dns: String,
}

/// The `[Peer]` half of a client configuration: the server as seen by the
/// client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientPeer {
    /// The server's public key, derived from the roster's private key.
    pub public_key: String,
    /// Networks routed through the tunnel.
    pub allowed_ips: &'static str,
    /// `hostname:listen_port` of the server.
    pub endpoint: String,
}

/// A ready-to-send client configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// The client's own interface settings.
    pub interface: ClientInterface,
    /// The server peer entry.
    pub peer: ClientPeer,
}

impl fmt::Display for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "[Interface]")?;
        writeln!(f, "PrivateKey = {PRIVATE_KEY_PLACEHOLDER}")?;
        writeln!(f, "Address = {}", self.interface.address)?;
        writeln!(f, "DNS = {}", self.interface.dns)?;
        writeln!(f)?;
        writeln!(f, "[Peer]")?;
        writeln!(f, "PublicKey = {}", self.peer.public_key)?;
        writeln!(f, "AllowedIPs = {}", self.peer.allowed_ips)?;
        writeln!(f, "Endpoint = {}", self.peer.endpoint)
    }
}
