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
//! Text codec for the wg-quick INI dialect.

use std::{fmt, str::FromStr};

use ipnet::IpNet;
use thiserror::Error;

use crate::config::{Interface, Peer, WgConfig};

/// Roster text parsing errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    /// A line is neither a section header, a comment, nor an entry.
    #[error("line {line}: expected `key = value`, got `{content}`")]
    MalformedLine { line: usize, content: String },
    /// A section other than `[Interface]` or `[Peer]`.
    #[error("line {line}: unknown section `{name}`")]
    UnknownSection { line: usize, name: String },
    /// A key that does not belong to its section.
    #[error("line {line}: `{key}` is not a known [{section}] entry")]
    UnknownKey {
        line: usize,
        section: &'static str,
        key: String,
    },
    /// An entry before the first section header.
    #[error("line {line}: entry outside of any section")]
    EntryOutsideSection { line: usize },
    /// More than one `[Interface]` section.
    #[error("line {line}: second [Interface] section")]
    DuplicateInterface { line: usize },
    /// A value that does not parse as a CIDR address.
    #[error("line {line}: invalid address `{value}`")]
    InvalidAddress { line: usize, value: String },
    /// A value that does not parse as a port number.
    #[error("line {line}: invalid listen port `{value}`")]
    InvalidPort { line: usize, value: String },
    /// No `[Interface]` section at all.
    #[error("missing [Interface] section")]
    MissingInterface,
    /// An `[Interface]` section without a required entry.
    #[error("[Interface] is missing `{key}`")]
    MissingInterfaceKey { key: &'static str },
    /// A `[Peer]` section without a required entry.
    #[error("peer section starting at line {line} is missing `{key}`")]
    MissingPeerKey { line: usize, key: &'static str },
}

#[derive(Default)]
struct InterfaceBuilder {
    address: Option<IpNet>,
    private_key: Option<String>,
    listen_port: Option<u16>,
}

impl InterfaceBuilder {
    fn finish(self) -> Result<Interface, ParseError> {
        Ok(Interface {
            address: self
                .address
                .ok_or(ParseError::MissingInterfaceKey { key: "Address" })?,
            private_key: self
                .private_key
                .ok_or(ParseError::MissingInterfaceKey { key: "PrivateKey" })?,
            listen_port: self
                .listen_port
                .ok_or(ParseError::MissingInterfaceKey { key: "ListenPort" })?,
        })
    }
}

struct PeerBuilder {
    line: usize,
    name: String,
    public_key: Option<String>,
    allowed_ips: Option<IpNet>,
}

impl PeerBuilder {
    fn finish(self) -> Result<Peer, ParseError> {
        Ok(Peer {
            public_key: self.public_key.ok_or(ParseError::MissingPeerKey {
                line: self.line,
                key: "PublicKey",
            })?,
            name: self.name,
            allowed_ips: self.allowed_ips.ok_or(ParseError::MissingPeerKey {
                line: self.line,
                key: "AllowedIPs",
            })?,
        })
    }
}

/// The section currently being filled.
enum Cursor {
    None,
    Interface(InterfaceBuilder),
    Peer(PeerBuilder),
}

impl Cursor {
    /// Finishes the section being filled, moving it to its destination.
    fn flush(
        &mut self,
        interface: &mut Option<Interface>,
        peers: &mut Vec<Peer>,
    ) -> Result<(), ParseError> {
        match std::mem::replace(self, Cursor::None) {
            Cursor::None => {}
            Cursor::Interface(builder) => *interface = Some(builder.finish()?),
            Cursor::Peer(builder) => peers.push(builder.finish()?),
        }
        Ok(())
    }
}

impl FromStr for WgConfig {
    type Err = ParseError;

    fn from_str(text: &str) -> Result<Self, ParseError> {
        let mut interface: Option<Interface> = None;
        let mut peers: Vec<Peer> = Vec::new();
        let mut cursor = Cursor::None;
        // A comment directly above a [Peer] header is that peer's name.
        let mut pending_name: Option<String> = None;

        for (index, raw) in text.lines().enumerate() {
            let number = index + 1;
            let line = raw.trim();

            if line.is_empty() {
                pending_name = None;
                continue;
            }

            if let Some(comment) = line.strip_prefix('#') {
                pending_name = Some(comment.trim().to_string());
                continue;
            }

            if let Some(header) = line.strip_prefix('[') {
                let name = header
                    .strip_suffix(']')
                    .ok_or_else(|| ParseError::MalformedLine {
                        line: number,
                        content: line.to_string(),
                    })?;
                cursor.flush(&mut interface, &mut peers)?;
                match name {
                    "Interface" => {
                        if interface.is_some() {
                            return Err(ParseError::DuplicateInterface { line: number });
                        }
                        cursor = Cursor::Interface(InterfaceBuilder::default());
                    }
                    "Peer" => {
                        cursor = Cursor::Peer(PeerBuilder {
                            line: number,
                            name: pending_name.take().unwrap_or_default(),
                            public_key: None,
                            allowed_ips: None,
                        });
                    }
                    other => {
                        return Err(ParseError::UnknownSection {
                            line: number,
                            name: other.to_string(),
                        });
                    }
                }
                pending_name = None;
                continue;
            }

            let (key, value) = line.split_once('=').ok_or_else(|| ParseError::MalformedLine {
                line: number,
                content: line.to_string(),
            })?;
            let key = key.trim();
            let value = value.trim();

            match &mut cursor {
                Cursor::None => return Err(ParseError::EntryOutsideSection { line: number }),
                Cursor::Interface(builder) => match key {
                    "Address" => {
                        builder.address =
                            Some(value.parse().map_err(|_| ParseError::InvalidAddress {
                                line: number,
                                value: value.to_string(),
                            })?);
                    }
                    "PrivateKey" => builder.private_key = Some(value.to_string()),
                    "ListenPort" => {
                        builder.listen_port =
                            Some(value.parse().map_err(|_| ParseError::InvalidPort {
                                line: number,
                                value: value.to_string(),
                            })?);
                    }
                    other => {
                        return Err(ParseError::UnknownKey {
                            line: number,
                            section: "Interface",
                            key: other.to_string(),
                        });
                    }
                },
                Cursor::Peer(builder) => match key {
                    "PublicKey" => builder.public_key = Some(value.to_string()),
                    "AllowedIPs" => {
                        builder.allowed_ips =
                            Some(value.parse().map_err(|_| ParseError::InvalidAddress {
                                line: number,
                                value: value.to_string(),
                            })?);
                    }
                    other => {
                        return Err(ParseError::UnknownKey {
                            line: number,
                            section: "Peer",
                            key: other.to_string(),
                        });
                    }
                },
            }
            pending_name = None;
        }

        cursor.flush(&mut interface, &mut peers)?;
        let interface = interface.ok_or(ParseError::MissingInterface)?;
        Ok(WgConfig { interface, peers })
    }
}

impl fmt::Display for WgConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "[Interface]")?;
        writeln!(f, "Address = {}", self.interface.address)?;
        writeln!(f, "PrivateKey = {}", self.interface.private_key)?;
        writeln!(f, "ListenPort = {}", self.interface.listen_port)?;
        for peer in &self.peers {
            writeln!(f)?;
            if !peer.name.is_empty() {
                writeln!(f, "# {}", peer.name)?;
            }
            writeln!(f, "[Peer]")?;
            writeln!(f, "PublicKey = {}", peer.public_key)?;
            writeln!(f, "AllowedIPs = {}", peer.allowed_ips)?;
        }
        Ok(())
    }
}
