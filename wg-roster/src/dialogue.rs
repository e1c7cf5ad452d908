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
//! Per-session command dialogues.
//!
//! A dialogue collects operator input over several turns, then calls into
//! the [crate::manager::ConfigManager]. The [DialogueRegistry] is the
//! session table: each session runs at most one dialogue at a time, and
//! input for a session is routed to its active dialogue until that one
//! reports itself finished. The transport is the caller's concern;
//! dialogues consume and produce plain strings.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::{client::ClientConfig, config::Peer};

mod add_peer;
mod client_config;
mod remove_peer;

pub use add_peer::AddPeerDialogue;
pub use client_config::ClientConfigDialogue;
pub use remove_peer::RemovePeerDialogue;

/// Identifies one conversation.
pub type SessionId = i64;

/// The outcome of one dialogue turn.
#[derive(Debug, PartialEq, Eq)]
pub struct Step {
    /// Messages to send back, in order.
    pub replies: Vec<String>,
    /// True once the dialogue is over and the session is free again.
    pub finished: bool,
}

impl Step {
    /// A turn that replies and keeps the dialogue going.
    pub fn reply(text: impl Into<String>) -> Self {
        Step {
            replies: vec![text.into()],
            finished: false,
        }
    }

    /// A turn that ends the dialogue.
    pub fn finish(replies: Vec<String>) -> Self {
        Step {
            replies,
            finished: true,
        }
    }

    /// A turn that neither replies nor ends the dialogue.
    pub fn ignore() -> Self {
        Step {
            replies: Vec::new(),
            finished: false,
        }
    }
}

/// A multi-turn command conversation.
#[async_trait]
pub trait Dialogue: Send {
    /// Produces the dialogue's opening messages.
    async fn begin(&mut self) -> Step;

    /// Feeds one operator message into the dialogue.
    async fn handle_input(&mut self, input: &str) -> Step;
}

/// Session table mapping each session to its active dialogue.
#[derive(Default)]
pub struct DialogueRegistry {
    active: Mutex<HashMap<SessionId, Box<dyn Dialogue>>>,
}

impl DialogueRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts `dialogue` for `session`, replacing any active one.
    pub async fn begin(&self, session: SessionId, mut dialogue: Box<dyn Dialogue>) -> Vec<String> {
        let step = dialogue.begin().await;
        let mut active = self.active.lock().await;
        if step.finished {
            active.remove(&session);
        } else {
            active.insert(session, dialogue);
        }
        step.replies
    }

    /// Routes `input` to the session's active dialogue, if any.
    pub async fn handle_input(&self, session: SessionId, input: &str) -> Vec<String> {
        let mut active = self.active.lock().await;
        let Some(dialogue) = active.get_mut(&session) else {
            return Vec::new();
        };
        let step = dialogue.handle_input(input).await;
        if step.finished {
            active.remove(&session);
        }
        step.replies
    }
}

/// The operator's answer to a Yes/No prompt.
pub(crate) enum Confirmation {
    Yes,
    No,
    Other,
}

pub(crate) fn parse_confirmation(input: &str) -> Confirmation {
    match input.to_lowercase().as_str() {
        "yes" => Confirmation::Yes,
        "no" => Confirmation::No,
        _ => Confirmation::Other,
    }
}

pub(crate) const ANSWER_YES_OR_NO: &str = "Please answer 'Yes' or 'No'";

/// One line per peer: `<index> - <public key> <name>`.
pub(crate) fn format_peer_list(peers: &[Peer]) -> String {
    let mut out = String::new();
    for (index, peer) in peers.iter().enumerate() {
        out.push_str(&format!("{index} - {} {}\n", peer.public_key, peer.name));
    }
    out
}

/// A readable summary of a client config plus the config file template.
pub(crate) fn format_client_config(config: &ClientConfig) -> String {
    format!(
        "Interface\n\
         Address: {}\n\
         DNS: {}\n\
         \n\
         Peer\n\
         Public key: {}\n\
         Allowed IPs: {}\n\
         Endpoint: {}\n\
         \n\
         Config template:\n{}",
        config.interface.address,
        config.interface.dns,
        config.peer.public_key,
        config.peer.allowed_ips,
        config.peer.endpoint,
        config,
    )
}

/// Parses a peer index entered by the operator.
///
/// Returns the index, or the reply to send back when the input is not a
/// number or out of range.
pub(crate) fn parse_peer_index(input: &str, len: usize) -> Result<usize, &'static str> {
    let index: usize = input.parse().map_err(|_| "Please enter a number")?;
    if index >= len {
        return Err("Index is out of range");
    }
    Ok(index)
}
