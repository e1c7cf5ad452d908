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
//! Dialogue that removes a peer from the roster.

use std::sync::Arc;

use async_trait::async_trait;

use crate::{
    config::Peer,
    dialogue::{
        ANSWER_YES_OR_NO, Confirmation, Dialogue, Step, format_peer_list, parse_confirmation,
        parse_peer_index,
    },
    manager::ConfigManager,
};

/// Lists the roster, collects an index, then removes the chosen peer after
/// confirmation.
pub struct RemovePeerDialogue {
    manager: Arc<ConfigManager>,
    state: State,
}

enum State {
    New,
    CollectingIndex { peers: Vec<Peer> },
    AwaitingConfirmation { peer: Peer },
}

impl RemovePeerDialogue {
    pub fn new(manager: Arc<ConfigManager>) -> Self {
        Self {
            manager,
            state: State::New,
        }
    }

    async fn remove_peer(&self, peer: &Peer) -> Vec<String> {
        if let Err(error) = self.manager.remove_peer(&peer.public_key).await {
            tracing::error!(%error, public_key = %peer.public_key, "removing peer failed");
            return vec!["Unexpected error occurred while removing peer".to_string()];
        }
        tracing::info!(
            public_key = %peer.public_key,
            name = %peer.name,
            "removed peer"
        );
        vec!["Peer was removed successfully!".to_string()]
    }
}

#[async_trait]
impl Dialogue for RemovePeerDialogue {
    async fn begin(&mut self) -> Step {
        let peers = match self.manager.list_peers().await {
            Ok(peers) => peers,
            Err(error) => {
                tracing::error!(%error, "fetching peer list failed");
                return Step::finish(vec![
                    "Unexpected error while fetching peer list".to_string(),
                ]);
            }
        };
        if peers.is_empty() {
            return Step::finish(vec!["No peers found in configuration".to_string()]);
        }

        let listing = format!(
            "{}\nEnter an index of peer to remove",
            format_peer_list(&peers)
        );
        self.state = State::CollectingIndex { peers };
        Step::reply(listing)
    }

    async fn handle_input(&mut self, input: &str) -> Step {
        let input = input.trim();
        if input.is_empty() {
            return Step::ignore();
        }

        match std::mem::replace(&mut self.state, State::New) {
            State::New => Step::ignore(),
            State::CollectingIndex { mut peers } => match parse_peer_index(input, peers.len()) {
                Ok(index) => {
                    let peer = peers.remove(index);
                    let prompt = format!(
                        "Are you sure that you want to remove peer?\n\
                         Public key: {}\n\
                         Name: {}",
                        peer.public_key, peer.name
                    );
                    self.state = State::AwaitingConfirmation { peer };
                    Step::reply(prompt)
                }
                Err(reply) => {
                    self.state = State::CollectingIndex { peers };
                    Step::reply(reply)
                }
            },
            State::AwaitingConfirmation { peer } => match parse_confirmation(input) {
                Confirmation::Yes => Step::finish(self.remove_peer(&peer).await),
                Confirmation::No => Step::finish(Vec::new()),
                Confirmation::Other => {
                    self.state = State::AwaitingConfirmation { peer };
                    Step::reply(ANSWER_YES_OR_NO)
                }
            },
        }
    }
}
