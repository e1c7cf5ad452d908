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
//! Dialogue that shows the client configuration for a peer.

use std::sync::Arc;

use async_trait::async_trait;

use crate::{
    config::Peer,
    dialogue::{Dialogue, Step, format_client_config, format_peer_list, parse_peer_index},
    manager::ConfigManager,
};

/// Lists the roster, collects an index, then replies with the chosen
/// peer's client configuration.
pub struct ClientConfigDialogue {
    manager: Arc<ConfigManager>,
    state: State,
}

enum State {
    New,
    CollectingIndex { peers: Vec<Peer> },
}

impl ClientConfigDialogue {
    pub fn new(manager: Arc<ConfigManager>) -> Self {
        Self {
            manager,
            state: State::New,
        }
    }

    async fn client_config(&self, peer: &Peer) -> Vec<String> {
        match self.manager.client_config(&peer.public_key).await {
            Ok(config) => vec![format_client_config(&config)],
            Err(error) => {
                tracing::error!(%error, public_key = %peer.public_key, "building client config failed");
                vec![
                    "Unexpected error occurred while trying to obtain client config for peer"
                        .to_string(),
                ]
            }
        }
    }
}

#[async_trait]
impl Dialogue for ClientConfigDialogue {
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
            "{}\nEnter an index of peer to display its client configuration",
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
            State::CollectingIndex { peers } => match parse_peer_index(input, peers.len()) {
                Ok(index) => Step::finish(self.client_config(&peers[index]).await),
                Err(reply) => {
                    self.state = State::CollectingIndex { peers };
                    Step::reply(reply)
                }
            },
        }
    }
}
