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
//! Dialogue that adds a peer to the roster.

use std::sync::Arc;

use async_trait::async_trait;

use crate::{
    dialogue::{
        ANSWER_YES_OR_NO, Confirmation, Dialogue, Step, format_client_config, parse_confirmation,
    },
    manager::ConfigManager,
};

/// Collects a public key and a name, then adds the peer after
/// confirmation and replies with its client configuration.
pub struct AddPeerDialogue {
    manager: Arc<ConfigManager>,
    state: State,
}

enum State {
    CollectingKey,
    CollectingName { public_key: String },
    AwaitingConfirmation { public_key: String, name: String },
}

impl AddPeerDialogue {
    pub fn new(manager: Arc<ConfigManager>) -> Self {
        Self {
            manager,
            state: State::CollectingKey,
        }
    }

    async fn add_peer(&self, public_key: &str, name: &str) -> Vec<String> {
        if let Err(error) = self.manager.add_peer(public_key, name).await {
            tracing::error!(%error, public_key, "adding peer failed");
            return vec!["Unexpected error occurred while adding peer".to_string()];
        }
        tracing::info!(public_key, name, "added new peer");

        let mut replies = vec!["Peer was added successfully! Config below.".to_string()];
        match self.manager.client_config(public_key).await {
            Ok(config) => replies.push(format_client_config(&config)),
            Err(error) => {
                tracing::error!(%error, public_key, "building client config failed");
                replies.push(
                    "Unexpected error occurred while trying to obtain client config for peer"
                        .to_string(),
                );
            }
        }
        replies
    }
}

#[async_trait]
impl Dialogue for AddPeerDialogue {
    async fn begin(&mut self) -> Step {
        Step::reply("Enter public key for new peer")
    }

    async fn handle_input(&mut self, input: &str) -> Step {
        let input = input.trim();
        if input.is_empty() {
            return Step::ignore();
        }

        match std::mem::replace(&mut self.state, State::CollectingKey) {
            State::CollectingKey => {
                self.state = State::CollectingName {
                    public_key: input.to_string(),
                };
                Step::reply("Enter peer name")
            }
            State::CollectingName { public_key } => {
                let prompt = format!(
                    "Are you sure that you want to add new peer?\n\
                     Public key: {public_key}\n\
                     Name: {input}"
                );
                self.state = State::AwaitingConfirmation {
                    public_key,
                    name: input.to_string(),
                };
                Step::reply(prompt)
            }
            State::AwaitingConfirmation { public_key, name } => match parse_confirmation(input) {
                Confirmation::Yes => Step::finish(self.add_peer(&public_key, &name).await),
                Confirmation::No => Step::finish(Vec::new()),
                Confirmation::Other => {
                    self.state = State::AwaitingConfirmation { public_key, name };
                    Step::reply(ANSWER_YES_OR_NO)
                }
            },
        }
    }
}
