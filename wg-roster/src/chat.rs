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
//! Console front end for the dialogue layer.
//!
//! Stands in for a chat transport: commands and dialogue input are read
//! line by line from stdin, replies go to stdout.

use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

use crate::{
    dialogue::{
        AddPeerDialogue, ClientConfigDialogue, DialogueRegistry, RemovePeerDialogue, SessionId,
    },
    manager::ConfigManager,
};

/// The single session a console conversation runs under.
const CONSOLE_SESSION: SessionId = 0;

const GREETING: &str =
    "Commands: /add_peer /remove_peer /client_config /list_peers /quit\n";

/// Runs the chat loop until stdin closes or the operator enters `/quit`.
pub async fn run(manager: Arc<ConfigManager>) -> std::io::Result<()> {
    let registry = DialogueRegistry::new();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    stdout.write_all(GREETING.as_bytes()).await?;
    stdout.flush().await?;

    while let Some(line) = lines.next_line().await? {
        let replies = match line.trim() {
            "/quit" => break,
            "/add_peer" => {
                registry
                    .begin(
                        CONSOLE_SESSION,
                        Box::new(AddPeerDialogue::new(manager.clone())),
                    )
                    .await
            }
            "/remove_peer" => {
                registry
                    .begin(
                        CONSOLE_SESSION,
                        Box::new(RemovePeerDialogue::new(manager.clone())),
                    )
                    .await
            }
            "/client_config" => {
                registry
                    .begin(
                        CONSOLE_SESSION,
                        Box::new(ClientConfigDialogue::new(manager.clone())),
                    )
                    .await
            }
            "/list_peers" => list_peers(&manager).await,
            input => registry.handle_input(CONSOLE_SESSION, input).await,
        };

        for reply in replies {
            stdout.write_all(reply.as_bytes()).await?;
            stdout.write_all(b"\n").await?;
        }
        stdout.flush().await?;
    }
    Ok(())
}

async fn list_peers(manager: &ConfigManager) -> Vec<String> {
    match manager.list_peers().await {
        Ok(peers) if peers.is_empty() => vec!["No peers found in configuration".to_string()],
        Ok(peers) => vec![crate::dialogue::format_peer_list(&peers)],
        Err(error) => {
            tracing::error!(%error, "fetching peer list failed");
            vec!["Unexpected error while fetching peer list".to_string()]
        }
    }
}
