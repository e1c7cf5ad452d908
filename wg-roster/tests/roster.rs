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
//! End-to-end roster transaction and dialogue tests.

use std::{path::PathBuf, sync::Arc};

use async_trait::async_trait;
use tempfile::TempDir;
use test_log::test;
use wg_roster::{
    dialogue::{AddPeerDialogue, ClientConfigDialogue, DialogueRegistry, RemovePeerDialogue},
    manager::{ConfigManager, ManagerError},
    process::{ProcessError, ProcessManager, ProcessManagerStub},
};

// RFC 7748 section 6.1 key pair.
const SERVER_PRIVATE: &str = "dwdtCnMYpX08FsFyUbJmRd9ML4frwJkqsXf7pR25LCo=";
const SERVER_PUBLIC: &str = "hSDwCYkwp1R0i33ctD73Wg2/Og0mOBr066SpjqqbTmo=";

struct Fixture {
    _dir: TempDir,
    path: PathBuf,
}

fn empty_roster() -> Fixture {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("wg0.conf");
    std::fs::write(
        &path,
        format!(
            "[Interface]\n\
             Address = 192.168.3.1/24\n\
             PrivateKey = {SERVER_PRIVATE}\n\
             ListenPort = 51820\n"
        ),
    )
    .unwrap();
    Fixture { _dir: dir, path }
}

fn stub_manager(fixture: &Fixture) -> Arc<ConfigManager> {
    Arc::new(ConfigManager::new(
        fixture.path.clone(),
        "vpn.example.com",
        "192.168.3.1",
        Arc::new(ProcessManagerStub),
    ))
}

struct FailingProcessManager;

#[async_trait]
impl ProcessManager for FailingProcessManager {
    async fn reload_config(&self) -> Result<(), ProcessError> {
        Err(ProcessError::Spawn(std::io::Error::other("wg is down")))
    }
}

#[test(tokio::test)]
async fn add_list_client_config_remove_round_trip() {
    let fixture = empty_roster();
    let manager = stub_manager(&fixture);

    manager.add_peer("yyy", "Test Peer").await.unwrap();

    let peers = manager.list_peers().await.unwrap();
    assert_eq!(peers.len(), 1);
    assert_eq!(peers[0].public_key, "yyy");
    assert_eq!(peers[0].name, "Test Peer");
    assert_eq!(peers[0].allowed_ips.to_string(), "192.168.3.2/32");

    let config = manager.client_config("yyy").await.unwrap();
    assert_eq!(config.interface.address.to_string(), "192.168.3.2/24");
    assert_eq!(config.interface.dns, "192.168.3.1");
    assert_eq!(config.peer.public_key, SERVER_PUBLIC);
    assert_eq!(config.peer.endpoint, "vpn.example.com:51820");
    assert_eq!(config.peer.allowed_ips, "0.0.0.0/0, ::/0");

    manager.remove_peer("yyy").await.unwrap();
    assert!(manager.list_peers().await.unwrap().is_empty());
}

#[test(tokio::test)]
async fn roster_survives_manager_recreation() {
    // No in-memory state outlives an operation: a second manager on the
    // same file sees everything the first one wrote.
    let fixture = empty_roster();

    stub_manager(&fixture).add_peer("yyy", "One").await.unwrap();

    let peers = stub_manager(&fixture).list_peers().await.unwrap();
    assert_eq!(peers.len(), 1);
    assert_eq!(peers[0].public_key, "yyy");
}

#[test(tokio::test)]
async fn freed_address_is_handed_out_again() {
    let fixture = empty_roster();
    let manager = stub_manager(&fixture);

    manager.add_peer("a", "A").await.unwrap();
    manager.add_peer("b", "B").await.unwrap();
    manager.add_peer("c", "C").await.unwrap();
    manager.remove_peer("b").await.unwrap();
    manager.add_peer("d", "D").await.unwrap();

    let peers = manager.list_peers().await.unwrap();
    let d = peers.iter().find(|peer| peer.public_key == "d").unwrap();
    assert_eq!(d.allowed_ips.to_string(), "192.168.3.3/32");
}

#[test(tokio::test)]
async fn reload_failure_restores_the_previous_file_exactly() {
    let fixture = empty_roster();
    let manager = Arc::new(ConfigManager::new(
        fixture.path.clone(),
        "vpn.example.com",
        "192.168.3.1",
        Arc::new(FailingProcessManager),
    ));
    let before = std::fs::read(&fixture.path).unwrap();

    let result = manager.add_peer("yyy", "Test Peer").await;
    assert!(matches!(result, Err(ManagerError::Reload { .. })));
    assert_eq!(std::fs::read(&fixture.path).unwrap(), before);

    // The failed mutation left nothing behind.
    assert!(manager.list_peers().await.unwrap().is_empty());
}

#[test(tokio::test)]
async fn add_peer_dialogue_conversation() {
    let fixture = empty_roster();
    let manager = stub_manager(&fixture);
    let registry = DialogueRegistry::new();
    let session = 7;

    let replies = registry
        .begin(session, Box::new(AddPeerDialogue::new(manager.clone())))
        .await;
    assert_eq!(replies, ["Enter public key for new peer"]);

    // Blank input never advances a dialogue.
    assert!(registry.handle_input(session, "   ").await.is_empty());

    let replies = registry.handle_input(session, "yyy").await;
    assert_eq!(replies, ["Enter peer name"]);

    let replies = registry.handle_input(session, "Test Peer").await;
    assert_eq!(replies.len(), 1);
    assert!(replies[0].contains("Public key: yyy"));
    assert!(replies[0].contains("Name: Test Peer"));

    // An unrecognized answer re-prompts.
    let replies = registry.handle_input(session, "maybe").await;
    assert_eq!(replies, ["Please answer 'Yes' or 'No'"]);

    let replies = registry.handle_input(session, "Yes").await;
    assert_eq!(replies[0], "Peer was added successfully! Config below.");
    assert!(replies[1].contains("Address: 192.168.3.2/24"));
    assert!(replies[1].contains("Endpoint: vpn.example.com:51820"));
    assert!(replies[1].contains(SERVER_PUBLIC));

    // The dialogue is over; further input goes nowhere.
    assert!(registry.handle_input(session, "yyy").await.is_empty());

    let peers = manager.list_peers().await.unwrap();
    assert_eq!(peers.len(), 1);
    assert_eq!(peers[0].name, "Test Peer");
}

#[test(tokio::test)]
async fn add_peer_dialogue_aborts_on_no() {
    let fixture = empty_roster();
    let manager = stub_manager(&fixture);
    let registry = DialogueRegistry::new();
    let session = 7;

    registry
        .begin(session, Box::new(AddPeerDialogue::new(manager.clone())))
        .await;
    registry.handle_input(session, "yyy").await;
    registry.handle_input(session, "Test Peer").await;
    let replies = registry.handle_input(session, "no").await;
    assert!(replies.is_empty());

    assert!(manager.list_peers().await.unwrap().is_empty());
}

#[test(tokio::test)]
async fn remove_peer_dialogue_conversation() {
    let fixture = empty_roster();
    let manager = stub_manager(&fixture);
    manager.add_peer("yyy", "Test Peer").await.unwrap();

    let registry = DialogueRegistry::new();
    let session = 7;

    let replies = registry
        .begin(session, Box::new(RemovePeerDialogue::new(manager.clone())))
        .await;
    assert_eq!(replies.len(), 1);
    assert!(replies[0].contains("0 - yyy Test Peer"));
    assert!(replies[0].contains("Enter an index of peer to remove"));

    let replies = registry.handle_input(session, "one").await;
    assert_eq!(replies, ["Please enter a number"]);

    let replies = registry.handle_input(session, "3").await;
    assert_eq!(replies, ["Index is out of range"]);

    let replies = registry.handle_input(session, "0").await;
    assert!(replies[0].contains("Public key: yyy"));

    let replies = registry.handle_input(session, "yes").await;
    assert_eq!(replies, ["Peer was removed successfully!"]);

    assert!(manager.list_peers().await.unwrap().is_empty());
}

#[test(tokio::test)]
async fn remove_peer_dialogue_on_empty_roster_finishes_immediately() {
    let fixture = empty_roster();
    let manager = stub_manager(&fixture);
    let registry = DialogueRegistry::new();
    let session = 7;

    let replies = registry
        .begin(session, Box::new(RemovePeerDialogue::new(manager)))
        .await;
    assert_eq!(replies, ["No peers found in configuration"]);

    // Nothing was registered for the session.
    assert!(registry.handle_input(session, "0").await.is_empty());
}

#[test(tokio::test)]
async fn client_config_dialogue_conversation() {
    let fixture = empty_roster();
    let manager = stub_manager(&fixture);
    manager.add_peer("yyy", "Test Peer").await.unwrap();

    let registry = DialogueRegistry::new();
    let session = 7;

    let replies = registry
        .begin(session, Box::new(ClientConfigDialogue::new(manager)))
        .await;
    assert!(replies[0].contains("0 - yyy Test Peer"));

    let replies = registry.handle_input(session, "0").await;
    assert_eq!(replies.len(), 1);
    assert!(replies[0].contains("Address: 192.168.3.2/24"));
    assert!(replies[0].contains("Config template:"));
    assert!(replies[0].contains("PrivateKey = <put your private key here>"));
}
