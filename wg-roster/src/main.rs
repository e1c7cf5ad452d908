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
//! wg-roster binary.

use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use wg_roster::{
    chat,
    cli::{Commands, Opts},
    manager::ConfigManager,
    process::{ProcessManager, ProcessManagerStub, WgQuickProcessManager},
    settings::Settings,
};
use wg_roster_observability::setup_tracing;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let opts = Opts::parse();
    let _guards = setup_tracing(opts.logging.log_dir.as_ref(), opts.logging.stderr);

    let settings = Settings::load(&opts.settings)
        .await
        .with_context(|| format!("failed to load settings from {}", opts.settings.display()))?;

    let process_manager: Arc<dyn ProcessManager> = if settings.use_stub {
        Arc::new(ProcessManagerStub)
    } else {
        Arc::new(WgQuickProcessManager::new(settings.interface_name.clone()))
    };

    let manager = Arc::new(ConfigManager::new(
        settings.config_file_path.clone(),
        settings.hostname.clone(),
        settings.dns.clone(),
        process_manager,
    ));

    match opts.command {
        Commands::AddPeer { public_key, name } => {
            manager.add_peer(&public_key, &name).await?;
            println!("Peer added; client config below.\n");
            println!("{}", manager.client_config(&public_key).await?);
        }
        Commands::RemovePeer { public_key } => {
            manager.remove_peer(&public_key).await?;
            println!("Peer removed");
        }
        Commands::ListPeers => {
            let peers = manager.list_peers().await?;
            if peers.is_empty() {
                println!("No peers found in configuration");
            }
            for (index, peer) in peers.iter().enumerate() {
                println!("{index} - {} {}", peer.public_key, peer.name);
            }
        }
        Commands::ClientConfig { public_key } => {
            println!("{}", manager.client_config(&public_key).await?);
        }
        Commands::Chat => {
            tokio::select! {
                result = chat::run(manager) => result?,
                _ = tokio::signal::ctrl_c() => {}
            }
        }
    }

    Ok(())
}
