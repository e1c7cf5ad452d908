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
//! Pushing roster changes into the running WireGuard service.

use async_trait::async_trait;
use thiserror::Error;
use tokio::process::Command;

/// Live reload errors.
#[derive(Debug, Error)]
pub enum ProcessError {
    /// The reload command could not be spawned.
    #[error("failed to run reload command: {0}")]
    Spawn(#[from] std::io::Error),
    /// The reload command ran and reported failure.
    #[error("reload command exited with {status}: {stderr}")]
    CommandFailed {
        status: std::process::ExitStatus,
        stderr: String,
    },
}

/// Makes the running network service pick up the persisted roster.
///
/// The call blocks until the reload finishes; there is no implicit timeout.
/// Implementations must be safe to invoke repeatedly, the manager calls
/// this after every successful persist.
#[async_trait]
pub trait ProcessManager: Send + Sync {
    /// Reloads the live configuration from the persisted roster.
    async fn reload_config(&self) -> Result<(), ProcessError>;
}

/// Reloads a live wg-quick interface without restarting it.
pub struct WgQuickProcessManager {
    interface_name: String,
}

impl WgQuickProcessManager {
    /// Creates a process manager for the named WireGuard interface.
    pub fn new(interface_name: impl Into<String>) -> Self {
        Self {
            interface_name: interface_name.into(),
        }
    }
}

#[async_trait]
impl ProcessManager for WgQuickProcessManager {
    async fn reload_config(&self) -> Result<(), ProcessError> {
        // Process substitution requires bash, as does wg-quick itself.
        let script = format!(
            "wg syncconf {iface} <(wg-quick strip {iface})",
            iface = self.interface_name
        );
        let output = Command::new("/bin/bash")
            .arg("-c")
            .arg(&script)
            .output()
            .await?;

        if !output.status.success() {
            return Err(ProcessError::CommandFailed {
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            });
        }

        tracing::debug!(interface = %self.interface_name, "synced live configuration");
        Ok(())
    }
}

/// Reload stub that only logs, for tests and offline use.
pub struct ProcessManagerStub;

#[async_trait]
impl ProcessManager for ProcessManagerStub {
    async fn reload_config(&self) -> Result<(), ProcessError> {
        tracing::info!("[stub] reloading config");
        Ok(())
    }
}
