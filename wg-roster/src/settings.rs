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
//! Application settings.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Operator-provided settings, loaded from a JSON file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    /// Path of the managed wg-quick configuration file.
    pub config_file_path: PathBuf,
    /// Public hostname clients connect to.
    pub hostname: String,
    /// DNS server handed out in client configs.
    pub dns: String,
    /// Name of the WireGuard interface to reload.
    pub interface_name: String,
    /// Log reloads instead of touching a real interface.
    #[serde(default)]
    pub use_stub: bool,
}

impl Settings {
    /// Reads settings from the JSON file at `path`.
    pub async fn load(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let bytes = tokio::fs::read(path.as_ref()).await?;
        serde_json::from_slice(&bytes).map_err(std::io::Error::other)
    }
}
