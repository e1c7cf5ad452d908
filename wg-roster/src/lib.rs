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
//! # wg-roster
//!
//! Membership management for a WireGuard overlay network.
//!
//! The [manager::ConfigManager] applies roster mutations to the wg-quick
//! configuration file and the running interface: it allocates the lowest
//! free host address for new peers, persists every change as a whole, and
//! restores the previous file content if pushing the change into the live
//! service fails.
//!
//! The [dialogue] module drives the same operations through multi-turn
//! conversations keyed by session, with [chat] providing a console
//! front end.

pub mod chat;
pub mod cli;
pub mod client;
pub mod config;
pub mod dialogue;
pub mod keys;
pub mod manager;
pub mod process;
pub mod settings;
