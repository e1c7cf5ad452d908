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
//! # Address allocator
//!
//! Compute the lowest unused host address inside a subnet.
//!
//! [allocator::next_free_address] takes the subnet and the set of addresses
//! already in use and returns the first free host address, always filling
//! gaps left by removed entries before growing the range upward.

pub mod allocator;
