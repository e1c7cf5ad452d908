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
//! Curve25519 key handling.

use base64::{Engine as _, engine::general_purpose::STANDARD};
use thiserror::Error;
use x25519_dalek::{PublicKey, StaticSecret};

/// Length of a raw Curve25519 key in bytes.
const KEY_LEN: usize = 32;

/// Errors from handling WireGuard key material.
#[derive(Debug, Error)]
pub enum KeyFormatError {
    /// The key is not valid base64.
    #[error("key is not valid base64: {0}")]
    Encoding(#[from] base64::DecodeError),
    /// The decoded key has the wrong length.
    #[error("key must decode to {KEY_LEN} bytes, got {0}")]
    Length(usize),
}

/// Derives the base64-encoded public key for a base64-encoded private key.
pub fn derive_public_key(private_key: &str) -> Result<String, KeyFormatError> {
    let bytes = STANDARD.decode(private_key.trim())?;
    let bytes: [u8; KEY_LEN] = bytes
        .try_into()
        .map_err(|rejected: Vec<u8>| KeyFormatError::Length(rejected.len()))?;
    let public = PublicKey::from(&StaticSecret::from(bytes));
    Ok(STANDARD.encode(public.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    // RFC 7748 section 6.1 key pair.
    const PRIVATE: &str = "dwdtCnMYpX08FsFyUbJmRd9ML4frwJkqsXf7pR25LCo=";
    const PUBLIC: &str = "hSDwCYkwp1R0i33ctD73Wg2/Og0mOBr066SpjqqbTmo=";

    #[test]
    fn derives_known_public_key() {
        assert_eq!(derive_public_key(PRIVATE).unwrap(), PUBLIC);
    }

    #[test]
    fn tolerates_surrounding_whitespace() {
        let padded = format!("  {PRIVATE}\n");
        assert_eq!(derive_public_key(&padded).unwrap(), PUBLIC);
    }

    #[test]
    fn rejects_invalid_base64() {
        let result = derive_public_key("not base64!");
        assert!(matches!(result, Err(KeyFormatError::Encoding(_))));
    }

    #[test]
    fn rejects_wrong_length() {
        let short = STANDARD.encode([0u8; 16]);
        let result = derive_public_key(&short);
        assert!(matches!(result, Err(KeyFormatError::Length(16))));
    }
}
