// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Ephemeral session key material: a 32-byte AES key and a 16-byte IV.
//!
//! Generated fresh for every envelope. The same value encrypts the body and
//! is wrapped into the `key` field, so the IV that reaches the peer is always
//! the one that was used. The key bytes are zeroed on drop.

use rand::rngs::OsRng;
use rand::RngCore;
use zeroize::Zeroizing;

use crate::crypto::symmetric::{IV_LEN, KEY_LEN};
use crate::error::{EnvelopeError, EnvelopeResult};

/// Length of the wrapped `key || iv` material.
pub const MATERIAL_LEN: usize = KEY_LEN + IV_LEN;

pub struct SessionKey {
    key: Zeroizing<[u8; KEY_LEN]>,
    iv: [u8; IV_LEN],
}

impl SessionKey {
    /// Draw a new key and IV from the OS random source.
    pub fn generate() -> Self {
        let mut key = Zeroizing::new([0u8; KEY_LEN]);
        let mut iv = [0u8; IV_LEN];
        OsRng.fill_bytes(&mut key[..]);
        OsRng.fill_bytes(&mut iv);
        Self { key, iv }
    }

    /// Split unwrapped `key || iv` material.
    pub fn from_material(material: &[u8]) -> EnvelopeResult<Self> {
        if material.len() != MATERIAL_LEN {
            return Err(EnvelopeError::MalformedEnvelope(format!(
                "session key material must be {MATERIAL_LEN} bytes, got {}",
                material.len()
            )));
        }
        let mut key = Zeroizing::new([0u8; KEY_LEN]);
        key.copy_from_slice(&material[..KEY_LEN]);
        let mut iv = [0u8; IV_LEN];
        iv.copy_from_slice(&material[KEY_LEN..]);
        Ok(Self { key, iv })
    }

    /// `key || iv`, the plaintext that gets RSA-wrapped.
    pub fn material(&self) -> Zeroizing<Vec<u8>> {
        let mut material = Zeroizing::new(Vec::with_capacity(MATERIAL_LEN));
        material.extend_from_slice(&self.key[..]);
        material.extend_from_slice(&self.iv);
        material
    }

    pub fn key(&self) -> &[u8] {
        &self.key[..]
    }

    pub fn iv(&self) -> &[u8] {
        &self.iv
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_material_is_48_bytes_and_fresh() {
        let first = SessionKey::generate();
        let second = SessionKey::generate();
        assert_eq!(first.material().len(), MATERIAL_LEN);
        assert_ne!(first.key(), second.key());
        assert_ne!(first.iv(), second.iv());
    }

    #[test]
    fn material_splits_back_into_key_and_iv() {
        let session = SessionKey::generate();
        let restored = SessionKey::from_material(&session.material()).unwrap();
        assert_eq!(restored.key(), session.key());
        assert_eq!(restored.iv(), session.iv());
    }

    #[test]
    fn wrong_material_length_is_rejected() {
        assert!(matches!(
            SessionKey::from_material(&[0u8; 47]),
            Err(EnvelopeError::MalformedEnvelope(_))
        ));
    }
}
