// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! AES-256 body encryption.
//!
//! Two modes, selected per envelope by the `aesType` tag:
//!
//! | Mode | Tag | Construction |
//! |------|-----|--------------|
//! | [`AesMode::CbcPkcs7`] | absent | AES-256-CBC, PKCS#7 padding |
//! | [`AesMode::GcmNoPadding`] | `GCM_NOPADDING` | AES-256-GCM, 16-byte nonce, no AAD |
//!
//! The IV/nonce is never prepended to the ciphertext. It travels inside the
//! RSA-wrapped session key instead. GCM output is `ciphertext || tag`.

use aes::Aes256;
use aes_gcm::aead::consts::U16;
use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{AesGcm, Nonce};
use cbc::cipher::block_padding::Pkcs7;
use cbc::cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit};

use crate::error::{EnvelopeError, EnvelopeResult};

/// Wire tag for [`AesMode::GcmNoPadding`].
pub const GCM_TAG: &str = "GCM_NOPADDING";

/// AES key length in bytes.
pub const KEY_LEN: usize = 32;
/// IV / nonce length in bytes.
pub const IV_LEN: usize = 16;

type Aes256CbcEnc = cbc::Encryptor<Aes256>;
type Aes256CbcDec = cbc::Decryptor<Aes256>;
/// AES-256-GCM with a 128-bit nonce, matching the platform's nonce length.
type Aes256Gcm16 = AesGcm<Aes256, U16>;

/// Body cipher mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AesMode {
    /// Legacy mode, implied when no tag is present.
    CbcPkcs7,
    #[default]
    GcmNoPadding,
}

impl AesMode {
    /// Decode the optional `aesType` tag. Absent or blank means legacy.
    pub fn from_tag(tag: Option<&str>) -> EnvelopeResult<Self> {
        match tag.map(str::trim) {
            None | Some("") => Ok(AesMode::CbcPkcs7),
            Some(GCM_TAG) => Ok(AesMode::GcmNoPadding),
            Some(other) => Err(EnvelopeError::UnsupportedMode {
                field: "aesType",
                value: other.to_string(),
            }),
        }
    }

    /// Tag to put on the wire, `None` for the legacy mode.
    pub fn tag(self) -> Option<&'static str> {
        match self {
            AesMode::CbcPkcs7 => None,
            AesMode::GcmNoPadding => Some(GCM_TAG),
        }
    }
}

/// Encrypt `plaintext` with the given session key and IV.
pub fn encrypt(mode: AesMode, plaintext: &[u8], key: &[u8], iv: &[u8]) -> EnvelopeResult<Vec<u8>> {
    match mode {
        AesMode::CbcPkcs7 => {
            let cipher = Aes256CbcEnc::new_from_slices(key, iv)
                .map_err(|e| EnvelopeError::Cipher(format!("invalid CBC key or IV: {e}")))?;
            Ok(cipher.encrypt_padded_vec_mut::<Pkcs7>(plaintext))
        }
        AesMode::GcmNoPadding => {
            let cipher = gcm_cipher(key, iv)?;
            cipher
                .encrypt(Nonce::<U16>::from_slice(iv), plaintext)
                .map_err(|e| EnvelopeError::Cipher(format!("GCM seal failed: {e}")))
        }
    }
}

/// Decrypt `ciphertext` with the given session key and IV.
///
/// In GCM mode a tag mismatch is reported as
/// [`EnvelopeError::Authentication`], never as garbage plaintext.
pub fn decrypt(
    mode: AesMode,
    ciphertext: &[u8],
    key: &[u8],
    iv: &[u8],
) -> EnvelopeResult<Vec<u8>> {
    match mode {
        AesMode::CbcPkcs7 => {
            let cipher = Aes256CbcDec::new_from_slices(key, iv)
                .map_err(|e| EnvelopeError::Cipher(format!("invalid CBC key or IV: {e}")))?;
            if ciphertext.is_empty() || ciphertext.len() % IV_LEN != 0 {
                return Err(EnvelopeError::Cipher(format!(
                    "CBC ciphertext length {} is not a positive multiple of the block size",
                    ciphertext.len()
                )));
            }
            cipher
                .decrypt_padded_vec_mut::<Pkcs7>(ciphertext)
                .map_err(|_| EnvelopeError::Cipher("corrupt PKCS#7 padding".to_string()))
        }
        AesMode::GcmNoPadding => {
            let cipher = gcm_cipher(key, iv)?;
            cipher
                .decrypt(Nonce::<U16>::from_slice(iv), ciphertext)
                .map_err(|_| EnvelopeError::Authentication)
        }
    }
}

fn gcm_cipher(key: &[u8], iv: &[u8]) -> EnvelopeResult<Aes256Gcm16> {
    if iv.len() != IV_LEN {
        return Err(EnvelopeError::Cipher(format!(
            "invalid GCM nonce length: expected {IV_LEN}, got {}",
            iv.len()
        )));
    }
    Aes256Gcm16::new_from_slice(key).map_err(|_| {
        EnvelopeError::Cipher(format!(
            "invalid key size: expected {KEY_LEN} bytes, got {}",
            key.len()
        ))
    })
}
