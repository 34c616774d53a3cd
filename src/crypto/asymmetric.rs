// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! RSA key transport and signatures.
//!
//! Key transport wraps the 48-byte session key (`aes_key || iv`) with the
//! counterparty's public key, either PKCS#1 v1.5 (legacy, no tag) or
//! OAEP-SHA256 (`rsaType = ECB_OAEP`).
//!
//! Signatures are always over the SHA-256 digest of the canonical parameter
//! string. Legacy and v1 envelopes use PKCS#1 v1.5; v3 callbacks use PSS
//! with a digest-length salt.

use base64ct::{Base64, Encoding};
use rand::rngs::OsRng;
use rsa::{Oaep, Pkcs1v15Encrypt, Pkcs1v15Sign, Pss, RsaPrivateKey, RsaPublicKey};
use sha2::{Digest, Sha256};

use crate::error::{EnvelopeError, EnvelopeResult};

/// Wire tag for [`RsaMode::OaepSha256`].
pub const OAEP_TAG: &str = "ECB_OAEP";

/// Session key transport mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RsaMode {
    /// Legacy mode, implied when no tag is present.
    Pkcs1v15,
    #[default]
    OaepSha256,
}

impl RsaMode {
    /// Decode the optional `rsaType` tag. Absent or blank means legacy.
    pub fn from_tag(tag: Option<&str>) -> EnvelopeResult<Self> {
        match tag.map(str::trim) {
            None | Some("") => Ok(RsaMode::Pkcs1v15),
            Some(OAEP_TAG) => Ok(RsaMode::OaepSha256),
            Some(other) => Err(EnvelopeError::UnsupportedMode {
                field: "rsaType",
                value: other.to_string(),
            }),
        }
    }

    /// Tag to put on the wire, `None` for the legacy mode.
    pub fn tag(self) -> Option<&'static str> {
        match self {
            RsaMode::Pkcs1v15 => None,
            RsaMode::OaepSha256 => Some(OAEP_TAG),
        }
    }
}

/// Signature padding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignatureScheme {
    Pkcs1v15,
    Pss,
}

/// Sign `data` with SHA-256 and return the base64 signature.
pub fn sign(
    scheme: SignatureScheme,
    data: &str,
    private_key: &RsaPrivateKey,
) -> EnvelopeResult<String> {
    let hashed = Sha256::digest(data.as_bytes());
    let signature = match scheme {
        SignatureScheme::Pkcs1v15 => private_key.sign(Pkcs1v15Sign::new::<Sha256>(), &hashed),
        SignatureScheme::Pss => {
            private_key.sign_with_rng(&mut OsRng, Pss::new::<Sha256>(), &hashed)
        }
    }
    .map_err(|e| EnvelopeError::Rsa(format!("signing failed: {e}")))?;
    Ok(Base64::encode_string(&signature))
}

/// Check a base64 signature over `data`.
///
/// A signature that does not match yields `Ok(false)`. Only malformed base64
/// is an error.
pub fn verify(
    scheme: SignatureScheme,
    data: &str,
    signature_b64: &str,
    public_key: &RsaPublicKey,
) -> EnvelopeResult<bool> {
    let signature = decode_base64("sig", signature_b64)?;
    let hashed = Sha256::digest(data.as_bytes());
    let result = match scheme {
        SignatureScheme::Pkcs1v15 => {
            public_key.verify(Pkcs1v15Sign::new::<Sha256>(), &hashed, &signature)
        }
        SignatureScheme::Pss => public_key.verify(Pss::new::<Sha256>(), &hashed, &signature),
    };
    Ok(result.is_ok())
}

/// Encrypt session key material for the counterparty, base64 encoded.
pub fn wrap_key(
    mode: RsaMode,
    material: &[u8],
    public_key: &RsaPublicKey,
) -> EnvelopeResult<String> {
    let ciphertext = match mode {
        RsaMode::Pkcs1v15 => public_key.encrypt(&mut OsRng, Pkcs1v15Encrypt, material),
        RsaMode::OaepSha256 => public_key.encrypt(&mut OsRng, Oaep::new::<Sha256>(), material),
    }
    .map_err(|e| EnvelopeError::Rsa(format!("key wrap failed: {e}")))?;
    Ok(Base64::encode_string(&ciphertext))
}

/// Decrypt base64 session key material with the local private key.
pub fn unwrap_key(
    mode: RsaMode,
    wrapped_b64: &str,
    private_key: &RsaPrivateKey,
) -> EnvelopeResult<Vec<u8>> {
    let ciphertext = decode_base64("key", wrapped_b64)?;
    match mode {
        RsaMode::Pkcs1v15 => private_key.decrypt(Pkcs1v15Encrypt, &ciphertext),
        RsaMode::OaepSha256 => private_key.decrypt(Oaep::new::<Sha256>(), &ciphertext),
    }
    .map_err(|e| EnvelopeError::Decryption(e.to_string()))
}

pub(crate) fn decode_base64(field: &'static str, value: &str) -> EnvelopeResult<Vec<u8>> {
    Base64::decode_vec(value).map_err(|e| EnvelopeError::Encoding {
        field,
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{caller_key, platform_key};

    const CANONICAL: &str = "apiKey=abc&bizContent=Zm9v&timestamp=1700000000000000";

    #[test]
    fn signatures_verify_for_matching_keypair() {
        let key = caller_key();
        for scheme in [SignatureScheme::Pkcs1v15, SignatureScheme::Pss] {
            let sig = sign(scheme, CANONICAL, key).unwrap();
            assert!(verify(scheme, CANONICAL, &sig, &key.to_public_key()).unwrap());
        }
    }

    #[test]
    fn altered_data_fails_verification() {
        let key = caller_key();
        for scheme in [SignatureScheme::Pkcs1v15, SignatureScheme::Pss] {
            let sig = sign(scheme, CANONICAL, key).unwrap();
            let altered = CANONICAL.replace("abc", "abd");
            assert!(!verify(scheme, &altered, &sig, &key.to_public_key()).unwrap());
        }
    }

    #[test]
    fn altered_signature_fails_verification() {
        let key = caller_key();
        let sig = sign(SignatureScheme::Pkcs1v15, CANONICAL, key).unwrap();
        let mut raw = Base64::decode_vec(&sig).unwrap();
        raw[10] ^= 0x01;
        let tampered = Base64::encode_string(&raw);
        assert!(!verify(
            SignatureScheme::Pkcs1v15,
            CANONICAL,
            &tampered,
            &key.to_public_key()
        )
        .unwrap());
    }

    #[test]
    fn different_keypair_fails_verification() {
        let sig = sign(SignatureScheme::Pss, CANONICAL, caller_key()).unwrap();
        assert!(!verify(
            SignatureScheme::Pss,
            CANONICAL,
            &sig,
            &platform_key().to_public_key()
        )
        .unwrap());
    }

    #[test]
    fn pkcs1_signature_does_not_pass_as_pss() {
        let key = caller_key();
        let sig = sign(SignatureScheme::Pkcs1v15, CANONICAL, key).unwrap();
        assert!(!verify(SignatureScheme::Pss, CANONICAL, &sig, &key.to_public_key()).unwrap());
    }

    #[test]
    fn malformed_base64_signature_is_an_error() {
        let err = verify(
            SignatureScheme::Pkcs1v15,
            CANONICAL,
            "not*base64!",
            &caller_key().to_public_key(),
        )
        .unwrap_err();
        assert!(matches!(err, EnvelopeError::Encoding { field: "sig", .. }));
    }

    #[test]
    fn key_wrap_round_trips_in_both_modes() {
        let material = [0x5Au8; 48];
        let key = platform_key();
        for mode in [RsaMode::Pkcs1v15, RsaMode::OaepSha256] {
            let wrapped = wrap_key(mode, &material, &key.to_public_key()).unwrap();
            assert_eq!(unwrap_key(mode, &wrapped, key).unwrap(), material);
        }
    }

    #[test]
    fn unwrap_with_wrong_key_is_decryption_error() {
        let wrapped = wrap_key(
            RsaMode::OaepSha256,
            &[1u8; 48],
            &platform_key().to_public_key(),
        )
        .unwrap();
        assert!(matches!(
            unwrap_key(RsaMode::OaepSha256, &wrapped, caller_key()),
            Err(EnvelopeError::Decryption(_))
        ));
    }

    #[test]
    fn unwrap_with_wrong_mode_is_decryption_error() {
        let key = platform_key();
        let wrapped = wrap_key(RsaMode::OaepSha256, &[1u8; 48], &key.to_public_key()).unwrap();
        assert!(unwrap_key(RsaMode::Pkcs1v15, &wrapped, key).is_err());
    }

    #[test]
    fn rsa_mode_tags_decode_with_legacy_default() {
        assert_eq!(RsaMode::from_tag(None).unwrap(), RsaMode::Pkcs1v15);
        assert_eq!(
            RsaMode::from_tag(Some("ECB_OAEP")).unwrap(),
            RsaMode::OaepSha256
        );
        assert!(RsaMode::from_tag(Some("RSA_NONE")).is_err());
        assert_eq!(RsaMode::OaepSha256.tag(), Some("ECB_OAEP"));
        assert_eq!(RsaMode::Pkcs1v15.tag(), None);
    }
}
