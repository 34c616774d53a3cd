// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Envelope codec: seal outbound envelopes, verify and open inbound ones.
//!
//! ## Outbound
//!
//! 1. Fresh [`SessionKey`] (32-byte key, 16-byte IV)
//! 2. JSON payload encrypted with the session key, base64 into `bizContent`
//! 3. `key || iv` wrapped with the counterparty public key into `key`
//! 4. Canonical string signed with the own private key into `sig`
//! 5. Mode tags appended, unsigned
//!
//! ## Inbound
//!
//! Status check first, then signature, then key unwrap and body decryption.
//! Any failure aborts; a partially verified envelope is never returned.

use base64ct::{Base64, Encoding};
use serde::Serialize;
use tracing::{debug, warn};
use zeroize::Zeroizing;

use super::session::SessionKey;
use super::{
    CryptoModes, Envelope, ResponseEnvelope, AES_TYPE, API_KEY, BIZ_CONTENT, KEY, RSA_TYPE, SIG,
    SUCCESS_CODE, TIMESTAMP,
};
use crate::crypto::asymmetric::{self, decode_base64};
use crate::crypto::{symmetric, AesMode, Credentials, RsaMode, SignatureScheme};
use crate::error::{EnvelopeError, EnvelopeResult};

/// Build a signed, encrypted request envelope.
///
/// `payload` is JSON-encoded; `None` produces an envelope without
/// `bizContent`. The timestamp is the current time in microseconds.
pub fn build_request<T>(
    credentials: &Credentials,
    api_key: &str,
    payload: Option<&T>,
    modes: CryptoModes,
) -> EnvelopeResult<Envelope>
where
    T: Serialize + ?Sized,
{
    let mut envelope = Envelope::new();
    envelope.insert(API_KEY, api_key);
    envelope.insert(TIMESTAMP, timestamp_micros());
    seal(envelope, credentials, payload, modes)
}

/// Verify and decrypt a raw platform response, returning the plaintext
/// `bizContent` bytes.
///
/// A non-200 `code` fails with [`EnvelopeError::Remote`] before any
/// signature or decryption work is attempted.
pub fn parse_response(credentials: &Credentials, raw: &[u8]) -> EnvelopeResult<Vec<u8>> {
    let response: ResponseEnvelope = serde_json::from_slice(raw)?;

    if response.code != SUCCESS_CODE {
        warn!(
            code = response.code,
            message = %response.message,
            "request failed"
        );
        return Err(EnvelopeError::Remote {
            code: response.code,
            message: response.message,
        });
    }

    verify_signature(
        SignatureScheme::Pkcs1v15,
        &response.canonical_string(),
        &response.sig,
        credentials,
    )?;

    open_biz_content(
        credentials,
        &response.key,
        &response.biz_content,
        response.rsa_type.as_deref(),
        response.aes_type.as_deref(),
    )
}

/// Encrypt `payload` into `envelope`, wrap the session key, sign, and tag.
///
/// Shared by client requests and v1 callback acknowledgements. The
/// signature is always PKCS#1 v1.5 on these shapes.
pub(crate) fn seal<T>(
    mut envelope: Envelope,
    credentials: &Credentials,
    payload: Option<&T>,
    modes: CryptoModes,
) -> EnvelopeResult<Envelope>
where
    T: Serialize + ?Sized,
{
    let session = SessionKey::generate();

    if let Some(payload) = payload {
        let plaintext = Zeroizing::new(serde_json::to_vec(payload)?);
        debug!(bytes = plaintext.len(), aes = ?modes.aes, "encrypting payload");
        let ciphertext = symmetric::encrypt(modes.aes, &plaintext, session.key(), session.iv())?;
        envelope.insert(BIZ_CONTENT, Base64::encode_string(&ciphertext));
    }

    let wrapped = asymmetric::wrap_key(
        modes.rsa,
        &session.material(),
        credentials.counterparty_public_key(),
    )?;
    envelope.insert(KEY, wrapped);

    let signature = asymmetric::sign(
        SignatureScheme::Pkcs1v15,
        &envelope.canonical_string(),
        credentials.own_private_key(),
    )?;
    envelope.insert(SIG, signature);

    tag_modes(&mut envelope, modes);
    Ok(envelope)
}

/// Attach `rsaType` / `aesType` for the axes that use the modern mode.
pub(crate) fn tag_modes(envelope: &mut Envelope, modes: CryptoModes) {
    if let Some(tag) = modes.rsa.tag() {
        envelope.insert(RSA_TYPE, tag);
    }
    if let Some(tag) = modes.aes.tag() {
        envelope.insert(AES_TYPE, tag);
    }
}

/// Fail with [`EnvelopeError::SignatureVerification`] unless `signature`
/// matches `canonical` under the counterparty public key.
pub(crate) fn verify_signature(
    scheme: SignatureScheme,
    canonical: &str,
    signature: &str,
    credentials: &Credentials,
) -> EnvelopeResult<()> {
    if asymmetric::verify(
        scheme,
        canonical,
        signature,
        credentials.counterparty_public_key(),
    )? {
        Ok(())
    } else {
        warn!(scheme = ?scheme, "envelope signature verification failed");
        Err(EnvelopeError::SignatureVerification)
    }
}

/// Unwrap the session key and decrypt `bizContent`, dispatching on the
/// mode tags. An empty `bizContent` yields an empty payload.
pub(crate) fn open_biz_content(
    credentials: &Credentials,
    wrapped_key: &str,
    biz_content: &str,
    rsa_type: Option<&str>,
    aes_type: Option<&str>,
) -> EnvelopeResult<Vec<u8>> {
    let rsa_mode = RsaMode::from_tag(rsa_type)?;
    let aes_mode = AesMode::from_tag(aes_type)?;

    if biz_content.is_empty() {
        return Ok(Vec::new());
    }

    let material = Zeroizing::new(asymmetric::unwrap_key(
        rsa_mode,
        wrapped_key,
        credentials.own_private_key(),
    )?);
    let session = SessionKey::from_material(&material)?;
    let ciphertext = decode_base64("bizContent", biz_content)?;
    symmetric::decrypt(aes_mode, &ciphertext, session.key(), session.iv())
}

pub(crate) fn timestamp_micros() -> String {
    chrono::Utc::now().timestamp_micros().to_string()
}

pub(crate) fn timestamp_millis() -> String {
    chrono::Utc::now().timestamp_millis().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{caller_credentials, platform_credentials};
    use serde_json::json;

    /// Platform side of a request: verify the caller's signature and open
    /// the body with the platform's key.
    fn platform_opens(envelope: &Envelope) -> EnvelopeResult<Vec<u8>> {
        let platform = platform_credentials();
        verify_signature(
            SignatureScheme::Pkcs1v15,
            &envelope.canonical_string(),
            envelope.get(SIG).unwrap_or_default(),
            &platform,
        )?;
        open_biz_content(
            &platform,
            envelope.get(KEY).unwrap_or_default(),
            envelope.get(BIZ_CONTENT).unwrap_or_default(),
            envelope.get(RSA_TYPE),
            envelope.get(AES_TYPE),
        )
    }

    fn platform_response(payload: &serde_json::Value, modes: CryptoModes) -> Vec<u8> {
        let platform = platform_credentials();
        let mut envelope = Envelope::new();
        envelope.insert("code", "200");
        envelope.insert("message", "SUCCESS");
        envelope.insert(TIMESTAMP, timestamp_millis());
        let sealed = seal(envelope, &platform, Some(payload), modes).unwrap();
        let mut value = serde_json::to_value(sealed.fields()).unwrap();
        value["code"] = json!(200);
        serde_json::to_vec(&value).unwrap()
    }

    #[test]
    fn request_carries_expected_fields_per_mode() {
        let creds = caller_credentials();
        let payload = json!({"foo": "bar"});

        let modern = build_request(&creds, "api-key", Some(&payload), CryptoModes::MODERN).unwrap();
        for field in [API_KEY, TIMESTAMP, KEY, BIZ_CONTENT, SIG] {
            assert!(modern.contains(field), "missing {field}");
        }
        assert_eq!(modern.get(RSA_TYPE), Some("ECB_OAEP"));
        assert_eq!(modern.get(AES_TYPE), Some("GCM_NOPADDING"));
        assert_eq!(modern.get(TIMESTAMP).unwrap().len(), 16);

        let legacy = build_request(&creds, "api-key", Some(&payload), CryptoModes::LEGACY).unwrap();
        assert!(!legacy.contains(RSA_TYPE));
        assert!(!legacy.contains(AES_TYPE));
    }

    #[test]
    fn request_without_payload_has_no_biz_content() {
        let envelope =
            build_request::<()>(&caller_credentials(), "api-key", None, CryptoModes::MODERN)
                .unwrap();
        assert!(!envelope.contains(BIZ_CONTENT));
        assert!(envelope.contains(KEY));
        assert!(platform_opens(&envelope).unwrap().is_empty());
    }

    #[test]
    fn platform_can_open_requests_in_every_mode_combination() {
        let payload = json!({"foo": "bar"});
        for rsa in [RsaMode::Pkcs1v15, RsaMode::OaepSha256] {
            for aes in [AesMode::CbcPkcs7, AesMode::GcmNoPadding] {
                let envelope = build_request(
                    &caller_credentials(),
                    "api-key",
                    Some(&payload),
                    CryptoModes::new(rsa, aes),
                )
                .unwrap();
                let opened = platform_opens(&envelope).unwrap();
                assert_eq!(serde_json::from_slice::<serde_json::Value>(&opened).unwrap(), payload);
            }
        }
    }

    #[test]
    fn legacy_cbc_uses_the_transmitted_iv() {
        // The IV wrapped into `key` must be exactly the one that encrypted
        // the body; a regenerated or stale IV corrupts the first block.
        let payload = json!({"first_block": "0123456789abcdef", "more": "x"});
        for _ in 0..8 {
            let envelope = build_request(
                &caller_credentials(),
                "api-key",
                Some(&payload),
                CryptoModes::LEGACY,
            )
            .unwrap();
            let opened = platform_opens(&envelope).unwrap();
            assert_eq!(opened, serde_json::to_vec(&payload).unwrap());
        }
    }

    #[test]
    fn tampered_request_field_fails_signature() {
        let mut envelope = build_request(
            &caller_credentials(),
            "api-key",
            Some(&json!({"foo": "bar"})),
            CryptoModes::MODERN,
        )
        .unwrap();
        envelope.insert(API_KEY, "other-key");
        assert!(matches!(
            platform_opens(&envelope),
            Err(EnvelopeError::SignatureVerification)
        ));
    }

    #[test]
    fn parse_response_returns_plaintext() {
        let raw = platform_response(&json!({"result": true}), CryptoModes::MODERN);
        let plaintext = parse_response(&caller_credentials(), &raw).unwrap();
        assert_eq!(plaintext, br#"{"result":true}"#);
    }

    #[test]
    fn parse_response_handles_legacy_and_mixed_modes() {
        let combos = [
            CryptoModes::LEGACY,
            CryptoModes::new(RsaMode::OaepSha256, AesMode::CbcPkcs7),
            CryptoModes::new(RsaMode::Pkcs1v15, AesMode::GcmNoPadding),
        ];
        for modes in combos {
            let raw = platform_response(&json!({"result": true}), modes);
            let plaintext = parse_response(&caller_credentials(), &raw).unwrap();
            assert_eq!(plaintext, br#"{"result":true}"#);
        }
    }

    #[test]
    fn non_200_fails_fast_without_verification() {
        // No sig, key or bizContent at all: only the status is inspected.
        let raw = br#"{"code":400,"message":"bad request"}"#;
        match parse_response(&caller_credentials(), raw) {
            Err(EnvelopeError::Remote { code, message }) => {
                assert_eq!(code, 400);
                assert_eq!(message, "bad request");
            }
            other => panic!("expected Remote, got: {other:?}"),
        }
    }

    #[test]
    fn non_200_with_null_fields_keeps_code_and_message() {
        let raw = serde_json::to_vec(&json!({
            "code": 1001,
            "message": "apiKey invalid",
            "sig": null,
            "key": null,
            "bizContent": null,
            "timestamp": null
        }))
        .unwrap();
        match parse_response(&caller_credentials(), &raw) {
            Err(EnvelopeError::Remote { code, message }) => {
                assert_eq!(code, 1001);
                assert_eq!(message, "apiKey invalid");
            }
            other => panic!("expected Remote, got: {other:?}"),
        }
    }

    #[test]
    fn tampered_response_fails_signature() {
        let raw = platform_response(&json!({"result": true}), CryptoModes::MODERN);
        let mut value: serde_json::Value = serde_json::from_slice(&raw).unwrap();
        value["message"] = json!("SUCCESS!");
        let raw = serde_json::to_vec(&value).unwrap();
        assert!(matches!(
            parse_response(&caller_credentials(), &raw),
            Err(EnvelopeError::SignatureVerification)
        ));
    }

    #[test]
    fn response_signed_by_wrong_key_fails_signature() {
        let raw = platform_response(&json!({"result": true}), CryptoModes::MODERN);
        // The caller's own key pair stands in for a misconfigured platform key.
        let confused = Credentials::new(
            crate::test_support::caller_key().clone(),
            crate::test_support::caller_key().to_public_key(),
        );
        assert!(matches!(
            parse_response(&confused, &raw),
            Err(EnvelopeError::SignatureVerification)
        ));
    }

    #[test]
    fn unknown_mode_tag_is_rejected() {
        let raw = platform_response(&json!({"result": true}), CryptoModes::MODERN);
        let mut value: serde_json::Value = serde_json::from_slice(&raw).unwrap();
        value["aesType"] = json!("CTR_NOPADDING");
        let raw = serde_json::to_vec(&value).unwrap();
        assert!(matches!(
            parse_response(&caller_credentials(), &raw),
            Err(EnvelopeError::UnsupportedMode { field: "aesType", .. })
        ));
    }

    #[test]
    fn garbage_body_is_serialization_error() {
        assert!(matches!(
            parse_response(&caller_credentials(), b"<html>502</html>"),
            Err(EnvelopeError::Serialization(_))
        ));
    }
}
