// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Co-signer approval callbacks.
//!
//! The co-signer asks the approval callback service whether to sign a
//! transaction. The service verifies the request, decides, and answers with
//! a signed acknowledgement envelope:
//!
//! - v1 requests are answered with a hybrid-encrypted ack (PKCS#1 v1.5
//!   signature, session key wrapped for the co-signer).
//! - v3 requests are answered with a PSS-signed ack whose `bizContent` is
//!   plain base64 JSON.

use base64ct::{Base64, Encoding};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::debug;
use utoipa::ToSchema;

use super::{open_v1, open_v3, CallbackEnvelope, CallbackEnvelopeV3, V3};
use crate::config::CoSignerConfig;
use crate::crypto::{asymmetric, Credentials, SignatureScheme};
use crate::envelope::codec::{seal, timestamp_millis};
use crate::envelope::{
    CryptoModes, Envelope, BIZ_CONTENT, CODE, MESSAGE, SIG, SUCCESS_CODE, SUCCESS_MESSAGE,
    TIMESTAMP, VERSION,
};
use crate::error::EnvelopeResult;

/// v1 decision payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CoSignerResponse {
    pub approve: bool,
    pub tx_key: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CoSignerAction {
    Approve,
    Reject,
}

impl From<bool> for CoSignerAction {
    fn from(approve: bool) -> Self {
        if approve {
            CoSignerAction::Approve
        } else {
            CoSignerAction::Reject
        }
    }
}

/// v3 decision payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CoSignerResponseV3 {
    pub action: CoSignerAction,
    pub approval_id: String,
}

#[derive(Debug, Clone)]
pub struct CoSignerConverter {
    credentials: Credentials,
}

impl CoSignerConverter {
    /// `credentials`: the approval callback service's private key and the
    /// co-signer's public key.
    pub fn new(credentials: Credentials) -> Self {
        Self { credentials }
    }

    pub fn from_config(config: &CoSignerConfig) -> EnvelopeResult<Self> {
        Ok(Self::new(Credentials::load(
            &config.approval_private_key_path,
            &config.co_signer_public_key_path,
        )?))
    }

    /// Verify a v1 approval request and return the decrypted payload bytes.
    pub fn request_convert(&self, callback: &CallbackEnvelope) -> EnvelopeResult<Vec<u8>> {
        let plaintext = open_v1(&self.credentials, callback)?;
        debug!(bytes = plaintext.len(), "co-signer v1 request verified");
        Ok(plaintext)
    }

    /// Verify a v3 approval request and return the base64-decoded payload.
    pub fn request_v3_convert(&self, callback: &CallbackEnvelopeV3) -> EnvelopeResult<Vec<u8>> {
        let plaintext = open_v3(&self.credentials, callback)?;
        debug!(bytes = plaintext.len(), "co-signer v3 request verified");
        Ok(plaintext)
    }

    pub fn request_convert_as<T: DeserializeOwned>(
        &self,
        callback: &CallbackEnvelope,
    ) -> EnvelopeResult<T> {
        Ok(serde_json::from_slice(&self.request_convert(callback)?)?)
    }

    pub fn request_v3_convert_as<T: DeserializeOwned>(
        &self,
        callback: &CallbackEnvelopeV3,
    ) -> EnvelopeResult<T> {
        Ok(serde_json::from_slice(&self.request_v3_convert(callback)?)?)
    }

    /// Legacy v1 ack: PKCS#1 v1.5 key wrap with AES-CBC, no mode tags.
    #[deprecated(note = "use response_converter_with_new_crypto_type")]
    pub fn response_converter<T>(&self, payload: Option<&T>) -> EnvelopeResult<Envelope>
    where
        T: Serialize + ?Sized,
    {
        self.build_acknowledgement(payload, CryptoModes::LEGACY)
    }

    /// v1 ack with OAEP key wrap and AES-GCM, tagged after signing.
    pub fn response_converter_with_new_crypto_type<T>(
        &self,
        payload: Option<&T>,
    ) -> EnvelopeResult<Envelope>
    where
        T: Serialize + ?Sized,
    {
        self.build_acknowledgement(payload, CryptoModes::MODERN)
    }

    /// v1 ack in any mode combination.
    pub fn build_acknowledgement<T>(
        &self,
        payload: Option<&T>,
        modes: CryptoModes,
    ) -> EnvelopeResult<Envelope>
    where
        T: Serialize + ?Sized,
    {
        seal(ack_fields(), &self.credentials, payload, modes)
    }

    /// v3 ack: PSS-signed, `bizContent` is base64 JSON with no encryption.
    pub fn response_v3_converter<T>(&self, payload: Option<&T>) -> EnvelopeResult<Envelope>
    where
        T: Serialize + ?Sized,
    {
        let mut envelope = ack_fields();
        envelope.insert(VERSION, V3);
        if let Some(payload) = payload {
            envelope.insert(BIZ_CONTENT, Base64::encode_string(&serde_json::to_vec(payload)?));
        }

        let signature = asymmetric::sign(
            SignatureScheme::Pss,
            &envelope.canonical_string(),
            self.credentials.own_private_key(),
        )?;
        envelope.insert(SIG, signature);
        Ok(envelope)
    }
}

fn ack_fields() -> Envelope {
    let mut envelope = Envelope::new();
    envelope.insert(TIMESTAMP, timestamp_millis());
    envelope.insert(CODE, SUCCESS_CODE.to_string());
    envelope.insert(MESSAGE, SUCCESS_MESSAGE);
    envelope
}
