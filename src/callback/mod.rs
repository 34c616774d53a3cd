// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Callbacks
//!
//! Inbound payloads pushed by the platform without a preceding request:
//! webhooks and co-signer approval requests.
//!
//! ## Shapes
//!
//! | Shape | Fields | Signed over | Signature | Body |
//! |-------|--------|-------------|-----------|------|
//! | v1 | `timestamp, sig, key, bizContent, rsaType?, aesType?` | `key, timestamp, bizContent` | PKCS#1 v1.5 | hybrid encrypted |
//! | v3 | `timestamp, sig, version, bizContent` | `version, timestamp, bizContent` | PSS | plain base64 |
//!
//! The two field sets are kept separate on purpose; neither matches the
//! request or response canonical set.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::crypto::{canonicalize, Credentials, SignatureScheme};
use crate::envelope::codec::{open_biz_content, verify_signature};
use crate::envelope::{null_as_default, BIZ_CONTENT, KEY, TIMESTAMP, VERSION};
use crate::error::{EnvelopeError, EnvelopeResult};

pub mod cosigner;
pub mod webhook;

pub use cosigner::{CoSignerAction, CoSignerConverter, CoSignerResponse, CoSignerResponseV3};
pub use webhook::{WebhookAck, WebhookConverter};

/// The only `version` value of the v3 shape.
pub const V3: &str = "v3";

/// v1 callback as received (webhook or co-signer).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct CallbackEnvelope {
    #[serde(deserialize_with = "null_as_default")]
    pub timestamp: String,
    #[serde(deserialize_with = "null_as_default")]
    pub sig: String,
    #[serde(deserialize_with = "null_as_default")]
    pub key: String,
    #[serde(deserialize_with = "null_as_default")]
    pub biz_content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rsa_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aes_type: Option<String>,
}

impl CallbackEnvelope {
    pub fn canonical_string(&self) -> String {
        canonicalize(&BTreeMap::from([
            (KEY, self.key.as_str()),
            (TIMESTAMP, self.timestamp.as_str()),
            (BIZ_CONTENT, self.biz_content.as_str()),
        ]))
    }
}

/// v3 co-signer callback as received.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct CallbackEnvelopeV3 {
    #[serde(deserialize_with = "null_as_default")]
    pub timestamp: String,
    #[serde(deserialize_with = "null_as_default")]
    pub sig: String,
    #[serde(deserialize_with = "null_as_default")]
    pub version: String,
    #[serde(deserialize_with = "null_as_default")]
    pub biz_content: String,
}

impl CallbackEnvelopeV3 {
    /// `version` is always rendered as `v3`, whatever the sender put in the
    /// field; [`open_v3`] rejects any other value before this is used.
    pub fn canonical_string(&self) -> String {
        canonicalize(&BTreeMap::from([
            (VERSION, V3),
            (TIMESTAMP, self.timestamp.as_str()),
            (BIZ_CONTENT, self.biz_content.as_str()),
        ]))
    }
}

/// Verify a v1 callback and decrypt its body.
pub(crate) fn open_v1(
    credentials: &Credentials,
    callback: &CallbackEnvelope,
) -> EnvelopeResult<Vec<u8>> {
    verify_signature(
        SignatureScheme::Pkcs1v15,
        &callback.canonical_string(),
        &callback.sig,
        credentials,
    )?;
    open_biz_content(
        credentials,
        &callback.key,
        &callback.biz_content,
        callback.rsa_type.as_deref(),
        callback.aes_type.as_deref(),
    )
}

/// Verify a v3 callback and base64-decode its body. No symmetric layer.
pub(crate) fn open_v3(
    credentials: &Credentials,
    callback: &CallbackEnvelopeV3,
) -> EnvelopeResult<Vec<u8>> {
    if callback.version != V3 {
        return Err(EnvelopeError::UnsupportedMode {
            field: VERSION,
            value: callback.version.clone(),
        });
    }
    verify_signature(
        SignatureScheme::Pss,
        &callback.canonical_string(),
        &callback.sig,
        credentials,
    )?;
    crate::crypto::asymmetric::decode_base64(BIZ_CONTENT, &callback.biz_content)
}
