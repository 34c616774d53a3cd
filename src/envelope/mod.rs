// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Envelope
//!
//! The wire unit of the custody API: a flat map of string fields.
//!
//! ## Request fields
//!
//! | Field | Presence | Signed |
//! |-------|----------|--------|
//! | `apiKey` | always (client requests) | yes |
//! | `timestamp` | always | yes |
//! | `bizContent` | iff a payload exists | yes |
//! | `key` | always | yes |
//! | `sig` | always | - |
//! | `rsaType` / `aesType` | modern modes only | no |
//!
//! Mode tags are attached after signing and never enter a canonical string.
//!
//! ## Response fields
//!
//! `code`, `message`, `key`, `timestamp`, `bizContent` are all signed, empty
//! or not. See [`ResponseEnvelope::canonical_string`].

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};
use utoipa::ToSchema;

use crate::crypto::{canonicalize, AesMode, RsaMode};

pub mod codec;
pub mod session;

pub use codec::{build_request, parse_response};
pub use session::SessionKey;

pub const API_KEY: &str = "apiKey";
pub const TIMESTAMP: &str = "timestamp";
pub const SIG: &str = "sig";
pub const KEY: &str = "key";
pub const BIZ_CONTENT: &str = "bizContent";
pub const RSA_TYPE: &str = "rsaType";
pub const AES_TYPE: &str = "aesType";
pub const CODE: &str = "code";
pub const MESSAGE: &str = "message";
pub const VERSION: &str = "version";

/// Status code of a successful response or acknowledgement.
pub const SUCCESS_CODE: i64 = 200;
/// Message carried by acknowledgements.
pub const SUCCESS_MESSAGE: &str = "SUCCESS";

/// Fields excluded from every canonical string.
const UNSIGNED_FIELDS: [&str; 3] = [SIG, RSA_TYPE, AES_TYPE];

/// Asymmetric and symmetric mode for one envelope. The two axes are
/// independent; any combination is valid on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CryptoModes {
    pub rsa: RsaMode,
    pub aes: AesMode,
}

impl CryptoModes {
    /// PKCS#1 v1.5 key wrap with AES-CBC, no tags.
    pub const LEGACY: CryptoModes = CryptoModes {
        rsa: RsaMode::Pkcs1v15,
        aes: AesMode::CbcPkcs7,
    };

    /// OAEP-SHA256 key wrap with AES-GCM, tagged.
    pub const MODERN: CryptoModes = CryptoModes {
        rsa: RsaMode::OaepSha256,
        aes: AesMode::GcmNoPadding,
    };

    pub fn new(rsa: RsaMode, aes: AesMode) -> Self {
        Self { rsa, aes }
    }
}

/// Outbound envelope: request to the platform or acknowledgement of a
/// callback. Serializes as a flat JSON object of strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
pub struct Envelope(BTreeMap<String, String>);

impl Envelope {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, field: &str, value: impl Into<String>) {
        self.0.insert(field.to_string(), value.into());
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn fields(&self) -> &BTreeMap<String, String> {
        &self.0
    }

    pub fn into_fields(self) -> BTreeMap<String, String> {
        self.0
    }

    /// Canonical string over every field except `sig` and the mode tags.
    pub fn canonical_string(&self) -> String {
        canonicalize(
            self.0
                .iter()
                .filter(|(field, _)| !UNSIGNED_FIELDS.contains(&field.as_str())),
        )
    }
}

impl From<BTreeMap<String, String>> for Envelope {
    fn from(fields: BTreeMap<String, String>) -> Self {
        Envelope(fields)
    }
}

/// Decode JSON `null` as the type's default, the same as a missing field.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Response body returned by the platform.
///
/// Missing or `null` fields decode as empty strings (or `0` for `code`) so
/// that a malformed answer still surfaces as a non-200 [`Remote`] error or a
/// signature failure rather than a decoding error.
///
/// [`Remote`]: crate::error::EnvelopeError::Remote
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ResponseEnvelope {
    #[serde(deserialize_with = "null_as_default")]
    pub code: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub message: String,
    #[serde(deserialize_with = "null_as_default")]
    pub sig: String,
    #[serde(deserialize_with = "null_as_default")]
    pub key: String,
    #[serde(deserialize_with = "null_as_default")]
    pub biz_content: String,
    #[serde(deserialize_with = "null_as_default")]
    pub timestamp: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rsa_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aes_type: Option<String>,
}

impl ResponseEnvelope {
    /// Canonical string over the fixed response field set.
    pub fn canonical_string(&self) -> String {
        let code = self.code.to_string();
        let fields: BTreeMap<&str, &str> = BTreeMap::from([
            (CODE, code.as_str()),
            (MESSAGE, self.message.as_str()),
            (KEY, self.key.as_str()),
            (TIMESTAMP, self.timestamp.as_str()),
            (BIZ_CONTENT, self.biz_content.as_str()),
        ]);
        canonicalize(&fields)
    }
}
