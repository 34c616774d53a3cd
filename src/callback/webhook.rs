// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Webhook verification.
//!
//! Webhooks use their own key pair, distinct from the API key pair: the
//! platform signs with its webhook key and wraps the session key for the
//! receiver's webhook public key.

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::debug;
use utoipa::ToSchema;

use super::{open_v1, CallbackEnvelope};
use crate::config::WebhookConfig;
use crate::crypto::Credentials;
use crate::envelope::{SUCCESS_CODE, SUCCESS_MESSAGE};
use crate::error::EnvelopeResult;

/// Body the receiver answers a webhook with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct WebhookAck {
    pub code: String,
    pub message: String,
}

impl Default for WebhookAck {
    fn default() -> Self {
        Self {
            code: SUCCESS_CODE.to_string(),
            message: SUCCESS_MESSAGE.to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct WebhookConverter {
    credentials: Credentials,
}

impl WebhookConverter {
    /// `credentials`: the receiver's webhook private key and the platform's
    /// webhook public key.
    pub fn new(credentials: Credentials) -> Self {
        Self { credentials }
    }

    pub fn from_config(config: &WebhookConfig) -> EnvelopeResult<Self> {
        Ok(Self::new(Credentials::load(
            &config.private_key_path,
            &config.platform_public_key_path,
        )?))
    }

    /// Verify the webhook signature and return the decrypted payload bytes.
    pub fn convert(&self, webhook: &CallbackEnvelope) -> EnvelopeResult<Vec<u8>> {
        let plaintext = open_v1(&self.credentials, webhook)?;
        debug!(bytes = plaintext.len(), "webhook verified");
        Ok(plaintext)
    }

    /// [`convert`](Self::convert) and decode the payload as `T`.
    pub fn convert_as<T: DeserializeOwned>(&self, webhook: &CallbackEnvelope) -> EnvelopeResult<T> {
        Ok(serde_json::from_slice(&self.convert(webhook)?)?)
    }
}
