// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! In-process stand-in for the custody platform.
//!
//! Plays the remote side of the protocol with the platform's own key pair:
//! verifies the request signature, opens `bizContent`, hands the decrypted
//! JSON to a handler, and answers with a signed, encrypted response. Useful
//! for testing code built on [`CustodyClient`] without network access.
//!
//! [`CustodyClient`]: crate::client::CustodyClient

use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::debug;

use super::{Transport, TransportError};
use crate::crypto::{Credentials, SignatureScheme};
use crate::envelope::codec::{open_biz_content, seal, timestamp_millis, verify_signature};
use crate::envelope::{
    CryptoModes, Envelope, AES_TYPE, API_KEY, BIZ_CONTENT, CODE, KEY, MESSAGE, RSA_TYPE, SIG,
    SUCCESS_CODE, SUCCESS_MESSAGE, TIMESTAMP,
};
use crate::error::EnvelopeError;

/// What the simulated platform answers.
#[derive(Debug, Clone, PartialEq)]
pub enum MockReply {
    /// `code = 200` with this payload encrypted into `bizContent`.
    Success(Value),
    /// Non-200 status, no signature or body.
    Failure { code: i64, message: String },
}

type Handler = dyn Fn(&str, Value) -> MockReply + Send + Sync;

/// A request as the simulated platform received it.
#[derive(Debug, Clone)]
pub struct ReceivedRequest {
    pub path: String,
    pub envelope: Envelope,
}

pub struct MockPlatform {
    credentials: Credentials,
    api_key: String,
    modes: CryptoModes,
    handler: Box<Handler>,
    received: Mutex<Vec<ReceivedRequest>>,
}

impl MockPlatform {
    /// `credentials` are the platform's: its own private key and the
    /// client's public key.
    pub fn new<F>(credentials: Credentials, api_key: impl Into<String>, handler: F) -> Self
    where
        F: Fn(&str, Value) -> MockReply + Send + Sync + 'static,
    {
        Self {
            credentials,
            api_key: api_key.into(),
            modes: CryptoModes::MODERN,
            handler: Box::new(handler),
            received: Mutex::new(Vec::new()),
        }
    }

    /// Modes used for response envelopes.
    pub fn with_modes(mut self, modes: CryptoModes) -> Self {
        self.modes = modes;
        self
    }

    /// Requests received so far, oldest first.
    pub fn received(&self) -> Vec<ReceivedRequest> {
        self.received
            .lock()
            .map(|requests| requests.clone())
            .unwrap_or_default()
    }

    fn open_request(&self, envelope: &Envelope) -> Result<Value, EnvelopeError> {
        if envelope.get(API_KEY) != Some(self.api_key.as_str()) {
            return Err(EnvelopeError::MalformedEnvelope("unknown apiKey".to_string()));
        }
        verify_signature(
            SignatureScheme::Pkcs1v15,
            &envelope.canonical_string(),
            envelope.get(SIG).unwrap_or_default(),
            &self.credentials,
        )?;
        let plaintext = open_biz_content(
            &self.credentials,
            envelope.get(KEY).unwrap_or_default(),
            envelope.get(BIZ_CONTENT).unwrap_or_default(),
            envelope.get(RSA_TYPE),
            envelope.get(AES_TYPE),
        )?;
        if plaintext.is_empty() {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_slice(&plaintext)?)
    }

    fn respond(&self, reply: MockReply) -> Result<Vec<u8>, EnvelopeError> {
        let body = match reply {
            MockReply::Failure { code, message } => json!({ "code": code, "message": message }),
            MockReply::Success(payload) => {
                let mut envelope = Envelope::new();
                envelope.insert(CODE, SUCCESS_CODE.to_string());
                envelope.insert(MESSAGE, SUCCESS_MESSAGE);
                envelope.insert(TIMESTAMP, timestamp_millis());
                let sealed = seal(envelope, &self.credentials, Some(&payload), self.modes)?;
                let mut body = serde_json::to_value(sealed.fields())?;
                body[CODE] = json!(SUCCESS_CODE);
                body
            }
        };
        Ok(serde_json::to_vec(&body)?)
    }
}

#[async_trait]
impl Transport for MockPlatform {
    async fn post(&self, path: &str, envelope: &Envelope) -> Result<Vec<u8>, TransportError> {
        if let Ok(mut received) = self.received.lock() {
            received.push(ReceivedRequest {
                path: path.to_string(),
                envelope: envelope.clone(),
            });
        }

        let reply = match self.open_request(envelope) {
            Ok(request) => (self.handler)(path, request),
            Err(e) => {
                debug!(path = %path, error = %e, "mock platform rejected request");
                MockReply::Failure {
                    code: 401,
                    message: e.to_string(),
                }
            }
        };

        self.respond(reply).map_err(|e| TransportError::Body {
            path: path.to_string(),
            reason: e.to_string(),
        })
    }
}
