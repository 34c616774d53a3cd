// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Error taxonomy for the envelope protocol.
//!
//! Every variant is terminal for the call in progress. Nothing in this crate
//! retries; retry policy belongs to the caller or to the [`Transport`].
//!
//! [`Transport`]: crate::transport::Transport

use std::path::PathBuf;

use crate::transport::TransportError;

/// Errors produced while building, sending or opening an envelope.
#[derive(Debug, thiserror::Error)]
pub enum EnvelopeError {
    /// Key file missing, not PEM, or not an RSA key of the expected kind.
    #[error("failed to load key from {path}: {reason}")]
    KeyLoad { path: PathBuf, reason: String },

    /// Symmetric cipher failure (bad key/IV length, corrupt padding).
    #[error("cipher error: {0}")]
    Cipher(String),

    /// AES-GCM tag did not verify: tampered ciphertext, wrong key or nonce.
    #[error("authentication tag mismatch")]
    Authentication,

    /// RSA decryption of the session key failed.
    #[error("decryption failed: {0}")]
    Decryption(String),

    /// Envelope signature did not match the canonical parameters.
    #[error("signature verification failed")]
    SignatureVerification,

    /// The platform answered with a non-200 status code.
    #[error("request failed, code: {code}, message: {message}")]
    Remote { code: i64, message: String },

    #[error(transparent)]
    Transport(#[from] TransportError),

    /// Payload or envelope JSON could not be encoded or decoded.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A wire field was not valid base64.
    #[error("invalid base64 in {field}: {reason}")]
    Encoding { field: &'static str, reason: String },

    /// Required field missing or structurally wrong.
    #[error("malformed envelope: {0}")]
    MalformedEnvelope(String),

    /// A mode tag or protocol version this client does not speak.
    #[error("unsupported {field} value: {value}")]
    UnsupportedMode { field: &'static str, value: String },

    /// RSA signing or encryption failed on the producing side.
    #[error("rsa operation failed: {0}")]
    Rsa(String),
}

impl EnvelopeError {
    /// Errors that indicate a tampered or misconfigured channel rather than
    /// a transient or caller-side fault.
    pub fn is_integrity_failure(&self) -> bool {
        matches!(
            self,
            EnvelopeError::SignatureVerification
                | EnvelopeError::Authentication
                | EnvelopeError::Decryption(_)
        )
    }
}

/// Result type for envelope operations.
pub type EnvelopeResult<T> = Result<T, EnvelopeError>;
