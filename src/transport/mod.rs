// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Delivery of envelopes to the platform.
//!
//! The codec only needs one operation: POST a flat envelope to a path and get
//! the raw response bytes back. TLS, timeouts and retries are the
//! transport's business.

use async_trait::async_trait;

use crate::envelope::Envelope;

pub mod http;
pub mod mock;

pub use http::HttpTransport;
pub use mock::MockPlatform;

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("failed to build HTTP client: {0}")]
    Build(String),

    #[error("POST {path} failed: {reason}")]
    Request { path: String, reason: String },

    #[error("POST {path} response could not be read: {reason}")]
    Body { path: String, reason: String },
}

/// Posts an envelope as a JSON object to `{base_url}{path}`.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn post(&self, path: &str, envelope: &Envelope) -> Result<Vec<u8>, TransportError>;
}
