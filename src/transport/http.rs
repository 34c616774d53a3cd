// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! reqwest-backed transport.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, error};

use super::{Transport, TransportError};
use crate::envelope::Envelope;

#[derive(Debug, Clone)]
pub struct HttpTransport {
    base_url: String,
    http: Client,
}

impl HttpTransport {
    /// Build a transport for `base_url`. `timeout` of `None` means no
    /// request timeout.
    pub fn new(
        base_url: impl Into<String>,
        timeout: Option<Duration>,
    ) -> Result<Self, TransportError> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder
            .build()
            .map_err(|e| TransportError::Build(e.to_string()))?;

        Ok(Self {
            base_url: base_url.into(),
            http,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url_for(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn post(&self, path: &str, envelope: &Envelope) -> Result<Vec<u8>, TransportError> {
        let response = self
            .http
            .post(self.url_for(path))
            .json(envelope)
            .send()
            .await
            .map_err(|e| TransportError::Request {
                path: path.to_string(),
                reason: e.to_string(),
            })?;

        // The platform reports failures in the envelope's `code`, so the
        // body is returned whatever the HTTP status.
        let status = response.status();
        let body = response.bytes().await.map_err(|e| {
            error!(path = %path, "request custody api error");
            TransportError::Body {
                path: path.to_string(),
                reason: e.to_string(),
            }
        })?;
        debug!(path = %path, status = %status, bytes = body.len(), "custody api responded");

        Ok(body.to_vec())
    }
}
