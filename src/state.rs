// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Shared state of the callback receiver.
//!
//! The converters are optional: a receiver configured only for webhooks
//! answers co-signer routes with 503, and the other way round.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tracing::info;

use crate::callback::{CoSignerConverter, WebhookConverter};

/// Decides co-signer approval requests.
#[async_trait]
pub trait Approver: Send + Sync {
    /// `request` is the verified, decrypted approval request.
    async fn approve(&self, request: &Value) -> bool;
}

/// Approves or rejects everything.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedApprover {
    pub approve: bool,
}

#[async_trait]
impl Approver for FixedApprover {
    async fn approve(&self, _request: &Value) -> bool {
        self.approve
    }
}

/// Receives verified webhook events.
#[async_trait]
pub trait WebhookSink: Send + Sync {
    async fn deliver(&self, event: Value);
}

/// Logs each event's type and drops it.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingSink;

#[async_trait]
impl WebhookSink for LoggingSink {
    async fn deliver(&self, event: Value) {
        let event_type = event
            .get("eventType")
            .and_then(Value::as_str)
            .unwrap_or("unknown");
        info!(event_type = %event_type, "webhook event received");
    }
}

#[derive(Clone)]
pub struct AppState {
    pub webhook: Option<Arc<WebhookConverter>>,
    pub cosigner: Option<Arc<CoSignerConverter>>,
    pub approver: Arc<dyn Approver>,
    pub sink: Arc<dyn WebhookSink>,
}

impl AppState {
    pub fn new(approver: Arc<dyn Approver>, sink: Arc<dyn WebhookSink>) -> Self {
        Self {
            webhook: None,
            cosigner: None,
            approver,
            sink,
        }
    }

    pub fn with_webhook(mut self, converter: WebhookConverter) -> Self {
        self.webhook = Some(Arc::new(converter));
        self
    }

    pub fn with_cosigner(mut self, converter: CoSignerConverter) -> Self {
        self.cosigner = Some(Arc::new(converter));
        self
    }
}

impl Default for AppState {
    /// No converters, reject every approval, log every webhook.
    fn default() -> Self {
        Self::new(Arc::new(FixedApprover { approve: false }), Arc::new(LoggingSink))
    }
}
