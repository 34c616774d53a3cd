// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Relational Custody Client - secure envelope SDK for a custodial
//! crypto-asset API.
//!
//! Every request and response travels in a signed, hybrid-encrypted
//! envelope: a fresh AES-256 session key encrypts the JSON payload, RSA
//! wraps the session key for the counterparty, and an RSA signature covers
//! the canonicalized fields.
//!
//! ## Modules
//!
//! - `crypto` - key loading, canonical serializer, AES and RSA primitives
//! - `envelope` - envelope types and the request/response codec
//! - `client` - [`CustodyClient`], the entry point for API calls
//! - `transport` - HTTP delivery of envelopes (reqwest) and a mock platform
//! - `callback` - webhook and co-signer callback verification and acks
//! - `server` - axum receiver for callbacks
//! - `config` - environment and serde configuration
//! - `telemetry` - tracing subscriber setup

pub mod callback;
pub mod client;
pub mod config;
pub mod crypto;
pub mod envelope;
pub mod error;
pub mod server;
pub mod state;
pub mod telemetry;
pub mod transport;

#[cfg(test)]
mod test_support;

pub use client::CustodyClient;
pub use envelope::{CryptoModes, Envelope};
pub use error::{EnvelopeError, EnvelopeResult};
