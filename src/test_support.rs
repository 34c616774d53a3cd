// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Shared RSA fixtures for unit tests. Key generation is slow, so each key
//! is generated once per test process.

use std::sync::OnceLock;

use rand::rngs::OsRng;
use rsa::RsaPrivateKey;

use crate::crypto::Credentials;

const TEST_KEY_BITS: usize = 2048;

fn generate() -> RsaPrivateKey {
    RsaPrivateKey::new(&mut OsRng, TEST_KEY_BITS).expect("rsa key generation")
}

/// Key pair of the SDK user (API client, webhook receiver, approval service).
pub fn caller_key() -> &'static RsaPrivateKey {
    static KEY: OnceLock<RsaPrivateKey> = OnceLock::new();
    KEY.get_or_init(generate)
}

/// Key pair of the custody platform (or co-signer).
pub fn platform_key() -> &'static RsaPrivateKey {
    static KEY: OnceLock<RsaPrivateKey> = OnceLock::new();
    KEY.get_or_init(generate)
}

/// Credentials as seen by the SDK user.
pub fn caller_credentials() -> Credentials {
    Credentials::new(caller_key().clone(), platform_key().to_public_key())
}

/// Credentials as seen by the platform: the roles are mirrored.
pub fn platform_credentials() -> Credentials {
    Credentials::new(platform_key().clone(), caller_key().to_public_key())
}
