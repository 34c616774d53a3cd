// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Cryptographic primitives behind the envelope protocol.
//!
//! - [`keys`]: PEM key loading and the per-party [`Credentials`]
//! - [`canonical`]: the sorted `k=v&...` string that gets signed
//! - [`symmetric`]: AES-256 CBC/GCM body encryption
//! - [`asymmetric`]: RSA key transport and PKCS#1 v1.5 / PSS signatures

pub mod asymmetric;
pub mod canonical;
pub mod keys;
pub mod symmetric;

pub use asymmetric::{RsaMode, SignatureScheme};
pub use canonical::canonicalize;
pub use keys::{load_private_key, load_public_key, Credentials};
pub use symmetric::AesMode;
