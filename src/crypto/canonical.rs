// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Canonical parameter string: the exact bytes that get signed and verified.
//!
//! Every entry becomes a `key=value` token, tokens are sorted bytewise as
//! whole strings (not by key), then joined with `&`. Values are not escaped;
//! real envelope values are base64 or decimal and never contain `=` or `&`.

/// Serialize string pairs into the canonical signing string.
///
/// Output depends only on the set of pairs, never on iteration order.
/// An empty input yields an empty string.
pub fn canonicalize<'a, I, K, V>(params: I) -> String
where
    I: IntoIterator<Item = (&'a K, &'a V)>,
    K: AsRef<str> + ?Sized + 'a,
    V: AsRef<str> + ?Sized + 'a,
{
    let mut tokens: Vec<String> = params
        .into_iter()
        .map(|(k, v)| format!("{}={}", k.as_ref(), v.as_ref()))
        .collect();
    tokens.sort_unstable();
    tokens.join("&")
}
