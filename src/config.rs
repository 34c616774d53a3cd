// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! Configuration is read from the environment once, at startup, and
//! resolved into immutable values. Every struct also derives
//! `Deserialize` (camelCase) for callers that keep settings in a file.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `CUSTODY_BASE_URL` | Custody API base URL | Required |
//! | `CUSTODY_API_KEY` | API key from the custody console | Required |
//! | `CUSTODY_PRIVATE_KEY_PATH` | Own RSA private key (PKCS#8 PEM) | Required |
//! | `CUSTODY_PLATFORM_PUBLIC_KEY_PATH` | Platform RSA public key | Required |
//! | `CUSTODY_REQUEST_TIMEOUT_MS` | Request timeout, `0` disables | `0` |
//! | `CUSTODY_RSA_MODE` | Request key wrap: `oaep` or `pkcs1` | `oaep` |
//! | `CUSTODY_AES_MODE` | Request body cipher: `gcm` or `cbc` | `gcm` |
//! | `WEBHOOK_PLATFORM_PUBLIC_KEY_PATH` | Webhook signer public key | Required for webhooks |
//! | `WEBHOOK_PRIVATE_KEY_PATH` | Webhook receiver private key | Required for webhooks |
//! | `COSIGNER_PUBLIC_KEY_PATH` | Co-signer public key | Required for co-signer |
//! | `COSIGNER_API_PUBLIC_KEY_PATH` | Deprecated alias of the above | - |
//! | `APPROVAL_CALLBACK_PRIVATE_KEY_PATH` | Approval callback service private key | Required for co-signer |
//! | `COSIGNER_BIZ_PRIVATE_KEY_PATH` | Deprecated alias of the above | - |
//! | `CALLBACK_BIND_ADDR` | Callback receiver bind address | `0.0.0.0:8080` |
//! | `COSIGNER_DEFAULT_DECISION` | `approve` or `reject` | `reject` |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info` |

use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

use crate::crypto::{AesMode, RsaMode};
use crate::envelope::CryptoModes;

pub const BASE_URL_ENV: &str = "CUSTODY_BASE_URL";
pub const API_KEY_ENV: &str = "CUSTODY_API_KEY";
pub const PRIVATE_KEY_PATH_ENV: &str = "CUSTODY_PRIVATE_KEY_PATH";
pub const PLATFORM_PUBLIC_KEY_PATH_ENV: &str = "CUSTODY_PLATFORM_PUBLIC_KEY_PATH";
pub const REQUEST_TIMEOUT_MS_ENV: &str = "CUSTODY_REQUEST_TIMEOUT_MS";
pub const RSA_MODE_ENV: &str = "CUSTODY_RSA_MODE";
pub const AES_MODE_ENV: &str = "CUSTODY_AES_MODE";

pub const WEBHOOK_PLATFORM_PUBLIC_KEY_PATH_ENV: &str = "WEBHOOK_PLATFORM_PUBLIC_KEY_PATH";
pub const WEBHOOK_PRIVATE_KEY_PATH_ENV: &str = "WEBHOOK_PRIVATE_KEY_PATH";

pub const COSIGNER_PUBLIC_KEY_PATH_ENV: &str = "COSIGNER_PUBLIC_KEY_PATH";
/// Deprecated name of [`COSIGNER_PUBLIC_KEY_PATH_ENV`].
pub const COSIGNER_API_PUBLIC_KEY_PATH_ENV: &str = "COSIGNER_API_PUBLIC_KEY_PATH";
pub const APPROVAL_CALLBACK_PRIVATE_KEY_PATH_ENV: &str = "APPROVAL_CALLBACK_PRIVATE_KEY_PATH";
/// Deprecated name of [`APPROVAL_CALLBACK_PRIVATE_KEY_PATH_ENV`].
pub const COSIGNER_BIZ_PRIVATE_KEY_PATH_ENV: &str = "COSIGNER_BIZ_PRIVATE_KEY_PATH";

pub const CALLBACK_BIND_ADDR_ENV: &str = "CALLBACK_BIND_ADDR";
pub const COSIGNER_DEFAULT_DECISION_ENV: &str = "COSIGNER_DEFAULT_DECISION";
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

pub const DEFAULT_CALLBACK_BIND_ADDR: &str = "0.0.0.0:8080";

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("configuration missing: {0}")]
    Missing(String),

    #[error("invalid {name}: {reason}")]
    Invalid { name: String, reason: String },
}

// =============================================================================
// Custody API client
// =============================================================================

/// Settings for [`CustodyClient`](crate::client::CustodyClient).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiConfig {
    pub base_url: String,
    pub api_key: String,
    pub private_key_path: PathBuf,
    pub platform_public_key_path: PathBuf,
    /// `None` means no timeout.
    #[serde(default, rename = "requestTimeoutMillis", deserialize_with = "timeout_from_millis")]
    pub request_timeout: Option<Duration>,
    #[serde(skip)]
    pub modes: CryptoModes,
}

impl ApiConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let timeout_ms = match env_optional(REQUEST_TIMEOUT_MS_ENV) {
            Some(raw) => raw.parse::<u64>().map_err(|e| ConfigError::Invalid {
                name: REQUEST_TIMEOUT_MS_ENV.to_string(),
                reason: e.to_string(),
            })?,
            None => 0,
        };
        let modes = CryptoModes::new(
            parse_rsa_mode(&env_or_default(RSA_MODE_ENV, "oaep"))?,
            parse_aes_mode(&env_or_default(AES_MODE_ENV, "gcm"))?,
        );

        let config = Self {
            base_url: env_required(BASE_URL_ENV)?,
            api_key: env_required(API_KEY_ENV)?,
            private_key_path: env_required(PRIVATE_KEY_PATH_ENV)?.into(),
            platform_public_key_path: env_required(PLATFORM_PUBLIC_KEY_PATH_ENV)?.into(),
            request_timeout: millis_to_timeout(timeout_ms),
            modes,
        };
        config.validate()?;
        Ok(config)
    }

    /// Check the base URL parses as an absolute http(s) URL.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = url::Url::parse(&self.base_url).map_err(|e| ConfigError::Invalid {
            name: BASE_URL_ENV.to_string(),
            reason: e.to_string(),
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::Invalid {
                name: BASE_URL_ENV.to_string(),
                reason: format!("unsupported scheme '{}'", url.scheme()),
            });
        }
        if self.api_key.trim().is_empty() {
            return Err(ConfigError::Missing(API_KEY_ENV.to_string()));
        }
        Ok(())
    }
}

fn millis_to_timeout(ms: u64) -> Option<Duration> {
    (ms > 0).then(|| Duration::from_millis(ms))
}

fn timeout_from_millis<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let ms = Option::<u64>::deserialize(deserializer)?;
    Ok(ms.and_then(millis_to_timeout))
}

pub fn parse_rsa_mode(raw: &str) -> Result<RsaMode, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "oaep" | "ecb_oaep" => Ok(RsaMode::OaepSha256),
        "pkcs1" | "pkcs1v15" => Ok(RsaMode::Pkcs1v15),
        other => Err(ConfigError::Invalid {
            name: RSA_MODE_ENV.to_string(),
            reason: format!("expected 'oaep' or 'pkcs1', got '{other}'"),
        }),
    }
}

pub fn parse_aes_mode(raw: &str) -> Result<AesMode, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "gcm" | "gcm_nopadding" => Ok(AesMode::GcmNoPadding),
        "cbc" => Ok(AesMode::CbcPkcs7),
        other => Err(ConfigError::Invalid {
            name: AES_MODE_ENV.to_string(),
            reason: format!("expected 'gcm' or 'cbc', got '{other}'"),
        }),
    }
}

// =============================================================================
// Webhook
// =============================================================================

/// Keys for webhook verification: the platform's webhook signing key and the
/// receiver's own private key.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookConfig {
    pub platform_public_key_path: PathBuf,
    pub private_key_path: PathBuf,
}

impl WebhookConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            platform_public_key_path: env_required(WEBHOOK_PLATFORM_PUBLIC_KEY_PATH_ENV)?.into(),
            private_key_path: env_required(WEBHOOK_PRIVATE_KEY_PATH_ENV)?.into(),
        })
    }
}

// =============================================================================
// Co-signer
// =============================================================================

/// Co-signer settings as written by the operator. Both the current and the
/// deprecated field names are accepted; [`normalize`](Self::normalize)
/// resolves them into a [`CoSignerConfig`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawCoSignerConfig {
    pub co_signer_pub_key: Option<String>,
    pub approval_callback_service_private_key: Option<String>,
    /// Deprecated name of `co_signer_pub_key`.
    pub api_pub_key: Option<String>,
    /// Deprecated name of `approval_callback_service_private_key`.
    pub biz_priv_key: Option<String>,
}

impl RawCoSignerConfig {
    pub fn from_env() -> Self {
        Self {
            co_signer_pub_key: env_optional(COSIGNER_PUBLIC_KEY_PATH_ENV),
            approval_callback_service_private_key: env_optional(
                APPROVAL_CALLBACK_PRIVATE_KEY_PATH_ENV,
            ),
            api_pub_key: env_optional(COSIGNER_API_PUBLIC_KEY_PATH_ENV),
            biz_priv_key: env_optional(COSIGNER_BIZ_PRIVATE_KEY_PATH_ENV),
        }
    }

    /// Resolve aliases once. The current name wins; the deprecated name is
    /// used only when the current one is absent or blank.
    pub fn normalize(self) -> Result<CoSignerConfig, ConfigError> {
        let co_signer_public_key_path = prefer(self.co_signer_pub_key, self.api_pub_key)
            .ok_or_else(|| ConfigError::Missing(COSIGNER_PUBLIC_KEY_PATH_ENV.to_string()))?;
        let approval_private_key_path =
            prefer(self.approval_callback_service_private_key, self.biz_priv_key).ok_or_else(
                || ConfigError::Missing(APPROVAL_CALLBACK_PRIVATE_KEY_PATH_ENV.to_string()),
            )?;

        Ok(CoSignerConfig {
            co_signer_public_key_path: co_signer_public_key_path.into(),
            approval_private_key_path: approval_private_key_path.into(),
        })
    }
}

fn prefer(current: Option<String>, deprecated: Option<String>) -> Option<String> {
    let non_blank = |v: Option<String>| v.filter(|s| !s.trim().is_empty());
    non_blank(current).or_else(|| non_blank(deprecated))
}

/// Resolved co-signer settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoSignerConfig {
    pub co_signer_public_key_path: PathBuf,
    pub approval_private_key_path: PathBuf,
}

impl CoSignerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        RawCoSignerConfig::from_env().normalize()
    }
}

// =============================================================================
// Environment helpers
// =============================================================================

pub fn env_required(name: &str) -> Result<String, ConfigError> {
    env_optional(name).ok_or_else(|| ConfigError::Missing(name.to_string()))
}

pub fn env_optional(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

pub fn env_or_default(name: &str, default: &str) -> String {
    env_optional(name).unwrap_or_else(|| default.to_string())
}
