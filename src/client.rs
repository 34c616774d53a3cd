// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Custody API client.
//!
//! Each call builds a fresh envelope, posts it through the [`Transport`],
//! and opens the response. The client holds no per-call state, so one
//! instance can serve any number of concurrent calls.

use std::sync::Arc;

use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, info};

use crate::config::ApiConfig;
use crate::crypto::Credentials;
use crate::envelope::{build_request, parse_response, CryptoModes};
use crate::error::EnvelopeResult;
use crate::transport::{HttpTransport, Transport};

#[derive(Clone)]
pub struct CustodyClient {
    api_key: String,
    credentials: Credentials,
    modes: CryptoModes,
    transport: Arc<dyn Transport>,
}

impl CustodyClient {
    pub fn new(
        api_key: impl Into<String>,
        credentials: Credentials,
        transport: Arc<dyn Transport>,
    ) -> Self {
        Self {
            api_key: api_key.into(),
            credentials,
            modes: CryptoModes::MODERN,
            transport,
        }
    }

    /// Load keys from the configured paths and talk HTTP to `base_url`.
    pub fn from_config(config: &ApiConfig) -> EnvelopeResult<Self> {
        let credentials =
            Credentials::load(&config.private_key_path, &config.platform_public_key_path)?;
        let transport = HttpTransport::new(config.base_url.as_str(), config.request_timeout)?;
        info!(base_url = %config.base_url, modes = ?config.modes, "custody client configured");
        Ok(
            Self::new(config.api_key.clone(), credentials, Arc::new(transport))
                .with_modes(config.modes),
        )
    }

    /// Modes used for outbound request envelopes.
    pub fn with_modes(mut self, modes: CryptoModes) -> Self {
        self.modes = modes;
        self
    }

    pub fn modes(&self) -> CryptoModes {
        self.modes
    }

    /// Send `request` to `path` and decode the decrypted response as `Resp`.
    pub async fn send_request<Req, Resp>(&self, path: &str, request: &Req) -> EnvelopeResult<Resp>
    where
        Req: Serialize + ?Sized,
        Resp: DeserializeOwned,
    {
        let plaintext = self.execute(path, Some(request)).await?;
        Ok(serde_json::from_slice(&plaintext)?)
    }

    /// Send an optional payload to `path` and return the decrypted response
    /// bytes.
    pub async fn execute<Req>(&self, path: &str, request: Option<&Req>) -> EnvelopeResult<Vec<u8>>
    where
        Req: Serialize + ?Sized,
    {
        let envelope = build_request(&self.credentials, &self.api_key, request, self.modes)?;
        debug!(path = %path, has_payload = request.is_some(), "sending custody api request");

        let raw = self.transport.post(path, &envelope).await?;
        parse_response(&self.credentials, &raw)
    }
}

impl std::fmt::Debug for CustodyClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CustodyClient")
            .field("api_key", &self.api_key)
            .field("modes", &self.modes)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::{AesMode, RsaMode};
    use crate::envelope::{AES_TYPE, BIZ_CONTENT, RSA_TYPE};
    use crate::error::EnvelopeError;
    use crate::test_support::{caller_credentials, platform_credentials};
    use crate::transport::mock::{MockPlatform, MockReply};
    use serde::Deserialize;
    use serde_json::{json, Value};

    #[derive(Debug, Serialize)]
    #[serde(rename_all = "camelCase")]
    struct ListAccountRequest {
        page_number: u32,
        page_size: u32,
    }

    #[derive(Debug, Deserialize, PartialEq)]
    #[serde(rename_all = "camelCase")]
    struct ListAccountResponse {
        total_elements: u64,
    }

    fn client_with(platform: MockPlatform) -> (CustodyClient, Arc<MockPlatform>) {
        let platform = Arc::new(platform);
        let client = CustodyClient::new("api-key", caller_credentials(), platform.clone());
        (client, platform)
    }

    #[tokio::test]
    async fn echo_round_trip_returns_exact_payload() {
        let platform = MockPlatform::new(platform_credentials(), "api-key", |_, request| {
            assert_eq!(request, json!({"foo": "bar"}));
            MockReply::Success(json!({"result": true}))
        });
        let (client, _) = client_with(platform);

        let bytes = client
            .execute("/v1/echo", Some(&json!({"foo": "bar"})))
            .await
            .unwrap();
        assert_eq!(bytes, br#"{"result":true}"#);
    }

    #[tokio::test]
    async fn send_request_decodes_typed_response() {
        let platform = MockPlatform::new(platform_credentials(), "api-key", |path, request| {
            assert_eq!(path, "/v1/account/list");
            assert_eq!(request["pageSize"], json!(10));
            MockReply::Success(json!({"totalElements": 3, "content": []}))
        });
        let (client, platform) = client_with(platform);

        let response: ListAccountResponse = client
            .send_request(
                "/v1/account/list",
                &ListAccountRequest {
                    page_number: 1,
                    page_size: 10,
                },
            )
            .await
            .unwrap();

        assert_eq!(response, ListAccountResponse { total_elements: 3 });
        let received = platform.received();
        assert_eq!(received.len(), 1);
        assert_eq!(received[0].path, "/v1/account/list");
        assert_eq!(received[0].envelope.get(RSA_TYPE), Some("ECB_OAEP"));
        assert_eq!(received[0].envelope.get(AES_TYPE), Some("GCM_NOPADDING"));
    }

    #[tokio::test]
    async fn remote_failure_surfaces_code_and_message() {
        let platform = MockPlatform::new(platform_credentials(), "api-key", |_, _| {
            MockReply::Failure {
                code: 400,
                message: "bad request".into(),
            }
        });
        let (client, _) = client_with(platform);

        let err = client
            .execute("/v1/account/one", Some(&json!({})))
            .await
            .unwrap_err();
        match err {
            EnvelopeError::Remote { code, message } => {
                assert_eq!(code, 400);
                assert_eq!(message, "bad request");
            }
            other => panic!("expected Remote, got: {other:?}"),
        }
    }

    #[tokio::test]
    async fn legacy_client_against_legacy_platform() {
        let platform = MockPlatform::new(platform_credentials(), "api-key", |_, request| {
            MockReply::Success(request)
        })
        .with_modes(CryptoModes::LEGACY);
        let (client, platform) = client_with(platform);
        let client = client.with_modes(CryptoModes::new(RsaMode::Pkcs1v15, AesMode::CbcPkcs7));

        let echoed: Value = client
            .send_request("/v1/echo", &json!({"amount": "1.5"}))
            .await
            .unwrap();
        assert_eq!(echoed, json!({"amount": "1.5"}));
        let received = platform.received();
        assert!(received[0].envelope.get(RSA_TYPE).is_none());
        assert!(received[0].envelope.get(AES_TYPE).is_none());
    }

    #[tokio::test]
    async fn request_without_payload_omits_biz_content() {
        let platform = MockPlatform::new(platform_credentials(), "api-key", |_, request| {
            assert_eq!(request, Value::Null);
            MockReply::Success(json!({"ok": true}))
        });
        let (client, platform) = client_with(platform);

        let bytes = client.execute::<Value>("/v1/ping", None).await.unwrap();
        assert_eq!(bytes, br#"{"ok":true}"#);
        assert!(!platform.received()[0].envelope.contains(BIZ_CONTENT));
    }

    #[tokio::test]
    async fn wrong_api_key_is_rejected_by_platform() {
        let platform = MockPlatform::new(platform_credentials(), "expected-key", |_, _| {
            MockReply::Success(json!({}))
        });
        let (client, _) = client_with(platform);

        let err = client
            .execute("/v1/echo", Some(&json!({})))
            .await
            .unwrap_err();
        assert!(matches!(err, EnvelopeError::Remote { code: 401, .. }));
    }

    #[tokio::test]
    async fn concurrent_calls_are_independent() {
        let platform = MockPlatform::new(platform_credentials(), "api-key", |_, request| {
            MockReply::Success(request)
        });
        let (client, _) = client_with(platform);

        let calls: Vec<_> = (0..8)
            .map(|i| {
                let client = client.clone();
                tokio::spawn(async move {
                    let echoed: Value =
                        client.send_request("/v1/echo", &json!({ "n": i })).await?;
                    Ok::<_, EnvelopeError>((i, echoed))
                })
            })
            .collect();
        for call in calls {
            let (i, echoed) = call.await.unwrap().unwrap();
            assert_eq!(echoed, json!({ "n": i }));
        }
    }

    #[test]
    fn debug_output_omits_credentials() {
        let platform = MockPlatform::new(platform_credentials(), "api-key", |_, _| {
            MockReply::Success(json!({}))
        });
        let (client, _) = client_with(platform);
        let debug = format!("{client:?}");
        assert!(debug.contains("api-key"));
        assert!(!debug.contains("own_private_key"));
    }
}
