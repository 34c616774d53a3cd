// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{extract::State, Json};
use serde_json::Value;
use tracing::info;

use super::error::{ApiError, ErrorBody};
use crate::callback::{
    CallbackEnvelope, CallbackEnvelopeV3, CoSignerAction, CoSignerResponse, CoSignerResponseV3,
    WebhookAck,
};
use crate::envelope::Envelope;
use crate::state::AppState;

/// Receive a webhook event.
///
/// The event is verified and decrypted, handed to the configured sink, and
/// acknowledged with `{"code": "200", "message": "SUCCESS"}`.
#[utoipa::path(
    post,
    path = "/v1/webhook",
    tag = "Callbacks",
    request_body = CallbackEnvelope,
    responses(
        (status = 200, description = "Event accepted", body = WebhookAck),
        (status = 400, description = "Malformed or undecryptable event", body = ErrorBody),
        (status = 401, description = "Invalid signature", body = ErrorBody),
        (status = 503, description = "Webhook keys not configured", body = ErrorBody)
    )
)]
pub async fn receive_webhook(
    State(state): State<AppState>,
    Json(callback): Json<CallbackEnvelope>,
) -> Result<Json<WebhookAck>, ApiError> {
    let converter = state
        .webhook
        .as_ref()
        .ok_or(ApiError::NotConfigured("webhook"))?;
    let event: Value = converter.convert_as(&callback)?;
    state.sink.deliver(event).await;
    Ok(Json(WebhookAck::default()))
}

/// Answer a v1 co-signer approval request.
///
/// The reply is an encrypted acknowledgement (OAEP + AES-GCM) carrying
/// `{"approve": bool, "txKey": string}`.
#[utoipa::path(
    post,
    path = "/v1/cosigner",
    tag = "Callbacks",
    request_body = CallbackEnvelope,
    responses(
        (status = 200, description = "Signed acknowledgement", body = Envelope),
        (status = 400, description = "Malformed request or missing txKey", body = ErrorBody),
        (status = 401, description = "Invalid signature", body = ErrorBody),
        (status = 503, description = "Co-signer keys not configured", body = ErrorBody)
    )
)]
pub async fn cosigner_v1(
    State(state): State<AppState>,
    Json(callback): Json<CallbackEnvelope>,
) -> Result<Json<Envelope>, ApiError> {
    let converter = state
        .cosigner
        .as_ref()
        .ok_or(ApiError::NotConfigured("co-signer"))?;
    let request: Value = converter.request_convert_as(&callback)?;

    let tx_key = request
        .pointer("/customerContent/txKey")
        .or_else(|| request.pointer("/txKey"))
        .and_then(Value::as_str)
        .ok_or_else(|| ApiError::BadRequest("approval request has no txKey".to_string()))?
        .to_string();

    let approve = state.approver.approve(&request).await;
    info!(tx_key = %tx_key, approve, "co-signer v1 decision");

    let ack = converter
        .response_converter_with_new_crypto_type(Some(&CoSignerResponse { approve, tx_key }))?;
    Ok(Json(ack))
}

/// Answer a v3 co-signer approval request.
///
/// The reply is a PSS-signed acknowledgement carrying
/// `{"action": "APPROVE" | "REJECT", "approvalId": string}`.
#[utoipa::path(
    post,
    path = "/v3/cosigner",
    tag = "Callbacks",
    request_body = CallbackEnvelopeV3,
    responses(
        (status = 200, description = "Signed acknowledgement", body = Envelope),
        (status = 400, description = "Malformed request or missing approvalId", body = ErrorBody),
        (status = 401, description = "Invalid signature", body = ErrorBody),
        (status = 503, description = "Co-signer keys not configured", body = ErrorBody)
    )
)]
pub async fn cosigner_v3(
    State(state): State<AppState>,
    Json(callback): Json<CallbackEnvelopeV3>,
) -> Result<Json<Envelope>, ApiError> {
    let converter = state
        .cosigner
        .as_ref()
        .ok_or(ApiError::NotConfigured("co-signer"))?;
    let request: Value = converter.request_v3_convert_as(&callback)?;

    let approval_id = request
        .get("approvalId")
        .and_then(Value::as_str)
        .ok_or_else(|| ApiError::BadRequest("approval request has no approvalId".to_string()))?
        .to_string();

    let action = CoSignerAction::from(state.approver.approve(&request).await);
    info!(approval_id = %approval_id, action = ?action, "co-signer v3 decision");

    let ack = converter.response_v3_converter(Some(&CoSignerResponseV3 {
        action,
        approval_id,
    }))?;
    Ok(Json(ack))
}
