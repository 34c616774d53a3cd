// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! HTTP errors of the callback receiver.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::{error, warn};
use utoipa::ToSchema;

use crate::error::EnvelopeError;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Callback signature did not verify.
    #[error("{0}")]
    Unauthorized(String),

    /// Callback could not be decoded, unwrapped or decrypted.
    #[error("{0}")]
    BadRequest(String),

    /// The route's converter is not configured.
    #[error("{0} callbacks are not configured")]
    NotConfigured(&'static str),

    #[error("internal error: {0}")]
    Internal(String),
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    pub error: String,
    pub error_code: String,
}

impl ApiError {
    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::Unauthorized(_) => "invalid_signature",
            ApiError::BadRequest(_) => "bad_request",
            ApiError::NotConfigured(_) => "not_configured",
            ApiError::Internal(_) => "internal_error",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotConfigured(_) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<EnvelopeError> for ApiError {
    fn from(err: EnvelopeError) -> Self {
        match err {
            EnvelopeError::SignatureVerification => {
                warn!("rejected callback with invalid signature");
                ApiError::Unauthorized(err.to_string())
            }
            EnvelopeError::Authentication
            | EnvelopeError::Decryption(_)
            | EnvelopeError::Cipher(_)
            | EnvelopeError::Encoding { .. }
            | EnvelopeError::MalformedEnvelope(_)
            | EnvelopeError::UnsupportedMode { .. }
            | EnvelopeError::Serialization(_) => {
                warn!(error = %err, "rejected malformed callback");
                ApiError::BadRequest(err.to_string())
            }
            other => {
                error!(error = %other, "callback handling failed");
                ApiError::Internal(other.to_string())
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(ErrorBody {
            error: self.to_string(),
            error_code: self.error_code().to_string(),
        });
        (status, body).into_response()
    }
}
