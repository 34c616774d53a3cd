// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{extract::State, Json};
use serde::Serialize;
use utoipa::ToSchema;

use crate::state::AppState;

/// Liveness plus which callback families are configured.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// Always "ok" while the process is serving.
    pub status: String,
    /// "enabled" or "disabled".
    pub webhook: String,
    /// "enabled" or "disabled".
    pub cosigner: String,
}

fn flag(enabled: bool) -> String {
    if enabled { "enabled" } else { "disabled" }.to_string()
}

#[utoipa::path(
    get,
    path = "/health",
    tag = "Health",
    responses(
        (status = 200, description = "Service is running", body = HealthResponse)
    )
)]
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        webhook: flag(state.webhook.is_some()),
        cosigner: flag(state.cosigner.is_some()),
    })
}
