// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Callback receiver: the HTTP side of webhook and co-signer callbacks.

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::callback::{
    CallbackEnvelope, CallbackEnvelopeV3, CoSignerAction, CoSignerResponse, CoSignerResponseV3,
    WebhookAck,
};
use crate::envelope::Envelope;
use crate::state::AppState;

pub mod error;
pub mod handlers;
pub mod health;

pub use error::ApiError;

pub fn router(state: AppState) -> Router {
    let v1_routes = Router::new()
        .route("/webhook", post(handlers::receive_webhook))
        .route("/cosigner", post(handlers::cosigner_v1));

    let v3_routes = Router::new().route("/cosigner", post(handlers::cosigner_v3));

    Router::new()
        .route("/health", get(health::health))
        .nest("/v1", v1_routes)
        .nest("/v3", v3_routes)
        .with_state(state)
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health,
        handlers::receive_webhook,
        handlers::cosigner_v1,
        handlers::cosigner_v3
    ),
    components(
        schemas(
            CallbackEnvelope,
            CallbackEnvelopeV3,
            Envelope,
            WebhookAck,
            CoSignerResponse,
            CoSignerResponseV3,
            CoSignerAction,
            health::HealthResponse,
            error::ErrorBody
        )
    ),
    tags(
        (name = "Callbacks", description = "Webhook and co-signer callbacks"),
        (name = "Health", description = "Liveness")
    )
)]
struct ApiDoc;
