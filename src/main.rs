// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use relational_custody_client::callback::{CoSignerConverter, WebhookConverter};
use relational_custody_client::config::{
    env_or_default, CoSignerConfig, WebhookConfig, CALLBACK_BIND_ADDR_ENV,
    COSIGNER_DEFAULT_DECISION_ENV, DEFAULT_CALLBACK_BIND_ADDR,
};
use relational_custody_client::server::router;
use relational_custody_client::state::{AppState, FixedApprover, LoggingSink};
use relational_custody_client::telemetry::{init_tracing, LogFormat};
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing(LogFormat::from_env())?;

    let approve = match env_or_default(COSIGNER_DEFAULT_DECISION_ENV, "reject")
        .to_ascii_lowercase()
        .as_str()
    {
        "approve" => true,
        "reject" => false,
        other => {
            return Err(format!(
                "{COSIGNER_DEFAULT_DECISION_ENV} must be 'approve' or 'reject', got '{other}'"
            )
            .into());
        }
    };

    let mut state = AppState::new(Arc::new(FixedApprover { approve }), Arc::new(LoggingSink));

    match WebhookConfig::from_env() {
        Ok(config) => state = state.with_webhook(WebhookConverter::from_config(&config)?),
        Err(e) => warn!(error = %e, "webhook callbacks disabled"),
    }
    match CoSignerConfig::from_env() {
        Ok(config) => state = state.with_cosigner(CoSignerConverter::from_config(&config)?),
        Err(e) => warn!(error = %e, "co-signer callbacks disabled"),
    }

    let addr = env_or_default(CALLBACK_BIND_ADDR_ENV, DEFAULT_CALLBACK_BIND_ADDR);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(addr = %addr, default_approve = approve, "callback receiver listening (docs at /docs)");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutting down");
}
