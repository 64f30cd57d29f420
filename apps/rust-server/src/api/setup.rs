// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{extract::State, http::StatusCode, Json};

use crate::{
    error::ApiError,
    state::AppState,
    storage::PublicRegistry,
    workflow::setup::{bootstrap, SetupOutcome},
};

/// Bootstrap the deployment, or return it if it already exists.
///
/// A fresh bootstrap funds an admin and three investors, configures the
/// admin as issuer of `BRL`, `TKA` and `TKB`, opens the initial trust lines
/// and distributes the first balances. This takes a while on the testnet.
#[utoipa::path(
    get,
    path = "/api/setup",
    tag = "Setup",
    responses(
        (status = 200, description = "Existing deployment", body = PublicRegistry),
        (status = 201, description = "Deployment bootstrapped", body = PublicRegistry),
        (status = 500, description = "Bootstrap failed", body = crate::error::ErrorBody)
    )
)]
pub async fn setup(
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<PublicRegistry>), ApiError> {
    let _writer = state.writer.lock().await;

    let outcome = bootstrap(
        state.ledger.as_ref(),
        state.store.as_ref(),
        &state.settings,
        &state.network.name,
    )
    .await
    .map_err(|e| ApiError::from_workflow(e, "failed_to_setup"))?;

    let status = match outcome {
        SetupOutcome::Existing(_) => StatusCode::OK,
        SetupOutcome::Created(_) => StatusCode::CREATED,
    };
    Ok((status, Json(outcome.registry().public_view())))
}
