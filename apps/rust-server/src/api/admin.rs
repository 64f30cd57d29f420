// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Issuer dashboard and investor registration.
//!
//! - `GET /api/admin` lists every trust line held against the admin
//!   account, grouped by currency and by holder, plus the currencies each
//!   stored investor still lacks.
//! - `POST /api/admin/new-wallet` creates, funds and provisions a new
//!   investor and appends it to the registry.

use axum::{extract::State, http::StatusCode, Json};

use crate::{
    error::ApiError,
    models::{NewWalletRequest, NewWalletResponse},
    state::AppState,
    workflow::{
        query::{admin_overview, AdminOverview},
        registration::register_investor,
    },
};

// ============================================================================
// Handlers
// ============================================================================

/// Get the issuer dashboard.
///
/// Balances are reported from the issuer's side, so tokens held by an
/// investor show up as negative values.
#[utoipa::path(
    get,
    path = "/api/admin",
    tag = "Admin",
    responses(
        (status = 200, description = "Issuer trust lines and investor coverage", body = AdminOverview),
        (status = 404, description = "Setup has not run yet", body = crate::error::ErrorBody),
        (status = 500, description = "Ledger query failed", body = crate::error::ErrorBody)
    )
)]
pub async fn get_admin(State(state): State<AppState>) -> Result<Json<AdminOverview>, ApiError> {
    let registry = state
        .store
        .load()?
        .ok_or_else(|| ApiError::not_found("state_not_found"))?;

    let overview = admin_overview(state.ledger.as_ref(), &registry)
        .await
        .map_err(|e| ApiError::from_workflow(e, "failed_to_query_trust_lines"))?;

    Ok(Json(overview))
}

/// Register a new investor.
///
/// Generates a wallet, funds it from the faucet, waits for activation and
/// opens a trust line to the admin for each requested currency. Failed trust
/// lines are reported in `failures` when the server is configured to keep
/// partial registrations.
#[utoipa::path(
    post,
    path = "/api/admin/new-wallet",
    tag = "Admin",
    request_body = NewWalletRequest,
    responses(
        (status = 201, description = "Investor registered", body = NewWalletResponse),
        (status = 400, description = "Missing name or invalid currency", body = crate::error::ErrorBody),
        (status = 404, description = "Setup has not run yet", body = crate::error::ErrorBody),
        (status = 502, description = "A transaction was rejected", body = crate::error::ErrorBody),
        (status = 504, description = "Account never activated", body = crate::error::ErrorBody)
    )
)]
pub async fn new_wallet(
    State(state): State<AppState>,
    Json(request): Json<NewWalletRequest>,
) -> Result<(StatusCode, Json<NewWalletResponse>), ApiError> {
    if request.name.trim().is_empty() {
        return Err(ApiError::bad_request("name_required", "name is required"));
    }

    let _writer = state.writer.lock().await;

    let outcome = register_investor(
        state.ledger.as_ref(),
        state.store.as_ref(),
        &state.settings,
        &request.name,
        &request.trustlines,
    )
    .await
    .map_err(|e| ApiError::from_workflow(e, "failed_to_create_wallet"))?;

    let explorer_url = state.network.account_url(&outcome.investor.address);
    Ok((
        StatusCode::CREATED,
        Json(NewWalletResponse {
            success: outcome.failures.is_empty(),
            investor: outcome.investor,
            trustlines: outcome.trust_lines,
            failures: outcome.failures,
            explorer_url,
        }),
    ))
}
