// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::{
    blockchain::codec::encode_issued_value,
    error::ApiError,
    models::{CreateTrustLineRequest, TrustLineCreatedResponse, TrustLineExistsResponse},
    state::AppState,
    workflow::{
        provisioning::{ensure_trust_line, TrustLineStatus},
        registration::normalize_currencies,
        WorkflowError,
    },
};

/// Open a trust line from a stored wallet.
///
/// The holder must be the admin or a registered investor. When the issuer
/// is the admin account the full handshake runs (holder `TrustSet`, then
/// authorization and rippling from the issuer); for any other issuer only
/// the holder's `TrustSet` is submitted.
#[utoipa::path(
    post,
    path = "/api/trustline",
    tag = "Trust Lines",
    request_body = CreateTrustLineRequest,
    responses(
        (status = 200, description = "Trust line already present", body = TrustLineExistsResponse),
        (status = 201, description = "Trust line created", body = TrustLineCreatedResponse),
        (status = 400, description = "Missing or invalid parameters", body = crate::error::ErrorBody),
        (status = 404, description = "Setup has not run yet", body = crate::error::ErrorBody),
        (status = 502, description = "A transaction was rejected", body = crate::error::ErrorBody)
    )
)]
pub async fn create_trust_line(
    State(state): State<AppState>,
    Json(request): Json<CreateTrustLineRequest>,
) -> Result<Response, ApiError> {
    let (Some(holder), Some(currency), Some(issuer)) =
        (request.wallet_address, request.currency, request.issuer)
    else {
        return Err(ApiError::bad_request(
            "missing_parameters",
            "walletAddress, currency and issuer are required",
        ));
    };

    if !issuer.is_valid() {
        return Err(ApiError::bad_request(
            "invalid_address",
            format!("{issuer} is not a valid address"),
        ));
    }
    let currency = currency.trim().to_string();
    normalize_currencies(std::slice::from_ref(&currency))
        .map_err(|e| ApiError::bad_request("invalid_currency", e.to_string()))?;

    let limit = request
        .limit
        .unwrap_or_else(|| state.settings.trust_line_limit.clone());
    if limit.trim_start().starts_with('-') {
        return Err(ApiError::bad_request("invalid_limit", "limit must not be negative"));
    }
    encode_issued_value(&limit).map_err(|e| ApiError::bad_request("invalid_limit", e.to_string()))?;

    let registry = state
        .store
        .load()?
        .ok_or_else(|| ApiError::not_found("state_not_found"))?;
    let participant = registry.find(holder.as_str()).ok_or_else(|| {
        ApiError::bad_request(
            "wallet_secret_not_found",
            format!("no stored wallet for {holder}"),
        )
    })?;
    if participant.address == issuer.as_str() {
        return Err(ApiError::bad_request(
            "invalid_request",
            "holder and issuer must differ",
        ));
    }

    let map_err = |e: WorkflowError| ApiError::from_workflow(e, "failed_to_create_trustline");
    let holder_wallet = participant.wallet().map_err(|e| map_err(e.into()))?;
    let issuer_wallet = if registry.admin.address == issuer.as_str() {
        Some(registry.admin.wallet().map_err(|e| map_err(e.into()))?)
    } else {
        None
    };

    let status = ensure_trust_line(
        state.ledger.as_ref(),
        &holder_wallet,
        issuer.as_str(),
        issuer_wallet.as_ref(),
        &currency,
        &limit,
    )
    .await
    .map_err(map_err)?;

    Ok(match status {
        TrustLineStatus::Exists => (
            StatusCode::OK,
            Json(TrustLineExistsResponse {
                status: "exists".to_string(),
            }),
        )
            .into_response(),
        TrustLineStatus::Created(result) => {
            let explorer_urls = result
                .iter()
                .map(|outcome| state.network.transaction_url(&outcome.hash))
                .collect();
            (
                StatusCode::CREATED,
                Json(TrustLineCreatedResponse {
                    result,
                    explorer_urls,
                }),
            )
                .into_response()
        }
    })
}
