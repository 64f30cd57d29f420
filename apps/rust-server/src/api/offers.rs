// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{extract::State, Json};

use crate::{
    blockchain::{codec::encode_currency, Asset},
    error::ApiError,
    models::OffersRequest,
    state::AppState,
};

/// Largest page `book_offers` is asked for.
const MAX_OFFERS: u32 = 400;

fn resolve_asset(code: &str, issuer: &str) -> Result<Asset, ApiError> {
    let asset = Asset::resolve(code.trim(), issuer);
    if let Asset::Issued { currency, .. } = &asset {
        encode_currency(currency)
            .map_err(|e| ApiError::bad_request("invalid_currency", e.to_string()))?;
    }
    Ok(asset)
}

/// Query the order book between two assets.
///
/// Non-native codes are resolved as tokens issued by the admin account.
/// The ledger's `book_offers` result is returned as is.
#[utoipa::path(
    post,
    path = "/api/offers",
    tag = "Offers",
    request_body = OffersRequest,
    responses(
        (status = 200, description = "Raw book_offers result", body = serde_json::Value),
        (status = 400, description = "Invalid currency pair", body = crate::error::ErrorBody),
        (status = 404, description = "Setup has not run yet", body = crate::error::ErrorBody),
        (status = 500, description = "Ledger query failed", body = crate::error::ErrorBody)
    )
)]
pub async fn get_offers(
    State(state): State<AppState>,
    Json(request): Json<OffersRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let registry = state
        .store
        .load()?
        .ok_or_else(|| ApiError::not_found("state_not_found"))?;
    let issuer = registry.admin.address.as_str();

    let taker_gets = resolve_asset(&request.sell, issuer)?;
    let taker_pays = resolve_asset(&request.buy, issuer)?;
    if taker_gets == taker_pays {
        return Err(ApiError::bad_request(
            "invalid_request",
            "sell and buy must differ",
        ));
    }
    if request.limit == 0 {
        return Err(ApiError::bad_request("invalid_request", "limit must be positive"));
    }

    let offers = state
        .ledger
        .book_offers(&taker_gets, &taker_pays, request.limit.min(MAX_OFFERS))
        .await
        .map_err(|e| ApiError::internal("failed_to_fetch_offers", e.to_string()))?;

    Ok(Json(offers))
}
