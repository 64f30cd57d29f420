// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{extract::State, Json};

use crate::{error::ApiError, state::AppState, storage::PublicRegistry};

/// Get the stored deployment.
///
/// Returns the registry with every secret removed.
#[utoipa::path(
    get,
    path = "/api/state",
    tag = "State",
    responses(
        (status = 200, description = "Stored registry", body = PublicRegistry),
        (status = 404, description = "Setup has not run yet", body = crate::error::ErrorBody),
        (status = 503, description = "Store unavailable", body = crate::error::ErrorBody)
    )
)]
pub async fn get_state(State(state): State<AppState>) -> Result<Json<PublicRegistry>, ApiError> {
    let registry = state
        .store
        .load()?
        .ok_or_else(|| ApiError::not_found("state_not_found"))?;
    Ok(Json(registry.public_view()))
}
