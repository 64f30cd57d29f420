// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::CorsLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    blockchain::{SubmitOutcome, TrustLine},
    error::ErrorBody,
    models::{
        CreateTrustLineRequest, NewWalletRequest, NewWalletResponse, OffersRequest,
        TrustLineCreatedResponse, TrustLineExistsResponse, WalletAddress,
    },
    state::AppState,
    storage::{CurrencyDeclaration, PublicParticipant, PublicRegistry, Role},
    workflow::{
        query::{AdminOverview, HolderLine, InvestorOverview, TrustLineSummary},
        registration::TrustLineFailure,
    },
};

pub mod admin;
pub mod health;
pub mod offers;
pub mod setup;
pub mod state;
pub mod trustline;

pub fn router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/state", get(state::get_state))
        .route("/setup", get(setup::setup))
        .route("/admin", get(admin::get_admin))
        .route("/admin/new-wallet", post(admin::new_wallet))
        .route("/trustline", post(trustline::create_trust_line))
        .route("/offers", post(offers::get_offers));

    Router::new()
        .route("/health", get(health::health))
        .route("/health/live", get(health::liveness))
        .route("/health/ready", get(health::readiness))
        .nest("/api", api_routes)
        .with_state(state)
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                .layer(TraceLayer::new_for_http())
                .layer(PropagateRequestIdLayer::x_request_id()),
        )
        .layer(CorsLayer::permissive())
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health,
        health::liveness,
        health::readiness,
        state::get_state,
        setup::setup,
        admin::get_admin,
        admin::new_wallet,
        trustline::create_trust_line,
        offers::get_offers
    ),
    components(
        schemas(
            ErrorBody,
            WalletAddress,
            Role,
            PublicParticipant,
            PublicRegistry,
            CurrencyDeclaration,
            TrustLine,
            SubmitOutcome,
            HolderLine,
            TrustLineSummary,
            InvestorOverview,
            AdminOverview,
            TrustLineFailure,
            CreateTrustLineRequest,
            TrustLineCreatedResponse,
            TrustLineExistsResponse,
            NewWalletRequest,
            NewWalletResponse,
            OffersRequest,
            health::ReadyResponse,
            health::HealthChecks,
            health::HealthResponse
        )
    ),
    tags(
        (name = "Health", description = "Liveness and readiness checks"),
        (name = "State", description = "Stored deployment"),
        (name = "Setup", description = "One-time deployment bootstrap"),
        (name = "Admin", description = "Issuer dashboard and investor registration"),
        (name = "Trust Lines", description = "Trust-line provisioning"),
        (name = "Offers", description = "Order book queries")
    )
)]
struct ApiDoc;
