// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::storage::StoreError;
use crate::workflow::WorkflowError;

/// Error returned by every handler.
///
/// `kind` is machine-readable (`state_not_found`, `wallet_mismatch`, ...);
/// `details` is for humans.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub kind: &'static str,
    pub details: Option<String>,
}

/// JSON body of an error response.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiError {
    pub fn new(status: StatusCode, kind: &'static str, details: impl Into<String>) -> Self {
        Self {
            status,
            kind,
            details: Some(details.into()),
        }
    }

    /// Error with a kind and no details.
    pub fn bare(status: StatusCode, kind: &'static str) -> Self {
        Self {
            status,
            kind,
            details: None,
        }
    }

    pub fn not_found(kind: &'static str) -> Self {
        Self::bare(StatusCode::NOT_FOUND, kind)
    }

    pub fn bad_request(kind: &'static str, details: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, kind, details)
    }

    pub fn internal(kind: &'static str, details: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, kind, details)
    }

    /// Map a workflow failure, using `fallback` as the kind for ledger
    /// and other unexpected errors.
    pub fn from_workflow(err: WorkflowError, fallback: &'static str) -> Self {
        let details = err.to_string();
        match err {
            WorkflowError::ConfigurationMissing(_) => {
                Self::new(StatusCode::NOT_FOUND, "state_not_found", details)
            }
            WorkflowError::InvalidRequest(_) => {
                Self::new(StatusCode::BAD_REQUEST, "invalid_request", details)
            }
            WorkflowError::WalletMismatch { .. } => {
                Self::new(StatusCode::BAD_REQUEST, "wallet_mismatch", details)
            }
            WorkflowError::InvalidKey(_) => {
                Self::new(StatusCode::BAD_REQUEST, "invalid_wallet_secret", details)
            }
            WorkflowError::SubmissionFailed { .. } => {
                Self::new(StatusCode::BAD_GATEWAY, "submission_failed", details)
            }
            WorkflowError::ActivationTimeout { .. } => {
                Self::new(StatusCode::GATEWAY_TIMEOUT, "activation_timeout", details)
            }
            WorkflowError::StoreUnavailable(_) => {
                Self::new(StatusCode::SERVICE_UNAVAILABLE, "store_unavailable", details)
            }
            WorkflowError::Ledger(_) => Self::internal(fallback, details),
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        Self::new(StatusCode::SERVICE_UNAVAILABLE, "store_unavailable", err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            tracing::error!(
                status = self.status.as_u16(),
                kind = self.kind,
                details = self.details.as_deref().unwrap_or_default(),
                "Request failed"
            );
        }
        let body = Json(ErrorBody {
            error: self.kind.to_string(),
            details: self.details,
        });
        (self.status, body).into_response()
    }
}
