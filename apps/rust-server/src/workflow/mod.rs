// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Ledger workflows.
//!
//! - `provisioning` - wallet funding, activation polling, the trust-line
//!   handshake, issuer configuration and token issuance
//! - `query` - issuer trust-line listing and the admin overview
//! - `registration` - new investor wallets
//! - `setup` - one-time bootstrap of a deployment
//!
//! Workflows take the ledger and the store as capabilities and run their
//! steps strictly in order.

use std::str::FromStr;

use crate::blockchain::{KeyError, LedgerError};
use crate::storage::{StoreError, WalletCheckError};

pub mod provisioning;
pub mod query;
pub mod registration;
pub mod setup;

pub use provisioning::ActivationPolicy;

/// Default trust-line limit extended by holders.
pub const DEFAULT_TRUST_LINE_LIMIT: &str = "1000000";

/// What registration does when a trust line fails partway through.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Fail the request and persist nothing.
    #[default]
    Abort,
    /// Stop at the first failure but persist the investor.
    KeepPartial,
    /// Attempt every currency, persist, report each failure.
    BestEffort,
}

impl FailurePolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailurePolicy::Abort => "abort",
            FailurePolicy::KeepPartial => "keep-partial",
            FailurePolicy::BestEffort => "best-effort",
        }
    }
}

impl FromStr for FailurePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "abort" => Ok(FailurePolicy::Abort),
            "keep-partial" | "keep_partial" => Ok(FailurePolicy::KeepPartial),
            "best-effort" | "best_effort" => Ok(FailurePolicy::BestEffort),
            other => Err(format!(
                "unknown failure policy `{other}` (expected abort, keep-partial or best-effort)"
            )),
        }
    }
}

/// Tunables shared by the workflows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkflowSettings {
    /// Limit holders extend on new trust lines
    pub trust_line_limit: String,
    pub activation: ActivationPolicy,
    pub failure_policy: FailurePolicy,
}

impl Default for WorkflowSettings {
    fn default() -> Self {
        Self {
            trust_line_limit: DEFAULT_TRUST_LINE_LIMIT.to_string(),
            activation: ActivationPolicy::default(),
            failure_policy: FailurePolicy::default(),
        }
    }
}

/// Errors that end a workflow.
#[derive(Debug, thiserror::Error)]
pub enum WorkflowError {
    #[error("Not configured: {0}")]
    ConfigurationMissing(String),

    #[error("{transaction_type} failed with {result_code}")]
    SubmissionFailed {
        transaction_type: String,
        result_code: String,
        hash: String,
    },

    #[error("Timeout waiting for account activation: {address}")]
    ActivationTimeout { address: String },

    #[error("Wallet mismatch: expected {expected}, got {got}")]
    WalletMismatch { expected: String, got: String },

    #[error("Store unavailable: {0}")]
    StoreUnavailable(#[from] StoreError),

    #[error("Ledger error: {0}")]
    Ledger(#[from] LedgerError),

    #[error("Invalid key: {0}")]
    InvalidKey(#[from] KeyError),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl From<WalletCheckError> for WorkflowError {
    fn from(e: WalletCheckError) -> Self {
        match e {
            WalletCheckError::InvalidSecret(e) => WorkflowError::InvalidKey(e),
            WalletCheckError::Mismatch { expected, got } => {
                WorkflowError::WalletMismatch { expected, got }
            }
        }
    }
}
