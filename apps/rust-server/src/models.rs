// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # API Data Models
//!
//! This module defines the request and response data structures used by
//! the REST API. All types derive `Serialize`, `Deserialize`, and `ToSchema`
//! for automatic JSON handling and OpenAPI documentation. Field names are
//! camelCase on the wire.
//!
//! ## Wallet Address Type
//!
//! The [`WalletAddress`] newtype wraps XRP Ledger classic addresses
//! (`r`-prefixed base58 with a checksum).
//!
//! ## Model Categories
//!
//! - **Trust lines**: `POST /api/trustline`
//! - **Registration**: `POST /api/admin/new-wallet`
//! - **Order book**: `POST /api/offers`

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::blockchain::{is_valid_address, SubmitOutcome};
use crate::storage::PublicParticipant;
use crate::workflow::registration::TrustLineFailure;

// =============================================================================
// Wallet Address Type
// =============================================================================

/// XRP Ledger classic address wrapper.
///
/// # Example
///
/// ```rust,ignore
/// let addr = WalletAddress::from("rHb9CJAWyB4rj91VRWn96DkukG4bwdtyTh");
/// assert!(addr.is_valid());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WalletAddress(pub String);

impl WalletAddress {
    /// Whether the address decodes with a valid checksum.
    pub fn is_valid(&self) -> bool {
        is_valid_address(&self.0)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for WalletAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for WalletAddress {
    fn from(value: String) -> Self {
        WalletAddress(value)
    }
}

impl From<&str> for WalletAddress {
    fn from(value: &str) -> Self {
        WalletAddress(value.to_string())
    }
}

impl From<WalletAddress> for String {
    fn from(value: WalletAddress) -> Self {
        value.0
    }
}

// =============================================================================
// Trust Line Models
// =============================================================================

/// Request to open a trust line from a stored wallet.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CreateTrustLineRequest {
    /// Holder; must be the admin or a registered investor.
    #[serde(default)]
    pub wallet_address: Option<WalletAddress>,
    /// Currency code (three characters or 40 hex digits).
    #[serde(default)]
    pub currency: Option<String>,
    /// Issuer of the currency.
    #[serde(default)]
    pub issuer: Option<WalletAddress>,
    /// Trust-line limit; defaults to the configured limit.
    #[serde(default)]
    pub limit: Option<String>,
}

/// Trust line created.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TrustLineCreatedResponse {
    /// Validated transactions, in submission order.
    pub result: Vec<SubmitOutcome>,
    /// Explorer link for each transaction in `result`.
    pub explorer_urls: Vec<String>,
}

/// Trust line already present.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct TrustLineExistsResponse {
    /// Always `exists`.
    pub status: String,
}

// =============================================================================
// Registration Models
// =============================================================================

/// Request to create, fund and provision a new investor wallet.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct NewWalletRequest {
    /// Display name of the investor.
    #[serde(default)]
    pub name: String,
    /// Currencies to open trust lines for.
    #[serde(default)]
    pub trustlines: Vec<String>,
}

/// Registered investor.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct NewWalletResponse {
    pub success: bool,
    pub investor: PublicParticipant,
    /// Currencies whose trust line was created.
    pub trustlines: Vec<String>,
    /// Trust lines that failed (only with a non-aborting failure policy).
    pub failures: Vec<TrustLineFailure>,
    /// Explorer link for the new account.
    pub explorer_url: String,
}

// =============================================================================
// Order Book Models
// =============================================================================

fn default_offer_limit() -> u32 {
    20
}

/// Order book query.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct OffersRequest {
    /// Currency the taker receives (`XRP` for the native asset).
    pub sell: String,
    /// Currency the taker pays.
    pub buy: String,
    /// Maximum number of offers.
    #[serde(default = "default_offer_limit")]
    pub limit: u32,
}
