// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Ledger types and constants.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Currency code of the ledger's native asset.
pub const NATIVE_CURRENCY: &str = "XRP";

/// Result code of a successfully applied transaction.
pub const TES_SUCCESS: &str = "tesSUCCESS";

/// XRP Ledger network configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkConfig {
    /// Network name for display and for the persisted registry
    pub name: String,
    /// rippled JSON-RPC endpoint
    pub rpc_url: String,
    /// Faucet endpoint granting test XRP to new accounts
    pub faucet_url: String,
    /// Block explorer URL
    pub explorer_url: String,
}

/// Public XRP Ledger testnet (altnet).
pub const XRPL_TESTNET_RPC: &str = "https://s.altnet.rippletest.net:51234/";

/// Faucet for the public testnet.
pub const XRPL_TESTNET_FAUCET: &str = "https://faucet.altnet.rippletest.net/accounts";

impl NetworkConfig {
    /// The public testnet with its default endpoints.
    pub fn testnet() -> Self {
        Self {
            name: "testnet".to_string(),
            rpc_url: XRPL_TESTNET_RPC.to_string(),
            faucet_url: XRPL_TESTNET_FAUCET.to_string(),
            explorer_url: "https://testnet.xrpl.org".to_string(),
        }
    }

    /// Explorer link for a transaction hash.
    pub fn transaction_url(&self, hash: &str) -> String {
        format!("{}/transactions/{hash}", self.explorer_url.trim_end_matches('/'))
    }

    /// Explorer link for an account.
    pub fn account_url(&self, address: &str) -> String {
        format!("{}/accounts/{address}", self.explorer_url.trim_end_matches('/'))
    }
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self::testnet()
    }
}

/// Root account state as seen in a validated ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountInfo {
    /// Classic address
    pub account: String,
    /// XRP balance in drops, present once the account is activated
    pub balance: Option<String>,
    /// Next sequence number the account must use
    pub sequence: u32,
}

impl AccountInfo {
    /// Whether the account holds a native balance.
    pub fn is_activated(&self) -> bool {
        self.balance.is_some()
    }
}

/// A trust line as reported by `account_lines`, from the queried
/// account's point of view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct TrustLine {
    /// Counterparty of the line
    pub account: String,
    /// Currency code
    pub currency: String,
    /// Balance (negative when the queried account owes the counterparty)
    pub balance: String,
    /// Limit set by the queried account
    pub limit: String,
}

/// Final outcome of a submitted transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubmitOutcome {
    /// Transaction type name (e.g. `TrustSet`)
    pub transaction_type: String,
    /// Transaction hash
    pub hash: String,
    /// Engine result code from the validated ledger (e.g. `tesSUCCESS`)
    pub result_code: String,
    /// Validated ledger the transaction landed in
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ledger_index: Option<u32>,
}

impl SubmitOutcome {
    pub fn is_success(&self) -> bool {
        self.result_code == TES_SUCCESS
    }
}

/// One side of an order book.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Asset {
    /// The native asset
    Native,
    /// A token identified by currency and issuer
    Issued { currency: String, issuer: String },
}

impl Asset {
    /// Resolve a currency code against the issuer: `XRP` is native, any
    /// other code is a token of `issuer`.
    pub fn resolve(code: &str, issuer: &str) -> Self {
        if code.eq_ignore_ascii_case(NATIVE_CURRENCY) {
            Asset::Native
        } else {
            Asset::Issued {
                currency: code.to_string(),
                issuer: issuer.to_string(),
            }
        }
    }

    /// JSON shape expected by `book_offers`.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Asset::Native => serde_json::json!({ "currency": NATIVE_CURRENCY }),
            Asset::Issued { currency, issuer } => {
                serde_json::json!({ "currency": currency, "issuer": issuer })
            }
        }
    }
}
