// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! XRP Ledger integration.
//!
//! This module provides functionality for:
//! - Generating and restoring wallets from family seeds
//! - Building and signing `TrustSet`, `Payment` and `AccountSet` transactions
//! - Querying accounts, trust lines and order books over JSON-RPC
//! - Funding new accounts through the testnet faucet

pub mod client;
pub mod codec;
pub mod signing;
pub mod transactions;
pub mod types;

pub use client::{ConfirmationPolicy, LedgerClient, LedgerError, XrplClient};
pub use signing::{is_valid_address, KeyAlgorithm, KeyError, Wallet};
pub use transactions::Transaction;
pub use types::*;
