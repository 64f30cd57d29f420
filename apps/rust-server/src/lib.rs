// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Crowdfund Server - Tokenized Crowdfunding on the XRP Ledger Testnet
//!
//! An admin account issues tokens (`BRL`, `TKA`, `TKB`, ...) to investor
//! accounts through authorized trust lines. This crate provisions those
//! wallets and trust lines, keeps the participant registry and serves an
//! issuer dashboard over HTTP.
//!
//! ## Modules
//!
//! - `api` - HTTP API handlers (Axum)
//! - `blockchain` - XRP Ledger keys, transaction signing and JSON-RPC client
//! - `storage` - Participant registry with JSON file and redb backends
//! - `workflow` - Provisioning, registration, setup and trust-line queries

pub mod api;
pub mod blockchain;
pub mod config;
pub mod error;
pub mod models;
pub mod state;
pub mod storage;
pub mod workflow;

#[cfg(test)]
pub(crate) mod testing;
