// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Transaction models for the handful of ledger operations this service
//! submits: `TrustSet`, `Payment` of issued tokens and `AccountSet`.

/// TrustSet: allow rippling through the line.
pub const TF_CLEAR_NO_RIPPLE: u32 = 0x0004_0000;

/// TrustSet: authorize the counterparty to hold the issuer's token.
pub const TF_SETF_AUTH: u32 = 0x0001_0000;

/// AccountSet: incoming trust lines need explicit authorization.
pub const ASF_REQUIRE_AUTH: u32 = 2;

/// AccountSet: enable rippling on the issuer's trust lines by default.
pub const ASF_DEFAULT_RIPPLE: u32 = 8;

/// An amount of issued (non-native) currency.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedAmount {
    pub currency: String,
    pub issuer: String,
    /// Decimal string, e.g. `"1000000"` or `"12.5"`
    pub value: String,
}

impl IssuedAmount {
    pub fn new(currency: impl Into<String>, issuer: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            currency: currency.into(),
            issuer: issuer.into(),
            value: value.into(),
        }
    }
}

/// Native drops or an issued amount.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Amount {
    Drops(u64),
    Issued(IssuedAmount),
}

/// Type-specific transaction fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransactionKind {
    Payment { destination: String, amount: Amount },
    TrustSet { limit_amount: IssuedAmount },
    AccountSet { set_flag: Option<u32>, clear_flag: Option<u32> },
}

/// An unsigned transaction. `sequence`, `fee_drops` and
/// `last_ledger_sequence` are filled in by the client before signing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    pub account: String,
    pub kind: TransactionKind,
    pub flags: u32,
    pub sequence: Option<u32>,
    pub fee_drops: Option<u64>,
    pub last_ledger_sequence: Option<u32>,
}

impl Transaction {
    fn new(account: &str, kind: TransactionKind, flags: u32) -> Self {
        Self {
            account: account.to_string(),
            kind,
            flags,
            sequence: None,
            fee_drops: None,
            last_ledger_sequence: None,
        }
    }

    /// `account` extends a line to `issuer` for `currency` up to `limit`.
    pub fn trust_set(account: &str, currency: &str, issuer: &str, limit: &str, flags: u32) -> Self {
        Self::new(
            account,
            TransactionKind::TrustSet {
                limit_amount: IssuedAmount::new(currency, issuer, limit),
            },
            flags,
        )
    }

    /// `issuer` sends `value` of its own `currency` to `destination`.
    pub fn issue(issuer: &str, destination: &str, currency: &str, value: &str) -> Self {
        Self::new(
            issuer,
            TransactionKind::Payment {
                destination: destination.to_string(),
                amount: Amount::Issued(IssuedAmount::new(currency, issuer, value)),
            },
            0,
        )
    }

    pub fn account_set(account: &str, set_flag: u32) -> Self {
        Self::new(
            account,
            TransactionKind::AccountSet {
                set_flag: Some(set_flag),
                clear_flag: None,
            },
            0,
        )
    }

    /// Ledger name of the transaction type.
    pub fn transaction_type(&self) -> &'static str {
        match self.kind {
            TransactionKind::Payment { .. } => "Payment",
            TransactionKind::TrustSet { .. } => "TrustSet",
            TransactionKind::AccountSet { .. } => "AccountSet",
        }
    }

    /// Numeric transaction type code.
    pub fn type_code(&self) -> u16 {
        match self.kind {
            TransactionKind::Payment { .. } => 0,
            TransactionKind::AccountSet { .. } => 3,
            TransactionKind::TrustSet { .. } => 20,
        }
    }
}
