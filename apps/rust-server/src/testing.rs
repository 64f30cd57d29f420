// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! In-process ledger used by workflow and handler tests.
//!
//! Models just enough of the ledger to exercise the workflows: accounts
//! funded by a faucet, trust lines with per-side limits and authorization,
//! issued payments and the `asfRequireAuth` account flag. Every submitted
//! transaction is serialized and signed with the real codec.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::blockchain::client::{LedgerClient, LedgerError};
use crate::blockchain::codec;
use crate::blockchain::transactions::{
    Amount, Transaction, TransactionKind, ASF_DEFAULT_RIPPLE, ASF_REQUIRE_AUTH, TF_SETF_AUTH,
};
use crate::blockchain::types::{AccountInfo, Asset, SubmitOutcome, TrustLine, TES_SUCCESS};
use crate::blockchain::Wallet;

/// Starting balance granted by the fake faucet, in drops.
pub const FAUCET_DROPS: u64 = 100_000_000;

/// A submitted transaction as recorded by the fake.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub account: String,
    pub transaction_type: String,
    pub flags: u32,
    pub currency: Option<String>,
    pub counterparty: Option<String>,
    pub result_code: String,
}

#[derive(Debug, Default)]
struct FakeAccount {
    sequence: u32,
    require_auth: bool,
    default_ripple: bool,
}

#[derive(Debug, Clone)]
struct FakeLine {
    /// The two ends, in creation order
    a: String,
    b: String,
    currency: String,
    limit_a: f64,
    limit_b: f64,
    /// Amount of `b`'s token held by `a`; negative when `b` holds `a`'s
    balance: f64,
    authorized_by_a: bool,
    authorized_by_b: bool,
}

impl FakeLine {
    fn involves(&self, x: &str, y: &str) -> bool {
        (self.a == x && self.b == y) || (self.a == y && self.b == x)
    }

    fn view_from(&self, account: &str) -> TrustLine {
        let (peer, limit, balance) = if account == self.a {
            (&self.b, self.limit_a, self.balance)
        } else {
            (&self.a, self.limit_b, -self.balance)
        };
        TrustLine {
            account: peer.clone(),
            currency: self.currency.clone(),
            balance: format_value(balance),
            limit: format_value(limit),
        }
    }
}

#[derive(Debug, Default)]
struct FakeState {
    accounts: HashMap<String, FakeAccount>,
    lines: Vec<FakeLine>,
    submissions: Vec<Submission>,
    /// Currency → result code returned for any transaction touching it
    rejected_currencies: HashMap<String, String>,
    /// Addresses the faucet accepts but that never appear on the ledger
    never_activated: HashSet<String>,
    /// Remaining `account_info` misses before an address appears
    activation_delays: HashMap<String, u32>,
    faucet_down: bool,
    faucet_calls: usize,
    account_info_calls: usize,
    ledger_index: u32,
    offers: Vec<Value>,
}

/// Thread-safe fake ledger.
#[derive(Debug)]
pub struct FakeLedger {
    state: Mutex<FakeState>,
}

impl Default for FakeLedger {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeLedger {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(FakeState {
                ledger_index: 1000,
                ..FakeState::default()
            }),
        }
    }

    fn with_state<T>(&self, f: impl FnOnce(&mut FakeState) -> T) -> T {
        let mut state = self.state.lock().unwrap();
        f(&mut state)
    }

    /// Make every transaction on `currency` fail with `result_code`.
    pub fn reject_currency(&self, currency: &str, result_code: &str) {
        self.with_state(|s| {
            s.rejected_currencies
                .insert(currency.to_string(), result_code.to_string())
        });
    }

    /// Have the faucet accept requests for `address` without funding it.
    pub fn never_activate(&self, address: &str) {
        self.with_state(|s| s.never_activated.insert(address.to_string()));
    }

    /// Every faucet request fails from now on.
    pub fn take_faucet_down(&self) {
        self.with_state(|s| s.faucet_down = true);
    }

    /// Make `address` show up only after `misses` account lookups.
    pub fn delay_activation(&self, address: &str, misses: u32) {
        self.with_state(|s| s.activation_delays.insert(address.to_string(), misses));
    }

    /// Create an activated account directly.
    pub fn fund(&self, address: &str) {
        self.with_state(|s| {
            s.accounts.entry(address.to_string()).or_insert(FakeAccount {
                sequence: 1,
                ..FakeAccount::default()
            });
        });
    }

    pub fn add_offer(&self, offer: Value) {
        self.with_state(|s| s.offers.push(offer));
    }

    pub fn submissions(&self) -> Vec<Submission> {
        self.with_state(|s| s.submissions.clone())
    }

    pub fn faucet_calls(&self) -> usize {
        self.with_state(|s| s.faucet_calls)
    }

    pub fn account_info_calls(&self) -> usize {
        self.with_state(|s| s.account_info_calls)
    }

    pub fn requires_auth(&self, address: &str) -> bool {
        self.with_state(|s| s.accounts.get(address).map(|a| a.require_auth).unwrap_or(false))
    }

    pub fn default_ripple(&self, address: &str) -> bool {
        self.with_state(|s| s.accounts.get(address).map(|a| a.default_ripple).unwrap_or(false))
    }

    /// Whether `issuer` has authorized `holder`'s line for `currency`.
    pub fn is_authorized(&self, holder: &str, issuer: &str, currency: &str) -> bool {
        self.with_state(|s| {
            s.lines
                .iter()
                .find(|l| l.involves(holder, issuer) && l.currency == currency)
                .map(|l| if l.a == issuer { l.authorized_by_a } else { l.authorized_by_b })
                .unwrap_or(false)
        })
    }

    /// Lines of `account` as the ledger would report them.
    pub fn lines_of(&self, account: &str) -> Vec<TrustLine> {
        self.with_state(|s| lines_of(s, account, None))
    }
}

fn lines_of(state: &FakeState, account: &str, peer: Option<&str>) -> Vec<TrustLine> {
    state
        .lines
        .iter()
        .filter(|l| l.a == account || l.b == account)
        .filter(|l| peer.map_or(true, |p| l.involves(account, p)))
        .map(|l| l.view_from(account))
        .collect()
}

fn format_value(value: f64) -> String {
    if value == 0.0 {
        "0".to_string()
    } else {
        format!("{value}")
    }
}

fn parse_value(value: &str) -> Result<f64, String> {
    value
        .parse::<f64>()
        .map_err(|_| format!("bad amount {value}"))
}

/// Apply a transaction to the state and return its engine result.
fn apply(state: &mut FakeState, tx: &Transaction) -> Result<&'static str, String> {
    match &tx.kind {
        TransactionKind::AccountSet { set_flag, .. } => {
            let account = state.accounts.get_mut(&tx.account).ok_or("no account")?;
            match *set_flag {
                Some(ASF_REQUIRE_AUTH) => account.require_auth = true,
                Some(ASF_DEFAULT_RIPPLE) => account.default_ripple = true,
                _ => {}
            }
            Ok(TES_SUCCESS)
        }
        TransactionKind::TrustSet { limit_amount } => {
            let peer = &limit_amount.issuer;
            if peer == &tx.account {
                return Ok("temDST_IS_SRC");
            }
            if !state.accounts.contains_key(peer) {
                return Ok("tecNO_DST");
            }
            let limit = parse_value(&limit_amount.value)?;
            let authorize = tx.flags & TF_SETF_AUTH != 0;

            let existing = state
                .lines
                .iter()
                .position(|l| l.involves(&tx.account, peer) && l.currency == limit_amount.currency);
            let index = match existing {
                Some(index) => index,
                None => {
                    state.lines.push(FakeLine {
                        a: tx.account.clone(),
                        b: peer.clone(),
                        currency: limit_amount.currency.clone(),
                        limit_a: 0.0,
                        limit_b: 0.0,
                        balance: 0.0,
                        authorized_by_a: false,
                        authorized_by_b: false,
                    });
                    state.lines.len() - 1
                }
            };
            let line = &mut state.lines[index];

            if line.a == tx.account {
                line.limit_a = limit;
                line.authorized_by_a |= authorize;
            } else {
                line.limit_b = limit;
                line.authorized_by_b |= authorize;
            }
            Ok(TES_SUCCESS)
        }
        TransactionKind::Payment { destination, amount } => {
            let Amount::Issued(amount) = amount else {
                return Ok("temBAD_AMOUNT");
            };
            if amount.issuer != tx.account {
                return Ok("tecPATH_DRY");
            }
            let value = parse_value(&amount.value)?;
            let issuer_requires_auth = state
                .accounts
                .get(&tx.account)
                .map(|a| a.require_auth)
                .unwrap_or(false);

            let Some(line) = state
                .lines
                .iter_mut()
                .find(|l| l.involves(&tx.account, destination) && l.currency == amount.currency)
            else {
                return Ok("tecPATH_DRY");
            };

            let holder_is_a = &line.a == destination;
            let (holder_limit, issuer_authorized) = if holder_is_a {
                (line.limit_a, line.authorized_by_b)
            } else {
                (line.limit_b, line.authorized_by_a)
            };
            if issuer_requires_auth && !issuer_authorized {
                return Ok("tecPATH_DRY");
            }

            let held = if holder_is_a { line.balance } else { -line.balance };
            if held + value > holder_limit {
                return Ok("tecPATH_PARTIAL");
            }
            if holder_is_a {
                line.balance += value;
            } else {
                line.balance -= value;
            }
            Ok(TES_SUCCESS)
        }
    }
}

fn touched_currency(tx: &Transaction) -> (Option<String>, Option<String>) {
    match &tx.kind {
        TransactionKind::TrustSet { limit_amount } => (
            Some(limit_amount.currency.clone()),
            Some(limit_amount.issuer.clone()),
        ),
        TransactionKind::Payment { destination, amount } => match amount {
            Amount::Issued(a) => (Some(a.currency.clone()), Some(destination.clone())),
            Amount::Drops(_) => (None, Some(destination.clone())),
        },
        TransactionKind::AccountSet { .. } => (None, None),
    }
}

#[async_trait]
impl LedgerClient for FakeLedger {
    async fn account_info(&self, address: &str) -> Result<Option<AccountInfo>, LedgerError> {
        Ok(self.with_state(|s| {
            s.account_info_calls += 1;
            if let Some(remaining) = s.activation_delays.get_mut(address) {
                if *remaining > 0 {
                    *remaining -= 1;
                    return None;
                }
            }
            s.accounts.get(address).map(|a| AccountInfo {
                account: address.to_string(),
                balance: Some(FAUCET_DROPS.to_string()),
                sequence: a.sequence,
            })
        }))
    }

    async fn account_lines(
        &self,
        address: &str,
        peer: Option<&str>,
    ) -> Result<Vec<TrustLine>, LedgerError> {
        self.with_state(|s| {
            if !s.accounts.contains_key(address) {
                return Err(LedgerError::Rpc {
                    method: "account_lines".to_string(),
                    code: "actNotFound".to_string(),
                    message: "Account not found.".to_string(),
                });
            }
            Ok(lines_of(s, address, peer))
        })
    }

    async fn submit_and_wait(
        &self,
        wallet: &Wallet,
        mut tx: Transaction,
    ) -> Result<SubmitOutcome, LedgerError> {
        let sequence = self.with_state(|s| s.accounts.get(&tx.account).map(|a| a.sequence));
        let Some(sequence) = sequence else {
            return Err(LedgerError::Rpc {
                method: "account_info".to_string(),
                code: "actNotFound".to_string(),
                message: "Account not found.".to_string(),
            });
        };

        let ledger_index = self.with_state(|s| s.ledger_index);
        tx.sequence.get_or_insert(sequence);
        tx.fee_drops.get_or_insert(12);
        tx.last_ledger_sequence.get_or_insert(ledger_index + 20);

        let signed = codec::sign(wallet, &tx)?;
        let transaction_type = tx.transaction_type().to_string();
        let (currency, counterparty) = touched_currency(&tx);

        let result_code = self.with_state(|s| {
            let code = if wallet.address() != tx.account {
                "tefBAD_AUTH".to_string()
            } else if let Some(code) = currency.as_ref().and_then(|c| s.rejected_currencies.get(c)) {
                code.clone()
            } else {
                apply(s, &tx)
                    .map(str::to_string)
                    .map_err(LedgerError::MalformedResponse)?
            };

            if !code.starts_with("tem") && !code.starts_with("tef") {
                if let Some(account) = s.accounts.get_mut(&tx.account) {
                    account.sequence += 1;
                }
            }
            s.ledger_index += 1;
            s.submissions.push(Submission {
                account: tx.account.clone(),
                transaction_type: transaction_type.clone(),
                flags: tx.flags,
                currency: currency.clone(),
                counterparty: counterparty.clone(),
                result_code: code.clone(),
            });
            Ok::<_, LedgerError>(code)
        })?;

        let ledger_index = self.with_state(|s| s.ledger_index);
        Ok(SubmitOutcome {
            transaction_type,
            hash: signed.hash,
            result_code,
            ledger_index: Some(ledger_index),
        })
    }

    async fn fund_wallet(&self, address: &str) -> Result<(), LedgerError> {
        self.with_state(|s| {
            s.faucet_calls += 1;
            if s.faucet_down {
                return Err(LedgerError::Faucet("HTTP 503 Service Unavailable".to_string()));
            }
            if !s.never_activated.contains(address) {
                s.accounts.entry(address.to_string()).or_insert(FakeAccount {
                    sequence: 1,
                    ..FakeAccount::default()
                });
            }
            Ok(())
        })
    }

    async fn book_offers(
        &self,
        taker_gets: &Asset,
        taker_pays: &Asset,
        limit: u32,
    ) -> Result<Value, LedgerError> {
        Ok(self.with_state(|s| {
            let offers: Vec<Value> = s.offers.iter().take(limit as usize).cloned().collect();
            json!({
                "ledger_index": s.ledger_index,
                "offers": offers,
                "taker_gets": taker_gets.to_json(),
                "taker_pays": taker_pays.to_json(),
                "validated": true,
            })
        }))
    }

    async fn validated_ledger_index(&self) -> Result<u32, LedgerError> {
        Ok(self.with_state(|s| s.ledger_index))
    }
}
