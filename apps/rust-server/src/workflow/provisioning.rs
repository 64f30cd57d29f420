// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Wallet funding and the trust-line handshake.
//!
//! The handshake between a holder and the issuer is three transactions:
//!
//! 1. holder `TrustSet` to the issuer with the requested limit
//! 2. the same `TrustSet` again with `tfClearNoRipple`
//! 3. issuer `TrustSet` back to the holder, limit `0`, `tfSetfAuth`
//!
//! Each step is validated before the next one is built. A failure aborts the sequence and leaves earlier steps on the ledger.

use std::time::Duration;

use tracing::Instrument;

use crate::blockchain::transactions::{
    Transaction, ASF_DEFAULT_RIPPLE, ASF_REQUIRE_AUTH, TF_CLEAR_NO_RIPPLE, TF_SETF_AUTH,
};
use crate::blockchain::{AccountInfo, LedgerClient, SubmitOutcome, Wallet};

use super::WorkflowError;

/// Bounded polling for new accounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActivationPolicy {
    pub retries: u32,
    pub interval: Duration,
}

impl Default for ActivationPolicy {
    fn default() -> Self {
        Self {
            retries: 15,
            interval: Duration::from_millis(1000),
        }
    }
}

/// Generate a wallet locally and have the faucet fund it.
pub async fn create_funded_wallet(ledger: &dyn LedgerClient) -> Result<Wallet, WorkflowError> {
    let wallet = Wallet::generate()?;
    ledger.fund_wallet(wallet.address()).await?;
    tracing::info!(address = %wallet.address(), "Wallet created and funding requested");
    Ok(wallet)
}

/// Poll until `address` holds a native balance.
///
/// Lookup errors count as "not yet"; exhausting the retries is the only
/// failure.
pub async fn wait_for_account_activated(
    ledger: &dyn LedgerClient,
    address: &str,
    policy: &ActivationPolicy,
) -> Result<AccountInfo, WorkflowError> {
    for attempt in 1..=policy.retries {
        match ledger.account_info(address).await {
            Ok(Some(info)) if info.is_activated() => {
                tracing::debug!(address = %address, attempt, "Account activated");
                return Ok(info);
            }
            Ok(_) => {}
            Err(e) => {
                tracing::debug!(address = %address, attempt, error = %e, "Account lookup failed");
            }
        }

        if attempt < policy.retries {
            tokio::time::sleep(policy.interval).await;
        }
    }

    tracing::warn!(address = %address, retries = policy.retries, "Account never activated");
    Err(WorkflowError::ActivationTimeout {
        address: address.to_string(),
    })
}

/// Submit and require `tesSUCCESS`.
pub async fn submit(
    ledger: &dyn LedgerClient,
    wallet: &Wallet,
    tx: Transaction,
) -> Result<SubmitOutcome, WorkflowError> {
    let outcome = ledger.submit_and_wait(wallet, tx).await?;

    if !outcome.is_success() {
        tracing::warn!(
            account = %wallet.address(),
            transaction_type = %outcome.transaction_type,
            result_code = %outcome.result_code,
            hash = %outcome.hash,
            "Transaction failed"
        );
        return Err(WorkflowError::SubmissionFailed {
            transaction_type: outcome.transaction_type,
            result_code: outcome.result_code,
            hash: outcome.hash,
        });
    }

    tracing::info!(
        account = %wallet.address(),
        transaction_type = %outcome.transaction_type,
        hash = %outcome.hash,
        "Transaction validated"
    );
    Ok(outcome)
}

/// Run the full three-step handshake for `holder` on `currency` of `issuer`.
pub async fn provision_trust_line(
    ledger: &dyn LedgerClient,
    holder: &Wallet,
    issuer: &Wallet,
    currency: &str,
    limit: &str,
) -> Result<Vec<SubmitOutcome>, WorkflowError> {
    let span = tracing::info_span!(
        "provision_trust_line",
        holder = %holder.address(),
        issuer = %issuer.address(),
        currency = %currency
    );

    async move {
        let mut outcomes = Vec::with_capacity(3);

        outcomes.push(
            submit(
                ledger,
                holder,
                Transaction::trust_set(holder.address(), currency, issuer.address(), limit, 0),
            )
            .await?,
        );

        outcomes.push(
            submit(
                ledger,
                holder,
                Transaction::trust_set(
                    holder.address(),
                    currency,
                    issuer.address(),
                    limit,
                    TF_CLEAR_NO_RIPPLE,
                ),
            )
            .await?,
        );

        outcomes.push(
            submit(
                ledger,
                issuer,
                Transaction::trust_set(issuer.address(), currency, holder.address(), "0", TF_SETF_AUTH),
            )
            .await?,
        );

        Ok::<_, WorkflowError>(outcomes)
    }
    .instrument(span)
    .await
}

/// Enable default rippling, then require authorization for incoming lines.
pub async fn configure_issuer(
    ledger: &dyn LedgerClient,
    admin: &Wallet,
) -> Result<Vec<SubmitOutcome>, WorkflowError> {
    let mut outcomes = Vec::with_capacity(2);
    for flag in [ASF_DEFAULT_RIPPLE, ASF_REQUIRE_AUTH] {
        outcomes.push(submit(ledger, admin, Transaction::account_set(admin.address(), flag)).await?);
    }
    Ok(outcomes)
}

/// Pay `value` of the issuer's `currency` to `destination`.
pub async fn issue_tokens(
    ledger: &dyn LedgerClient,
    issuer: &Wallet,
    destination: &str,
    currency: &str,
    value: &str,
) -> Result<SubmitOutcome, WorkflowError> {
    submit(
        ledger,
        issuer,
        Transaction::issue(issuer.address(), destination, currency, value),
    )
    .await
}

/// Result of [`ensure_trust_line`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrustLineStatus {
    /// The holder already had a line for the currency to the issuer.
    Exists,
    /// Transactions submitted to create it.
    Created(Vec<SubmitOutcome>),
}

/// Create a holder's line to `issuer_address` unless it already exists.
///
/// With the issuer's wallet available the full handshake runs; for a
/// foreign issuer only the holder's `TrustSet` is submitted.
pub async fn ensure_trust_line(
    ledger: &dyn LedgerClient,
    holder: &Wallet,
    issuer_address: &str,
    issuer: Option<&Wallet>,
    currency: &str,
    limit: &str,
) -> Result<TrustLineStatus, WorkflowError> {
    let existing = ledger
        .account_lines(holder.address(), Some(issuer_address))
        .await?;
    if existing
        .iter()
        .any(|l| l.currency == currency && l.account == issuer_address)
    {
        return Ok(TrustLineStatus::Exists);
    }

    let outcomes = match issuer {
        Some(issuer) => provision_trust_line(ledger, holder, issuer, currency, limit).await?,
        None => vec![
            submit(
                ledger,
                holder,
                Transaction::trust_set(holder.address(), currency, issuer_address, limit, 0),
            )
            .await?,
        ],
    };
    Ok(TrustLineStatus::Created(outcomes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeLedger;

    fn fast_policy(retries: u32) -> ActivationPolicy {
        ActivationPolicy {
            retries,
            interval: Duration::from_millis(1),
        }
    }

    fn funded(ledger: &FakeLedger) -> Wallet {
        let wallet = Wallet::generate().unwrap();
        ledger.fund(wallet.address());
        wallet
    }

    #[tokio::test]
    async fn funded_wallet_activates() {
        let ledger = FakeLedger::new();
        let wallet = create_funded_wallet(&ledger).await.unwrap();
        assert_eq!(ledger.faucet_calls(), 1);

        let info = wait_for_account_activated(&ledger, wallet.address(), &fast_policy(3))
            .await
            .unwrap();
        assert_eq!(info.account, wallet.address());
        assert!(info.is_activated());
    }

    #[tokio::test]
    async fn activation_polls_until_balance_appears() {
        let ledger = FakeLedger::new();
        let wallet = funded(&ledger);
        ledger.delay_activation(wallet.address(), 4);

        wait_for_account_activated(&ledger, wallet.address(), &fast_policy(10))
            .await
            .unwrap();
        assert_eq!(ledger.account_info_calls(), 5);
    }

    #[tokio::test]
    async fn activation_times_out_naming_the_address() {
        let ledger = FakeLedger::new();
        let address = Wallet::generate().unwrap().address().to_string();
        ledger.never_activate(&address);
        ledger.fund_wallet(&address).await.unwrap();

        let err = wait_for_account_activated(&ledger, &address, &fast_policy(5))
            .await
            .unwrap_err();
        match err {
            WorkflowError::ActivationTimeout { address: reported } => assert_eq!(reported, address),
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(ledger.account_info_calls(), 5);
    }

    #[tokio::test]
    async fn faucet_failure_is_surfaced_once() {
        let ledger = FakeLedger::new();
        ledger.take_faucet_down();
        let err = create_funded_wallet(&ledger).await.unwrap_err();
        assert!(matches!(err, WorkflowError::Ledger(_)));
        assert_eq!(ledger.faucet_calls(), 1);
    }

    #[tokio::test]
    async fn handshake_creates_authorized_line_with_limit() {
        let ledger = FakeLedger::new();
        let issuer = funded(&ledger);
        let holder = funded(&ledger);
        configure_issuer(&ledger, &issuer).await.unwrap();

        let outcomes = provision_trust_line(&ledger, &holder, &issuer, "BRL", "1000000")
            .await
            .unwrap();
        assert_eq!(outcomes.len(), 3);
        assert!(outcomes.iter().all(SubmitOutcome::is_success));

        let lines = ledger.lines_of(holder.address());
        let line = lines
            .iter()
            .find(|l| l.account == issuer.address() && l.currency == "BRL")
            .expect("line to issuer");
        assert!(line.limit.parse::<f64>().unwrap() >= 1_000_000.0);
        assert!(ledger.is_authorized(holder.address(), issuer.address(), "BRL"));
    }

    #[tokio::test]
    async fn handshake_submits_in_order_with_flags() {
        let ledger = FakeLedger::new();
        let issuer = funded(&ledger);
        let holder = funded(&ledger);

        provision_trust_line(&ledger, &holder, &issuer, "TKA", "500")
            .await
            .unwrap();

        let subs = ledger.submissions();
        assert_eq!(subs.len(), 3);
        assert_eq!(subs[0].account, holder.address());
        assert_eq!(subs[0].flags, 0);
        assert_eq!(subs[1].account, holder.address());
        assert_eq!(subs[1].flags, TF_CLEAR_NO_RIPPLE);
        assert_eq!(subs[2].account, issuer.address());
        assert_eq!(subs[2].flags, TF_SETF_AUTH);
        assert_eq!(subs[2].counterparty.as_deref(), Some(holder.address()));
    }

    #[tokio::test]
    async fn handshake_stops_at_first_failure() {
        let ledger = FakeLedger::new();
        let issuer = funded(&ledger);
        let holder = funded(&ledger);
        ledger.reject_currency("TKB", "tecNO_LINE_INSUF_RESERVE");

        let err = provision_trust_line(&ledger, &holder, &issuer, "TKB", "1000")
            .await
            .unwrap_err();
        match err {
            WorkflowError::SubmissionFailed {
                transaction_type,
                result_code,
                ..
            } => {
                assert_eq!(transaction_type, "TrustSet");
                assert_eq!(result_code, "tecNO_LINE_INSUF_RESERVE");
            }
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(ledger.submissions().len(), 1);
    }

    #[tokio::test]
    async fn configure_issuer_sets_both_flags() {
        let ledger = FakeLedger::new();
        let issuer = funded(&ledger);
        let outcomes = configure_issuer(&ledger, &issuer).await.unwrap();
        assert_eq!(outcomes.len(), 2);
        assert!(ledger.default_ripple(issuer.address()));
        assert!(ledger.requires_auth(issuer.address()));
    }

    #[tokio::test]
    async fn issuing_requires_an_authorized_line() {
        let ledger = FakeLedger::new();
        let issuer = funded(&ledger);
        let holder = funded(&ledger);
        configure_issuer(&ledger, &issuer).await.unwrap();

        let err = issue_tokens(&ledger, &issuer, holder.address(), "BRL", "1000")
            .await
            .unwrap_err();
        assert!(matches!(err, WorkflowError::SubmissionFailed { .. }));

        provision_trust_line(&ledger, &holder, &issuer, "BRL", "1000000")
            .await
            .unwrap();
        issue_tokens(&ledger, &issuer, holder.address(), "BRL", "1000")
            .await
            .unwrap();

        let line = ledger
            .lines_of(holder.address())
            .into_iter()
            .find(|l| l.currency == "BRL")
            .unwrap();
        assert_eq!(line.balance, "1000");
    }

    #[tokio::test]
    async fn ensure_reports_existing_line_without_submitting() {
        let ledger = FakeLedger::new();
        let issuer = funded(&ledger);
        let holder = funded(&ledger);

        let first = ensure_trust_line(&ledger, &holder, issuer.address(), Some(&issuer), "BRL", "10")
            .await
            .unwrap();
        assert!(matches!(first, TrustLineStatus::Created(ref o) if o.len() == 3));

        let second = ensure_trust_line(&ledger, &holder, issuer.address(), Some(&issuer), "BRL", "10")
            .await
            .unwrap();
        assert_eq!(second, TrustLineStatus::Exists);
        assert_eq!(ledger.submissions().len(), 3);
    }

    #[tokio::test]
    async fn ensure_with_foreign_issuer_only_sets_holder_side() {
        let ledger = FakeLedger::new();
        let foreign = funded(&ledger);
        let holder = funded(&ledger);

        let status = ensure_trust_line(&ledger, &holder, foreign.address(), None, "USD", "50")
            .await
            .unwrap();
        assert!(matches!(status, TrustLineStatus::Created(ref o) if o.len() == 1));
        assert!(!ledger.is_authorized(holder.address(), foreign.address(), "USD"));
    }
}
