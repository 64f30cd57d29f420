// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! One-time bootstrap of a deployment.
//!
//! Creates the admin and three investors, turns the admin into an issuer,
//! opens trust lines and distributes the initial balances. Running it again
//! returns the stored registry untouched.

use crate::blockchain::{LedgerClient, Wallet};
use crate::storage::{CurrencyDeclaration, Participant, ParticipantStore, Registry, Role};

use super::provisioning::{
    configure_issuer, create_funded_wallet, issue_tokens, provision_trust_line,
    wait_for_account_activated,
};
use super::{WorkflowError, WorkflowSettings};

/// Currencies declared at setup, in order.
pub const SETUP_CURRENCIES: [&str; 3] = ["BRL", "TKA", "TKB"];

/// Number of investors created at setup.
pub const SETUP_INVESTORS: usize = 3;

/// Investors (by index) that receive every currency and a distribution.
const FULLY_PROVISIONED: usize = 2;

/// Whether setup found an existing registry or created one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SetupOutcome {
    Existing(Registry),
    Created(Registry),
}

impl SetupOutcome {
    pub fn registry(&self) -> &Registry {
        match self {
            SetupOutcome::Existing(r) | SetupOutcome::Created(r) => r,
        }
    }
}

/// Amount distributed to the investor at `index` (0-based), per currency.
pub fn distribution_amount(index: usize) -> String {
    ((index + 1) * 1000).to_string()
}

/// Return the stored registry, or bootstrap a new deployment.
pub async fn bootstrap(
    ledger: &dyn LedgerClient,
    store: &dyn ParticipantStore,
    settings: &WorkflowSettings,
    network: &str,
) -> Result<SetupOutcome, WorkflowError> {
    // Unreadable state counts as not provisioned yet
    match store.load() {
        Ok(Some(existing)) => return Ok(SetupOutcome::Existing(existing)),
        Ok(None) => {}
        Err(e) => {
            tracing::warn!(backend = store.backend(), error = %e, "Stored registry unreadable, bootstrapping");
        }
    }

    tracing::info!(network = %network, "Bootstrapping deployment");

    let admin = create_funded_wallet(ledger).await?;
    let mut investors: Vec<Wallet> = Vec::with_capacity(SETUP_INVESTORS);
    for _ in 0..SETUP_INVESTORS {
        investors.push(create_funded_wallet(ledger).await?);
    }

    for wallet in std::iter::once(&admin).chain(investors.iter()) {
        wait_for_account_activated(ledger, wallet.address(), &settings.activation).await?;
    }

    configure_issuer(ledger, &admin).await?;

    let limit = settings.trust_line_limit.as_str();
    for investor in &investors[..FULLY_PROVISIONED] {
        for code in SETUP_CURRENCIES {
            provision_trust_line(ledger, investor, &admin, code, limit).await?;
        }
    }
    for investor in &investors[FULLY_PROVISIONED..] {
        provision_trust_line(ledger, investor, &admin, SETUP_CURRENCIES[0], limit).await?;
    }

    for (index, investor) in investors[..FULLY_PROVISIONED].iter().enumerate() {
        let amount = distribution_amount(index);
        for code in SETUP_CURRENCIES {
            issue_tokens(ledger, &admin, investor.address(), code, &amount).await?;
        }
    }

    let mut registry = Registry::new(network, Participant::from_wallet(Role::Admin, "Admin", &admin));
    registry.investors = investors
        .iter()
        .enumerate()
        .map(|(i, w)| Participant::from_wallet(Role::Investor, format!("Investor {}", i + 1), w))
        .collect();
    registry.currencies = SETUP_CURRENCIES
        .iter()
        .map(|code| CurrencyDeclaration::new(code, admin.address()))
        .collect();
    registry.distributed = true;

    store.save(&registry)?;
    tracing::info!(admin = %admin.address(), investors = registry.investors.len(), "Deployment bootstrapped");

    Ok(SetupOutcome::Created(registry))
}
