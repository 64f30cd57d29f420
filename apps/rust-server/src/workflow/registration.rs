// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Registration of new investor wallets.
//!
//! A new wallet is funded, awaited, given the requested trust lines one by
//! one and only then appended to the store. What happens when one of the
//! trust lines fails is decided by [`FailurePolicy`].

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::blockchain::codec::encode_currency;
use crate::blockchain::{LedgerClient, NATIVE_CURRENCY};
use crate::storage::{Participant, ParticipantStore, PublicParticipant, Role};

use super::provisioning::{create_funded_wallet, provision_trust_line, wait_for_account_activated};
use super::{FailurePolicy, WorkflowError, WorkflowSettings};

/// A trust line that could not be created during registration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct TrustLineFailure {
    pub currency: String,
    pub error: String,
}

/// Result of a completed registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrationOutcome {
    pub investor: PublicParticipant,
    /// Currencies whose handshake completed, in request order
    pub trust_lines: Vec<String>,
    pub failures: Vec<TrustLineFailure>,
}

/// Normalize the requested currency list: trimmed, deduplicated, request
/// order kept. Rejects the native asset and malformed codes.
pub fn normalize_currencies(requested: &[String]) -> Result<Vec<String>, WorkflowError> {
    let mut currencies: Vec<String> = Vec::with_capacity(requested.len());
    for code in requested {
        let code = code.trim();
        if code.eq_ignore_ascii_case(NATIVE_CURRENCY) {
            return Err(WorkflowError::InvalidRequest(format!(
                "{NATIVE_CURRENCY} is the native asset and needs no trust line"
            )));
        }
        encode_currency(code)
            .map_err(|e| WorkflowError::InvalidRequest(e.to_string()))?;
        if !currencies.iter().any(|c| c == code) {
            currencies.push(code.to_string());
        }
    }
    Ok(currencies)
}

/// Create, fund and provision a new investor named `name`.
pub async fn register_investor(
    ledger: &dyn LedgerClient,
    store: &dyn ParticipantStore,
    settings: &WorkflowSettings,
    name: &str,
    requested: &[String],
) -> Result<RegistrationOutcome, WorkflowError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(WorkflowError::InvalidRequest("name is required".to_string()));
    }
    let currencies = normalize_currencies(requested)?;

    let mut registry = store.load()?.ok_or_else(|| {
        WorkflowError::ConfigurationMissing("no registry; run setup first".to_string())
    })?;
    let admin = registry.admin.wallet()?;

    let wallet = create_funded_wallet(ledger).await?;
    wait_for_account_activated(ledger, wallet.address(), &settings.activation).await?;

    let mut trust_lines = Vec::with_capacity(currencies.len());
    let mut failures = Vec::new();
    for currency in &currencies {
        match provision_trust_line(ledger, &wallet, &admin, currency, &settings.trust_line_limit).await {
            Ok(_) => trust_lines.push(currency.clone()),
            Err(e) => {
                tracing::warn!(
                    address = %wallet.address(),
                    currency = %currency,
                    policy = settings.failure_policy.as_str(),
                    error = %e,
                    "Trust line failed during registration"
                );
                match settings.failure_policy {
                    FailurePolicy::Abort => return Err(e),
                    FailurePolicy::KeepPartial => {
                        failures.push(TrustLineFailure {
                            currency: currency.clone(),
                            error: e.to_string(),
                        });
                        break;
                    }
                    FailurePolicy::BestEffort => failures.push(TrustLineFailure {
                        currency: currency.clone(),
                        error: e.to_string(),
                    }),
                }
            }
        }
    }

    let investor = Participant::from_wallet(Role::Investor, name, &wallet);
    let public = investor.public_view();
    registry.investors.push(investor);
    store.save(&registry)?;

    tracing::info!(
        address = %public.address,
        name = %public.name,
        trust_lines = trust_lines.len(),
        failures = failures.len(),
        "Investor registered"
    );

    Ok(RegistrationOutcome {
        investor: public,
        trust_lines,
        failures,
    })
}
