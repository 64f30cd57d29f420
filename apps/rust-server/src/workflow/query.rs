// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Read-only views over the issuer's trust lines.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::blockchain::{LedgerClient, TrustLine, NATIVE_CURRENCY};
use crate::storage::{PublicParticipant, Registry};

use super::WorkflowError;

/// One holder's side of a line, grouped under its currency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct HolderLine {
    pub account: String,
    pub balance: String,
    pub limit: String,
}

/// Counts over the issuer's lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TrustLineSummary {
    pub total_trust_lines: usize,
    pub unique_accounts: usize,
    pub currencies: usize,
    pub currencies_list: Vec<String>,
}

/// An investor with the currencies they can still add.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InvestorOverview {
    #[serde(flatten)]
    pub participant: PublicParticipant,
    pub missing_currencies: Vec<String>,
}

/// Everything `GET /api/admin` shows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AdminOverview {
    pub issuer: String,
    pub summary: TrustLineSummary,
    pub by_currency: BTreeMap<String, Vec<HolderLine>>,
    pub by_account: BTreeMap<String, Vec<String>>,
    pub all_trust_lines: Vec<TrustLine>,
    pub investors: Vec<InvestorOverview>,
}

/// All trust lines held against `issuer`, every page.
pub async fn list_issuer_trust_lines(
    ledger: &dyn LedgerClient,
    issuer: &str,
) -> Result<Vec<TrustLine>, WorkflowError> {
    let lines = ledger.account_lines(issuer, None).await?;
    tracing::debug!(issuer = %issuer, count = lines.len(), "Fetched issuer trust lines");
    Ok(lines)
}

/// Group lines by currency, keeping input order within each group.
pub fn group_by_currency(lines: &[TrustLine]) -> BTreeMap<String, Vec<HolderLine>> {
    let mut grouped: BTreeMap<String, Vec<HolderLine>> = BTreeMap::new();
    for line in lines {
        grouped
            .entry(line.currency.clone())
            .or_default()
            .push(HolderLine {
                account: line.account.clone(),
                balance: line.balance.clone(),
                limit: line.limit.clone(),
            });
    }
    grouped
}

/// Currencies each account holds a line for, in input order.
pub fn group_by_account(lines: &[TrustLine]) -> BTreeMap<String, Vec<String>> {
    let mut grouped: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for line in lines {
        let currencies = grouped.entry(line.account.clone()).or_default();
        if !currencies.contains(&line.currency) {
            currencies.push(line.currency.clone());
        }
    }
    grouped
}

/// Known currencies `holder` has no line for, native asset excluded.
///
/// `lines` are the issuer's lines, so `account` is the holder. The result
/// is sorted and deduplicated.
pub fn missing_currencies_for(holder: &str, known: &[String], lines: &[TrustLine]) -> Vec<String> {
    let held: BTreeSet<&str> = lines
        .iter()
        .filter(|l| l.account == holder)
        .map(|l| l.currency.as_str())
        .collect();

    known
        .iter()
        .filter(|code| !code.eq_ignore_ascii_case(NATIVE_CURRENCY))
        .filter(|code| !held.contains(code.as_str()))
        .cloned()
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

pub fn summarize(lines: &[TrustLine]) -> TrustLineSummary {
    let accounts: BTreeSet<&str> = lines.iter().map(|l| l.account.as_str()).collect();
    let currencies: Vec<String> = lines
        .iter()
        .map(|l| l.currency.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    TrustLineSummary {
        total_trust_lines: lines.len(),
        unique_accounts: accounts.len(),
        currencies: currencies.len(),
        currencies_list: currencies,
    }
}

/// Build the admin dashboard view for the stored registry.
pub async fn admin_overview(
    ledger: &dyn LedgerClient,
    registry: &Registry,
) -> Result<AdminOverview, WorkflowError> {
    let issuer = registry.admin.address.clone();
    if issuer.is_empty() {
        return Err(WorkflowError::ConfigurationMissing(
            "admin address not found in registry".to_string(),
        ));
    }

    let lines = list_issuer_trust_lines(ledger, &issuer).await?;
    let known = registry.currency_codes();

    let investors = registry
        .investors
        .iter()
        .map(|p| InvestorOverview {
            participant: p.public_view(),
            missing_currencies: missing_currencies_for(&p.address, &known, &lines),
        })
        .collect();

    Ok(AdminOverview {
        issuer,
        summary: summarize(&lines),
        by_currency: group_by_currency(&lines),
        by_account: group_by_account(&lines),
        all_trust_lines: lines,
        investors,
    })
}
