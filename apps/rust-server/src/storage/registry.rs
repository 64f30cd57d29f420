// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! The persisted registry: admin wallet, investor wallets and declared
//! currencies.
//!
//! Field names follow the on-disk JSON document (`data/xrpl-poc.json`).
//! Older documents stored currencies as bare codes and the admin without a
//! name or role; both shapes still deserialize.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::blockchain::{KeyError, Wallet};

/// Role of a participant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Investor,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Investor => "investor",
        }
    }
}

fn default_role() -> Role {
    Role::Investor
}

/// A wallet this service signs for.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Participant {
    #[serde(default = "default_role")]
    pub role: Role,
    #[serde(default)]
    pub name: String,
    pub address: String,
    /// Family seed. Never leaves the process through the API.
    pub secret: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl std::fmt::Debug for Participant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Participant")
            .field("role", &self.role)
            .field("name", &self.name)
            .field("address", &self.address)
            .finish_non_exhaustive()
    }
}

impl Participant {
    /// Record a freshly created wallet.
    pub fn from_wallet(role: Role, name: impl Into<String>, wallet: &Wallet) -> Self {
        Self {
            role,
            name: name.into(),
            address: wallet.address().to_string(),
            secret: wallet.seed().to_string(),
            created_at: Some(Utc::now()),
        }
    }

    /// Restore the signing wallet, checking that the stored seed still
    /// derives the stored address.
    pub fn wallet(&self) -> Result<Wallet, WalletCheckError> {
        let wallet = Wallet::from_seed(&self.secret)?;
        if wallet.address() != self.address {
            return Err(WalletCheckError::Mismatch {
                expected: self.address.clone(),
                got: wallet.address().to_string(),
            });
        }
        Ok(wallet)
    }

    /// Copy without the secret, safe to return to clients.
    pub fn public_view(&self) -> PublicParticipant {
        PublicParticipant {
            role: self.role,
            name: self.name.clone(),
            address: self.address.clone(),
            created_at: self.created_at,
        }
    }
}

/// Failure restoring a participant's wallet.
#[derive(Debug, thiserror::Error)]
pub enum WalletCheckError {
    #[error("Invalid stored secret: {0}")]
    InvalidSecret(#[from] KeyError),

    #[error("Stored secret derives {got}, expected {expected}")]
    Mismatch { expected: String, got: String },
}

/// A participant with the secret stripped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PublicParticipant {
    pub role: Role,
    pub name: String,
    pub address: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

/// A token the admin issues, with a `"CODE:issuer"` link hint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(from = "CurrencyEntry")]
pub struct CurrencyDeclaration {
    pub code: String,
    pub link: String,
}

impl CurrencyDeclaration {
    pub fn new(code: &str, issuer: &str) -> Self {
        Self {
            code: code.to_string(),
            link: format!("{code}:{issuer}"),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum CurrencyEntry {
    Code(String),
    Full { code: String, link: String },
}

impl From<CurrencyEntry> for CurrencyDeclaration {
    fn from(entry: CurrencyEntry) -> Self {
        match entry {
            CurrencyEntry::Code(code) => Self {
                link: String::new(),
                code,
            },
            CurrencyEntry::Full { code, link } => Self { code, link },
        }
    }
}

/// The whole persisted state of a deployment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "RegistryDocument")]
pub struct Registry {
    pub network: String,
    pub admin: Participant,
    pub investors: Vec<Participant>,
    pub currencies: Vec<CurrencyDeclaration>,
    pub distributed: bool,
}

/// Registry as read from disk, before roles are normalized.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RegistryDocument {
    network: String,
    admin: Participant,
    #[serde(default)]
    investors: Vec<Participant>,
    #[serde(default)]
    currencies: Vec<CurrencyDeclaration>,
    #[serde(default)]
    distributed: bool,
}

impl From<RegistryDocument> for Registry {
    fn from(doc: RegistryDocument) -> Self {
        // Roles are positional in older documents.
        let mut admin = doc.admin;
        admin.role = Role::Admin;
        if admin.name.is_empty() {
            admin.name = "Admin".to_string();
        }
        let investors = doc
            .investors
            .into_iter()
            .map(|mut p| {
                p.role = Role::Investor;
                p
            })
            .collect();

        // Bare codes link to the admin.
        let currencies = doc
            .currencies
            .into_iter()
            .map(|c| {
                if c.link.is_empty() {
                    CurrencyDeclaration::new(&c.code, &admin.address)
                } else {
                    c
                }
            })
            .collect();

        Self {
            network: doc.network,
            admin,
            investors,
            currencies,
            distributed: doc.distributed,
        }
    }
}

impl Registry {
    pub fn new(network: impl Into<String>, admin: Participant) -> Self {
        Self {
            network: network.into(),
            admin,
            investors: Vec::new(),
            currencies: Vec::new(),
            distributed: false,
        }
    }

    /// Declared currency codes, in declaration order.
    pub fn currency_codes(&self) -> Vec<String> {
        self.currencies.iter().map(|c| c.code.clone()).collect()
    }

    /// Find the admin or an investor by address.
    pub fn find(&self, address: &str) -> Option<&Participant> {
        std::iter::once(&self.admin)
            .chain(self.investors.iter())
            .find(|p| p.address == address)
    }

    /// Check structural invariants: an admin, investors with the investor
    /// role, and no address used twice.
    pub fn validate(&self) -> Result<(), RegistryError> {
        if self.admin.address.is_empty() {
            return Err(RegistryError::MissingAdmin);
        }

        let mut seen = HashSet::new();
        seen.insert(self.admin.address.as_str());
        for investor in &self.investors {
            if investor.role != Role::Investor {
                return Err(RegistryError::WrongRole(investor.address.clone()));
            }
            if investor.address.is_empty() || investor.secret.is_empty() {
                return Err(RegistryError::IncompleteParticipant(investor.name.clone()));
            }
            if !seen.insert(investor.address.as_str()) {
                return Err(RegistryError::DuplicateAddress(investor.address.clone()));
            }
        }

        let mut codes = HashSet::new();
        for currency in &self.currencies {
            if !codes.insert(currency.code.as_str()) {
                return Err(RegistryError::DuplicateCurrency(currency.code.clone()));
            }
        }
        Ok(())
    }

    /// Copy without any secrets.
    pub fn public_view(&self) -> PublicRegistry {
        PublicRegistry {
            network: self.network.clone(),
            admin: self.admin.public_view(),
            investors: self.investors.iter().map(Participant::public_view).collect(),
            currencies: self.currencies.clone(),
            distributed: self.distributed,
        }
    }
}

/// The registry as returned by `GET /api/state`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PublicRegistry {
    pub network: String,
    pub admin: PublicParticipant,
    pub investors: Vec<PublicParticipant>,
    pub currencies: Vec<CurrencyDeclaration>,
    pub distributed: bool,
}

/// Registry invariant violations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    #[error("Registry has no admin address")]
    MissingAdmin,

    #[error("Address {0} is registered more than once")]
    DuplicateAddress(String),

    #[error("Currency {0} is declared more than once")]
    DuplicateCurrency(String),

    #[error("Participant {0} in the investor list does not have the investor role")]
    WrongRole(String),

    #[error("Participant `{0}` has no address or secret")]
    IncompleteParticipant(String),
}
