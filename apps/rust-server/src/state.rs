// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use tokio::sync::Mutex;

use crate::blockchain::{LedgerClient, NetworkConfig};
use crate::storage::ParticipantStore;
use crate::workflow::WorkflowSettings;

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub ledger: Arc<dyn LedgerClient>,
    pub store: Arc<dyn ParticipantStore>,
    pub network: NetworkConfig,
    pub settings: WorkflowSettings,
    /// Serializes store writers (setup, registration) within the process.
    pub writer: Arc<Mutex<()>>,
}

impl AppState {
    pub fn new(
        ledger: Arc<dyn LedgerClient>,
        store: Arc<dyn ParticipantStore>,
        network: NetworkConfig,
        settings: WorkflowSettings,
    ) -> Self {
        Self {
            ledger,
            store,
            network,
            settings,
            writer: Arc::new(Mutex::new(())),
        }
    }
}
