// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use crate::config::ItnConfig;
use crate::providers::{GatewayError, PayFastClient};
use crate::storage::{PostgrestRegistrationStore, RegistrationStore, StoreError};

#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error(transparent)]
    Gateway(#[from] GatewayError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("record store not configured: set SUPABASE_URL and SUPABASE_SERVICE_ROLE_KEY")]
    MissingStore,
}

/// Shared, read-only handler state. Cloned per request.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ItnConfig>,
    pub gateway: PayFastClient,
    pub store: Arc<dyn RegistrationStore>,
}

impl AppState {
    pub fn new(config: ItnConfig, gateway: PayFastClient, store: Arc<dyn RegistrationStore>) -> Self {
        Self {
            config: Arc::new(config),
            gateway,
            store,
        }
    }

    /// Build the gateway client and the PostgREST store from configuration.
    ///
    /// Refuses to start without a record store. A verified payment must be
    /// written durably before it is acknowledged.
    pub fn from_config(config: ItnConfig) -> Result<Self, StateError> {
        let gateway = PayFastClient::from_config(&config)?;

        let store_config = config.store.as_ref().ok_or(StateError::MissingStore)?;
        let store = PostgrestRegistrationStore::from_config(store_config, config.http_timeout)?;

        Ok(Self::new(config, gateway, Arc::new(store)))
    }
}
