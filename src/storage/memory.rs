// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! In-memory registration store.
//!
//! Backs tests and embedders that seed their own records. It is never
//! selected from configuration: contents are lost on restart, so acknowledging
//! a payment against it would not be durable.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{RegistrationStore, StoreResult};
use crate::models::{RegistrationStatus, Transition};

/// A team registration as held by the record store.
#[derive(Debug, Clone, PartialEq)]
pub struct RegistrationRecord {
    pub id: String,
    pub team_name: String,
    pub status: RegistrationStatus,
    pub pf_payment_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Default)]
pub struct InMemoryRegistrationStore {
    records: RwLock<HashMap<String, RegistrationRecord>>,
}

impl InMemoryRegistrationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a fresh registration awaiting payment.
    pub async fn insert_pending(&self, team_name: impl Into<String>) -> RegistrationRecord {
        let record = RegistrationRecord {
            id: Uuid::new_v4().to_string(),
            team_name: team_name.into(),
            status: RegistrationStatus::PendingPayment,
            pf_payment_id: None,
            created_at: Utc::now(),
        };
        self.insert(record.clone()).await;
        record
    }

    pub async fn insert(&self, record: RegistrationRecord) {
        self.records.write().await.insert(record.id.clone(), record);
    }

    pub async fn get(&self, registration_id: &str) -> Option<RegistrationRecord> {
        self.records.read().await.get(registration_id).cloned()
    }
}

#[async_trait]
impl RegistrationStore for InMemoryRegistrationStore {
    async fn confirm_payment(
        &self,
        registration_id: &str,
        pf_payment_id: Option<&str>,
    ) -> StoreResult<Transition> {
        let mut records = self.records.write().await;
        let Some(record) = records.get_mut(registration_id) else {
            return Ok(Transition::Unchanged);
        };

        if record.status == RegistrationStatus::Confirmed {
            return Ok(Transition::Unchanged);
        }

        record.status = RegistrationStatus::Confirmed;
        if let Some(pf_payment_id) = pf_payment_id {
            record.pf_payment_id = Some(pf_payment_id.to_string());
        }
        Ok(Transition::Applied)
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn confirm_moves_pending_record_to_confirmed() {
        let store = InMemoryRegistrationStore::new();
        let record = store.insert_pending("Soweto Strikers").await;

        let transition = store
            .confirm_payment(&record.id, Some("1089250"))
            .await
            .expect("confirm");
        assert_eq!(transition, Transition::Applied);

        let stored = store.get(&record.id).await.expect("record");
        assert_eq!(stored.status, RegistrationStatus::Confirmed);
        assert_eq!(stored.pf_payment_id.as_deref(), Some("1089250"));
    }

    #[tokio::test]
    async fn repeated_confirmation_is_a_no_op() {
        let store = InMemoryRegistrationStore::new();
        let record = store.insert_pending("Durban Dolphins").await;

        store
            .confirm_payment(&record.id, Some("1089250"))
            .await
            .expect("first");
        let after_first = store.get(&record.id).await.expect("record");

        let transition = store
            .confirm_payment(&record.id, Some("1089250"))
            .await
            .expect("second");
        assert_eq!(transition, Transition::Unchanged);
        assert_eq!(store.get(&record.id).await.expect("record"), after_first);
    }

    #[tokio::test]
    async fn confirmed_record_keeps_original_transaction_id() {
        let store = InMemoryRegistrationStore::new();
        let record = store.insert_pending("Cape Town Comets").await;

        store
            .confirm_payment(&record.id, Some("first"))
            .await
            .expect("first");
        store
            .confirm_payment(&record.id, Some("second"))
            .await
            .expect("second");

        let stored = store.get(&record.id).await.expect("record");
        assert_eq!(stored.pf_payment_id.as_deref(), Some("first"));
    }

    #[tokio::test]
    async fn unknown_registration_is_unchanged() {
        let store = InMemoryRegistrationStore::new();
        let transition = store
            .confirm_payment("missing", Some("1"))
            .await
            .expect("confirm");
        assert_eq!(transition, Transition::Unchanged);
        assert!(store.get("missing").await.is_none());
    }
}
