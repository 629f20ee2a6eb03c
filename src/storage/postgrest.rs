// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Supabase PostgREST registration store.
//!
//! Confirmation is a single `PATCH` filtered on both the id and
//! `status=neq.Confirmed`, so PostgreSQL applies it as one atomic row update.
//! `Prefer: return=representation` makes PostgREST echo the changed rows,
//! which tells an applied transition apart from a no-op.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;

use super::{RegistrationStore, StoreError, StoreResult};
use crate::config::{Secret, StoreConfig};
use crate::models::{RegistrationStatus, Transition};

pub const REGISTRATIONS_TABLE: &str = "teams";

/// Longest slice of an error body kept in [`StoreError::Status`].
const MAX_ERROR_BODY: usize = 256;

#[derive(Serialize)]
struct ConfirmPatch<'a> {
    status: &'a RegistrationStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pf_payment_id: Option<&'a str>,
}

#[derive(Debug, Clone)]
pub struct PostgrestRegistrationStore {
    base_url: String,
    service_role_key: Secret,
    http: Client,
}

impl PostgrestRegistrationStore {
    pub fn new(
        base_url: impl Into<String>,
        service_role_key: Secret,
        timeout: Duration,
    ) -> StoreResult<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| StoreError::Request(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            base_url: base_url.into(),
            service_role_key,
            http,
        })
    }

    pub fn from_config(config: &StoreConfig, timeout: Duration) -> StoreResult<Self> {
        Self::new(config.url.clone(), config.service_role_key.clone(), timeout)
    }

    fn table_url(&self) -> String {
        format!(
            "{}/rest/v1/{REGISTRATIONS_TABLE}",
            self.base_url.trim_end_matches('/')
        )
    }
}

#[async_trait]
impl RegistrationStore for PostgrestRegistrationStore {
    async fn confirm_payment(
        &self,
        registration_id: &str,
        pf_payment_id: Option<&str>,
    ) -> StoreResult<Transition> {
        let confirmed = RegistrationStatus::Confirmed;
        let patch = ConfirmPatch {
            status: &confirmed,
            pf_payment_id,
        };
        let key = self.service_role_key.expose();

        let response = self
            .http
            .patch(self.table_url())
            .query(&[
                ("id", format!("eq.{registration_id}")),
                ("status", format!("neq.{}", confirmed.as_str())),
            ])
            .header("apikey", key)
            .bearer_auth(key)
            .header("Prefer", "return=representation")
            .json(&patch)
            .send()
            .await
            .map_err(|e| StoreError::Request(format!("PATCH {REGISTRATIONS_TABLE} failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(StoreError::Status {
                status,
                body: body.chars().take(MAX_ERROR_BODY).collect(),
            });
        }

        let rows: Vec<Value> = response
            .json()
            .await
            .map_err(|e| StoreError::InvalidResponse(format!("expected row array: {e}")))?;

        Ok(if rows.is_empty() {
            Transition::Unchanged
        } else {
            Transition::Applied
        })
    }

    fn backend(&self) -> &'static str {
        "postgrest"
    }
}
