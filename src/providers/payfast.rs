// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! PayFast server-side ITN validation.
//!
//! After the signature checks out, the canonical parameter string is posted
//! back to PayFast's `/eng/query/validate` endpoint. PayFast answers with the
//! literal `VALID` only for transactions it actually issued, which catches
//! replayed or fabricated payloads that happen to carry a matching digest.

use std::time::Duration;

use reqwest::{header::CONTENT_TYPE, Client};
use tracing::debug;

use crate::config::ItnConfig;

const VALID_TOKEN: &str = "VALID";

/// Longest slice of an unexpected response body kept for logging.
const MAX_LOGGED_BODY: usize = 64;

#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("PayFast request failed: {0}")]
    Request(String),

    #[error("PayFast validate returned {0}")]
    Status(u16),

    #[error("PayFast did not confirm the notification: {0:?}")]
    NotValid(String),
}

#[derive(Debug, Clone)]
pub struct PayFastClient {
    validate_url: String,
    http: Client,
}

impl PayFastClient {
    pub fn new(validate_url: impl Into<String>, timeout: Duration) -> Result<Self, GatewayError> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| GatewayError::Request(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            validate_url: validate_url.into(),
            http,
        })
    }

    pub fn from_config(config: &ItnConfig) -> Result<Self, GatewayError> {
        Self::new(config.validate_url.clone(), config.http_timeout)
    }

    pub fn validate_url(&self) -> &str {
        &self.validate_url
    }

    /// Ask PayFast to confirm the canonical parameter string.
    ///
    /// Exactly one attempt is made; PayFast redelivers the ITN on failure.
    pub async fn confirm(&self, param_string: &str) -> Result<(), GatewayError> {
        let response = self
            .http
            .post(&self.validate_url)
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(param_string.to_string())
            .send()
            .await
            .map_err(|e| GatewayError::Request(format!("POST validate failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(GatewayError::Status(status.as_u16()));
        }

        let body = response
            .text()
            .await
            .map_err(|e| GatewayError::Request(format!("reading validate response failed: {e}")))?;

        let verdict = body.trim();
        if verdict != VALID_TOKEN {
            return Err(GatewayError::NotValid(
                verdict.chars().take(MAX_LOGGED_BODY).collect(),
            ));
        }

        debug!("PayFast confirmed notification");
        Ok(())
    }
}
