// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # PayFast ITN Verification Pipeline
//!
//! An Instant Transaction Notification is untrusted input from the internet.
//! It passes five stages in order and any failure halts processing before
//! the record store is touched:
//!
//! 1. [`ingress`] - POST only, form parsing, advisory source-IP check
//! 2. [`signature`] - MD5 over the canonical parameter string
//! 3. [`PayFastClient::confirm`](crate::providers::PayFastClient::confirm) -
//!    server-side validation with PayFast
//! 4. [`rules`] - merchant id and registration fee
//! 5. [`apply`] - idempotent `Confirmed` transition
//!
//! Each invocation is independent. The store write is the last step, so an
//! aborted request never leaves a partial update behind.

pub mod apply;
pub mod ingress;
pub mod rules;
pub mod signature;

use axum::http::{HeaderMap, Method};
use tracing::{error, instrument};

use crate::error::{ItnError, ItnResult};
use crate::models::{PaymentStatus, Transition};
use crate::state::AppState;

/// Successful end states of the pipeline. Both are acknowledged with 200.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItnOutcome {
    /// A COMPLETE payment reached the record store.
    Confirmed {
        registration_id: String,
        transition: Transition,
    },
    /// A verified notification with a non-terminal status.
    Acknowledged { payment_status: PaymentStatus },
}

/// Run a raw callback through every stage.
#[instrument(name = "itn", skip_all)]
pub async fn process(
    state: &AppState,
    method: &Method,
    headers: &HeaderMap,
    body: &[u8],
) -> ItnResult<ItnOutcome> {
    let notification = ingress::admit(method, headers, body)?;

    signature::verify(&notification, state.config.passphrase())?;

    let param_string = signature::canonical_string(&notification);
    if let Err(e) = state.gateway.confirm(&param_string).await {
        error!(error = %e, "ITN rejected: PayFast server validation failed");
        return Err(ItnError::UpstreamRejected);
    }

    rules::check_merchant(&notification, &state.config.merchant_id)?;
    rules::check_amount(&notification, state.config.expected_amount)?;

    apply::apply_transition(state.store.as_ref(), &notification).await
}
