// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, Method},
};

use tracing::{error, warn};

use crate::{error::ItnError, itn, state::AppState};

/// PayFast Instant Transaction Notification callback.
///
/// Every failure is logged once with its classification and turned into a
/// plain-text response here; nothing escapes the handler.
#[utoipa::path(
    post,
    path = "/payfast-itn",
    tag = "ITN",
    request_body(
        content = String,
        content_type = "application/x-www-form-urlencoded",
        description = "PayFast ITN fields in the order PayFast sent them"
    ),
    responses(
        (status = 200, description = "Notification accepted or acknowledged", body = String),
        (status = 400, description = "Notification rejected", body = String),
        (status = 405, description = "Method other than POST", body = String),
        (status = 500, description = "Record store failure", body = String)
    )
)]
pub async fn payfast_itn(
    State(state): State<AppState>,
    method: Method,
    headers: HeaderMap,
    body: Bytes,
) -> Result<&'static str, ItnError> {
    match itn::process(&state, &method, &headers, &body).await {
        Ok(_) => Ok("OK"),
        Err(err) => {
            log_failure(&err);
            Err(err)
        }
    }
}

/// Server faults make PayFast redeliver, so they are logged at error level.
fn log_failure(err: &ItnError) {
    let status = err.status_code().as_u16();
    if err.is_server_fault() {
        error!(
            error_code = err.error_code(),
            server_fault = true,
            status,
            error = %err,
            "ITN processing failed"
        );
    } else {
        warn!(
            error_code = err.error_code(),
            server_fault = false,
            status,
            error = %err,
            "ITN rejected"
        );
    }
}
