// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::any::Any;

use axum::{
    response::{IntoResponse, Response},
    routing::{any, get},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    catch_panic::CatchPanicLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use tracing::error;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{error::ItnError, state::AppState};

pub mod health;
pub mod itn;

/// Route PayFast posts notifications to (`notify_url`).
pub const ITN_PATH: &str = "/payfast-itn";

pub fn router(state: AppState) -> Router {
    let routes = Router::new()
        // Any method is routed so non-POST requests get the pipeline's 405.
        .route(ITN_PATH, any(itn::payfast_itn))
        .route("/health", get(health::health))
        .route("/health/live", get(health::liveness))
        .route("/health/ready", get(health::readiness))
        .with_state(state);

    Router::new()
        .merge(routes)
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                .layer(TraceLayer::new_for_http())
                .layer(PropagateRequestIdLayer::x_request_id())
                .layer(CatchPanicLayer::custom(panic_response)),
        )
}

fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(message) = panic.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    };

    let err = ItnError::Internal(detail);
    error!(
        error_code = err.error_code(),
        server_fault = err.is_server_fault(),
        error = %err,
        "ITN processing error: handler panicked"
    );
    err.into_response()
}

#[derive(OpenApi)]
#[openapi(
    paths(
        itn::payfast_itn,
        health::health,
        health::liveness,
        health::readiness
    ),
    components(
        schemas(
            health::ReadyResponse,
            health::HealthChecks,
            health::HealthResponse
        )
    ),
    tags(
        (name = "ITN", description = "PayFast payment notifications"),
        (name = "Health", description = "Liveness and readiness probes")
    )
)]
struct ApiDoc;
