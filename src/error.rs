// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! ITN pipeline errors and their HTTP mapping.
//!
//! PayFast only inspects the status code, so bodies are short plain-text
//! reasons. Internal detail carried by a variant is for logs only and never
//! reaches the response.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

#[derive(Debug, thiserror::Error)]
pub enum ItnError {
    /// Request used a method other than POST.
    #[error("method not allowed")]
    TransportRejected,

    #[error("signature mismatch")]
    InvalidSignature,

    #[error("gateway did not confirm the notification")]
    UpstreamRejected,

    #[error("merchant_id does not match the configured merchant")]
    MerchantMismatch,

    #[error("amount_gross does not match the registration fee")]
    AmountMismatch,

    #[error("m_payment_id missing")]
    MissingReference,

    #[error("record store update failed: {0}")]
    PersistenceFailure(String),

    #[error("internal error: {0}")]
    Internal(String),
}

pub type ItnResult<T> = Result<T, ItnError>;

impl ItnError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::TransportRejected => StatusCode::METHOD_NOT_ALLOWED,
            Self::InvalidSignature
            | Self::UpstreamRejected
            | Self::MerchantMismatch
            | Self::AmountMismatch
            | Self::MissingReference => StatusCode::BAD_REQUEST,
            Self::PersistenceFailure(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Stable code for log correlation.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::TransportRejected => "transport_rejected",
            Self::InvalidSignature => "invalid_signature",
            Self::UpstreamRejected => "upstream_rejected",
            Self::MerchantMismatch => "merchant_mismatch",
            Self::AmountMismatch => "amount_mismatch",
            Self::MissingReference => "missing_reference",
            Self::PersistenceFailure(_) => "persistence_failure",
            Self::Internal(_) => "internal_error",
        }
    }

    /// Server faults, as opposed to rejections of untrusted input.
    pub fn is_server_fault(&self) -> bool {
        matches!(self, Self::PersistenceFailure(_) | Self::Internal(_))
    }

    fn public_message(&self) -> &'static str {
        match self {
            Self::TransportRejected => "Method Not Allowed",
            Self::InvalidSignature => "Invalid signature",
            Self::UpstreamRejected => "Validation failed",
            Self::MerchantMismatch => "Merchant ID mismatch",
            Self::AmountMismatch => "Amount mismatch",
            Self::MissingReference => "Missing payment ID",
            Self::PersistenceFailure(_) => "DB update failed",
            Self::Internal(_) => "Server Error",
        }
    }
}

impl IntoResponse for ItnError {
    fn into_response(self) -> Response {
        (self.status_code(), self.public_message()).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    #[test]
    fn untrusted_input_rejections_are_bad_requests() {
        for err in [
            ItnError::InvalidSignature,
            ItnError::UpstreamRejected,
            ItnError::MerchantMismatch,
            ItnError::AmountMismatch,
            ItnError::MissingReference,
        ] {
            assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
            assert!(!err.is_server_fault());
        }
    }

    #[test]
    fn server_faults_map_to_500() {
        let persistence = ItnError::PersistenceFailure("timeout".to_string());
        assert_eq!(persistence.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(persistence.is_server_fault());
        assert_eq!(persistence.error_code(), "persistence_failure");
    }

    #[test]
    fn wrong_method_maps_to_405() {
        assert_eq!(
            ItnError::TransportRejected.status_code(),
            StatusCode::METHOD_NOT_ALLOWED
        );
    }

    #[tokio::test]
    async fn into_response_hides_internal_detail() {
        let response =
            ItnError::PersistenceFailure("relation \"teams\" does not exist".to_string())
                .into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body_bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = String::from_utf8(body_bytes.to_vec()).unwrap();
        assert_eq!(body, "DB update failed");
    }

    #[tokio::test]
    async fn into_response_returns_plain_text_reason() {
        let response = ItnError::AmountMismatch.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body_bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body_bytes[..], b"Amount mismatch");
    }
}
