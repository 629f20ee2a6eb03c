// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Final pipeline stage: confirm the registration a COMPLETE payment refers to.

use tracing::{error, info, warn};

use super::ItnOutcome;
use crate::error::{ItnError, ItnResult};
use crate::models::{Notification, Transition};
use crate::storage::RegistrationStore;

/// Apply the state transition for a fully verified notification.
///
/// Non-terminal statuses are acknowledged without touching the store so
/// PayFast stops redelivering them.
pub async fn apply_transition(
    store: &dyn RegistrationStore,
    notification: &Notification,
) -> ItnResult<ItnOutcome> {
    let payment_status = notification.payment_status();
    if !payment_status.is_complete() {
        info!(
            payment_status = %payment_status,
            m_payment_id = notification.registration_id().unwrap_or_default(),
            "ITN acknowledged without state change"
        );
        return Ok(ItnOutcome::Acknowledged { payment_status });
    }

    let Some(registration_id) = notification.registration_id() else {
        error!("ITN rejected: missing m_payment_id");
        return Err(ItnError::MissingReference);
    };
    let pf_payment_id = notification.pf_payment_id();

    let transition = store
        .confirm_payment(registration_id, pf_payment_id)
        .await
        .map_err(|e| {
            error!(
                m_payment_id = registration_id,
                backend = store.backend(),
                error = %e,
                "ITN: record store update failed"
            );
            ItnError::PersistenceFailure(e.to_string())
        })?;

    match transition {
        Transition::Applied => info!(
            m_payment_id = registration_id,
            pf_payment_id = pf_payment_id.unwrap_or_default(),
            "Payment confirmed for registration"
        ),
        Transition::Unchanged => warn!(
            m_payment_id = registration_id,
            pf_payment_id = pf_payment_id.unwrap_or_default(),
            "ITN for registration that is already confirmed or does not exist"
        ),
    }

    Ok(ItnOutcome::Confirmed {
        registration_id: registration_id.to_string(),
        transition,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{PaymentStatus, RegistrationStatus};
    use crate::storage::{InMemoryRegistrationStore, StoreError, StoreResult};
    use async_trait::async_trait;

    struct FailingStore;

    #[async_trait]
    impl RegistrationStore for FailingStore {
        async fn confirm_payment(&self, _: &str, _: Option<&str>) -> StoreResult<Transition> {
            Err(StoreError::Status {
                status: 503,
                body: "upstream connect error".to_string(),
            })
        }

        fn backend(&self) -> &'static str {
            "failing"
        }
    }

    fn notification(status: &str, reference: &str) -> Notification {
        Notification::from_pairs([
            ("m_payment_id", reference),
            ("pf_payment_id", "1089250"),
            ("payment_status", status),
        ])
    }

    #[tokio::test]
    async fn complete_payment_confirms_registration() {
        let store = InMemoryRegistrationStore::new();
        let record = store.insert_pending("Pretoria Panthers").await;

        let outcome = apply_transition(&store, &notification("COMPLETE", &record.id))
            .await
            .expect("applied");
        assert_eq!(
            outcome,
            ItnOutcome::Confirmed {
                registration_id: record.id.clone(),
                transition: Transition::Applied,
            }
        );

        let stored = store.get(&record.id).await.expect("record");
        assert_eq!(stored.status, RegistrationStatus::Confirmed);
        assert_eq!(stored.pf_payment_id.as_deref(), Some("1089250"));
    }

    #[tokio::test]
    async fn pending_payment_is_acknowledged_without_mutation() {
        let store = InMemoryRegistrationStore::new();
        let record = store.insert_pending("Bloem Bulls").await;

        let outcome = apply_transition(&store, &notification("PENDING", &record.id))
            .await
            .expect("acknowledged");
        assert_eq!(
            outcome,
            ItnOutcome::Acknowledged {
                payment_status: PaymentStatus::Pending
            }
        );
        assert_eq!(store.get(&record.id).await.expect("record"), record);
    }

    #[tokio::test]
    async fn missing_reference_is_rejected() {
        let store = InMemoryRegistrationStore::new();
        let err = apply_transition(&store, &notification("COMPLETE", ""))
            .await
            .expect_err("missing reference");
        assert!(matches!(err, ItnError::MissingReference));
    }

    #[tokio::test]
    async fn store_failure_is_a_persistence_failure() {
        let err = apply_transition(&FailingStore, &notification("COMPLETE", "team-1"))
            .await
            .expect_err("store failure");
        assert!(matches!(err, ItnError::PersistenceFailure(detail) if detail.contains("503")));
    }

    #[tokio::test]
    async fn non_complete_status_skips_reference_check() {
        let outcome = apply_transition(&FailingStore, &notification("CANCELLED", ""))
            .await
            .expect("acknowledged");
        assert!(matches!(outcome, ItnOutcome::Acknowledged { .. }));
    }
}
