// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Registration Record Store
//!
//! The portal's records live in an external store (Supabase PostgREST, table
//! `teams`). The ITN pipeline needs exactly one operation from it: confirm a
//! registration by id, stamping the PayFast transaction id.
//!
//! ## Backends
//!
//! - [`PostgrestRegistrationStore`] - production, service-role credential
//! - [`InMemoryRegistrationStore`] - tests and embedders; not durable
//!
//! ## Concurrency
//!
//! Redelivered or concurrent notifications for the same registration race
//! only inside the store. Each backend applies the confirmation as a single
//! conditional row update (`status <> 'Confirmed'`), so duplicate writes are
//! harmless and no pipeline-level locking exists.

pub mod memory;
pub mod postgrest;

use async_trait::async_trait;

use crate::models::Transition;

pub use memory::{InMemoryRegistrationStore, RegistrationRecord};
pub use postgrest::PostgrestRegistrationStore;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("record store request failed: {0}")]
    Request(String),

    #[error("record store returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("record store response was invalid: {0}")]
    InvalidResponse(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

#[async_trait]
pub trait RegistrationStore: Send + Sync {
    /// Set `status = Confirmed` and `pf_payment_id` on the registration,
    /// unless it is already confirmed.
    ///
    /// Must be safe to call repeatedly with the same arguments.
    async fn confirm_payment(
        &self,
        registration_id: &str,
        pf_payment_id: Option<&str>,
    ) -> StoreResult<Transition>;

    /// Short backend name for health reporting.
    fn backend(&self) -> &'static str;
}
