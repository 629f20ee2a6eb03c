// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Registration ITN Service - PayFast Payment Notification Verifier
//!
//! Receives PayFast Instant Transaction Notifications for registration fees
//! and confirms the matching registration once the notification is proven
//! genuine.
//!
//! ## Modules
//!
//! - `api` - HTTP routes (Axum)
//! - `itn` - the verification pipeline stages
//! - `providers` - PayFast server-side validation client
//! - `storage` - registration record store (PostgREST or in-memory)

pub mod api;
pub mod config;
pub mod error;
pub mod itn;
pub mod models;
pub mod providers;
pub mod state;
pub mod storage;
