// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Outbound payment gateway integrations.

pub mod payfast;

pub use payfast::{GatewayError, PayFastClient};
