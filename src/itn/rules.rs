// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Merchant and fee checks applied after the gateway has confirmed a
//! notification. A genuine notification for another merchant account or a
//! different amount must not confirm a registration.

use tracing::error;

use crate::error::{ItnError, ItnResult};
use crate::models::{Notification, FIELD_AMOUNT_GROSS, FIELD_MERCHANT_ID};

/// Rounding slack in currency units.
pub const AMOUNT_TOLERANCE: f64 = 0.01;

pub fn check_merchant(notification: &Notification, expected_merchant_id: &str) -> ItnResult<()> {
    let merchant_id = notification.get(FIELD_MERCHANT_ID);
    if merchant_id != Some(expected_merchant_id) {
        error!(
            merchant_id = merchant_id.unwrap_or_default(),
            "ITN rejected: merchant_id mismatch"
        );
        return Err(ItnError::MerchantMismatch);
    }
    Ok(())
}

pub fn check_amount(notification: &Notification, expected_amount: f64) -> ItnResult<()> {
    let amount = parse_amount(notification.get(FIELD_AMOUNT_GROSS));
    let difference = (amount - expected_amount).abs();

    if difference > AMOUNT_TOLERANCE {
        error!(
            amount_gross = amount,
            expected = expected_amount,
            "ITN rejected: amount mismatch"
        );
        return Err(ItnError::AmountMismatch);
    }
    Ok(())
}

/// Absent, unparsable, or non-finite amounts count as zero.
///
/// Parsing is strict: a value with trailing junk such as `2650abc` is not
/// read as its numeric prefix, so it fails the fee check.
fn parse_amount(raw: Option<&str>) -> f64 {
    raw.and_then(|value| value.trim().parse::<f64>().ok())
        .filter(|value| value.is_finite())
        .unwrap_or(0.0)
}
