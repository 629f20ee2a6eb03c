// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Notification and Registration Models
//!
//! ## Notification
//!
//! A PayFast ITN arrives as an urlencoded form. [`Notification`] keeps the
//! fields as an ordered list of pairs because the signature is computed over
//! the fields in the order PayFast sent them; an unordered map would produce
//! a different canonical string.
//!
//! ## Registration
//!
//! [`RegistrationStatus`] mirrors the `status` column of the `teams` table.
//! Only the `Pending Payment` to `Confirmed` transition is driven from here.

use std::fmt;

use serde::Serialize;

// =============================================================================
// Notification Fields
// =============================================================================

pub const FIELD_MERCHANT_ID: &str = "merchant_id";
pub const FIELD_AMOUNT_GROSS: &str = "amount_gross";
pub const FIELD_PAYMENT_STATUS: &str = "payment_status";
pub const FIELD_M_PAYMENT_ID: &str = "m_payment_id";
pub const FIELD_SIGNATURE: &str = "signature";
pub const FIELD_PF_PAYMENT_ID: &str = "pf_payment_id";

/// Untrusted ITN payload, in arrival order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Notification {
    fields: Vec<(String, String)>,
}

impl Notification {
    /// Parse an `application/x-www-form-urlencoded` body.
    pub fn from_form(body: &[u8]) -> Self {
        Self::from_pairs(url::form_urlencoded::parse(body).into_owned())
    }

    /// Build from key/value pairs. A repeated key replaces the earlier value
    /// but keeps the position where the key first appeared.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut fields: Vec<(String, String)> = Vec::new();
        for (key, value) in pairs {
            let key = key.into();
            let value = value.into();
            match fields.iter_mut().find(|(existing, _)| *existing == key) {
                Some(slot) => slot.1 = value,
                None => fields.push((key, value)),
            }
        }
        Self { fields }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Like [`Notification::get`] but treats an empty value as absent.
    pub fn get_non_empty(&self, key: &str) -> Option<&str> {
        self.get(key).filter(|value| !value.is_empty())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn payment_status(&self) -> PaymentStatus {
        PaymentStatus::parse(self.get(FIELD_PAYMENT_STATUS).unwrap_or_default())
    }

    pub fn registration_id(&self) -> Option<&str> {
        self.get_non_empty(FIELD_M_PAYMENT_ID)
    }

    pub fn pf_payment_id(&self) -> Option<&str> {
        self.get_non_empty(FIELD_PF_PAYMENT_ID)
    }
}

/// `payment_status` token reported by PayFast.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentStatus {
    Complete,
    Pending,
    Cancelled,
    /// Any token this service does not act on, kept verbatim for logging.
    Other(String),
}

impl PaymentStatus {
    pub fn parse(token: &str) -> Self {
        match token {
            "COMPLETE" => Self::Complete,
            "PENDING" => Self::Pending,
            "CANCELLED" => Self::Cancelled,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn is_complete(&self) -> bool {
        matches!(self, Self::Complete)
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Complete => f.write_str("COMPLETE"),
            Self::Pending => f.write_str("PENDING"),
            Self::Cancelled => f.write_str("CANCELLED"),
            Self::Other(token) => f.write_str(token),
        }
    }
}

// =============================================================================
// Registration Records
// =============================================================================

/// Registration lifecycle status as stored in the `teams` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum RegistrationStatus {
    #[serde(rename = "Pending Payment")]
    PendingPayment,
    #[serde(rename = "Confirmed")]
    Confirmed,
    /// Statuses managed elsewhere in the portal.
    #[serde(untagged)]
    Other(String),
}

impl RegistrationStatus {
    pub fn as_str(&self) -> &str {
        match self {
            Self::PendingPayment => "Pending Payment",
            Self::Confirmed => "Confirmed",
            Self::Other(status) => status,
        }
    }
}

/// Result of the single conditional write performed for a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// The record moved to `Confirmed`.
    Applied,
    /// Nothing changed: already confirmed, or no record with that id.
    Unchanged,
}
