// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! PayFast ITN signature verification.
//!
//! # Canonical Parameter String
//!
//! 1. Walk the notification fields in arrival order
//! 2. Skip `signature` and any field with an empty value
//! 3. Emit `key=value` with the value percent-encoded, spaces as `+`
//! 4. Join with `&`, then append `&passphrase=...` when a passphrase is set
//!
//! The digest is MD5 rendered as lowercase hex. MD5 is mandated by the
//! gateway's legacy protocol.

use md5::{Digest, Md5};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use subtle::ConstantTimeEq;
use tracing::{debug, error};

use crate::error::{ItnError, ItnResult};
use crate::models::{Notification, FIELD_SIGNATURE};

/// Characters left unescaped by the gateway's encoder: alphanumerics and
/// `- _ . ! ~ * ' ( )`.
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Percent-encode a value, then rewrite encoded spaces as `+`.
pub fn encode_value(value: &str) -> String {
    utf8_percent_encode(value, COMPONENT)
        .to_string()
        .replace("%20", "+")
}

/// Canonical parameter string without the passphrase.
///
/// This is also the body posted to the gateway's validate endpoint.
pub fn canonical_string(notification: &Notification) -> String {
    notification
        .iter()
        .filter(|(key, value)| *key != FIELD_SIGNATURE && !value.is_empty())
        .map(|(key, value)| format!("{key}={}", encode_value(value)))
        .collect::<Vec<_>>()
        .join("&")
}

/// Expected signature for a notification under an optional passphrase.
pub fn compute_signature(notification: &Notification, passphrase: Option<&str>) -> String {
    let mut payload = canonical_string(notification);
    if let Some(passphrase) = passphrase {
        payload.push_str("&passphrase=");
        payload.push_str(&encode_value(passphrase));
    }
    hex::encode(Md5::digest(payload.as_bytes()))
}

/// Verify the `signature` field. Fails closed when it is absent.
pub fn verify(notification: &Notification, passphrase: Option<&str>) -> ItnResult<()> {
    let expected = compute_signature(notification, passphrase);
    let provided = notification.get(FIELD_SIGNATURE).unwrap_or_default();

    if !constant_time_eq(provided, &expected) {
        error!(
            signature_present = !provided.is_empty(),
            "ITN rejected: invalid signature"
        );
        return Err(ItnError::InvalidSignature);
    }

    debug!("ITN signature verified");
    Ok(())
}

/// Length mismatches return early; the expected digest length is public.
fn constant_time_eq(a: &str, b: &str) -> bool {
    a.as_bytes().ct_eq(b.as_bytes()).into()
}

#[cfg(test)]
mod tests {
    use super::*;

    // Reference values produced independently with a JavaScript
    // encodeURIComponent + MD5 implementation.
    const GOLDEN_UNSALTED: &str = "6ab772262e7b0475bb4d557d3dd7515b";
    const GOLDEN_SALTED: &str = "4c5c63f26e89e8cb1ffb8a42bf747a8b";

    fn golden_notification(signature: &str) -> Notification {
        Notification::from_pairs([
            ("merchant_id", "10000100"),
            ("merchant_key", "46f0cd694581a"),
            ("m_payment_id", "team-42"),
            ("pf_payment_id", "1089250"),
            ("payment_status", "COMPLETE"),
            ("item_name", "Team Registration"),
            ("item_description", ""),
            ("amount_gross", "2650.00"),
            ("amount_fee", "-60.95"),
            ("amount_net", "2589.05"),
            ("name_first", "Thandi"),
            ("name_last", "O'Brien"),
            ("email_address", "captain@example.com"),
            ("signature", signature),
        ])
    }

    #[test]
    fn canonical_string_skips_signature_and_empty_fields() {
        let canonical = canonical_string(&golden_notification("deadbeef"));
        assert_eq!(
            canonical,
            "merchant_id=10000100&merchant_key=46f0cd694581a&m_payment_id=team-42\
             &pf_payment_id=1089250&payment_status=COMPLETE&item_name=Team+Registration\
             &amount_gross=2650.00&amount_fee=-60.95&amount_net=2589.05&name_first=Thandi\
             &name_last=O'Brien&email_address=captain%40example.com"
        );
    }

    #[test]
    fn canonical_string_follows_arrival_order() {
        let forward = Notification::from_pairs([("a", "1"), ("b", "2")]);
        let reverse = Notification::from_pairs([("b", "2"), ("a", "1")]);
        assert_eq!(canonical_string(&forward), "a=1&b=2");
        assert_eq!(canonical_string(&reverse), "b=2&a=1");
    }

    #[test]
    fn encoder_matches_gateway_convention() {
        assert_eq!(encode_value("a b"), "a+b");
        assert_eq!(encode_value("~*()!'-_."), "~*()!'-_.");
        assert_eq!(encode_value("a+b&c=d/e"), "a%2Bb%26c%3Dd%2Fe");
        assert_eq!(encode_value("Ünïcode"), "%C3%9Cn%C3%AFcode");
    }

    #[test]
    fn golden_digest_without_passphrase() {
        let notification = golden_notification("");
        assert_eq!(compute_signature(&notification, None), GOLDEN_UNSALTED);
    }

    #[test]
    fn golden_digest_with_passphrase() {
        let notification = golden_notification("");
        assert_eq!(
            compute_signature(&notification, Some("salt and pepper")),
            GOLDEN_SALTED
        );
    }

    #[test]
    fn matching_signature_verifies() {
        let notification = golden_notification(GOLDEN_SALTED);
        assert!(verify(&notification, Some("salt and pepper")).is_ok());
    }

    #[test]
    fn tampered_signature_is_rejected() {
        let notification = golden_notification("4c5c63f26e89e8cb1ffb8a42bf747a8c");
        let err = verify(&notification, Some("salt and pepper")).expect_err("tampered");
        assert!(matches!(err, ItnError::InvalidSignature));
    }

    #[test]
    fn wrong_passphrase_is_rejected() {
        let notification = golden_notification(GOLDEN_SALTED);
        assert!(verify(&notification, Some("salt & pepper")).is_err());
        assert!(verify(&notification, None).is_err());
    }

    #[test]
    fn digest_is_lowercase_hex() {
        let digest = compute_signature(&golden_notification(""), None);
        assert_eq!(digest.len(), 32);
        assert!(digest.chars().all(|c| c.is_ascii_digit() || c.is_ascii_lowercase()));
    }

    #[test]
    fn constant_time_eq_requires_equal_length_and_bytes() {
        assert!(constant_time_eq(GOLDEN_SALTED, GOLDEN_SALTED));
        assert!(!constant_time_eq(GOLDEN_SALTED, &GOLDEN_SALTED[..31]));
        assert!(!constant_time_eq(GOLDEN_SALTED, GOLDEN_UNSALTED));
        assert!(!constant_time_eq("", GOLDEN_SALTED));
    }

    #[test]
    fn uppercase_hex_signature_is_rejected() {
        let notification = golden_notification(&GOLDEN_UNSALTED.to_uppercase());
        assert!(verify(&notification, None).is_err());
    }

    #[test]
    fn missing_signature_field_is_rejected() {
        let notification = Notification::from_pairs([("merchant_id", "10000100")]);
        assert!(matches!(
            verify(&notification, None),
            Err(ItnError::InvalidSignature)
        ));
    }

    #[test]
    fn tampered_field_invalidates_signature() {
        let mut pairs: Vec<(String, String)> = golden_notification(GOLDEN_UNSALTED)
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        for (key, value) in &mut pairs {
            if key == "amount_gross" {
                *value = "1.00".to_string();
            }
        }
        let notification = Notification::from_pairs(pairs);
        assert!(verify(&notification, None).is_err());
    }
}
