// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Transport-level admission of ITN callbacks.
//!
//! The source-address check here is advisory. Edge proxies in front of the
//! service can rewrite or mask the client address, so a miss against the
//! PayFast allow-list is logged and processing continues. Signature and
//! server-side validation remain the gates that matter.

use std::net::Ipv4Addr;

use axum::http::{HeaderMap, Method};
use tracing::warn;

use crate::error::{ItnError, ItnResult};
use crate::models::Notification;

pub const UNKNOWN_SOURCE: &str = "unknown";

const FORWARDED_FOR_HEADER: &str = "x-forwarded-for";
const EDGE_CLIENT_IP_HEADER: &str = "cf-connecting-ip";

/// Published PayFast ITN source ranges, inclusive.
pub const PAYFAST_SOURCE_RANGES: [(Ipv4Addr, Ipv4Addr); 3] = [
    // Production
    (
        Ipv4Addr::new(197, 97, 145, 145),
        Ipv4Addr::new(197, 97, 145, 158),
    ),
    (
        Ipv4Addr::new(41, 74, 179, 193),
        Ipv4Addr::new(41, 74, 179, 222),
    ),
    // Sandbox
    (
        Ipv4Addr::new(144, 126, 193, 139),
        Ipv4Addr::new(144, 126, 193, 139),
    ),
];

/// Accept the request and parse its form body into a [`Notification`].
pub fn admit(method: &Method, headers: &HeaderMap, body: &[u8]) -> ItnResult<Notification> {
    if method != Method::POST {
        return Err(ItnError::TransportRejected);
    }

    let source = source_address(headers);
    if !is_payfast_source(&source) {
        warn!(source_ip = %source, "ITN from address outside PayFast ranges, continuing");
    }

    Ok(Notification::from_form(body))
}

/// Best-effort client address from proxy headers.
pub fn source_address(headers: &HeaderMap) -> String {
    let forwarded = headers
        .get(FORWARDED_FOR_HEADER)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(str::trim)
        .filter(|value| !value.is_empty());

    let edge = || {
        headers
            .get(EDGE_CLIENT_IP_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|value| !value.is_empty())
    };

    forwarded
        .or_else(edge)
        .unwrap_or(UNKNOWN_SOURCE)
        .to_string()
}

pub fn is_payfast_source(address: &str) -> bool {
    let Ok(ip) = address.parse::<Ipv4Addr>() else {
        return false;
    };
    PAYFAST_SOURCE_RANGES
        .iter()
        .any(|(start, end)| (*start..=*end).contains(&ip))
}
