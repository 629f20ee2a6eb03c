// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! This module defines environment variable names, default values, and the
//! immutable [`ItnConfig`] assembled from them. Configuration is loaded from
//! the environment once at startup.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `8080` |
//! | `PAYFAST_PASSPHRASE` | Signature salt configured on the PayFast account | Unset |
//! | `PAYFAST_SANDBOX` | `true` validates against the sandbox host | `false` |
//! | `PAYFAST_MERCHANT_ID` | Expected `merchant_id` on notifications | `33250683` |
//! | `PAYFAST_VALIDATE_URL` | Override for the validate endpoint | Derived from sandbox flag |
//! | `SUPABASE_URL` | Record store base URL | Required |
//! | `SUPABASE_SERVICE_ROLE_KEY` | Privileged record store key | Required |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |

use std::{env, fmt, time::Duration};

/// Environment variable name for the PayFast passphrase.
pub const PASSPHRASE_ENV: &str = "PAYFAST_PASSPHRASE";

/// Environment variable name for the sandbox flag.
pub const SANDBOX_ENV: &str = "PAYFAST_SANDBOX";

/// Environment variable name for the expected merchant identifier.
pub const MERCHANT_ID_ENV: &str = "PAYFAST_MERCHANT_ID";

/// Environment variable name for the validate endpoint override.
pub const VALIDATE_URL_ENV: &str = "PAYFAST_VALIDATE_URL";

/// Environment variable name for the record store base URL.
pub const SUPABASE_URL_ENV: &str = "SUPABASE_URL";

/// Environment variable name for the record store service-role key.
///
/// This is the privileged credential used only by the ITN handler, never the
/// client-facing anon key.
pub const SUPABASE_SERVICE_ROLE_KEY_ENV: &str = "SUPABASE_SERVICE_ROLE_KEY";

pub const HOST_ENV: &str = "HOST";
pub const PORT_ENV: &str = "PORT";
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8080;

/// Merchant account the registration fee is paid into.
pub const DEFAULT_MERCHANT_ID: &str = "33250683";

/// Registration fee in ZAR.
pub const EXPECTED_AMOUNT: f64 = 2650.0;

pub const PRODUCTION_VALIDATE_URL: &str = "https://www.payfast.co.za/eng/query/validate";
pub const SANDBOX_VALIDATE_URL: &str = "https://sandbox.payfast.co.za/eng/query/validate";

/// Upper bound for every outbound call made while handling a notification.
pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("configuration missing: {0}")]
    MissingConfig(String),

    #[error("invalid configuration value for {name}: {value}")]
    InvalidValue { name: &'static str, value: String },
}

/// A configuration value that must never appear in logs.
#[derive(Clone, PartialEq, Eq)]
pub struct Secret(String);

impl Secret {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret([REDACTED])")
    }
}

/// Connection details for the PostgREST record store.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub url: String,
    pub service_role_key: Secret,
}

/// Immutable process-wide configuration for the ITN pipeline.
#[derive(Debug, Clone)]
pub struct ItnConfig {
    passphrase: Option<Secret>,
    pub sandbox: bool,
    pub merchant_id: String,
    pub expected_amount: f64,
    pub validate_url: String,
    /// Always set when loaded from the environment. `None` only for configs
    /// built with [`ItnConfig::new`], whose callers supply their own store.
    pub store: Option<StoreConfig>,
    pub http_timeout: Duration,
}

impl ItnConfig {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// Empty values are treated as unset, matching how the gateway
    /// dashboard leaves optional fields blank.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let passphrase = lookup(PASSPHRASE_ENV)
            .filter(|value| !value.is_empty())
            .map(Secret::new);

        let sandbox = match get(SANDBOX_ENV) {
            None => false,
            Some(value) => match value.to_ascii_lowercase().as_str() {
                "true" | "1" => true,
                "false" | "0" => false,
                _ => {
                    return Err(ConfigError::InvalidValue {
                        name: SANDBOX_ENV,
                        value,
                    })
                }
            },
        };

        let merchant_id = get(MERCHANT_ID_ENV).unwrap_or_else(|| DEFAULT_MERCHANT_ID.to_string());

        let validate_url = get(VALIDATE_URL_ENV).unwrap_or_else(|| {
            if sandbox {
                SANDBOX_VALIDATE_URL.to_string()
            } else {
                PRODUCTION_VALIDATE_URL.to_string()
            }
        });

        // Acknowledging a COMPLETE payment without a durable store would stop
        // gateway redelivery and lose the confirmation.
        let store = match (get(SUPABASE_URL_ENV), get(SUPABASE_SERVICE_ROLE_KEY_ENV)) {
            (Some(url), Some(key)) => StoreConfig {
                url,
                service_role_key: Secret::new(key),
            },
            (None, _) => return Err(ConfigError::MissingConfig(SUPABASE_URL_ENV.to_string())),
            (Some(_), None) => {
                return Err(ConfigError::MissingConfig(
                    SUPABASE_SERVICE_ROLE_KEY_ENV.to_string(),
                ))
            }
        };

        Ok(Self {
            passphrase,
            sandbox,
            merchant_id,
            expected_amount: EXPECTED_AMOUNT,
            validate_url,
            store: Some(store),
            http_timeout: DEFAULT_HTTP_TIMEOUT,
        })
    }

    /// Defaults with no passphrase and no record store.
    ///
    /// Pair with [`AppState::new`](crate::state::AppState::new) and an
    /// explicit store; `AppState::from_config` rejects it.
    pub fn new(validate_url: impl Into<String>) -> Self {
        Self {
            passphrase: None,
            sandbox: true,
            merchant_id: DEFAULT_MERCHANT_ID.to_string(),
            expected_amount: EXPECTED_AMOUNT,
            validate_url: validate_url.into(),
            store: None,
            http_timeout: DEFAULT_HTTP_TIMEOUT,
        }
    }

    pub fn with_passphrase(mut self, passphrase: impl Into<String>) -> Self {
        self.passphrase = Some(Secret::new(passphrase));
        self
    }

    /// The verification secret. NEVER log this value.
    pub fn passphrase(&self) -> Option<&str> {
        self.passphrase.as_ref().map(Secret::expose)
    }
}
