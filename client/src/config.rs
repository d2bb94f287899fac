use alloy_primitives::Address;
use anyhow::{anyhow, Context, Result};
use std::env;
use std::fmt::Display;
use std::str::FromStr;

/// Base Sepolia
pub const DEFAULT_CHAIN_ID: u64 = 84532;
pub const DEFAULT_EXPIRY_SECS: u64 = 60 * 60;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubscriptionConfig {
    pub chain_id: u64,
    /// Token the subscription is paid in. Grants are matched on it.
    pub token: Address,
    pub token_symbol: String,
    /// Contract the session key may call.
    pub call_target: Address,
    pub fee_currency: String,
    pub fee_value: String,
    /// Lifetime of a granted permission, in seconds.
    pub expiry_secs: u64,
}

impl Default for SubscriptionConfig {
    fn default() -> Self {
        Self {
            chain_id: DEFAULT_CHAIN_ID,
            token: Address::ZERO,
            token_symbol: "EXP".to_string(),
            call_target: Address::ZERO,
            fee_currency: "USD".to_string(),
            fee_value: "1".to_string(),
            expiry_secs: DEFAULT_EXPIRY_SECS,
        }
    }
}

impl SubscriptionConfig {
    /// Load from the process environment, reading `.env` first if present.
    pub fn from_env() -> Result<Self> {
        if let Err(err) = dotenvy::dotenv() {
            if !err.not_found() {
                return Err(err).context("Failed to load .env file");
            }
        }

        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        Ok(Self {
            chain_id: parse_or(&lookup, "CHAIN_ID", defaults.chain_id)?,
            token: parse_or(&lookup, "SUBSCRIPTION_TOKEN", defaults.token)?,
            token_symbol: lookup("SUBSCRIPTION_TOKEN_SYMBOL").unwrap_or(defaults.token_symbol),
            call_target: parse_or(&lookup, "SUBSCRIPTION_CALL_TARGET", defaults.call_target)?,
            fee_currency: lookup("FEE_LIMIT_CURRENCY").unwrap_or(defaults.fee_currency),
            fee_value: lookup("FEE_LIMIT_VALUE").unwrap_or(defaults.fee_value),
            expiry_secs: parse_or(&lookup, "GRANT_EXPIRY_SECS", defaults.expiry_secs)?,
        })
    }
}

fn parse_or<F, T>(lookup: &F, name: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: Display,
{
    match lookup(name) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| anyhow!("{name} is invalid ({raw:?}): {e}")),
        None => Ok(default),
    }
}
