use alloy_primitives::{Address, U256};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Spend period as reported by the wallet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    Minute,
    Hour,
    Day,
    Week,
    Month,
    Year,
}

impl Period {
    pub fn as_str(&self) -> &'static str {
        match self {
            Period::Minute => "minute",
            Period::Hour => "hour",
            Period::Day => "day",
            Period::Week => "week",
            Period::Month => "month",
            Period::Year => "year",
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpendClause {
    pub limit: U256,
    pub period: Period,
    // None means the chain's native currency
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<Address>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallClause {
    pub to: Address,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Permissions {
    #[serde(default)]
    pub calls: Vec<CallClause>,
    #[serde(default)]
    pub spend: Vec<SpendClause>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum KeyType {
    #[serde(rename = "p256")]
    P256,
    #[serde(rename = "secp256k1")]
    Secp256k1,
    #[serde(rename = "webauthn-p256")]
    WebAuthnP256,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GrantKey {
    pub public_key: String,
    #[serde(rename = "type")]
    pub key_type: KeyType,
}

/// A permission grant as returned by the wallet's permission query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PermissionGrant {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<Address>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chain_id: Option<u64>,
    pub expiry: u64, // Unix seconds
    pub key: GrantKey,
    pub permissions: Permissions,
}

impl PermissionGrant {
    /// True if any spend clause of this grant is denominated in `token`.
    pub fn spends_token(&self, token: Address) -> bool {
        self.permissions
            .spend
            .iter()
            .any(|spend| spend.token == Some(token))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeLimit {
    pub currency: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GrantPermissionsRequest {
    pub expiry: u64,
    pub fee_limit: FeeLimit,
    pub key: GrantKey,
    pub permissions: Permissions,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrantPermissionsResponse {
    pub id: String,
}
