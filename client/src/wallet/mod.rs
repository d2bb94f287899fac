use alloy_primitives::Address;
use async_trait::async_trait;
use thiserror::Error;

use crate::model::{GrantPermissionsRequest, GrantPermissionsResponse, PermissionGrant};

pub mod memory;

pub use memory::{MemoryWallet, Operation};

/// EIP-1193 "User Rejected Request".
pub const USER_REJECTED_CODE: i64 = 4001;

#[derive(Debug, Error)]
pub enum WalletError {
    /// Error object returned by the wallet's RPC surface.
    #[error("{message}")]
    Rpc { code: i64, message: String },
    /// SDK-level error carrying the error that caused it.
    #[error("{message}")]
    Wrapped {
        message: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    #[error("transport error: {0}")]
    Transport(String),
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl WalletError {
    pub fn user_rejected() -> Self {
        WalletError::Rpc {
            code: USER_REJECTED_CODE,
            message: "User rejected the request.".to_string(),
        }
    }

    pub fn wrap(
        message: impl Into<String>,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        WalletError::Wrapped {
            message: message.into(),
            source: source.into(),
        }
    }
}

#[async_trait]
pub trait AccountConnector: Send + Sync {
    /// Sign in and return the connected account.
    async fn connect(&self) -> Result<Address, WalletError>;
}

#[async_trait]
pub trait PermissionQuery: Send + Sync {
    /// Resolves once the wallet has produced an up-to-date grant list.
    async fn fetch_permissions(&self) -> Result<Vec<PermissionGrant>, WalletError>;
}

#[async_trait]
pub trait PermissionGrantor: Send + Sync {
    async fn grant_permissions(
        &self,
        request: GrantPermissionsRequest,
    ) -> Result<GrantPermissionsResponse, WalletError>;
}

#[async_trait]
pub trait PermissionRevoker: Send + Sync {
    async fn revoke_permissions(&self, id: &str) -> Result<(), WalletError>;
}

/// Everything the subscription view model needs from a wallet.
pub trait Wallet: AccountConnector + PermissionQuery + PermissionGrantor + PermissionRevoker {}

impl<T> Wallet for T where
    T: AccountConnector + PermissionQuery + PermissionGrantor + PermissionRevoker
{
}
