use alloy_primitives::Address;
use async_trait::async_trait;
use rand::RngCore;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use super::{
    AccountConnector, PermissionGrantor, PermissionQuery, PermissionRevoker, WalletError,
};
use crate::model::{GrantPermissionsRequest, GrantPermissionsResponse, PermissionGrant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Connect,
    Fetch,
    Grant,
    Revoke,
}

/// Wallet that keeps grants in process memory. Cloning shares state.
#[derive(Debug, Clone)]
pub struct MemoryWallet {
    inner: Arc<Mutex<Inner>>,
}

#[derive(Debug)]
struct Inner {
    account: Address,
    chain_id: u64,
    grants: Vec<PermissionGrant>,
    requests: Vec<GrantPermissionsRequest>,
    failures: Vec<(Operation, WalletError)>,
}

impl MemoryWallet {
    pub fn new(account: Address, chain_id: u64) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                account,
                chain_id,
                grants: Vec::new(),
                requests: Vec::new(),
                failures: Vec::new(),
            })),
        }
    }

    fn inner(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Make the next call of `operation` fail with `error`.
    pub fn fail_next(&self, operation: Operation, error: WalletError) {
        self.inner().failures.push((operation, error));
    }

    /// Make the next call of `operation` look like the user declined it.
    pub fn reject_next(&self, operation: Operation) {
        self.fail_next(operation, WalletError::user_rejected());
    }

    pub fn insert_grant(&self, grant: PermissionGrant) {
        self.inner().grants.push(grant);
    }

    pub fn grants(&self) -> Vec<PermissionGrant> {
        self.inner().grants.clone()
    }

    /// Every grant request received so far, oldest first.
    pub fn requests(&self) -> Vec<GrantPermissionsRequest> {
        self.inner().requests.clone()
    }
}

impl Inner {
    fn take_failure(&mut self, operation: Operation) -> Result<(), WalletError> {
        match self.failures.iter().position(|(op, _)| *op == operation) {
            Some(index) => Err(self.failures.remove(index).1),
            None => Ok(()),
        }
    }
}

fn new_grant_id() -> String {
    let mut id = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut id);
    format!("0x{}", hex::encode(id))
}

#[async_trait]
impl AccountConnector for MemoryWallet {
    async fn connect(&self) -> Result<Address, WalletError> {
        let mut inner = self.inner();
        inner.take_failure(Operation::Connect)?;
        Ok(inner.account)
    }
}

#[async_trait]
impl PermissionQuery for MemoryWallet {
    async fn fetch_permissions(&self) -> Result<Vec<PermissionGrant>, WalletError> {
        let mut inner = self.inner();
        inner.take_failure(Operation::Fetch)?;
        Ok(inner.grants.clone())
    }
}

#[async_trait]
impl PermissionGrantor for MemoryWallet {
    async fn grant_permissions(
        &self,
        request: GrantPermissionsRequest,
    ) -> Result<GrantPermissionsResponse, WalletError> {
        let mut inner = self.inner();
        inner.requests.push(request.clone());
        inner.take_failure(Operation::Grant)?;

        if request.key.public_key.is_empty() {
            return Err(WalletError::InvalidRequest("missing session key".to_string()));
        }
        if request.permissions.spend.is_empty() && request.permissions.calls.is_empty() {
            return Err(WalletError::InvalidRequest("no permissions requested".to_string()));
        }

        let grant = PermissionGrant {
            id: new_grant_id(),
            address: Some(inner.account),
            chain_id: Some(inner.chain_id),
            expiry: request.expiry,
            key: request.key,
            permissions: request.permissions,
        };
        let id = grant.id.clone();
        inner.grants.push(grant);

        Ok(GrantPermissionsResponse { id })
    }
}

#[async_trait]
impl PermissionRevoker for MemoryWallet {
    async fn revoke_permissions(&self, id: &str) -> Result<(), WalletError> {
        let mut inner = self.inner();
        inner.take_failure(Operation::Revoke)?;

        let before = inner.grants.len();
        inner.grants.retain(|grant| grant.id != id);
        if inner.grants.len() == before {
            return Err(WalletError::InvalidRequest(format!("permission {id} not found")));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{FeeLimit, GrantKey, KeyType, Period, Permissions, SpendClause};
    use alloy_primitives::U256;

    fn request() -> GrantPermissionsRequest {
        GrantPermissionsRequest {
            expiry: 100,
            fee_limit: FeeLimit {
                currency: "USD".to_string(),
                value: "1".to_string(),
            },
            key: GrantKey {
                public_key: "0x01".to_string(),
                key_type: KeyType::P256,
            },
            permissions: Permissions {
                calls: Vec::new(),
                spend: vec![SpendClause {
                    limit: U256::from(1u64),
                    period: Period::Month,
                    token: Some(Address::ZERO),
                }],
            },
        }
    }

    #[tokio::test]
    async fn grant_then_revoke() {
        let wallet = MemoryWallet::new(Address::repeat_byte(0x11), 84532);

        let response = wallet.grant_permissions(request()).await.unwrap();
        assert!(response.id.starts_with("0x"));
        assert_eq!(response.id.len(), 66);

        let grants = wallet.fetch_permissions().await.unwrap();
        assert_eq!(grants.len(), 1);
        assert_eq!(grants[0].address, Some(Address::repeat_byte(0x11)));
        assert_eq!(grants[0].chain_id, Some(84532));

        wallet.revoke_permissions(&response.id).await.unwrap();
        assert!(wallet.fetch_permissions().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn revoking_unknown_grant_fails() {
        let wallet = MemoryWallet::new(Address::ZERO, 1);
        let err = wallet.revoke_permissions("0xmissing").await.unwrap_err();
        assert!(matches!(err, WalletError::InvalidRequest(_)));
    }

    #[tokio::test]
    async fn scripted_failures_fire_once() {
        let wallet = MemoryWallet::new(Address::ZERO, 1);
        wallet.reject_next(Operation::Grant);

        let err = wallet.grant_permissions(request()).await.unwrap_err();
        assert!(matches!(err, WalletError::Rpc { code: 4001, .. }));
        assert!(wallet.grants().is_empty());
        assert_eq!(wallet.requests().len(), 1);

        assert!(wallet.grant_permissions(request()).await.is_ok());
        assert_eq!(wallet.grants().len(), 1);
    }

    #[tokio::test]
    async fn failures_only_hit_their_operation() {
        let wallet = MemoryWallet::new(Address::repeat_byte(0x33), 1);
        wallet.fail_next(Operation::Fetch, WalletError::Transport("offline".to_string()));

        assert_eq!(wallet.connect().await.unwrap(), Address::repeat_byte(0x33));
        assert!(wallet.fetch_permissions().await.is_err());
        assert!(wallet.fetch_permissions().await.is_ok());
    }
}
