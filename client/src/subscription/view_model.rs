use alloy_primitives::Address;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::{debug, info, warn};

use super::active::derive_active_subscription;
use super::classify::{classify, ErrorClass};
use super::tiers::{self, Tier, TierUnit, TOKEN_DECIMALS};
use super::view::{ActiveCard, SubscriptionView, TierForm, TierOption};
use crate::clock::{Clock, SystemClock};
use crate::config::SubscriptionConfig;
use crate::format::format_amount;
use crate::keys::SessionKey;
use crate::model::{
    CallClause, FeeLimit, GrantPermissionsRequest, PermissionGrant, Permissions, SpendClause,
};
use crate::notify::{Notification, Notifier};
use crate::wallet::{Wallet, WalletError};

pub const SUBSCRIBE_FAILED: &str = "Subscribe Failed";
pub const SIGN_IN_FAILED: &str = "Sign In Failed";

/// How a user action settled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Completed,
    /// The user declined in the wallet. Nothing was shown.
    Rejected,
    /// A notification carrying this message was emitted.
    Failed(String),
    /// A grant request is still in flight.
    Busy,
}

/// Owned copy of the derived active subscription.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveTier {
    pub grant_id: String,
    pub clause: SpendClause,
    pub tier_index: usize,
}

#[derive(Debug, Default)]
struct ViewState {
    account: Option<Address>,
    permissions: Option<Vec<PermissionGrant>>,
    pending_id: Option<String>,
    selected: TierUnit,
    grant_pending: bool,
}

/// Clears `grant_pending` when the grant call settles or its future is dropped.
struct GrantPendingGuard<'a> {
    state: &'a Mutex<ViewState>,
}

impl Drop for GrantPendingGuard<'_> {
    fn drop(&mut self) {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .grant_pending = false;
    }
}

/// State behind the subscribe widget for one signed-in account.
///
/// All methods take `&self`; the state lock is never held across an
/// `.await`, so the view can be read while a wallet request is in flight.
pub struct SubscriptionViewModel<W, N, C = SystemClock> {
    wallet: W,
    notifier: N,
    clock: C,
    config: SubscriptionConfig,
    state: Mutex<ViewState>,
}

impl<W, N, C> SubscriptionViewModel<W, N, C>
where
    W: Wallet,
    N: Notifier,
    C: Clock,
{
    pub fn new(wallet: W, notifier: N, clock: C, config: SubscriptionConfig) -> Self {
        Self {
            wallet,
            notifier,
            clock,
            config,
            state: Mutex::new(ViewState::default()),
        }
    }

    fn state(&self) -> MutexGuard<'_, ViewState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn account(&self) -> Option<Address> {
        self.state().account
    }

    pub fn selected_tier(&self) -> TierUnit {
        self.state().selected
    }

    pub fn select_tier(&self, unit: TierUnit) {
        self.state().selected = unit;
    }

    pub fn pending_id(&self) -> Option<String> {
        self.state().pending_id.clone()
    }

    pub fn is_grant_pending(&self) -> bool {
        self.state().grant_pending
    }

    pub fn active_tier(&self) -> Option<ActiveTier> {
        let state = self.state();
        derive_active_subscription(
            state.permissions.as_deref(),
            state.pending_id.as_deref(),
            self.config.token,
        )
        .map(|active| ActiveTier {
            grant_id: active.grant.id.clone(),
            clause: active.clause.clone(),
            tier_index: active.tier_index,
        })
    }

    /// Connect the wallet account and load its permissions.
    pub async fn sign_in(&self) -> Outcome {
        let account = match self.wallet.connect().await {
            Ok(account) => account,
            Err(err) => return self.report(SIGN_IN_FAILED, &err),
        };
        info!(%account, "signed in");
        self.state().account = Some(account);

        if let Err(err) = self.refresh().await {
            warn!(error = %err, "failed to load permissions after sign in");
        }
        Outcome::Completed
    }

    /// Replace the cached permission list with the wallet's current one.
    pub async fn refresh(&self) -> Result<(), WalletError> {
        let permissions = self.wallet.fetch_permissions().await?;
        debug!(count = permissions.len(), "permissions refreshed");
        self.state().permissions = Some(permissions);
        Ok(())
    }

    pub fn grant_request(&self, tier: &Tier, key: &SessionKey) -> GrantPermissionsRequest {
        GrantPermissionsRequest {
            expiry: self.clock.now_unix() + self.config.expiry_secs,
            fee_limit: FeeLimit {
                currency: self.config.fee_currency.clone(),
                value: self.config.fee_value.clone(),
            },
            key: key.grant_key(),
            permissions: Permissions {
                calls: vec![CallClause {
                    to: self.config.call_target,
                    signature: None,
                }],
                spend: vec![SpendClause {
                    limit: tier.amount,
                    period: tier.unit.into(),
                    token: Some(self.config.token),
                }],
            },
        }
    }

    /// Grant a spend permission for the selected tier.
    pub async fn submit(&self) -> Outcome {
        let request = {
            let mut state = self.state();
            if state.grant_pending {
                return Outcome::Busy;
            }
            state.grant_pending = true;
            self.grant_request(&tiers::tier_for(state.selected), &SessionKey::generate())
        };
        let grant_pending = GrantPendingGuard { state: &self.state };
        if let Ok(json) = serde_json::to_string(&request) {
            debug!(request = %json, "requesting subscription grant");
        }

        let granted = self.wallet.grant_permissions(request).await;
        drop(grant_pending);
        let response = match granted {
            Ok(response) => response,
            Err(err) => return self.report(SUBSCRIBE_FAILED, &err),
        };

        info!(id = %response.id, "subscription granted");
        self.state().pending_id = Some(response.id);

        match self.refresh().await {
            Ok(()) => {
                self.state().pending_id = None;
                Outcome::Completed
            }
            Err(err) => self.report(SUBSCRIBE_FAILED, &err),
        }
    }

    /// Revoke the grant `id`.
    pub async fn revoke(&self, id: &str) -> Outcome {
        if let Err(err) = self.wallet.revoke_permissions(id).await {
            return self.report(SUBSCRIBE_FAILED, &err);
        }
        info!(id, "subscription revoked");

        // The pending id only correlates UI state, so a failed refresh is ignored.
        match self.refresh().await {
            Ok(()) => self.state().pending_id = None,
            Err(err) => debug!(error = %err, "refresh after revoke failed"),
        }
        Outcome::Completed
    }

    fn report(&self, title: &str, err: &WalletError) -> Outcome {
        match classify(err) {
            ErrorClass::Rejected => {
                debug!(title, "request rejected by user");
                Outcome::Rejected
            }
            ErrorClass::Other(message) => {
                warn!(title, error = %message, "wallet request failed");
                self.notifier.notify(Notification::new(title, message.clone()));
                Outcome::Failed(message)
            }
        }
    }

    pub fn view(&self) -> SubscriptionView {
        let state = self.state();
        if state.account.is_none() {
            return SubscriptionView::SignedOut;
        }

        let symbol = self.config.token_symbol.clone();
        if let Some(active) = derive_active_subscription(
            state.permissions.as_deref(),
            state.pending_id.as_deref(),
            self.config.token,
        ) {
            return SubscriptionView::Active(ActiveCard {
                grant_id: active.grant.id.clone(),
                tier_index: active.tier_index,
                tier_label: tiers::tier_label(active.tier_index),
                amount: format_amount(active.clause.limit, TOKEN_DECIMALS),
                symbol,
                period: active.clause.period,
            });
        }

        let options = tiers::catalog()
            .iter()
            .enumerate()
            .map(|(index, tier)| TierOption {
                unit: tier.unit,
                label: tiers::tier_label(index),
                amount: format_amount(tier.amount, TOKEN_DECIMALS),
                selected: tier.unit == state.selected,
            })
            .collect();

        SubscriptionView::Choose(TierForm {
            options,
            symbol,
            loading: state.permissions.is_none(),
            submit_disabled: state.grant_pending,
            submit_label: if state.grant_pending {
                "Check prompt"
            } else {
                "Subscribe"
            },
        })
    }
}
