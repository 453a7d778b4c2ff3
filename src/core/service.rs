use crate::auth::identity::CurrentUser;
use crate::constants::{
    BALANCE_CREATED, MEMBER_JOINED, PURCHASE_ADDED, PURCHASE_DELETED, USER_REGISTERED,
};
use crate::core::errors::BalancerError;
use crate::core::ledger;
use crate::core::models::audit::AppLog;
use crate::core::models::balance::Balance;
use crate::core::models::user::{BalanceRef, PublicUser, User};
use crate::infrastructure::kv::KeyValueStore;
use crate::infrastructure::logging::LoggingService;
use crate::infrastructure::store::LedgerStore;
use chrono::Utc;
use serde::Serialize;
use serde_json::json;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use tracing::{debug, info, warn};
use utoipa::ToSchema;
use uuid::Uuid;

/// One row of the viewer-relative derived view: positive `amount` means
/// the peer owes the viewer, negative means the viewer owes the peer.
/// Amounts are hundredths of a minor unit.
#[derive(Clone, Debug, Serialize, ToSchema)]
pub struct PeerBalance {
    pub user: PublicUser,
    pub amount: i64,
}

pub struct BalancerService<L: LoggingService, K: KeyValueStore> {
    store: LedgerStore<K>,
    logging: L,
}

impl<L: LoggingService, K: KeyValueStore> BalancerService<L, K> {
    pub fn new(kv: K, logging: L) -> Self {
        info!("initializing balancer service");
        BalancerService {
            store: LedgerStore::new(kv),
            logging,
        }
    }

    // USERS

    /// Get-or-create the caller's user document from the trusted identity.
    pub async fn register_user(&self, identity: &CurrentUser) -> Result<User, BalancerError> {
        let _guard = self.store.lock_user(&identity.id).await?;
        if let Some(existing) = self.store.get_user(&identity.id).await? {
            debug!("user {} already registered", existing.id);
            return Ok(existing);
        }

        let user = User {
            id: identity.id.clone(),
            username: identity.username.clone(),
            nickname: identity.nickname.clone(),
            balances: HashMap::new(),
        };
        self.store.put_user(&user).await?;
        info!("registered user {}", user.id);

        self.logging
            .log_action(
                USER_REGISTERED,
                json!({ "user_id": user.id, "username": user.username }),
                Some(&user.id),
            )
            .await?;
        Ok(user)
    }

    /// The caller's own document, including the index of joined balances.
    pub async fn get_user(&self, identity: &CurrentUser) -> Result<User, BalancerError> {
        self.store
            .get_user(&identity.id)
            .await?
            .ok_or_else(|| BalancerError::UserNotFound(identity.id.clone()))
    }

    // BALANCES

    pub async fn create_balance(
        &self,
        identity: &CurrentUser,
        name: String,
    ) -> Result<Balance, BalancerError> {
        if name.trim().is_empty() {
            return Err(BalancerError::invalid_input("name", "must not be empty"));
        }
        info!("user {} creates balance '{}'", identity.id, name);

        self.register_user(identity).await?;
        let balance_id = self.fresh_balance_id().await?;
        let balance = Balance::new(balance_id.clone(), name, &identity.public());
        self.store.put_balance(&balance).await?;

        // the join pass wires the creator's own balance index
        let balance = self.add_user_to_balance(&identity.id, &balance_id).await?;

        self.logging
            .log_action(
                BALANCE_CREATED,
                json!({ "balance_id": balance.id, "name": balance.name, "owner": balance.owner }),
                Some(&identity.id),
            )
            .await?;
        Ok(balance)
    }

    /// Fetch with membership check: only current members may read the
    /// ledger.
    pub async fn get_balance(
        &self,
        identity: &CurrentUser,
        balance_id: &str,
    ) -> Result<Balance, BalancerError> {
        let balance = self
            .store
            .get_balance(balance_id)
            .await?
            .ok_or_else(|| BalancerError::BalanceNotFound(balance_id.to_string()))?;
        if !balance.is_member(&identity.id) {
            warn!("user {} denied access to balance {}", identity.id, balance_id);
            return Err(BalancerError::Forbidden(balance_id.to_string()));
        }
        Ok(balance)
    }

    pub async fn join_balance(
        &self,
        identity: &CurrentUser,
        balance_id: &str,
    ) -> Result<Balance, BalancerError> {
        info!("user {} joins balance {}", identity.id, balance_id);
        self.register_user(identity).await?;
        let balance = self.add_user_to_balance(&identity.id, balance_id).await?;

        self.logging
            .log_action(
                MEMBER_JOINED,
                json!({ "balance_id": balance_id, "user_id": identity.id }),
                Some(&identity.id),
            )
            .await?;
        Ok(balance)
    }

    /// Membership manager: keeps the user's index of balances and the
    /// balance's index of users consistent. The two documents are written
    /// in sequence without a cross-document transaction; a failure between
    /// the writes leaves them diverged until the next successful join, and
    /// the caller always sees the error.
    pub async fn add_user_to_balance(
        &self,
        user_id: &str,
        balance_id: &str,
    ) -> Result<Balance, BalancerError> {
        let _balance_guard = self.store.lock_balance(balance_id).await?;
        let _user_guard = self.store.lock_user(user_id).await?;

        let mut balance = self
            .store
            .get_balance(balance_id)
            .await?
            .ok_or_else(|| BalancerError::BalanceNotFound(balance_id.to_string()))?;
        let mut user = self
            .store
            .get_user(user_id)
            .await?
            .ok_or_else(|| BalancerError::UserNotFound(user_id.to_string()))?;

        user.balances.insert(
            balance_id.to_string(),
            BalanceRef {
                name: balance.name.clone(),
            },
        );
        self.store.put_user(&user).await?;

        balance.users.insert(user.id.clone(), user.public());
        self.store.put_balance(&balance).await?;

        debug!("user {} is now a member of balance {}", user_id, balance_id);
        Ok(balance)
    }

    // PURCHASES

    /// Applies a split purchase on behalf of the caller, who is always the
    /// purchaser. Everything up to the final put happens on an in-memory
    /// copy; a failure anywhere leaves the store unmodified.
    pub async fn add_purchase(
        &self,
        identity: &CurrentUser,
        balance_id: &str,
        amount: i64,
        description: &str,
        consumers: &[String],
    ) -> Result<Balance, BalancerError> {
        info!(
            "user {} adds purchase of {} to balance {}",
            identity.id, amount, balance_id
        );
        let _guard = self.store.lock_balance(balance_id).await?;

        let mut balance = self
            .store
            .get_balance(balance_id)
            .await?
            .ok_or_else(|| BalancerError::BalanceNotFound(balance_id.to_string()))?;
        if !balance.is_member(&identity.id) {
            warn!(
                "user {} attempted a purchase on balance {} without membership",
                identity.id, balance_id
            );
            return Err(BalancerError::Forbidden(balance_id.to_string()));
        }

        let purchase_id = Uuid::new_v4().to_string();
        ledger::apply_split_purchase(
            &mut balance,
            purchase_id.clone(),
            &identity.id,
            amount,
            description,
            consumers,
            Utc::now().timestamp_millis(),
        )?;
        self.store.put_balance(&balance).await?;

        self.logging
            .log_action(
                PURCHASE_ADDED,
                json!({ "balance_id": balance_id, "purchase_id": purchase_id, "amount": amount }),
                Some(&identity.id),
            )
            .await?;
        Ok(balance)
    }

    /// Deletes a purchase and reverses its ledger contribution, restoring
    /// the pair balances to their pre-purchase values.
    pub async fn delete_purchase(
        &self,
        identity: &CurrentUser,
        balance_id: &str,
        purchase_id: &str,
    ) -> Result<Balance, BalancerError> {
        info!(
            "user {} deletes purchase {} from balance {}",
            identity.id, purchase_id, balance_id
        );
        let _guard = self.store.lock_balance(balance_id).await?;

        let mut balance = self
            .store
            .get_balance(balance_id)
            .await?
            .ok_or_else(|| BalancerError::BalanceNotFound(balance_id.to_string()))?;
        if !balance.is_member(&identity.id) {
            warn!(
                "user {} attempted a deletion on balance {} without membership",
                identity.id, balance_id
            );
            return Err(BalancerError::Forbidden(balance_id.to_string()));
        }

        let removed = ledger::revert_purchase(&mut balance, purchase_id)?;
        self.store.put_balance(&balance).await?;

        self.logging
            .log_action(
                PURCHASE_DELETED,
                json!({ "balance_id": balance_id, "purchase_id": removed.id, "amount": removed.amount }),
                Some(&identity.id),
            )
            .await?;
        Ok(balance)
    }

    // DERIVED VIEW

    /// The caller's balance against every other member, sorted by user id.
    pub async fn peer_balances(
        &self,
        identity: &CurrentUser,
        balance_id: &str,
    ) -> Result<Vec<PeerBalance>, BalancerError> {
        let balance = self.get_balance(identity, balance_id).await?;
        let mut peers: Vec<PeerBalance> = balance
            .users
            .values()
            .filter(|user| user.id != identity.id)
            .map(|user| PeerBalance {
                amount: ledger::peer_balance(&balance, &identity.id, &user.id),
                user: user.clone(),
            })
            .collect();
        peers.sort_by(|a, b| a.user.id.cmp(&b.user.id));
        Ok(peers)
    }

    pub async fn get_app_logs(&self) -> Result<Vec<AppLog>, BalancerError> {
        self.logging.get_logs().await
    }

    // UTILITIES

    /// Balance ids are opaque hashes, collision-checked against the store
    /// before first use.
    async fn fresh_balance_id(&self) -> Result<String, BalancerError> {
        loop {
            let id = hex::encode(Sha256::digest(Uuid::new_v4().to_string().as_bytes()));
            if self.store.get_balance(&id).await?.is_none() {
                return Ok(id);
            }
            warn!("balance id collision, regenerating");
        }
    }
}
