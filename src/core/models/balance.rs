use super::user::PublicUser;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use utoipa::ToSchema;

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct Purchase {
    pub id: String,
    /// Server-assigned, Unix milliseconds
    pub timestamp: i64,
    /// Minor currency units
    pub amount: i64,
    pub purchaser: String,
    pub consumers: Vec<String>,
    pub description: String,
}

/// The shared ledger scope. Persisted whole as one JSON document; there is
/// no field-level update.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Balance {
    pub id: String,
    pub name: String,
    pub owner: String,
    pub users: HashMap<String, PublicUser>,
    /// Pair key -> signed amount in hundredths of a minor unit. Positive
    /// means the lexicographically greater id owes the lower one; read it
    /// through `ledger::peer_balance`, never directly.
    pub user_balances: HashMap<String, i64>,
    /// Append-only, insertion order is chronological order
    pub purchases: Vec<Purchase>,
}

impl Balance {
    pub fn new(id: String, name: String, owner: &PublicUser) -> Self {
        Balance {
            id,
            name,
            owner: owner.id.clone(),
            users: HashMap::from([(owner.id.clone(), owner.clone())]),
            user_balances: HashMap::new(),
            purchases: Vec::new(),
        }
    }

    pub fn is_member(&self, user_id: &str) -> bool {
        self.users.contains_key(user_id)
    }
}
