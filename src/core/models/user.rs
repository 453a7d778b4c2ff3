use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use utoipa::ToSchema;

/// Entry in a user's index of joined balances.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct BalanceRef {
    pub name: String,
}

/// Member summary embedded in a balance document.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct PublicUser {
    pub id: String,
    pub username: String,
    pub nickname: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct User {
    pub id: String,
    pub username: String,
    pub nickname: String,
    pub balances: HashMap<String, BalanceRef>,
}

impl User {
    pub fn public(&self) -> PublicUser {
        PublicUser {
            id: self.id.clone(),
            username: self.username.clone(),
            nickname: self.nickname.clone(),
        }
    }
}
