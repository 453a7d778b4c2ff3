use crate::core::models::user::PublicUser;
use sha2::{Digest, Sha256};

/// Authenticated caller as supplied by the upstream identity provider. The
/// core trusts this identity and never re-validates credentials.
#[derive(Clone, Debug)]
pub struct CurrentUser {
    pub id: String,
    pub username: String,
    pub nickname: String,
}

impl CurrentUser {
    pub fn new(username: String, nickname: String) -> Self {
        let id = user_id_for_username(&username);
        CurrentUser {
            id,
            username,
            nickname,
        }
    }

    pub fn public(&self) -> PublicUser {
        PublicUser {
            id: self.id.clone(),
            username: self.username.clone(),
            nickname: self.nickname.clone(),
        }
    }
}

/// User ids are the hex-encoded SHA-256 of the username and are never
/// reassigned.
pub fn user_id_for_username(username: &str) -> String {
    hex::encode(Sha256::digest(username.as_bytes()))
}
