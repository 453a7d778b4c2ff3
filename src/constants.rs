// Audit log action names.

pub const USER_REGISTERED: &str = "USER_REGISTERED";
pub const BALANCE_CREATED: &str = "BALANCE_CREATED";
pub const MEMBER_JOINED: &str = "MEMBER_JOINED";
pub const PURCHASE_ADDED: &str = "PURCHASE_ADDED";
pub const PURCHASE_DELETED: &str = "PURCHASE_DELETED";
