mod balance_tests;
mod ledger_props;
mod membership_tests;

use crate::auth::identity::CurrentUser;
use crate::core::service::BalancerService;
use crate::infrastructure::kv::in_memory::InMemoryKv;
use crate::infrastructure::logging::in_memory::InMemoryLogging;

pub fn create_test_service() -> BalancerService<InMemoryLogging, InMemoryKv> {
    BalancerService::new(InMemoryKv::new(), InMemoryLogging::new())
}

pub fn test_user(username: &str) -> CurrentUser {
    CurrentUser::new(username.to_string(), format!("{username} nickname"))
}
